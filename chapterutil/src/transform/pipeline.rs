//! File-level conversion pipeline.
//!
//! Combines reading, projection and writing. Output is rendered completely
//! in memory before the destination is opened, so a failed conversion never
//! leaves a half-written file behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use chapterutil::{convert, ConvertOptions, Schema};
//! use std::path::Path;
//!
//! let summary = convert(
//!     Path::new("chapter.json"),
//!     Path::new("chapter.csv"),
//!     &Schema::chapter(),
//!     &ConvertOptions::default(),
//! )?;
//! println!("{} levels", summary.levels);
//! ```

use serde::Serialize;
use std::fs;
use std::path::Path;

use super::export::export;
use super::import::import;
use crate::config::ConvertOptions;
use crate::error::{ConvertError, ConvertResult};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::Chapter;
use crate::parser::{parse_bytes_with, write_table, ParseResult, DEFAULT_DELIMITER};
use crate::schema::Schema;

/// Which way a conversion runs, chosen from the input's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `.json` input: export to CSV.
    Json,
    /// `.csv` input: import into an existing chapter.
    Csv,
}

impl FileKind {
    /// Classify a path by extension, case-insensitively.
    pub fn from_path(path: &Path) -> ConvertResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(FileKind::Json),
            "csv" => Ok(FileKind::Csv),
            _ => Err(ConvertError::UnsupportedFileKind(path.display().to_string())),
        }
    }
}

/// What a conversion did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertSummary {
    /// Input kind, which fixes the direction.
    pub kind: FileKind,
    /// Levels exported or imported.
    pub levels: usize,
    /// CSV delimiter written or read.
    pub delimiter: char,
    /// CSV encoding read (import only).
    pub encoding: Option<String>,
}

// =============================================================================
// In-memory conversions
// =============================================================================

/// Export chapter JSON text to CSV text.
pub fn chapter_json_to_csv(
    json: &str,
    schema: &Schema,
    options: &ConvertOptions,
) -> ConvertResult<(String, ConvertSummary)> {
    let chapter = Chapter::from_json(json)?;
    let table = export(&chapter, schema)?;
    let delimiter = options.delimiter.unwrap_or(DEFAULT_DELIMITER);
    let csv = write_table(&table, delimiter)?;

    let summary = ConvertSummary {
        kind: FileKind::Json,
        levels: table.len(),
        delimiter,
        encoding: None,
    };
    Ok((csv, summary))
}

/// Import CSV bytes into existing chapter JSON text, returning the new
/// chapter JSON text.
pub fn csv_into_chapter_json(
    csv: &[u8],
    existing_json: &str,
    schema: &Schema,
    options: &ConvertOptions,
) -> ConvertResult<(String, ConvertSummary)> {
    let existing = Chapter::from_json(existing_json)?;
    let ParseResult {
        table,
        encoding,
        delimiter,
    } = parse_bytes_with(csv, options.detect_encoding, options.delimiter)?;

    let chapter = import(&table, existing, schema)?;
    let json = chapter.to_json(options.indent)?;

    let summary = ConvertSummary {
        kind: FileKind::Csv,
        levels: table.len(),
        delimiter,
        encoding: Some(encoding),
    };
    Ok((json, summary))
}

// =============================================================================
// File conversions
// =============================================================================

/// Convert a chapter JSON file to a CSV file, overwriting `output`.
pub fn json_to_csv(
    input: &Path,
    output: &Path,
    schema: &Schema,
    options: &ConvertOptions,
) -> ConvertResult<ConvertSummary> {
    log_info(format!("📖 Reading chapter: {}", input.display()));
    let json = fs::read_to_string(input)?;

    let (csv, summary) = chapter_json_to_csv(&json, schema, options)?;
    log_success(format!("Exported {} levels", summary.levels));
    log_info_indent(format!("Columns: {}", schema.headers().join(", ")), 1);

    fs::write(output, csv)?;
    log_success(format!("💾 Table written to: {}", output.display()));
    Ok(summary)
}

/// Replace the levels of the chapter JSON file `output` with the rows of
/// the CSV file `input`.
pub fn csv_to_json(
    input: &Path,
    output: &Path,
    schema: &Schema,
    options: &ConvertOptions,
) -> ConvertResult<ConvertSummary> {
    log_info(format!("📖 Reading table: {}", input.display()));
    let csv = fs::read(input)?;
    let existing = fs::read_to_string(output)?;

    let (json, summary) = csv_into_chapter_json(&csv, &existing, schema, options)?;
    if let Some(ref encoding) = summary.encoding {
        log_success(format!("Encoding: {}", encoding));
    }
    log_success(format!("Delimiter: '{}'", format_delimiter(summary.delimiter)));
    log_success(format!("Imported {} levels", summary.levels));

    fs::write(output, json)?;
    log_success(format!("💾 Chapter written to: {}", output.display()));
    Ok(summary)
}

/// Convert in the direction implied by the input's extension.
pub fn convert(
    input: &Path,
    output: &Path,
    schema: &Schema,
    options: &ConvertOptions,
) -> ConvertResult<ConvertSummary> {
    match FileKind::from_path(input)? {
        FileKind::Json => json_to_csv(input, output, schema, options),
        FileKind::Csv => csv_to_json(input, output, schema, options),
    }
}

pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
