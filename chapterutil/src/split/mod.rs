//! Split one concatenated CSV stream into per-chapter files.
//!
//! Spreadsheet exports of a whole game arrive as a single text stream in
//! which each chapter is introduced by a divider line:
//!
//! ```text
//! -------- 03-functions
//! board,goal,textgoal,...
//! ...
//! -------- 04-replication
//! ...
//! ```
//!
//! The divider starts with eight dashes. Its chapter name is whatever
//! follows the ninth character, after the first `-` if there is one, so
//! `-------- 03-functions` writes `functions.csv`. Lines before the first
//! divider have nowhere to go and are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{SplitError, SplitResult};
use crate::logs::{log_info, log_success, log_warning};

static DIVIDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-{8}.?(?:[^-]*-)?(.*)$").expect("divider pattern is valid")
});

/// Chapter name on a divider line, or `None` if the line is ordinary content.
///
/// The line terminator, if any, must already be stripped.
pub fn divider_name(line: &str) -> Option<String> {
    DIVIDER
        .captures(line)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim().to_string())
}

fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Write each chapter section of `reader` to `<output_dir>/<name>.csv`.
///
/// Returns the files written, in the order their dividers appeared. A name
/// that repeats truncates the earlier file. Content lines are copied
/// byte for byte, line endings included.
pub fn split_stream<R: BufRead>(mut reader: R, output_dir: &Path) -> SplitResult<Vec<PathBuf>> {
    if !output_dir.is_dir() {
        return Err(SplitError::MissingDirectory(output_dir.display().to_string()));
    }

    let mut written = Vec::new();
    let mut current: Option<BufWriter<File>> = None;
    let mut skipped = 0usize;
    let mut line = String::new();
    let mut line_no = 0usize;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;

        if let Some(name) = divider_name(strip_terminator(&line)) {
            if name.is_empty() {
                return Err(SplitError::EmptyName(line_no));
            }

            if let Some(mut file) = current.take() {
                file.flush()?;
            }

            let path = output_dir.join(format!("{}.csv", name));
            log_info(format!("Opening file {}", path.display()));
            current = Some(BufWriter::new(File::create(&path)?));
            written.push(path);
        } else if let Some(file) = current.as_mut() {
            file.write_all(line.as_bytes())?;
        } else {
            skipped += 1;
        }
    }

    if let Some(mut file) = current.take() {
        file.flush()?;
    }

    if skipped > 0 {
        log_warning(format!("No output file for {} line(s) before the first divider", skipped));
    }
    log_success(format!("Split {} chapter file(s)", written.len()));

    Ok(written)
}
