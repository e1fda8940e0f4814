//! Error types for chapter conversion.
//!
//! - [`LiteralError`] - A cell literal could not be parsed
//! - [`DocumentFormatError`] - The chapter JSON lacks a usable `levels` array
//! - [`TableFormatError`] - A CSV header or cell could not be decoded
//! - [`SplitError`] - Demultiplexing a CSV stream failed
//! - [`ConvertError`] - Top-level errors returned by the pipeline
//!
//! Lower-level errors convert into [`ConvertError`] via `From`, so `?`
//! works across module boundaries.

use thiserror::Error;

// =============================================================================
// Literal Errors
// =============================================================================

/// Errors while parsing a cell literal such as `[[1, 2], {"a": "b"}]`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    /// Byte offset into the cell text.
    pub offset: usize,
    pub message: String,
}

impl LiteralError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

// =============================================================================
// Document Errors
// =============================================================================

/// Errors in the shape of a chapter document.
#[derive(Debug, Error)]
pub enum DocumentFormatError {
    /// The document root is not a JSON object.
    #[error("Chapter must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// No `levels` key at the top level.
    #[error("Chapter has no \"levels\" key")]
    MissingLevels,

    /// `levels` exists but is not an array.
    #[error("Chapter \"levels\" must be an array, found {0}")]
    LevelsNotArray(&'static str),

    /// A level entry is not an object.
    #[error("Level {index} must be an object, found {found}")]
    LevelNotObject { index: usize, found: &'static str },
}

// =============================================================================
// Table Errors
// =============================================================================

/// Errors while reading or decoding a CSV table.
///
/// `row` is the 1-based line number of the record in the CSV (the header is
/// line 1), or 0 when the error is not tied to a row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFormatError {
    pub row: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for TableFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.row, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.row, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.row, self.message)
            }
        }
    }
}

impl std::error::Error for TableFormatError {}

impl TableFormatError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Split Errors
// =============================================================================

/// Errors from the CSV stream splitter.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Output directory does not exist or is not a directory.
    #[error("Output directory not found: {0}")]
    MissingDirectory(String),

    /// A divider line produced an empty file name.
    #[error("Divider on line {0} has no chapter name")]
    EmptyName(usize),

    /// IO error while reading input or writing a chapter file.
    #[error("Split IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by the functions in
/// [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed chapter document.
    #[error("Document error: {0}")]
    Document(#[from] DocumentFormatError),

    /// Malformed CSV table.
    #[error("Table error: {0}")]
    Table(#[from] TableFormatError),

    /// Input file extension is neither `.json` nor `.csv`.
    #[error("Input file must either be .json or .csv, got '{0}'")]
    UnsupportedFileKind(String),

    /// JSON parse or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for literal parsing.
pub type LiteralResult<T> = Result<T, LiteralError>;

/// Result type for document inspection.
pub type DocumentResult<T> = Result<T, DocumentFormatError>;

/// Result type for table reading and decoding.
pub type TableResult<T> = Result<T, TableFormatError>;

/// Result type for stream splitting.
pub type SplitResult<T> = Result<T, SplitError>;

/// Result type for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
