//! # chapterutil - Level chapters as spreadsheets
//!
//! Converts a chapter document (JSON holding an ordered `levels` array plus
//! other metadata) into a CSV table that designers can bulk-edit in a
//! spreadsheet, and splices an edited table back into the chapter.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  export   ┌─────────────┐  write   ┌─────────────┐
//! │ Chapter JSON │──────────▶│    Table    │─────────▶│  CSV file   │
//! │   (levels)   │◀──────────│ (cell text) │◀─────────│ (any enc.)  │
//! └──────────────┘  import   └─────────────┘  parse   └─────────────┘
//!                      ▲
//!                      └── Schema: field order, decoders, defaults
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chapterutil::{convert, ConvertOptions, Schema};
//! use std::path::Path;
//!
//! let schema = Schema::chapter();
//! let options = ConvertOptions::from_env();
//! convert(Path::new("functions.json"), Path::new("functions.csv"), &schema, &options)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Chapter, level, table and row types
//! - [`schema`] - Level field registry
//! - [`literal`] - Restricted cell literal parser and formatter
//! - [`parser`] - CSV reading/writing with auto-detection
//! - [`transform`] - Export, import and the file pipeline
//! - [`split`] - Split a concatenated CSV stream into chapter files
//! - [`config`] - Conversion options
//! - [`logs`] - Levelled progress logging

// Core modules
pub mod error;
pub mod models;

// Schema and cell values
pub mod literal;
pub mod schema;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Auxiliary
pub mod config;
pub mod logs;
pub mod split;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConvertError, ConvertResult, DocumentFormatError, LiteralError, SplitError, TableFormatError,
};

// =============================================================================
// Re-exports - Models & Schema
// =============================================================================

pub use models::{Chapter, Level, Row, Table, LEVELS_KEY};
pub use schema::{is_blank, is_collapsed_empty, FieldDecoder, FieldDescriptor, Schema};

// =============================================================================
// Re-exports - Literals & CSV
// =============================================================================

pub use literal::{parse_literal, to_literal};
pub use parser::{parse_bytes_auto, parse_bytes_with, read_table_str, write_table, ParseResult};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::ConvertOptions;
pub use split::split_stream;
pub use transform::{
    chapter_json_to_csv, convert, csv_into_chapter_json, csv_to_json, export, import, json_to_csv,
    ConvertSummary, FileKind,
};
