//! Conversion between chapters and tables.
//!
//! - Export: chapter levels to table rows
//! - Import: table rows back into a chapter
//! - Pipeline: file-level conversions and extension dispatch

pub mod export;
pub mod import;
pub mod pipeline;

pub use export::{export, export_cell, level_to_row};
pub use import::{check_headers, import, row_to_level};
pub use pipeline::*;
