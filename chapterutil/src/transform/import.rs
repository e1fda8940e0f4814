//! Table to chapter reconstruction.
//!
//! Each row is decoded back into a level and the resulting list replaces
//! the chapter's `levels`. Any cell that fails to decode aborts the whole
//! import.

use crate::error::{TableFormatError, TableResult};
use crate::models::{Chapter, Level, Row, Table};
use crate::schema::{is_blank, is_collapsed_empty, Schema};

/// Rebuild levels from `table` and splice them into `chapter`.
///
/// Keys of `chapter` other than `levels` are kept as they are, in place.
pub fn import(table: &Table, mut chapter: Chapter, schema: &Schema) -> TableResult<Chapter> {
    check_headers(table, schema)?;

    let levels = table
        .rows
        .iter()
        .map(|row| row_to_level(row, schema))
        .collect::<TableResult<Vec<_>>>()?;

    chapter.set_levels(levels);
    Ok(chapter)
}

/// The header must name at least one schema field. Unknown columns are
/// ignored.
pub fn check_headers(table: &Table, schema: &Schema) -> TableResult<()> {
    if !table.headers.iter().any(|h| schema.contains(h)) {
        return Err(TableFormatError::new(
            1,
            format!(
                "Header has none of the level columns ({}), found: {}",
                schema.headers().join(", "),
                table.headers.join(", ")
            ),
        ));
    }

    let unknown: Vec<&String> = table.headers.iter().filter(|h| !schema.contains(h)).collect();
    if !unknown.is_empty() {
        log::debug!("ignoring columns {:?}", unknown);
    }
    Ok(())
}

/// Decode one row into a level.
///
/// Per field, in schema order: a column missing from the row is skipped; a
/// collapsed empty list such as `[""]` means absent; other non-blank values
/// are kept; blank values fall back to the default, if any.
pub fn row_to_level(row: &Row, schema: &Schema) -> TableResult<Level> {
    let mut level = Level::new();

    for field in schema.fields() {
        let Some(cell) = row.get(&field.name) else {
            continue;
        };

        let decoded = field.decode(cell).map_err(|e| {
            TableFormatError::new(row.line, e.to_string())
                .with_column(field.name.as_str())
                .with_value(cell)
        })?;

        if is_collapsed_empty(&decoded) {
            continue;
        }

        if !is_blank(&decoded) {
            level.insert(field.name.clone(), decoded);
        } else if let Some(default) = &field.default {
            level.insert(field.name.clone(), default.clone());
        }
    }

    Ok(level)
}
