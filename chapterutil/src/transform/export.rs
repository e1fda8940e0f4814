//! Chapter to table projection.
//!
//! Every level becomes exactly one row holding exactly the schema's
//! columns. Level keys the schema does not know are dropped.

use serde_json::Value;

use crate::error::DocumentResult;
use crate::models::{Chapter, Level, Row, Table};
use crate::schema::{FieldDescriptor, Schema};

/// Project a chapter's levels into a table, one row per level in order.
///
/// # Example
/// ```ignore
/// use chapterutil::{export, Chapter, Schema};
///
/// let chapter = Chapter::from_json(r#"{"levels": [{"board": [[1, 2], [3, 4]]}]}"#)?;
/// let table = export(&chapter, &Schema::chapter())?;
/// assert_eq!(table.rows[0].get("board"), Some("[[1, 2], [3, 4]]"));
/// ```
pub fn export(chapter: &Chapter, schema: &Schema) -> DocumentResult<Table> {
    let levels = chapter.levels()?;
    let mut table = Table::new(schema.headers());

    for (index, level) in levels.into_iter().enumerate() {
        let ignored: Vec<&str> = level
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.contains(key))
            .collect();
        if !ignored.is_empty() {
            log::debug!("level {}: dropping fields {:?}", index, ignored);
        }

        table.push(level_to_row(level, schema));
    }

    Ok(table)
}

/// Project a single level into a row.
pub fn level_to_row(level: &Level, schema: &Schema) -> Row {
    let mut row = Row::new(0);
    for field in schema.fields() {
        row.insert(field.name.as_str(), export_cell(field, level.get(&field.name)));
    }
    row
}

/// Cell text for one field of a level.
///
/// Absent fields take the default (or an empty cell). A list field holding
/// a scalar is written as a one-element list, so `"x"` and `["x"]` export
/// identically.
pub fn export_cell(field: &FieldDescriptor, value: Option<&Value>) -> String {
    match value {
        None => field
            .default
            .as_ref()
            .map(|default| field.encode(default))
            .unwrap_or_default(),
        Some(value) if !field.singleton && !value.is_array() => {
            field.encode(&Value::Array(vec![value.clone()]))
        }
        Some(value) => field.encode(value),
    }
}
