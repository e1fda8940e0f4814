//! Domain models for chapter conversion.
//!
//! - [`Chapter`] - A chapter document: `levels` plus opaque metadata
//! - [`Level`] - One level record (field name to JSON value)
//! - [`Table`] - CSV rendition of a chapter's levels
//! - [`Row`] - One CSV record, keyed by column header

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{DocumentFormatError, DocumentResult};

/// Key under which a chapter stores its levels.
pub const LEVELS_KEY: &str = "levels";

/// One level: field name to value, in document order.
pub type Level = Map<String, Value>;

/// Short name of a JSON value's type, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Chapter
// =============================================================================

/// A chapter document.
///
/// Only `levels` is interpreted. Every other top-level key is carried
/// through untouched and keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    root: Map<String, Value>,
}

impl Chapter {
    /// Wrap a parsed JSON document. The root must be an object.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(DocumentFormatError::NotAnObject(value_kind(&other))),
        }
    }

    /// Parse a chapter from JSON text.
    pub fn from_json(json: &str) -> Result<Self, crate::error::ConvertError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value)?)
    }

    /// The chapter's levels, in order.
    pub fn levels(&self) -> DocumentResult<Vec<&Level>> {
        let levels = self
            .root
            .get(LEVELS_KEY)
            .ok_or(DocumentFormatError::MissingLevels)?;

        let levels = levels
            .as_array()
            .ok_or_else(|| DocumentFormatError::LevelsNotArray(value_kind(levels)))?;

        levels
            .iter()
            .enumerate()
            .map(|(index, level)| {
                level.as_object().ok_or(DocumentFormatError::LevelNotObject {
                    index,
                    found: value_kind(level),
                })
            })
            .collect()
    }

    /// Replace `levels`, leaving every other key in place.
    ///
    /// A chapter without `levels` gets the key appended.
    pub fn set_levels(&mut self, levels: Vec<Level>) {
        let levels = Value::Array(levels.into_iter().map(Value::Object).collect());
        self.root.insert(LEVELS_KEY.to_string(), levels);
    }

    /// Top-level keys other than `levels`.
    pub fn metadata(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root.iter().filter(|(k, _)| k.as_str() != LEVELS_KEY)
    }

    /// Serialize with the given indent width (0 = compact).
    pub fn to_json(&self, indent: usize) -> serde_json::Result<String> {
        if indent == 0 {
            return serde_json::to_string(&self.root);
        }

        let indent = " ".repeat(indent);
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        serde::Serialize::serialize(&self.root, &mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

// =============================================================================
// Table
// =============================================================================

/// One CSV record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// 1-based line of the record in its CSV (the header is line 1), 0 if built in memory.
    pub line: usize,
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            cells: HashMap::new(),
        }
    }

    /// Cell for a column, `None` if the row has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Set a cell. A repeated column overwrites the earlier cell.
    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<String>) {
        self.cells.insert(column.into(), cell.into());
    }

    pub fn with(mut self, column: impl Into<String>, cell: impl Into<String>) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A CSV table: header plus rows, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_levels_in_order() {
        let chapter = Chapter::from_value(json!({
            "chapterName": "intro",
            "levels": [{"board": ["1"]}, {"board": ["2"]}]
        }))
        .unwrap();

        let levels = chapter.levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1]["board"], json!(["2"]));
    }

    #[test]
    fn test_missing_levels() {
        let chapter = Chapter::from_value(json!({"chapterName": "intro"})).unwrap();
        assert!(matches!(chapter.levels(), Err(DocumentFormatError::MissingLevels)));
    }

    #[test]
    fn test_levels_not_array() {
        let chapter = Chapter::from_value(json!({"levels": {"board": []}})).unwrap();
        assert!(matches!(
            chapter.levels(),
            Err(DocumentFormatError::LevelsNotArray("object"))
        ));
    }

    #[test]
    fn test_level_not_object() {
        let chapter = Chapter::from_value(json!({"levels": [{}, 3]})).unwrap();
        assert!(matches!(
            chapter.levels(),
            Err(DocumentFormatError::LevelNotObject { index: 1, found: "number" })
        ));
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            Chapter::from_value(json!([1, 2])),
            Err(DocumentFormatError::NotAnObject("array"))
        ));
    }

    #[test]
    fn test_set_levels_keeps_key_position() {
        let mut chapter = Chapter::from_json(
            r#"{"chapterName": "intro", "levels": [], "password": "abc", "resources": {"a": 1}}"#,
        )
        .unwrap();

        let mut level = Level::new();
        level.insert("goal".into(), json!(["star"]));
        chapter.set_levels(vec![level]);

        let keys: Vec<String> = chapter.into_value().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["chapterName", "levels", "password", "resources"]);
    }

    #[test]
    fn test_metadata_skips_levels() {
        let chapter = Chapter::from_value(json!({"a": 1, "levels": [], "b": 2})).unwrap();
        let keys: Vec<&String> = chapter.metadata().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_to_json_indent() {
        let chapter = Chapter::from_value(json!({"levels": [1]})).unwrap();
        assert_eq!(chapter.to_json(4).unwrap(), "{\n    \"levels\": [\n        1\n    ]\n}");
        assert_eq!(chapter.to_json(0).unwrap(), r#"{"levels":[1]}"#);
    }

    #[test]
    fn test_row_cells() {
        let row = Row::new(2).with("board", "[]").with("goal", "[\"star\"]");
        assert_eq!(row.get("board"), Some("[]"));
        assert_eq!(row.get("fade"), None);
        assert_eq!(row.len(), 2);
    }
}
