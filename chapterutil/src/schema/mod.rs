//! Level schema registry.
//!
//! The schema is the closed, ordered set of level fields a chapter CSV
//! carries. Each field knows how to turn a cell back into a value, whether
//! it is a singleton (stored as-is) or a list field (scalars wrapped in a
//! one-element list on export), and its default when absent.
//!
//! A [`Schema`] is built once, usually with [`Schema::chapter`], and passed
//! by reference to the exporter and importer.
//!
//! # Example
//!
//! ```rust,ignore
//! use chapterutil::schema::Schema;
//!
//! let schema = Schema::chapter();
//! assert_eq!(schema.headers()[0], "board");
//! assert!(schema.field("textgoal").unwrap().singleton);
//! ```

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::LiteralResult;
use crate::literal::{parse_literal, to_literal};

// =============================================================================
// Decoders
// =============================================================================

/// How a field's cell text maps to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDecoder {
    /// Cell holds a literal (`[[1, 2]]`, `{"a": 1}`). An empty cell is null.
    Literal,
    /// Cell holds plain text, taken verbatim.
    Text,
}

impl FieldDecoder {
    /// Decode cell text into a value.
    pub fn decode(&self, cell: &str) -> LiteralResult<Value> {
        match self {
            FieldDecoder::Literal if cell.trim().is_empty() => Ok(Value::Null),
            FieldDecoder::Literal => parse_literal(cell),
            FieldDecoder::Text => Ok(Value::String(cell.to_string())),
        }
    }

    /// Encode a value as cell text, the inverse of [`FieldDecoder::decode`].
    pub fn encode(&self, value: &Value) -> String {
        match (self, value) {
            (FieldDecoder::Text, Value::String(s)) => s.clone(),
            _ => to_literal(value),
        }
    }
}

// =============================================================================
// Field Descriptor
// =============================================================================

/// One schema field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Level key and CSV column header.
    pub name: String,
    pub decoder: FieldDecoder,
    /// Singletons are never wrapped in a one-element list.
    pub singleton: bool,
    /// Substituted when the field is absent on export or blank on import.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// A list field decoded from a literal.
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decoder: FieldDecoder::Literal,
            singleton: false,
            default: None,
        }
    }

    /// A singleton field holding plain text.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decoder: FieldDecoder::Text,
            singleton: true,
            default: None,
        }
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn decode(&self, cell: &str) -> LiteralResult<Value> {
        self.decoder.decode(cell)
    }

    pub fn encode(&self, value: &Value) -> String {
        self.decoder.encode(value)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// An ordered, immutable set of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build a schema. Later duplicates of a field name are dropped.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut unique: Vec<FieldDescriptor> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|f| f.name == field.name) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    /// The level schema used by chapter files.
    pub fn chapter() -> Self {
        Self::new(vec![
            FieldDescriptor::literal("board").with_default(json!([])),
            FieldDescriptor::literal("goal"),
            FieldDescriptor::text("textgoal"),
            FieldDescriptor::literal("toolbox"),
            FieldDescriptor::literal("defines"),
            FieldDescriptor::literal("globals").singleton().with_default(json!({})),
            FieldDescriptor::literal("syntax").with_default(json!([])),
            FieldDescriptor::literal("animationScales").singleton().with_default(json!({})),
            FieldDescriptor::literal("fade").with_default(json!({})),
        ])
    }

    /// Fields in column order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Column headers in order.
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Human-readable listing for the CLI.
    pub fn describe(&self) -> String {
        let mut out = String::from("Level fields (CSV column order):\n\n");
        for field in &self.fields {
            let kind = match (field.decoder, field.singleton) {
                (FieldDecoder::Text, _) => "text",
                (FieldDecoder::Literal, true) => "literal",
                (FieldDecoder::Literal, false) => "literal list",
            };
            let default = field
                .default
                .as_ref()
                .map(|d| format!(" (default {})", to_literal(d)))
                .unwrap_or_default();
            out.push_str(&format!("  {:<16} {}{}\n", field.name, kind, default));
        }
        out
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::chapter()
    }
}

// =============================================================================
// Absence Predicates
// =============================================================================

/// Null, an empty string, an empty list or an empty mapping.
///
/// Numbers and booleans are always content, `0` and `false` included.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A one-element list whose element is blank, e.g. `[""]` or `[null]`.
///
/// This is what an empty list field looks like after a spreadsheet round
/// trip, and it means the field is absent.
pub fn is_collapsed_empty(value: &Value) -> bool {
    matches!(value.as_array(), Some(items) if items.len() == 1 && is_blank(&items[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_field_order() {
        let schema = Schema::chapter();
        assert_eq!(
            schema.headers(),
            vec![
                "board",
                "goal",
                "textgoal",
                "toolbox",
                "defines",
                "globals",
                "syntax",
                "animationScales",
                "fade"
            ]
        );
    }

    #[test]
    fn test_chapter_singletons_and_defaults() {
        let schema = Schema::chapter();
        let singletons: Vec<&str> = schema
            .fields()
            .iter()
            .filter(|f| f.singleton)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(singletons, vec!["textgoal", "globals", "animationScales"]);

        assert_eq!(schema.field("board").unwrap().default, Some(json!([])));
        assert_eq!(schema.field("fade").unwrap().default, Some(json!({})));
        assert_eq!(schema.field("goal").unwrap().default, None);
        assert!(!schema.contains("macros"));
    }

    #[test]
    fn test_duplicate_fields_dropped() {
        let schema = Schema::new(vec![
            FieldDescriptor::literal("a"),
            FieldDescriptor::text("a"),
            FieldDescriptor::literal("b"),
        ]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field("a").unwrap().decoder, FieldDecoder::Literal);
    }

    #[test]
    fn test_literal_decoder() {
        let decoder = FieldDecoder::Literal;
        assert_eq!(decoder.decode("[[1, 2]]").unwrap(), json!([[1, 2]]));
        assert_eq!(decoder.decode("").unwrap(), Value::Null);
        assert_eq!(decoder.decode("  ").unwrap(), Value::Null);
        assert!(decoder.decode("[1,").is_err());
    }

    #[test]
    fn test_text_decoder_is_verbatim() {
        let decoder = FieldDecoder::Text;
        assert_eq!(decoder.decode("Make a star!").unwrap(), json!("Make a star!"));
        assert_eq!(decoder.decode("[not parsed]").unwrap(), json!("[not parsed]"));
        assert_eq!(decoder.encode(&json!("Make a star!")), "Make a star!");
        assert_eq!(decoder.encode(&json!(3)), "3");
    }

    #[test]
    fn test_literal_encoder() {
        assert_eq!(FieldDecoder::Literal.encode(&json!(["star"])), r#"["star"]"#);
        assert_eq!(FieldDecoder::Literal.encode(&json!({})), "{}");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!([""])));
    }

    #[test]
    fn test_is_collapsed_empty() {
        assert!(is_collapsed_empty(&json!([""])));
        assert!(is_collapsed_empty(&json!([null])));
        assert!(is_collapsed_empty(&json!([[]])));
        assert!(!is_collapsed_empty(&json!([])));
        assert!(!is_collapsed_empty(&json!(["", ""])));
        assert!(!is_collapsed_empty(&json!([0])));
        assert!(!is_collapsed_empty(&json!("")));
    }

    #[test]
    fn test_describe_lists_every_field() {
        let text = Schema::chapter().describe();
        assert!(text.contains("board"));
        assert!(text.contains("literal list (default [])"));
        assert!(text.contains("textgoal         text"));
    }
}
