//! Restricted literal parser.
//!
//! Accepts only data: numbers, quoted strings, booleans, null, lists,
//! tuples and mappings. Identifiers other than the boolean/null keywords,
//! operators and calls are rejected, so a spreadsheet cell can never be
//! evaluated as code.

use serde_json::{Map, Number, Value};

use crate::error::{LiteralError, LiteralResult};

/// Maximum nesting of lists/mappings inside one literal.
pub const MAX_DEPTH: usize = 128;

/// Parse a complete literal. Trailing input other than whitespace is an error.
///
/// # Example
/// ```ignore
/// use chapterutil::literal::parse_literal;
/// use serde_json::json;
///
/// let value = parse_literal("[(1, 2), {'a': True}]").unwrap();
/// assert_eq!(value, json!([[1, 2], {"a": true}]));
/// ```
pub fn parse_literal(text: &str) -> LiteralResult<Value> {
    let mut parser = LiteralParser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("Unexpected trailing character '{}'", c)));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError::new(self.pos, message)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> LiteralResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("Expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("Expected '{}', found end of input", expected))),
        }
    }

    fn parse_value(&mut self, depth: usize) -> LiteralResult<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error(format!("Nesting deeper than {} levels", MAX_DEPTH)));
        }

        match self.peek() {
            None => Err(self.error("Unexpected end of input")),
            Some('[') => self.parse_sequence(']', depth),
            Some('(') => self.parse_sequence(')', depth),
            Some('{') => self.parse_mapping(depth),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_keyword(),
            Some(c) => Err(self.error(format!("Unexpected character '{}'", c))),
        }
    }

    /// `[a, b]` or `(a, b)`. A parenthesised single value without a comma
    /// is the value itself, as in `(3)`.
    fn parse_sequence(&mut self, close: char, depth: usize) -> LiteralResult<Value> {
        self.bump();
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }

            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => {
                    self.bump();
                    saw_comma = true;
                }
                Some(c) if c == close => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    return Err(self.error(format!("Expected ',' or '{}', found '{}'", close, c)));
                }
                None => {
                    let open = if close == ']' { '[' } else { '(' };
                    return Err(self.error(format!("Unclosed '{}'", open)));
                }
            }
        }

        if close == ')' && items.len() == 1 && !saw_comma {
            return Ok(items.pop().unwrap_or(Value::Null));
        }
        Ok(Value::Array(items))
    }

    fn parse_mapping(&mut self, depth: usize) -> LiteralResult<Value> {
        self.bump();
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }

            let key_offset = self.pos;
            let key = match self.parse_value(depth + 1)? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(LiteralError::new(
                        key_offset,
                        "Mapping keys must be strings, numbers or booleans",
                    ))
                }
            };

            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(c) => return Err(self.error(format!("Expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("Unclosed '{'")),
            }
        }

        Ok(Value::Object(map))
    }

    fn parse_string(&mut self) -> LiteralResult<String> {
        let start = self.pos;
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();

        loop {
            match self.bump() {
                None => return Err(LiteralError::new(start, "Unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> LiteralResult<char> {
        let offset = self.pos;
        let c = self
            .bump()
            .ok_or_else(|| self.error("Unterminated escape sequence"))?;

        match c {
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            '/' => Ok('/'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            '0' => Ok('\0'),
            'x' => self.parse_code_point(2, offset),
            'u' => self.parse_code_point(4, offset),
            'U' => self.parse_code_point(8, offset),
            other => Err(LiteralError::new(offset, format!("Unknown escape '\\{}'", other))),
        }
    }

    fn parse_code_point(&mut self, digits: usize, offset: usize) -> LiteralResult<char> {
        let hex = self.rest().get(..digits).unwrap_or("");
        if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let message = format!("Expected {} hex digits in escape", digits);
            return Err(LiteralError::new(offset, message));
        }
        self.pos += digits;

        let code = u32::from_str_radix(hex, 16)
            .map_err(|e| LiteralError::new(offset, e.to_string()))?;

        // JSON-style surrogate pair, e.g. \ud83d\ude00
        if digits == 4 && (0xD800..0xDC00).contains(&code) {
            if let Some(low) = self.rest().strip_prefix("\\u").and_then(|r| r.get(..4)) {
                if let Ok(low) = u32::from_str_radix(low, 16) {
                    if (0xDC00..0xE000).contains(&low) {
                        self.pos += 6;
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        return char::from_u32(combined)
                            .ok_or_else(|| LiteralError::new(offset, "Invalid surrogate pair"));
                    }
                }
            }
        }

        char::from_u32(code)
            .ok_or_else(|| LiteralError::new(offset, format!("Invalid code point {:#x}", code)))
    }

    fn parse_number(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '-' | '+' if is_float && self.src[..self.pos].ends_with(['e', 'E']) => {}
                _ => break,
            }
            self.bump();
        }

        let text: String = self.src[start..self.pos].chars().filter(|&c| c != '_').collect();
        let text = text.strip_prefix('+').unwrap_or(&text);

        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(LiteralError::new(start, format!("Invalid number '{}'", text)));
        }

        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Value::Number(u.into()));
            }
        }

        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| LiteralError::new(start, format!("Invalid number '{}'", text)))
    }

    fn parse_keyword(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }

        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            word => Err(LiteralError::new(start, format!("Unexpected identifier '{}'", word))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lists() {
        assert_eq!(parse_literal("[[1, 2], [3, 4]]").unwrap(), json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_python_style_literal() {
        let value = parse_literal("[{'x': 'star', 'n': None}, True, False]").unwrap();
        assert_eq!(value, json!([{"x": "star", "n": null}, true, false]));
    }

    #[test]
    fn test_json_style_literal() {
        let value = parse_literal(r#"{"fade": {"lambda": true}, "list": [null]}"#).unwrap();
        assert_eq!(value, json!({"fade": {"lambda": true}, "list": [null]}));
    }

    #[test]
    fn test_mapping_preserves_key_order() {
        let value = parse_literal("{'z': 1, 'a': 2, 'm': 3}").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_literal("-12").unwrap(), json!(-12));
        assert_eq!(parse_literal("+7").unwrap(), json!(7));
        assert_eq!(parse_literal("1.5").unwrap(), json!(1.5));
        assert_eq!(parse_literal("2e3").unwrap(), json!(2000.0));
        assert_eq!(parse_literal("1_000").unwrap(), json!(1000));
        assert_eq!(parse_literal("18446744073709551615").unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_tuples() {
        assert_eq!(parse_literal("(1, 2)").unwrap(), json!([1, 2]));
        assert_eq!(parse_literal("(1,)").unwrap(), json!([1]));
        assert_eq!(parse_literal("(1)").unwrap(), json!(1));
        assert_eq!(parse_literal("()").unwrap(), json!([]));
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(parse_literal("[1, 2,]").unwrap(), json!([1, 2]));
        assert_eq!(parse_literal("{'a': 1,}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse_literal(r#"'it\'s'"#).unwrap(), json!("it's"));
        assert_eq!(parse_literal(r#""a\nb\t\"c\"""#).unwrap(), json!("a\nb\t\"c\""));
        assert_eq!(parse_literal(r#""é\x41""#).unwrap(), json!("éA"));
        assert_eq!(parse_literal(r#""\ud83d\ude00""#).unwrap(), json!("\u{1F600}"));
        assert_eq!(parse_literal("\"(x) => x\"").unwrap(), json!("(x) => x"));
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        assert_eq!(parse_literal("{1: 'a', True: 'b'}").unwrap(), json!({"1": "a", "true": "b"}));
    }

    #[test]
    fn test_rejects_expressions() {
        assert!(parse_literal("__import__('os')").is_err());
        assert!(parse_literal("1 + 2").is_err());
        assert!(parse_literal("[x]").is_err());
        assert!(parse_literal("{1, 2}").is_err());
        assert!(parse_literal("lambda: 0").is_err());
    }

    #[test]
    fn test_error_offsets() {
        let err = parse_literal("[1, 2").unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("Unclosed"));

        let err = parse_literal("'abc").unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.message.contains("Unterminated"));

        let err = parse_literal("[1] 2").unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_literal("").is_err());
        assert!(parse_literal("   ").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        let err = parse_literal(&deep).unwrap_err();
        assert!(err.message.contains("Nesting"));

        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&ok).is_ok());
    }
}
