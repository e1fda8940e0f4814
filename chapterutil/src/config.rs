//! Conversion settings.
//!
//! Defaults suit a spreadsheet round trip. The environment (or a `.env`
//! file loaded by the binary) can override them, and CLI flags override
//! the environment.

use crate::logs::log_warning;

/// Indent width for written chapter JSON.
pub const DEFAULT_INDENT: usize = 4;

/// Environment variable holding the CSV delimiter (`,` `;` `|` or `tab`).
pub const ENV_DELIMITER: &str = "CHAPTERUTIL_DELIMITER";

/// Environment variable holding the JSON indent width.
pub const ENV_INDENT: &str = "CHAPTERUTIL_INDENT";

/// Options shared by export and import.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// CSV delimiter. On import, `None` means auto-detect; on export, `,`.
    pub delimiter: Option<char>,

    /// Indent width for written JSON (0 = compact).
    pub indent: usize,

    /// Guess the CSV encoding instead of assuming UTF-8.
    pub detect_encoding: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            indent: DEFAULT_INDENT,
            detect_encoding: true,
        }
    }
}

impl ConvertOptions {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from an arbitrary key lookup. Unusable values are
    /// reported and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(raw) = lookup(ENV_DELIMITER) {
            match parse_delimiter(&raw) {
                Some(d) => options.delimiter = Some(d),
                None => log_warning(format!(
                    "Ignoring {}='{}': expected one ASCII character",
                    ENV_DELIMITER, raw
                )),
            }
        }

        if let Some(raw) = lookup(ENV_INDENT) {
            match raw.trim().parse::<usize>() {
                Ok(indent) => options.indent = indent,
                Err(_) => {
                    log_warning(format!("Ignoring {}='{}': expected a number", ENV_INDENT, raw))
                }
            }
        }

        options
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        if delimiter.is_some() {
            self.delimiter = delimiter;
        }
        self
    }

    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        if let Some(indent) = indent {
            self.indent = indent;
        }
        self
    }
}

/// Parse a delimiter setting. `tab` and `\t` both mean a tab.
pub fn parse_delimiter(raw: &str) -> Option<char> {
    match raw {
        "tab" | "\\t" | "\t" => return Some('\t'),
        _ => {}
    }

    let raw = raw.trim();
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c),
        _ => None,
    }
}
