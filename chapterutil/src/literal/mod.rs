//! Cell literals.
//!
//! Every non-text column of a chapter CSV holds a literal: a restricted,
//! data-only notation for the JSON values stored in a level. Both the
//! Python-style notation older spreadsheets contain (`['a', True, None]`)
//! and the JSON-style notation written by this crate (`["a", true, null]`)
//! are accepted.

pub mod format;
pub mod parser;

pub use format::to_literal;
pub use parser::{parse_literal, MAX_DEPTH};
