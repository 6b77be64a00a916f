//! Turns source text into tokens with 1-based line/column spans.
//!
//! Patterns are tried in table order; the first anchored match wins.

pub mod lexer;
pub mod tokens;
