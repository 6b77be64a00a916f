#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod binder;
pub mod cfg;
pub mod compilation;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod lexer;
pub mod lowering;
pub mod macros;
pub mod parser;
pub mod symbols;

extern crate regex;

/// A location in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn null() -> Self {
        Position {
            offset: 0,
            line: 0,
            column: 0,
            file: Rc::new(String::from("<null>")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Source text with precomputed line starts, used to turn byte offsets into
/// line/column pairs while lexing and to quote lines in diagnostics.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        for (index, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(index + 1);
            }
        }

        SourceText { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the zero-based index of the line containing `offset`.
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(next) => next - 1,
        }
    }

    pub fn position(&self, offset: usize, file: &Rc<String>) -> Position {
        let line_index = self.line_index(offset);
        Position {
            offset: offset as u32,
            line: line_index as u32 + 1,
            column: (offset - self.line_starts[line_index]) as u32 + 1,
            file: Rc::clone(file),
        }
    }

    /// Returns the text of a 1-based line without its line terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let index = (line.max(1) - 1) as usize;
        if index >= self.line_starts.len() {
            return "";
        }

        let start = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.text.len());

        self.text[start..end].trim_end_matches(&['\n', '\r'][..])
    }
}

/// Renders a diagnostic with the offending source line and a caret.
/// Diagnostics without a location render as the header line alone.
///
/// ```text
/// Error: UndefinedVariable (Variable `y` is not defined)
/// -> shell
///   |
/// 1 | x = y;
///   | ----^
/// ```
pub fn format_diagnostic(error: &Error, source: &SourceText) -> String {
    let position = error.get_position();
    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let mut output = String::new();
    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("Error: {}", error.get_error_name()));
    } else {
        output.push_str(&format!(
            "Error: {} ({})",
            error.get_error_name(),
            error.get_tip()
        ));
    }

    // Unlocated diagnostics have nothing to quote
    if position.line == 0 {
        return output;
    }

    output.push('\n');
    output.push_str(&format!("-> {}\n", position.file));
    output.push_str(&format!("{:>padding$}\n", "|"));

    let line_text = source.line_text(position.line);
    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);
    output.push_str(&format!("{:>padding$} {:->arrows$}", "|", "^"));

    output
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::SourceText;

    #[test]
    fn test_position_at_offset() {
        let source = SourceText::new(String::from("Hello, world!\nfoo\n\nTesting { }\n"));
        let file = Rc::new(String::from("test.lm"));

        let position = source.position(10, &file);
        assert_eq!(position.line, 1);
        assert_eq!(position.column, 11);

        let position = source.position(27, &file);
        assert_eq!(position.line, 4);
        assert_eq!(position.column, 9);
        assert_eq!(source.line_text(4), "Testing { }");
    }

    #[test]
    fn test_line_text_out_of_range() {
        let source = SourceText::new(String::from("one line"));
        assert_eq!(source.line_text(1), "one line");
        assert_eq!(source.line_text(3), "");
    }
}
