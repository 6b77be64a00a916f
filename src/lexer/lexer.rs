use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    SourceText, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("lexer patterns are valid regular expressions"),
        handler,
    }
}

lazy_static! {
    /// Tried in order; multi-character operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("^[0-9]+(\\.[0-9]+|b)?", number_handler),
        pattern("^\\s+", skip_handler),
        pattern("^\"(\\\\.|[^\"\\\\])*\"", string_handler),
        pattern("^//[^\n]*", skip_handler),
        pattern("^\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern("^\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern("^\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern("^\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern("^\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern("^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern("^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern("^\\*\\*", MK_DEFAULT_HANDLER!(TokenKind::StarStar, "**")),
        pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern("^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: SourceText,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source: SourceText::new(source),
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source.text()[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Span from the current position covering the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.source.position(self.pos, &self.file),
            end: self.source.position(self.pos + len, &self.file),
        }
    }

    fn matched_len(&self, regex: &Regex) -> usize {
        regex.find(self.remainder()).map_or(0, |found| found.end())
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched_len(regex);
    let matched = lexer.remainder()[..len].to_string();

    let span = lexer.span_of(len);
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, span));
    lexer.advance_n(len);
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched_len(regex);
    lexer.advance_n(len);
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched_len(regex);
    let string_literal = lexer.remainder()[1..len - 1].to_string();

    let mut result = String::new();
    let mut chars = string_literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next_ch) = chars.peek() {
                match next_ch {
                    'n' => {
                        result.push('\n');
                        chars.next();
                    }
                    't' => {
                        result.push('\t');
                        chars.next();
                    }
                    '\\' => {
                        result.push('\\');
                        chars.next();
                    }
                    'r' => {
                        result.push('\r');
                        chars.next();
                    }
                    '"' => {
                        result.push('"');
                        chars.next();
                    }
                    '0' => {
                        result.push('\0');
                        chars.next();
                    }
                    _ => {
                        result.push(ch); // Keep the backslash
                    }
                }
            } else {
                result.push(ch); // Keep the lone backslash
            }
        } else {
            result.push(ch);
        }
    }

    let span = lexer.span_of(len);
    lexer.push(MK_TOKEN!(TokenKind::String, result, span));
    lexer.advance_n(len);
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched_len(regex);
    let value = lexer.remainder()[..len].to_string();
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let span = lexer.span_of(len);
    lexer.push(MK_TOKEN!(kind, value, span));
    lexer.advance_n(len);
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => {
                let token = lex.at();
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: token.to_string(),
                    },
                    lex.span_of(token.len_utf8()),
                ));
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    tracing::trace!(tokens = lex.tokens.len(), "tokenized source");
    Ok(lex.tokens)
}
