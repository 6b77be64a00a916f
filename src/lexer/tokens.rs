use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("var", TokenKind::Var);
        map.insert("val", TokenKind::Val);
        map.insert("fun", TokenKind::Fun);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Semicolon,
    Colon,
    Comma,

    Plus,
    Dash,
    Slash,
    Star,
    StarStar,
    Percent,

    // Reserved
    Var,
    Val,
    Fun,
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    True,
    False,
}

impl TokenKind {
    /// Returns the source text of operator and keyword tokens.
    pub fn text(&self) -> Option<&'static str> {
        match self {
            TokenKind::OpenCurly => Some("{"),
            TokenKind::CloseCurly => Some("}"),
            TokenKind::OpenParen => Some("("),
            TokenKind::CloseParen => Some(")"),
            TokenKind::Assignment => Some("="),
            TokenKind::Equals => Some("=="),
            TokenKind::Not => Some("!"),
            TokenKind::NotEquals => Some("!="),
            TokenKind::Less => Some("<"),
            TokenKind::LessEquals => Some("<="),
            TokenKind::Greater => Some(">"),
            TokenKind::GreaterEquals => Some(">="),
            TokenKind::Or => Some("||"),
            TokenKind::And => Some("&&"),
            TokenKind::Semicolon => Some(";"),
            TokenKind::Colon => Some(":"),
            TokenKind::Comma => Some(","),
            TokenKind::Plus => Some("+"),
            TokenKind::Dash => Some("-"),
            TokenKind::Slash => Some("/"),
            TokenKind::Star => Some("*"),
            TokenKind::StarStar => Some("**"),
            TokenKind::Percent => Some("%"),
            TokenKind::Var => Some("var"),
            TokenKind::Val => Some("val"),
            TokenKind::Fun => Some("fun"),
            TokenKind::Return => Some("return"),
            TokenKind::If => Some("if"),
            TokenKind::Else => Some("else"),
            TokenKind::While => Some("while"),
            TokenKind::For => Some("for"),
            TokenKind::Break => Some("break"),
            TokenKind::Continue => Some("continue"),
            TokenKind::True => Some("true"),
            TokenKind::False => Some("false"),
            TokenKind::EOF | TokenKind::Number | TokenKind::String | TokenKind::Identifier => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }
}
