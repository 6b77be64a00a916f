//! Pratt parser producing a `CompilationUnit`.
//!
//! Statements dispatch on their leading token; expressions use NUD/LED
//! handlers ranked by `BindingPower`.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::ast::CompilationUnit,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    Position, SourceText, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
};

/// Token cursor plus the handler tables filled by `create_token_lookups`.
pub struct Parser {
    /// Always terminated by EOF
    tokens: Vec<Token>,
    pos: usize,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Consumes the current token. Stops at the trailing EOF.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Consumes a token of `expected_kind`, or fails with `error`
    /// (`UnexpectedToken` when none is given).
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.value.clone(),
                    },
                    token.span.clone(),
                )),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes an optional statement terminator.
    pub fn skip_semicolon(&mut self) {
        if self.current_token_kind() == TokenKind::Semicolon {
            self.advance();
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers an infix handler together with its binding power.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Prefix handlers leave the binding power table alone, so `-` can be
    /// registered as both prefix and infix.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Returns the end of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        if self.pos == 0 {
            return self.get_position();
        }
        self.tokens[self.pos - 1].span.end.clone()
    }

    /// Span from `start` to the end of the most recently consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.previous_end(),
        }
    }
}

/// Parses a stream of tokens into a compilation unit.
///
/// Parsing stops at the first error.
pub fn parse(tokens: Vec<Token>) -> Result<CompilationUnit, Error> {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);

    let start = parser.get_position();
    let mut statements = vec![];

    while parser.has_tokens() {
        statements.push(parse_stmt(&mut parser)?);
    }

    Ok(CompilationUnit {
        statements,
        span: Span {
            start,
            end: parser.get_position(),
        },
    })
}

/// The front end's output: a root plus zero or more parse diagnostics.
///
/// When diagnostics are present the root is empty and must not be bound.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub source: SourceText,
    pub root: CompilationUnit,
    pub diagnostics: Vec<Error>,
}

impl SyntaxTree {
    /// Tokenizes and parses `text`.
    pub fn parse(text: &str, file: Option<String>) -> SyntaxTree {
        let source = SourceText::new(text.to_string());
        let file_name = Rc::new(file.clone().unwrap_or_else(|| String::from("shell")));
        let empty = CompilationUnit {
            statements: vec![],
            span: Span {
                start: source.position(0, &file_name),
                end: source.position(0, &file_name),
            },
        };

        let result = tokenize(text.to_string(), file).and_then(parse);
        match result {
            Ok(root) => SyntaxTree {
                source,
                root,
                diagnostics: vec![],
            },
            Err(error) => SyntaxTree {
                source,
                root: empty,
                diagnostics: vec![error],
            },
        }
    }
}
