//! Type annotations and literal values in the syntax tree.
//!
//! Type clauses are kept as names here; the binder resolves them against
//! the built-in type registry and reports unknown names.

use crate::Span;

/// A literal value as written in source, already classified by the lexer
/// suffix rules: `12` is an int, `12b` a byte, `1.5` a double.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i32),
    Byte(i8),
    Double(f64),
    Boolean(bool),
    String(String),
}

/// A `: name` annotation on a variable, parameter or function.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeClause {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterClause {
    pub name: String,
    pub type_clause: TypeClause,
    pub span: Span,
}
