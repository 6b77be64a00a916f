use crate::{lexer::tokens::Token, Span};

use super::{ast::Expr, types::LiteralValue};

/// Literal Expression
/// Numbers, strings and `true`/`false`, already classified by type.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: Span,
}

/// Symbol Expression
/// Represents an identifier in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExpr {
    pub value: String,
    pub span: Span,
}

/// Binary Expression
/// Represents an infix operation between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Prefix Expression
/// Represents a unary operation on an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub operator: Token,
    pub right_expr: Box<Expr>,
    pub span: Span,
}

/// Assignment Expression
/// The parser accepts any expression on the left; the binder rejects
/// anything that is not a plain symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub assignee: Box<Expr>,
    pub operator: Token,
    pub value: Box<Expr>,
    pub span: Span,
}

/// Call Expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// Parenthesized expression, kept so spans cover the parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingExpr {
    pub expression: Box<Expr>,
    pub span: Span,
}
