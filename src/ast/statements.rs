use std::slice::Iter;

use crate::{lexer::tokens::Token, Span};

use super::{
    ast::{Expr, Stmt},
    types::{ParameterClause, TypeClause},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    /// `var` or `val`; the binder decides mutability from it.
    pub keyword: Token,
    pub identifier: String,
    pub identifier_span: Span,
    pub explicit_type: Option<TypeClause>,
    pub assigned_value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub initializer: Box<Stmt>,
    pub condition: Expr,
    pub step: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub identifier: String,
    pub parameters: Vec<ParameterClause>,
    /// Absent means `void`.
    pub return_type: Option<TypeClause>,
    pub body: BlockStmt,
    pub span: Span,
}
