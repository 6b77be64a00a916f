use std::rc::Rc;

use crate::Span;

use super::{
    expressions::{
        AssignmentExpr, BinaryExpr, CallExpr, GroupingExpr, LiteralExpr, PrefixExpr, SymbolExpr,
    },
    statements::{
        BlockStmt, BreakStmt, ContinueStmt, ExpressionStmt, FnDeclStmt, ForStmt, IfStmt,
        ReturnStmt, VarDeclStmt, WhileStmt,
    },
};

/// Statement kinds produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(BlockStmt),
    Expression(ExpressionStmt),
    VarDecl(VarDeclStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Return(ReturnStmt),
    /// Shared so a function symbol can keep its declaration for later binding.
    FnDecl(Rc<FnDeclStmt>),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Block(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::VarDecl(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::For(stmt) => &stmt.span,
            Stmt::Break(stmt) => &stmt.span,
            Stmt::Continue(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::FnDecl(stmt) => &stmt.span,
        }
    }
}

/// Expression kinds produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Grouping(GroupingExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Literal(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Prefix(expr) => &expr.span,
            Expr::Assignment(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
            Expr::Grouping(expr) => &expr.span,
        }
    }
}

/// The root of one submission: its top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl CompilationUnit {
    /// Iterates over the function declarations among the top-level statements.
    pub fn functions(&self) -> impl Iterator<Item = &Rc<FnDeclStmt>> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Stmt::FnDecl(function) => Some(function),
            _ => None,
        })
    }
}
