use std::rc::Rc;

use crate::{
    ast::types::LiteralValue,
    symbols::symbols::{FunctionSymbol, LabelSymbol, TypeSymbol, VariableSymbol},
    Span,
};

use super::operators::{BoundBinaryOperator, BoundUnaryOperator};

/// A type-checked expression. Every variant knows its result type.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    Literal(LiteralValue),
    Variable(Rc<VariableSymbol>),
    Assignment {
        variable: Rc<VariableSymbol>,
        expression: Box<BoundExpr>,
    },
    Unary {
        operator: &'static BoundUnaryOperator,
        operand: Box<BoundExpr>,
    },
    /// `span` covers the operator token, where runtime errors are reported.
    Binary {
        left: Box<BoundExpr>,
        operator: &'static BoundBinaryOperator,
        right: Box<BoundExpr>,
        span: Span,
    },
    Call {
        function: Rc<FunctionSymbol>,
        arguments: Vec<BoundExpr>,
        span: Span,
    },
    /// An implicit conversion inserted at a declaration, assignment,
    /// argument or return boundary.
    Conversion {
        type_: TypeSymbol,
        expression: Box<BoundExpr>,
    },
}

impl BoundExpr {
    pub fn type_(&self) -> TypeSymbol {
        match self {
            BoundExpr::Literal(value) => match value {
                LiteralValue::Integer(_) => TypeSymbol::Integer,
                LiteralValue::Byte(_) => TypeSymbol::Byte,
                LiteralValue::Double(_) => TypeSymbol::Double,
                LiteralValue::Boolean(_) => TypeSymbol::Boolean,
                LiteralValue::String(_) => TypeSymbol::String,
            },
            BoundExpr::Variable(variable) => variable.type_,
            BoundExpr::Assignment { variable, .. } => variable.type_,
            BoundExpr::Unary { operator, .. } => operator.result_type,
            BoundExpr::Binary { operator, .. } => operator.result_type,
            BoundExpr::Call { function, .. } => function.return_type,
            BoundExpr::Conversion { type_, .. } => *type_,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundBlock {
    pub statements: Vec<BoundStmt>,
}

/// A type-checked statement. `If`, `While` and `For` only exist before
/// lowering; the lowerer replaces them with labels and gotos.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundStmt {
    Block(BoundBlock),
    VariableDeclaration {
        variable: Rc<VariableSymbol>,
        initializer: BoundExpr,
    },
    Expression(BoundExpr),
    If {
        condition: BoundExpr,
        then_stmt: Box<BoundStmt>,
        else_stmt: Option<Box<BoundStmt>>,
    },
    While {
        condition: BoundExpr,
        body: Box<BoundStmt>,
        break_label: LabelSymbol,
        continue_label: LabelSymbol,
    },
    For {
        initializer: Box<BoundStmt>,
        condition: BoundExpr,
        step: BoundExpr,
        body: Box<BoundStmt>,
        break_label: LabelSymbol,
        continue_label: LabelSymbol,
    },
    Label(LabelSymbol),
    Goto(LabelSymbol),
    ConditionalGoto {
        label: LabelSymbol,
        condition: BoundExpr,
        jump_if_true: bool,
    },
    Return(Option<BoundExpr>),
}

impl BoundStmt {
    /// True for statements that end a basic block after themselves.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            BoundStmt::Goto(_) | BoundStmt::ConditionalGoto { .. } | BoundStmt::Return(_)
        )
    }
}
