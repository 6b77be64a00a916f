//! The fixed operator tables.
//!
//! Operators are resolved by exact lookup on the token and operand types.
//! No conversion is ever applied to find a match.

use lazy_static::lazy_static;

use crate::{lexer::tokens::TokenKind, symbols::symbols::TypeSymbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulus,
    Power,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, PartialEq)]
pub struct BoundUnaryOperator {
    pub token: TokenKind,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

#[derive(Debug, PartialEq)]
pub struct BoundBinaryOperator {
    pub token: TokenKind,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundUnaryOperator {
    pub fn text(&self) -> &'static str {
        self.token.text().unwrap_or("?")
    }
}

impl BoundBinaryOperator {
    pub fn text(&self) -> &'static str {
        self.token.text().unwrap_or("?")
    }
}

fn binary(
    token: TokenKind,
    kind: BoundBinaryOperatorKind,
    operand_type: TypeSymbol,
    result_type: TypeSymbol,
) -> BoundBinaryOperator {
    BoundBinaryOperator {
        token,
        kind,
        left_type: operand_type,
        right_type: operand_type,
        result_type,
    }
}

lazy_static! {
    static ref UNARY_OPERATORS: Vec<BoundUnaryOperator> = {
        use BoundUnaryOperatorKind::*;

        let mut operators = vec![BoundUnaryOperator {
            token: TokenKind::Not,
            kind: LogicalNegation,
            operand_type: TypeSymbol::Boolean,
            result_type: TypeSymbol::Boolean,
        }];
        for type_ in [TypeSymbol::Integer, TypeSymbol::Byte, TypeSymbol::Double] {
            for (token, kind) in [(TokenKind::Plus, Identity), (TokenKind::Dash, Negation)] {
                operators.push(BoundUnaryOperator {
                    token,
                    kind,
                    operand_type: type_,
                    result_type: type_,
                });
            }
        }
        operators
    };

    static ref BINARY_OPERATORS: Vec<BoundBinaryOperator> = {
        use BoundBinaryOperatorKind::*;

        let mut operators = vec![];
        for type_ in [TypeSymbol::Integer, TypeSymbol::Byte, TypeSymbol::Double] {
            for (token, kind) in [
                (TokenKind::Plus, Addition),
                (TokenKind::Dash, Subtraction),
                (TokenKind::Star, Multiplication),
                (TokenKind::Slash, Division),
                (TokenKind::Percent, Modulus),
                (TokenKind::StarStar, Power),
            ] {
                operators.push(binary(token, kind, type_, type_));
            }
            for (token, kind) in [
                (TokenKind::Equals, Equals),
                (TokenKind::NotEquals, NotEquals),
                (TokenKind::Less, Less),
                (TokenKind::LessEquals, LessOrEquals),
                (TokenKind::Greater, Greater),
                (TokenKind::GreaterEquals, GreaterOrEquals),
            ] {
                operators.push(binary(token, kind, type_, TypeSymbol::Boolean));
            }
        }

        for (token, kind) in [
            (TokenKind::And, LogicalAnd),
            (TokenKind::Or, LogicalOr),
            (TokenKind::Equals, Equals),
            (TokenKind::NotEquals, NotEquals),
        ] {
            operators.push(binary(token, kind, TypeSymbol::Boolean, TypeSymbol::Boolean));
        }

        operators.push(binary(TokenKind::Plus, Addition, TypeSymbol::String, TypeSymbol::String));
        operators.push(binary(TokenKind::Equals, Equals, TypeSymbol::String, TypeSymbol::Boolean));
        operators.push(binary(TokenKind::NotEquals, NotEquals, TypeSymbol::String, TypeSymbol::Boolean));
        operators
    };
}

pub fn bind_unary_operator(
    token: TokenKind,
    operand_type: TypeSymbol,
) -> Option<&'static BoundUnaryOperator> {
    UNARY_OPERATORS
        .iter()
        .find(|operator| operator.token == token && operator.operand_type == operand_type)
}

pub fn bind_binary_operator(
    token: TokenKind,
    left_type: TypeSymbol,
    right_type: TypeSymbol,
) -> Option<&'static BoundBinaryOperator> {
    BINARY_OPERATORS.iter().find(|operator| {
        operator.token == token
            && operator.left_type == left_type
            && operator.right_type == right_type
    })
}
