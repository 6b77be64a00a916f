use crate::{
    ast::{
        ast::Expr,
        expressions::{
            AssignmentExpr, BinaryExpr, CallExpr, GroupingExpr, LiteralExpr, PrefixExpr,
            SymbolExpr,
        },
        types::LiteralValue,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            let token = parser.current_token();
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span.clone(),
            ));
        }
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than `bp`, keep extending lhs
    while let Some(next_bp) = parser.get_bp_lookup().get(&parser.current_token_kind()).copied() {
        if next_bp <= bp {
            break;
        }

        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => break,
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

fn parse_number(value: &str) -> Option<LiteralValue> {
    if let Some(digits) = value.strip_suffix('b') {
        digits.parse::<i8>().ok().map(LiteralValue::Byte)
    } else if value.contains('.') {
        value.parse::<f64>().ok().map(LiteralValue::Double)
    } else {
        value.parse::<i32>().ok().map(LiteralValue::Integer)
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    let expr = match token.kind {
        TokenKind::Number => match parse_number(&token.value) {
            Some(value) => Expr::Literal(LiteralExpr {
                value,
                span: token.span.clone(),
            }),
            None => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span,
                ))
            }
        },
        TokenKind::True | TokenKind::False => Expr::Literal(LiteralExpr {
            value: LiteralValue::Boolean(token.kind == TokenKind::True),
            span: token.span.clone(),
        }),
        TokenKind::String => Expr::Literal(LiteralExpr {
            value: LiteralValue::String(token.value.clone()),
            span: token.span.clone(),
        }),
        TokenKind::Identifier => Expr::Symbol(SymbolExpr {
            value: token.value.clone(),
            span: token.span.clone(),
        }),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span,
            ))
        }
    };

    parser.advance();
    Ok(expr)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        left: Box::new(left),
        operator: operator_token,
        right: Box::new(right),
    }))
}

/// `**` is right-associative: `2 ** 3 ** 2` is `2 ** (3 ** 2)`.
pub fn parse_power_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, BindingPower::Multiplicative)?;

    Ok(Expr::Binary(BinaryExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        left: Box::new(left),
        operator: operator_token,
        right: Box::new(right),
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Prefix(PrefixExpr {
        span: Span {
            start: operator_token.span.start.clone(),
            end: rhs.get_span().end.clone(),
        },
        operator: operator_token,
        right_expr: Box::new(rhs),
    }))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    // Right-associative, so `a = b = 1` assigns `b` first
    let rhs = parse_expr(parser, BindingPower::Default)?;

    Ok(Expr::Assignment(AssignmentExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: rhs.get_span().end.clone(),
        },
        operator: operator_token,
        value: Box::new(rhs),
        assignee: Box::new(left),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Grouping(GroupingExpr {
        expression: Box::new(expr),
        span: parser.span_from(start),
    }))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            let error = Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected ',' or ')' in argument list"),
                },
                parser.current_token().span.clone(),
            );
            parser.expect_error(TokenKind::Comma, Some(error))?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Call(CallExpr {
        span: parser.span_from(left.get_span().start.clone()),
        callee: Box::new(left),
        arguments: args,
    }))
}
