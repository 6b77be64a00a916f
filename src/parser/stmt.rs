use std::rc::Rc;

use crate::{
    ast::{
        ast::Stmt,
        statements::{
            BlockStmt, BreakStmt, ContinueStmt, ExpressionStmt, FnDeclStmt, ForStmt, IfStmt,
            ReturnStmt, VarDeclStmt, WhileStmt,
        },
        types::ParameterClause,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type_clause};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    let stmt = parse_expression_stmt(parser)?;
    parser.skip_semicolon();

    Ok(stmt)
}

fn parse_expression_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let expr = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: expr.get_span().clone(),
        expression: expr,
    }))
}

/// Parses `var|val name [: type] [= value]` without its terminator.
fn parse_var_decl(parser: &mut Parser) -> Result<VarDeclStmt, Error> {
    let keyword = parser.advance().clone();

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.current_token().span.clone(),
    );
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type_clause(parser)?)
    } else {
        None
    };

    let assigned_value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    if assigned_value.is_none() {
        let message = if keyword.kind == TokenKind::Val {
            Some("expected initializer in read-only declaration")
        } else if explicit_type.is_none() {
            Some("expected initializer or explicit type")
        } else {
            None
        };

        if let Some(message) = message {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from(message),
                },
                parser.current_token().span.clone(),
            ));
        }
    }

    Ok(VarDeclStmt {
        span: parser.span_from(keyword.span.start.clone()),
        keyword,
        identifier: identifier.value,
        identifier_span: identifier.span,
        explicit_type,
        assigned_value,
    })
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let declaration = parse_var_decl(parser)?;
    parser.skip_semicolon();

    Ok(Stmt::VarDecl(declaration))
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

fn parse_condition(parser: &mut Parser) -> Result<crate::ast::ast::Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_condition(parser)?;
    let then_body = parse_stmt(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_body: Box::new(then_body),
        else_body,
        span: parser.span_from(start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_condition(parser)?;
    let body = parse_stmt(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body: Box::new(body),
        span: parser.span_from(start),
    }))
}

/// `for (init; condition; step) body`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::OpenParen)?;

    let initializer = match parser.current_token_kind() {
        TokenKind::Var | TokenKind::Val => Stmt::VarDecl(parse_var_decl(parser)?),
        _ => parse_expression_stmt(parser)?,
    };
    parser.expect(TokenKind::Semicolon)?;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    let step = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_stmt(parser)?;

    Ok(Stmt::For(ForStmt {
        initializer: Box::new(initializer),
        condition,
        step,
        body: Box::new(body),
        span: parser.span_from(start),
    }))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span.clone();
    parser.skip_semicolon();

    Ok(Stmt::Break(BreakStmt { span }))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span.clone();
    parser.skip_semicolon();

    Ok(Stmt::Continue(ContinueStmt { span }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };
    let span = parser.span_from(start);
    parser.skip_semicolon();

    Ok(Stmt::Return(ReturnStmt { value, span }))
}

/// `fun name(a: int, b: int): int { ... }`
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let identifier = parser.expect(TokenKind::Identifier)?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect(TokenKind::Identifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_clause = parse_type_clause(parser)?;

        parameters.push(ParameterClause {
            span: parser.span_from(name.span.start.clone()),
            name: name.value,
            type_clause,
        });

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type_clause(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Stmt::FnDecl(Rc::new(FnDeclStmt {
        identifier,
        parameters,
        return_type,
        body,
        span: parser.span_from(start),
    })))
}
