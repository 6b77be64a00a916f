use crate::{
    ast::types::TypeClause,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Parses the type name after a `:`. Names are resolved by the binder.
pub fn parse_type_clause(parser: &mut Parser) -> Result<TypeClause, Error> {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected type name"),
        },
        parser.current_token().span.clone(),
    );
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;

    Ok(TypeClause {
        name: token.value,
        span: token.span,
    })
}
