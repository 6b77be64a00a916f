//! Unit tests for diagnostics.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::{Position, Span};
use std::rc::Rc;

fn span_at(line: u32, column: u32) -> Span {
    let position = Position {
        offset: 0,
        line,
        column,
        file: Rc::new("test.lm".to_string()),
    };
    Span {
        start: position.clone(),
        end: position,
    }
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        span_at(1, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.line(), 1);
    assert_eq!(error.column(), 10);
}

#[test]
fn test_undefined_function_message() {
    let error = Error::new(
        ErrorImpl::UndefinedFunction {
            function: "foo".to_string(),
        },
        span_at(2, 1),
    );

    assert_eq!(error.message(), "undefined function 'foo'");
    assert_eq!(error.to_string(), "(2, 1): undefined function 'foo'");
}

#[test]
fn test_invalid_type_names_expected_type() {
    let error = Error::new(
        ErrorImpl::InvalidType {
            expected: "bool".to_string(),
            received: "int".to_string(),
        },
        span_at(1, 5),
    );

    assert!(error.message().contains("invalid type"));
    assert!(error.message().contains("bool"));
}

#[test]
fn test_redefinition_message() {
    let error = Error::new(
        ErrorImpl::SymbolAlreadyDeclared {
            name: "a".to_string(),
        },
        span_at(1, 1),
    );

    assert!(error.message().starts_with("cannot redefine"));
}

#[test]
fn test_break_outside_loop_message() {
    let error = Error::new(
        ErrorImpl::InvalidBreakOrContinue {
            keyword: "break".to_string(),
        },
        span_at(1, 1),
    );

    assert!(error.message().contains("invalid break statement"));
}

#[test]
fn test_error_tip_none() {
    let error = Error::unlocated(ErrorImpl::DivisionByZero);

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.line(), 0);
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::ReadOnlyAssignment {
            variable: "x".to_string(),
        },
        span_at(1, 1),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("var")),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_operator_error_names_both_operands() {
    let error = Error::new(
        ErrorImpl::UndefinedBinaryOperator {
            operator: "+".to_string(),
            left: "bool".to_string(),
            right: "int".to_string(),
        },
        span_at(1, 1),
    );

    let message = error.message();
    assert!(message.contains("'+'"));
    assert!(message.contains("'bool'"));
    assert!(message.contains("'int'"));
}
