use std::fmt::Display;

use thiserror::Error;

use crate::{Position, Span};

/// A diagnostic reported by any stage of the pipeline.
///
/// Diagnostics are accumulated into lists and never used for control flow;
/// a stage that produced any of them hands nothing to the next stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    /// Creates a diagnostic that is not tied to any source location.
    pub fn unlocated(error_impl: ErrorImpl) -> Self {
        Error::new(error_impl, Span::null())
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidSyntax { .. } => "InvalidSyntax",
            ErrorImpl::UndefinedVariable { .. } => "UndefinedVariable",
            ErrorImpl::UndefinedFunction { .. } => "UndefinedFunction",
            ErrorImpl::SymbolAlreadyDeclared { .. } => "SymbolAlreadyDeclared",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::InvalidType { .. } => "InvalidType",
            ErrorImpl::UndefinedBinaryOperator { .. } => "UndefinedBinaryOperator",
            ErrorImpl::UndefinedUnaryOperator { .. } => "UndefinedUnaryOperator",
            ErrorImpl::InvalidBreakOrContinue { .. } => "InvalidBreakOrContinue",
            ErrorImpl::ExpressionMustHaveValue => "ExpressionMustHaveValue",
            ErrorImpl::WrongArgumentCount { .. } => "WrongArgumentCount",
            ErrorImpl::UnknownDeclarationKeyword { .. } => "UnknownDeclarationKeyword",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::ReadOnlyAssignment { .. } => "ReadOnlyAssignment",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::UnexpectedReturnValue { .. } => "UnexpectedReturnValue",
            ErrorImpl::NotAllPathsReturn { .. } => "NotAllPathsReturn",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::UncallableFunction { .. } => "UncallableFunction",
            ErrorImpl::EvaluationInterrupted => "EvaluationInterrupted",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a closing bracket?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it outside the range of its type?",
                token
            )),
            ErrorImpl::UndefinedVariable { variable } => {
                ErrorTip::Suggestion(format!("Declare `{}` with `var` or `val` first", variable))
            }
            ErrorImpl::UndefinedFunction { function } => {
                ErrorTip::Suggestion(format!("Declare `{}` with `fun` first", function))
            }
            ErrorImpl::SymbolAlreadyDeclared { name } => ErrorTip::Suggestion(format!(
                "`{}` can only be shadowed from a nested block",
                name
            )),
            ErrorImpl::ReadOnlyAssignment { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` with `var` to allow reassignment",
                variable
            )),
            ErrorImpl::InvalidBreakOrContinue { keyword } => ErrorTip::Suggestion(format!(
                "`{}` can only appear inside `while` or `for`",
                keyword
            )),
            ErrorImpl::NotAllPathsReturn { function } => ErrorTip::Suggestion(format!(
                "Add a `return` to every path through `{}`",
                function
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}): {}",
            self.span.start.line, self.span.start.column, self.internal_error
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid syntax: {message}")]
    InvalidSyntax { message: String },
    #[error("undefined variable '{variable}'")]
    UndefinedVariable { variable: String },
    #[error("undefined function '{function}'")]
    UndefinedFunction { function: String },
    #[error("cannot redefine '{name}' in the same scope")]
    SymbolAlreadyDeclared { name: String },
    #[error("type mismatch: cannot convert '{received}' to '{expected}'")]
    TypeMatchError { expected: String, received: String },
    #[error("type mismatch in call to '{function}': argument {position} expects '{expected}', received '{received}'")]
    ArgumentTypeMatchError {
        function: String,
        position: usize,
        expected: String,
        received: String,
    },
    #[error("invalid type '{received}', expected '{expected}'")]
    InvalidType { expected: String, received: String },
    #[error("operator '{operator}' is not defined for types '{left}' and '{right}'")]
    UndefinedBinaryOperator {
        operator: String,
        left: String,
        right: String,
    },
    #[error("operator '{operator}' is not defined for type '{operand}'")]
    UndefinedUnaryOperator { operator: String, operand: String },
    #[error("invalid {keyword} statement outside of a loop")]
    InvalidBreakOrContinue { keyword: String },
    #[error("expression must have a value")]
    ExpressionMustHaveValue,
    #[error("function '{function}' expects {expected} arguments, received {received}")]
    WrongArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("unknown declaration keyword '{keyword}'")]
    UnknownDeclarationKeyword { keyword: String },
    #[error("unknown type '{type_}'")]
    UnknownType { type_: String },
    #[error("cannot reassign read-only variable '{variable}'")]
    ReadOnlyAssignment { variable: String },
    #[error("return statement outside of a function")]
    ReturnOutsideFunction,
    #[error("function '{function}' must return a value of type '{expected}'")]
    MissingReturnValue { function: String, expected: String },
    #[error("function '{function}' returns void and cannot return a value")]
    UnexpectedReturnValue { function: String },
    #[error("not all code paths of '{function}' return a value")]
    NotAllPathsReturn { function: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("function '{function}' has errors and cannot be called")]
    UncallableFunction { function: String },
    #[error("evaluation interrupted")]
    EvaluationInterrupted,
}
