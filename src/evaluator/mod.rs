//! Tree-walking evaluator for bound programs.
//!
//! - evaluator: statement and expression evaluation, calls, cancellation
//! - value: runtime values and the session variable store

pub mod evaluator;
pub mod value;

#[cfg(test)]
mod tests;
