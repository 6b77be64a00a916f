//! Diagnostics for lexing, parsing, binding and evaluation.

pub mod errors;

#[cfg(test)]
mod tests;
