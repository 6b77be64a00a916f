//! Lowering of structured control flow.
//!
//! `if`, `while` and `for` become labels plus conditional and
//! unconditional gotos, and nested blocks are flattened into one list.

pub mod lowerer;

#[cfg(test)]
mod tests;
