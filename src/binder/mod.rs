//! Binder module: name resolution and type checking.
//!
//! - binder: turns the syntax tree into bound nodes, one submission at a time
//! - bound_tree: the bound statement and expression enums
//! - operators: the fixed unary and binary operator tables
//! - printer: source-like rendering of bound nodes
//! - program: `GlobalScope` and `BoundProgram`, the binder's outputs

pub mod binder;
pub mod bound_tree;
pub mod operators;
pub mod printer;
pub mod program;

#[cfg(test)]
mod tests;
