//! Tokens to `CompilationUnit`.
//!
//! - parser: cursor, handler tables and the `SyntaxTree` entry point
//! - lookups: binding powers and handler registration
//! - expr / stmt / types: the individual handlers

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
