/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the syntax tree handed to the binder
///
/// Submodules:
/// - ast: Core statement/expression enums and the compilation unit
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: Type and parameter clauses, literal values
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
