//! Symbols and scopes shared by the binder and the evaluator.
//!
//! - symbols: variable, function, label, type and conversion symbols
//! - scope: the scope arena used during one bind pass
//! - builtins: the fixed registry of types, conversions and functions

pub mod builtins;
pub mod scope;
pub mod symbols;
