//! Built-in types, implicit conversions and built-in functions.
//!
//! The tables are built once and only read afterwards.

use std::{collections::HashMap, rc::Rc};

use lazy_static::lazy_static;

use super::symbols::{BuiltinFunction, FunctionSymbol, TypeConversionSymbol, TypeSymbol, VariableSymbol};

lazy_static! {
    static ref TYPES: HashMap<&'static str, TypeSymbol> = {
        let mut map = HashMap::new();
        map.insert("int", TypeSymbol::Integer);
        map.insert("byte", TypeSymbol::Byte);
        map.insert("double", TypeSymbol::Double);
        map.insert("bool", TypeSymbol::Boolean);
        map.insert("string", TypeSymbol::String);
        map.insert("void", TypeSymbol::Void);
        map
    };

    static ref CONVERSIONS: Vec<TypeConversionSymbol> = {
        let mut conversions = vec![
            TypeConversionSymbol { from: TypeSymbol::Integer, to: TypeSymbol::Double },
            TypeConversionSymbol { from: TypeSymbol::Byte, to: TypeSymbol::Integer },
            TypeConversionSymbol { from: TypeSymbol::Byte, to: TypeSymbol::Double },
        ];
        for from in [TypeSymbol::Integer, TypeSymbol::Byte, TypeSymbol::Double, TypeSymbol::Boolean] {
            conversions.push(TypeConversionSymbol { from, to: TypeSymbol::String });
        }
        conversions
    };
}

thread_local! {
    static FUNCTIONS: Vec<Rc<FunctionSymbol>> = vec![FunctionSymbol::builtin(
        BuiltinFunction::Print,
        "print",
        vec![VariableSymbol::parameter("text", TypeSymbol::String)],
        TypeSymbol::Void,
    )];
}

/// Resolves a type annotation by name.
pub fn lookup_type(name: &str) -> Option<TypeSymbol> {
    TYPES.get(name).copied()
}

/// Returns the implicit conversion from `from` to `to`, if one exists.
pub fn lookup_conversion(from: TypeSymbol, to: TypeSymbol) -> Option<TypeConversionSymbol> {
    CONVERSIONS
        .iter()
        .find(|conversion| conversion.from == from && conversion.to == to)
        .copied()
}

/// The built-in functions, the same symbols on every call.
pub fn builtin_functions() -> Vec<Rc<FunctionSymbol>> {
    FUNCTIONS.with(|functions| functions.clone())
}
