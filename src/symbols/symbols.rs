use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::ast::statements::FnDeclStmt;

static SYMBOL_ID_GENERATOR: AtomicUsize = AtomicUsize::new(0);

fn next_symbol_id() -> usize {
    SYMBOL_ID_GENERATOR.fetch_add(1, Ordering::Relaxed)
}

/// The closed set of value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Integer,
    Byte,
    Double,
    Boolean,
    String,
    Void,
}

impl TypeSymbol {
    pub fn name(&self) -> &'static str {
        match self {
            TypeSymbol::Integer => "int",
            TypeSymbol::Byte => "byte",
            TypeSymbol::Double => "double",
            TypeSymbol::Boolean => "bool",
            TypeSymbol::String => "string",
            TypeSymbol::Void => "void",
        }
    }
}

impl Display for TypeSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where a variable's storage lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Declared by a top-level statement; lives in the session store.
    Global,
    /// Declared inside a function body; lives in the call frame.
    Local,
    /// A function parameter; lives in the call frame.
    Parameter,
}

/// A declared variable or parameter. Identity is the generated id, so two
/// declarations with the same name in different scopes stay distinct.
#[derive(Debug)]
pub struct VariableSymbol {
    id: usize,
    pub name: String,
    pub read_only: bool,
    pub type_: TypeSymbol,
    pub kind: VariableKind,
}

impl VariableSymbol {
    pub fn new(name: &str, read_only: bool, type_: TypeSymbol, kind: VariableKind) -> Rc<Self> {
        Rc::new(VariableSymbol {
            id: next_symbol_id(),
            name: name.to_string(),
            read_only,
            type_,
            kind,
        })
    }

    /// Parameters are read-only variables scoped to their function.
    pub fn parameter(name: &str, type_: TypeSymbol) -> Rc<Self> {
        VariableSymbol::new(name, true, type_, VariableKind::Parameter)
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub type ParameterSymbol = VariableSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFunction {
    Print,
}

#[derive(Debug)]
pub struct FunctionSymbol {
    id: usize,
    pub name: String,
    pub parameters: Vec<Rc<ParameterSymbol>>,
    pub return_type: TypeSymbol,
    /// The unbound body; `None` for built-ins.
    pub declaration: Option<Rc<FnDeclStmt>>,
    pub builtin: Option<BuiltinFunction>,
}

impl FunctionSymbol {
    pub fn new(
        name: &str,
        parameters: Vec<Rc<ParameterSymbol>>,
        return_type: TypeSymbol,
        declaration: Option<Rc<FnDeclStmt>>,
    ) -> Rc<Self> {
        Rc::new(FunctionSymbol {
            id: next_symbol_id(),
            name: name.to_string(),
            parameters,
            return_type,
            declaration,
            builtin: None,
        })
    }

    pub fn builtin(
        builtin: BuiltinFunction,
        name: &str,
        parameters: Vec<Rc<ParameterSymbol>>,
        return_type: TypeSymbol,
    ) -> Rc<Self> {
        Rc::new(FunctionSymbol {
            id: next_symbol_id(),
            name: name.to_string(),
            parameters,
            return_type,
            declaration: None,
            builtin: Some(builtin),
        })
    }
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionSymbol {}

impl Hash for FunctionSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A branch target. Labels compare by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelSymbol {
    pub name: String,
}

impl LabelSymbol {
    pub fn new(name: String) -> Self {
        LabelSymbol { name }
    }
}

impl Display for LabelSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An allowed implicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConversionSymbol {
    pub from: TypeSymbol,
    pub to: TypeSymbol,
}

/// Anything a scope can map a name to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(Rc<VariableSymbol>),
    Function(Rc<FunctionSymbol>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(variable) => &variable.name,
            Symbol::Function(function) => &function.name,
        }
    }
}
