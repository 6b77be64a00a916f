use std::{collections::HashMap, rc::Rc};

use super::symbols::{FunctionSymbol, Symbol, VariableSymbol};

/// Index of a scope inside its `ScopeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: Vec<Symbol>,
    lookup: HashMap<String, usize>,
}

/// Lexical scopes for one bind pass, linked to their parents by index.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena { scopes: vec![] }
    }

    /// Opens a new scope nested in `parent`.
    pub fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            parent,
            symbols: vec![],
            lookup: HashMap::new(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Declares `symbol` in `scope`. Returns false if the name is already
    /// taken in that scope; outer scopes are not consulted.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[scope.0];
        if scope.lookup.contains_key(symbol.name()) {
            return false;
        }

        scope
            .lookup
            .insert(symbol.name().to_string(), scope.symbols.len());
        scope.symbols.push(symbol);
        true
    }

    /// Walks outward from `scope` until `name` is found.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &self.scopes[id.0];
            if let Some(index) = record.lookup.get(name) {
                return Some(&record.symbols[*index]);
            }
            current = record.parent;
        }
        None
    }

    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<Rc<VariableSymbol>> {
        match self.lookup(scope, name) {
            Some(Symbol::Variable(variable)) => Some(Rc::clone(variable)),
            _ => None,
        }
    }

    pub fn lookup_function(&self, scope: ScopeId, name: &str) -> Option<Rc<FunctionSymbol>> {
        match self.lookup(scope, name) {
            Some(Symbol::Function(function)) => Some(Rc::clone(function)),
            _ => None,
        }
    }

    /// Variables declared directly in `scope`, in declaration order.
    pub fn variables(&self, scope: ScopeId) -> Vec<Rc<VariableSymbol>> {
        self.scopes[scope.0]
            .symbols
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Variable(variable) => Some(Rc::clone(variable)),
                _ => None,
            })
            .collect()
    }

    /// Functions declared directly in `scope`, in declaration order.
    pub fn functions(&self, scope: ScopeId) -> Vec<Rc<FunctionSymbol>> {
        self.scopes[scope.0]
            .symbols
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Function(function) => Some(Rc::clone(function)),
                _ => None,
            })
            .collect()
    }
}
