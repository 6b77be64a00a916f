use std::{collections::HashMap, rc::Rc};

use crate::{
    errors::errors::Error,
    symbols::symbols::{FunctionSymbol, VariableSymbol},
};

use super::bound_tree::BoundBlock;

/// The immutable result of binding one submission.
///
/// A session advances by creating a new `GlobalScope` whose `previous`
/// points at the last one; existing scopes are never edited.
#[derive(Debug)]
pub struct GlobalScope {
    pub previous: Option<Rc<GlobalScope>>,
    pub diagnostics: Vec<Error>,
    pub functions: Vec<Rc<FunctionSymbol>>,
    pub variables: Vec<Rc<VariableSymbol>>,
    /// The bound top-level statements, absent when binding reported errors.
    pub statement: Option<BoundBlock>,
}

impl GlobalScope {
    /// The chain from the oldest submission to this one.
    pub fn chain(self: &Rc<Self>) -> Vec<Rc<GlobalScope>> {
        let mut chain = vec![];
        let mut current = Some(Rc::clone(self));
        while let Some(scope) = current {
            current = scope.previous.clone();
            chain.push(scope);
        }
        chain.reverse();
        chain
    }
}

/// Lowered function bodies plus the lowered top-level block of one
/// submission, chained to the program of the previous submission.
#[derive(Debug)]
pub struct BoundProgram {
    pub previous: Option<Rc<BoundProgram>>,
    pub diagnostics: Vec<Error>,
    pub functions: HashMap<Rc<FunctionSymbol>, BoundBlock>,
    pub statement: BoundBlock,
}

impl BoundProgram {
    /// Finds the body of `function` in this program or an earlier one.
    pub fn lookup_function(&self, function: &FunctionSymbol) -> Option<&BoundBlock> {
        let mut current = Some(self);
        while let Some(program) = current {
            if let Some(body) = program.functions.get(function) {
                return Some(body);
            }
            current = program.previous.as_deref();
        }
        None
    }
}
