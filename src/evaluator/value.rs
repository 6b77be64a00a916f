use std::{collections::HashMap, fmt::Display, rc::Rc};

use crate::{ast::types::LiteralValue, symbols::symbols::VariableSymbol};

/// A runtime value. `Null` is the result of calling a void function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Byte(i8),
    Double(f64),
    Boolean(bool),
    String(String),
    Null,
}

impl From<&LiteralValue> for Value {
    fn from(value: &LiteralValue) -> Self {
        match value {
            LiteralValue::Integer(value) => Value::Integer(*value),
            LiteralValue::Byte(value) => Value::Byte(*value),
            LiteralValue::Double(value) => Value::Double(*value),
            LiteralValue::Boolean(value) => Value::Boolean(*value),
            LiteralValue::String(value) => Value::String(value.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Byte(value) => write!(f, "{}", value),
            // `{:?}` keeps the decimal point on whole numbers
            Value::Double(value) => write!(f, "{:?}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Null => write!(f, "null"),
        }
    }
}

/// The session-wide store for top-level variables. It outlives a single
/// evaluation so later submissions see earlier values.
#[derive(Debug, Default)]
pub struct Variables {
    values: HashMap<Rc<VariableSymbol>, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Variables {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, variable: &VariableSymbol) -> Option<&Value> {
        self.values.get(variable)
    }

    pub fn insert(&mut self, variable: Rc<VariableSymbol>, value: Value) {
        self.values.insert(variable, value);
    }

    /// Finds a value by variable name. With shadowed names any of the
    /// matching variables may be returned.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(variable, _)| variable.name == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
