use std::{
    collections::HashMap,
    io::{self, Write},
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    binder::{
        binder::default_value,
        bound_tree::{BoundBlock, BoundExpr, BoundStmt},
        operators::{BoundBinaryOperatorKind, BoundUnaryOperatorKind},
        program::BoundProgram,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::symbols::{
        BuiltinFunction, FunctionSymbol, LabelSymbol, TypeSymbol, VariableKind, VariableSymbol,
    },
    Span,
};

use super::value::{Value, Variables};

pub type EvalResult<T> = Result<T, Error>;

/// How control leaves a statement.
#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Normal,
    /// A goto whose label has not been found yet; enclosing blocks and
    /// loops look for it on the way out.
    Jump(LabelSymbol),
    Return(Value),
}

/// Executes a bound program, lowered or not.
///
/// Top-level variables live in the caller's `Variables`; function
/// parameters and locals live in a frame pushed for each call.
pub struct Evaluator<'a> {
    program: &'a BoundProgram,
    globals: &'a mut Variables,
    frames: Vec<HashMap<Rc<VariableSymbol>, Value>>,
    output: Box<dyn Write + 'a>,
    interrupt: Option<Arc<AtomicBool>>,
    max_iterations: Option<u64>,
    iterations: u64,
    last_value: Value,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a BoundProgram, globals: &'a mut Variables) -> Self {
        Evaluator {
            program,
            globals,
            frames: vec![],
            output: Box::new(io::stdout()),
            interrupt: None,
            max_iterations: None,
            iterations: 0,
            last_value: Value::Null,
        }
    }

    /// Sends `print` output to `output` instead of stdout.
    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Stops evaluation at the next loop iteration once `interrupt` is set.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Stops evaluation after `limit` loop iterations in total.
    pub fn with_iteration_limit(mut self, limit: Option<u64>) -> Self {
        self.max_iterations = limit;
        self
    }

    /// Runs the top-level statements and returns the value of the last
    /// statement that produced one. A loop that never runs or an empty
    /// block produces nothing and leaves the earlier value in place.
    pub fn evaluate(&mut self) -> EvalResult<Option<Value>> {
        let program = self.program;
        tracing::debug!(
            statements = program.statement.statements.len(),
            "evaluating program"
        );

        match self.evaluate_block(&program.statement.statements)? {
            Flow::Normal | Flow::Return(_) => {}
            Flow::Jump(label) => panic!("goto to undefined label '{}'", label),
        }

        match std::mem::replace(&mut self.last_value, Value::Null) {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    /// Called on every backward jump and loop re-check.
    fn tick(&mut self) -> EvalResult<()> {
        self.iterations += 1;

        let interrupted = self
            .interrupt
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed));
        let exhausted = self
            .max_iterations
            .map_or(false, |limit| self.iterations > limit);

        if interrupted || exhausted {
            tracing::debug!(iterations = self.iterations, "evaluation interrupted");
            return Err(Error::unlocated(ErrorImpl::EvaluationInterrupted));
        }
        Ok(())
    }

    fn evaluate_block(&mut self, statements: &[BoundStmt]) -> EvalResult<Flow> {
        let labels: HashMap<&LabelSymbol, usize> = statements
            .iter()
            .enumerate()
            .filter_map(|(index, statement)| match statement {
                BoundStmt::Label(label) => Some((label, index)),
                _ => None,
            })
            .collect();

        let mut index = 0;
        while index < statements.len() {
            match self.evaluate_statement(&statements[index])? {
                Flow::Normal => index += 1,
                Flow::Jump(label) => match labels.get(&label) {
                    Some(&target) => {
                        if target <= index {
                            self.tick()?;
                        }
                        index = target;
                    }
                    None => return Ok(Flow::Jump(label)),
                },
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    fn evaluate_statement(&mut self, stmt: &BoundStmt) -> EvalResult<Flow> {
        match stmt {
            BoundStmt::Block(block) => self.evaluate_block(&block.statements),
            BoundStmt::VariableDeclaration {
                variable,
                initializer,
            } => {
                let value = self.evaluate_expression(initializer)?;
                self.assign(variable, value.clone());
                self.last_value = value;
                Ok(Flow::Normal)
            }
            BoundStmt::Expression(expression) => {
                self.last_value = self.evaluate_expression(expression)?;
                Ok(Flow::Normal)
            }
            BoundStmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                if self.evaluate_condition(condition)? {
                    self.evaluate_statement(then_stmt)
                } else if let Some(else_stmt) = else_stmt {
                    self.evaluate_statement(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }
            BoundStmt::While {
                condition,
                body,
                break_label,
                continue_label,
            } => {
                let mut first = true;
                loop {
                    if !first {
                        self.tick()?;
                    }
                    first = false;

                    if !self.evaluate_condition(condition)? {
                        break;
                    }

                    match self.evaluate_statement(body)? {
                        Flow::Normal => {}
                        Flow::Jump(label) if label == *break_label => break,
                        Flow::Jump(label) if label == *continue_label => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            BoundStmt::For {
                initializer,
                condition,
                step,
                body,
                break_label,
                continue_label,
            } => {
                match self.evaluate_statement(initializer)? {
                    Flow::Normal => {}
                    flow => return Ok(flow),
                }

                let mut first = true;
                loop {
                    if !first {
                        self.tick()?;
                    }
                    first = false;

                    if !self.evaluate_condition(condition)? {
                        break;
                    }

                    match self.evaluate_statement(body)? {
                        Flow::Normal => {}
                        Flow::Jump(label) if label == *break_label => break,
                        Flow::Jump(label) if label == *continue_label => {}
                        flow => return Ok(flow),
                    }

                    self.last_value = self.evaluate_expression(step)?;
                }
                Ok(Flow::Normal)
            }
            BoundStmt::Label(_) => Ok(Flow::Normal),
            BoundStmt::Goto(label) => Ok(Flow::Jump(label.clone())),
            BoundStmt::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            } => {
                if self.evaluate_condition(condition)? == *jump_if_true {
                    Ok(Flow::Jump(label.clone()))
                } else {
                    Ok(Flow::Normal)
                }
            }
            BoundStmt::Return(expression) => {
                let value = match expression {
                    Some(expression) => self.evaluate_expression(expression)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn evaluate_condition(&mut self, condition: &BoundExpr) -> EvalResult<bool> {
        match self.evaluate_expression(condition)? {
            Value::Boolean(value) => Ok(value),
            other => panic!("condition evaluated to non-boolean {:?}", other),
        }
    }

    fn assign(&mut self, variable: &Rc<VariableSymbol>, value: Value) {
        match variable.kind {
            VariableKind::Global => self.globals.insert(Rc::clone(variable), value),
            VariableKind::Local | VariableKind::Parameter => {
                match self.frames.last_mut() {
                    Some(frame) => {
                        frame.insert(Rc::clone(variable), value);
                    }
                    None => panic!("local '{}' assigned outside a call", variable.name),
                }
            }
        }
    }

    fn read(&self, variable: &VariableSymbol) -> Value {
        let value = match variable.kind {
            VariableKind::Global => self.globals.get(variable),
            VariableKind::Local | VariableKind::Parameter => {
                self.frames.last().and_then(|frame| frame.get(variable))
            }
        };

        match (value, variable.kind) {
            (Some(value), _) => value.clone(),
            // Declared by a submission that failed before it ran
            (None, VariableKind::Global) => default_value(variable.type_)
                .map(|literal| Value::from(&literal))
                .unwrap_or(Value::Null),
            (None, _) => panic!("variable '{}' read before declaration", variable.name),
        }
    }

    pub fn evaluate_expression(&mut self, expr: &BoundExpr) -> EvalResult<Value> {
        match expr {
            BoundExpr::Literal(value) => Ok(Value::from(value)),
            BoundExpr::Variable(variable) => Ok(self.read(variable)),
            BoundExpr::Assignment {
                variable,
                expression,
            } => {
                let value = self.evaluate_expression(expression)?;
                self.assign(variable, value.clone());
                Ok(value)
            }
            BoundExpr::Unary { operator, operand } => {
                let operand = self.evaluate_expression(operand)?;
                Ok(evaluate_unary(operator.kind, operand))
            }
            BoundExpr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left = self.evaluate_expression(left)?;

                // `&&` and `||` skip the right operand when the left decides
                match (operator.kind, &left) {
                    (BoundBinaryOperatorKind::LogicalAnd, Value::Boolean(false)) => {
                        return Ok(Value::Boolean(false))
                    }
                    (BoundBinaryOperatorKind::LogicalOr, Value::Boolean(true)) => {
                        return Ok(Value::Boolean(true))
                    }
                    _ => {}
                }

                let right = self.evaluate_expression(right)?;
                evaluate_binary(operator.kind, left, right)
                    .map_err(|error| Error::new(error, span.clone()))
            }
            BoundExpr::Call {
                function,
                arguments,
                span,
            } => {
                let mut values = vec![];
                for argument in arguments {
                    values.push(self.evaluate_expression(argument)?);
                }
                self.call_function(function, values, span)
            }
            BoundExpr::Conversion { type_, expression } => {
                let value = self.evaluate_expression(expression)?;
                Ok(convert(*type_, value))
            }
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<FunctionSymbol>,
        arguments: Vec<Value>,
        span: &Span,
    ) -> EvalResult<Value> {
        tracing::trace!(function = %function.name, "call");

        if let Some(builtin) = function.builtin {
            return Ok(self.call_builtin(builtin, arguments));
        }

        let program = self.program;
        let body: &BoundBlock = match program.lookup_function(function) {
            Some(body) => body,
            // Declared by a submission whose body failed to bind
            None => {
                return Err(Error::new(
                    ErrorImpl::UncallableFunction {
                        function: function.name.clone(),
                    },
                    span.clone(),
                ))
            }
        };

        let frame = function
            .parameters
            .iter()
            .cloned()
            .zip(arguments)
            .collect();

        self.frames.push(frame);
        let flow = self.evaluate_block(&body.statements);
        self.frames.pop();

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Jump(label) => panic!("goto to undefined label '{}'", label),
        }
    }

    fn call_builtin(&mut self, builtin: BuiltinFunction, arguments: Vec<Value>) -> Value {
        match builtin {
            BuiltinFunction::Print => {
                for argument in arguments {
                    if let Err(error) = writeln!(self.output, "{}", argument) {
                        tracing::warn!(%error, "failed to write program output");
                    }
                }
                Value::Null
            }
        }
    }
}

fn evaluate_unary(kind: BoundUnaryOperatorKind, operand: Value) -> Value {
    match (kind, operand) {
        (BoundUnaryOperatorKind::Identity, value) => value,
        (BoundUnaryOperatorKind::Negation, Value::Integer(value)) => {
            Value::Integer(value.wrapping_neg())
        }
        (BoundUnaryOperatorKind::Negation, Value::Byte(value)) => Value::Byte(value.wrapping_neg()),
        (BoundUnaryOperatorKind::Negation, Value::Double(value)) => Value::Double(-value),
        (BoundUnaryOperatorKind::LogicalNegation, Value::Boolean(value)) => Value::Boolean(!value),
        (kind, operand) => panic!("unary operator {:?} undefined for {:?}", kind, operand),
    }
}

/// Result of a binary operator; the caller attaches the operator's span.
type OperatorResult = Result<Value, ErrorImpl>;

/// Int arithmetic wraps on overflow; `/` and `%` truncate toward zero.
fn evaluate_integer(kind: BoundBinaryOperatorKind, left: i32, right: i32) -> OperatorResult {
    use BoundBinaryOperatorKind::*;

    Ok(match kind {
        Addition => Value::Integer(left.wrapping_add(right)),
        Subtraction => Value::Integer(left.wrapping_sub(right)),
        Multiplication => Value::Integer(left.wrapping_mul(right)),
        Division if right == 0 => return Err(ErrorImpl::DivisionByZero),
        Division => Value::Integer(left.wrapping_div(right)),
        Modulus if right == 0 => return Err(ErrorImpl::DivisionByZero),
        Modulus => Value::Integer(left.wrapping_rem(right)),
        Power => Value::Integer((left as f64).powf(right as f64) as i32),
        Equals => Value::Boolean(left == right),
        NotEquals => Value::Boolean(left != right),
        Less => Value::Boolean(left < right),
        LessOrEquals => Value::Boolean(left <= right),
        Greater => Value::Boolean(left > right),
        GreaterOrEquals => Value::Boolean(left >= right),
        LogicalAnd | LogicalOr => panic!("{:?} undefined for int", kind),
    })
}

/// Same rules as int; `**` goes through i32 and then wraps to i8.
fn evaluate_byte(kind: BoundBinaryOperatorKind, left: i8, right: i8) -> OperatorResult {
    use BoundBinaryOperatorKind::*;

    Ok(match kind {
        Addition => Value::Byte(left.wrapping_add(right)),
        Subtraction => Value::Byte(left.wrapping_sub(right)),
        Multiplication => Value::Byte(left.wrapping_mul(right)),
        Division if right == 0 => return Err(ErrorImpl::DivisionByZero),
        Division => Value::Byte(left.wrapping_div(right)),
        Modulus if right == 0 => return Err(ErrorImpl::DivisionByZero),
        Modulus => Value::Byte(left.wrapping_rem(right)),
        Power => Value::Byte(((left as f64).powf(right as f64) as i32) as i8),
        Equals => Value::Boolean(left == right),
        NotEquals => Value::Boolean(left != right),
        Less => Value::Boolean(left < right),
        LessOrEquals => Value::Boolean(left <= right),
        Greater => Value::Boolean(left > right),
        GreaterOrEquals => Value::Boolean(left >= right),
        LogicalAnd | LogicalOr => panic!("{:?} undefined for byte", kind),
    })
}

fn evaluate_double(kind: BoundBinaryOperatorKind, left: f64, right: f64) -> Value {
    use BoundBinaryOperatorKind::*;

    match kind {
        Addition => Value::Double(left + right),
        Subtraction => Value::Double(left - right),
        Multiplication => Value::Double(left * right),
        Division => Value::Double(left / right),
        Modulus => Value::Double(left % right),
        Power => Value::Double(left.powf(right)),
        Equals => Value::Boolean(left == right),
        NotEquals => Value::Boolean(left != right),
        Less => Value::Boolean(left < right),
        LessOrEquals => Value::Boolean(left <= right),
        Greater => Value::Boolean(left > right),
        GreaterOrEquals => Value::Boolean(left >= right),
        LogicalAnd | LogicalOr => panic!("{:?} undefined for double", kind),
    }
}

fn evaluate_binary(kind: BoundBinaryOperatorKind, left: Value, right: Value) -> OperatorResult {
    use BoundBinaryOperatorKind::*;

    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => evaluate_integer(kind, left, right),
        (Value::Byte(left), Value::Byte(right)) => evaluate_byte(kind, left, right),
        (Value::Double(left), Value::Double(right)) => Ok(evaluate_double(kind, left, right)),
        (Value::Boolean(left), Value::Boolean(right)) => Ok(Value::Boolean(match kind {
            LogicalAnd => left && right,
            LogicalOr => left || right,
            Equals => left == right,
            NotEquals => left != right,
            _ => panic!("{:?} undefined for bool", kind),
        })),
        (Value::String(left), Value::String(right)) => Ok(match kind {
            Addition => Value::String(left + &right),
            Equals => Value::Boolean(left == right),
            NotEquals => Value::Boolean(left != right),
            _ => panic!("{:?} undefined for string", kind),
        }),
        (left, right) => panic!("{:?} undefined for {:?} and {:?}", kind, left, right),
    }
}

fn convert(type_: TypeSymbol, value: Value) -> Value {
    match (type_, value) {
        (TypeSymbol::Double, Value::Integer(value)) => Value::Double(value as f64),
        (TypeSymbol::Double, Value::Byte(value)) => Value::Double(value as f64),
        (TypeSymbol::Integer, Value::Byte(value)) => Value::Integer(value as i32),
        (TypeSymbol::String, value) => Value::String(value.to_string()),
        (type_, value) => panic!("no conversion from {:?} to {}", value, type_),
    }
}
