use std::{
    cell::OnceCell,
    io::{self, Write},
    rc::Rc,
    sync::{atomic::AtomicBool, Arc},
};

use crate::{
    binder::{
        binder::Binder,
        bound_tree::BoundBlock,
        program::{BoundProgram, GlobalScope},
    },
    cfg::graph::ControlFlowGraph,
    errors::errors::Error,
    evaluator::{
        evaluator::Evaluator,
        value::{Value, Variables},
    },
    parser::parser::SyntaxTree,
    symbols::symbols::FunctionSymbol,
};

/// Runtime limits applied to one evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOptions {
    pub interrupt: Option<Arc<AtomicBool>>,
    pub max_loop_iterations: Option<u64>,
}

#[derive(Debug)]
pub struct EvaluationResult {
    pub diagnostics: Vec<Error>,
    pub value: Option<Value>,
}

/// One submission of a session, chained to the submission before it.
///
/// Binding happens lazily and at most once; the resulting scope and
/// program are shared by later submissions.
#[derive(Debug)]
pub struct Compilation {
    pub previous: Option<Rc<Compilation>>,
    pub syntax_tree: SyntaxTree,
    global_scope: OnceCell<Rc<GlobalScope>>,
    program: OnceCell<Rc<BoundProgram>>,
}

impl Compilation {
    pub fn new(syntax_tree: SyntaxTree) -> Rc<Compilation> {
        Compilation::create(None, syntax_tree)
    }

    fn create(previous: Option<Rc<Compilation>>, syntax_tree: SyntaxTree) -> Rc<Compilation> {
        Rc::new(Compilation {
            previous,
            syntax_tree,
            global_scope: OnceCell::new(),
            program: OnceCell::new(),
        })
    }

    /// Starts the next submission of the session.
    pub fn continue_with(self: &Rc<Self>, syntax_tree: SyntaxTree) -> Rc<Compilation> {
        Compilation::create(Some(Rc::clone(self)), syntax_tree)
    }

    pub fn global_scope(&self) -> Rc<GlobalScope> {
        let scope = self.global_scope.get_or_init(|| {
            let previous = self
                .previous
                .as_ref()
                .map(|previous| previous.global_scope());
            Binder::bind_global_scope(previous, &self.syntax_tree.root)
        });
        Rc::clone(scope)
    }

    pub fn program(&self) -> Rc<BoundProgram> {
        let program = self.program.get_or_init(|| {
            let previous = self.previous.as_ref().map(|previous| previous.program());
            Rc::new(Binder::bind_program(&self.global_scope(), previous))
        });
        Rc::clone(program)
    }

    /// Parse diagnostics, or else the binding diagnostics of the top level
    /// followed by those of the function bodies.
    pub fn diagnostics(&self) -> Vec<Error> {
        if !self.syntax_tree.diagnostics.is_empty() {
            return self.syntax_tree.diagnostics.clone();
        }

        self.program().diagnostics.clone()
    }

    pub fn evaluate(&self, variables: &mut Variables) -> EvaluationResult {
        self.evaluate_with(variables, io::stdout(), &EvaluationOptions::default())
    }

    /// Evaluates the submission if it has no diagnostics, sending `print`
    /// output to `output`.
    pub fn evaluate_with(
        &self,
        variables: &mut Variables,
        output: impl Write,
        options: &EvaluationOptions,
    ) -> EvaluationResult {
        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            return EvaluationResult {
                diagnostics,
                value: None,
            };
        }

        let program = self.program();
        let mut evaluator = Evaluator::new(&program, variables)
            .with_output(output)
            .with_iteration_limit(options.max_loop_iterations);
        if let Some(interrupt) = &options.interrupt {
            evaluator = evaluator.with_interrupt(Arc::clone(interrupt));
        }

        match evaluator.evaluate() {
            Ok(value) => EvaluationResult {
                diagnostics: vec![],
                value,
            },
            Err(error) => EvaluationResult {
                diagnostics: vec![error],
                value: None,
            },
        }
    }

    /// Writes the lowered functions and top-level statements.
    pub fn emit_tree(&self, writer: &mut impl Write) -> io::Result<()> {
        let program = self.program();

        for function in &self.global_scope().functions {
            if let Some(body) = program.functions.get(function) {
                writeln!(writer, "{}", signature(function))?;
                write!(writer, "{}", body)?;
                writeln!(writer)?;
            }
        }

        write!(writer, "{}", program.statement)
    }

    /// Writes the control-flow graph of the top-level statements, or of the
    /// last declared function when there are none.
    pub fn emit_control_flow_graph(&self, writer: &mut impl Write) -> io::Result<()> {
        let program = self.program();
        let global_scope = self.global_scope();

        let last_function: Option<&BoundBlock> = global_scope
            .functions
            .last()
            .and_then(|function| program.functions.get(function));

        let body = match last_function {
            Some(body) if program.statement.statements.is_empty() => body,
            _ => &program.statement,
        };

        ControlFlowGraph::create(body).write_to(writer)
    }
}

fn signature(function: &FunctionSymbol) -> String {
    let parameters: Vec<String> = function
        .parameters
        .iter()
        .map(|parameter| format!("{}: {}", parameter.name, parameter.type_))
        .collect();

    format!(
        "fun {}({}): {}",
        function.name,
        parameters.join(", "),
        function.return_type
    )
}
