use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{
    ast::{
        ast::{CompilationUnit, Expr, Stmt},
        expressions::{AssignmentExpr, BinaryExpr, CallExpr, PrefixExpr},
        statements::{BlockStmt, FnDeclStmt, ForStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
        types::{LiteralValue, TypeClause},
    },
    cfg::graph::ControlFlowGraph,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    lowering::lowerer::lower,
    symbols::{
        builtins::{builtin_functions, lookup_conversion, lookup_type},
        scope::{ScopeArena, ScopeId},
        symbols::{
            FunctionSymbol, LabelSymbol, Symbol, TypeSymbol, VariableKind, VariableSymbol,
        },
    },
    Span,
};

use super::{
    bound_tree::{BoundBlock, BoundExpr, BoundStmt},
    operators::{bind_binary_operator, bind_unary_operator},
    program::{BoundProgram, GlobalScope},
};

pub type BindResult<T> = Result<T, Error>;

/// Binds syntax into type-checked bound nodes.
///
/// Every bind function returns a `BindResult`. Statement lists record a
/// failed statement in `diagnostics` and carry on with the next one, so a
/// single pass can report several independent errors.
pub struct Binder {
    scopes: ScopeArena,
    scope: ScopeId,
    function: Option<Rc<FunctionSymbol>>,
    /// (break, continue) labels of the enclosing loops, innermost last
    loop_stack: Vec<(LabelSymbol, LabelSymbol)>,
    label_count: usize,
    diagnostics: Vec<Error>,
}

fn create_root_scope(scopes: &mut ScopeArena) -> ScopeId {
    let root = scopes.push(None);
    for function in builtin_functions() {
        scopes.declare(root, Symbol::Function(function));
    }
    root
}

/// Replays every earlier submission, oldest first, into nested scopes.
fn create_parent_scope(scopes: &mut ScopeArena, previous: Option<&Rc<GlobalScope>>) -> ScopeId {
    let mut parent = create_root_scope(scopes);

    if let Some(previous) = previous {
        for global_scope in previous.chain() {
            let scope = scopes.push(Some(parent));
            for function in &global_scope.functions {
                scopes.declare(scope, Symbol::Function(Rc::clone(function)));
            }
            for variable in &global_scope.variables {
                scopes.declare(scope, Symbol::Variable(Rc::clone(variable)));
            }
            parent = scope;
        }
    }

    parent
}

/// Scope seen by function bodies: built-ins and every declared function,
/// but none of the top-level variables.
fn create_function_scope(scopes: &mut ScopeArena, global_scope: &Rc<GlobalScope>) -> ScopeId {
    let mut parent = create_root_scope(scopes);

    for global_scope in global_scope.chain() {
        let scope = scopes.push(Some(parent));
        for function in &global_scope.functions {
            scopes.declare(scope, Symbol::Function(Rc::clone(function)));
        }
        parent = scope;
    }

    parent
}

/// The value a typed declaration without an initializer starts with.
pub(crate) fn default_value(type_: TypeSymbol) -> Option<LiteralValue> {
    match type_ {
        TypeSymbol::Integer => Some(LiteralValue::Integer(0)),
        TypeSymbol::Byte => Some(LiteralValue::Byte(0)),
        TypeSymbol::Double => Some(LiteralValue::Double(0.0)),
        TypeSymbol::Boolean => Some(LiteralValue::Boolean(false)),
        TypeSymbol::String => Some(LiteralValue::String(String::new())),
        TypeSymbol::Void => None,
    }
}

impl Binder {
    fn new(scopes: ScopeArena, scope: ScopeId, function: Option<Rc<FunctionSymbol>>) -> Self {
        Binder {
            scopes,
            scope,
            function,
            loop_stack: vec![],
            label_count: 0,
            diagnostics: vec![],
        }
    }

    /// Binds one submission on top of the scopes of all earlier ones.
    ///
    /// Function signatures are declared before any statement is bound so
    /// that functions can call each other regardless of order. The
    /// returned scope has no statement if any diagnostic was reported.
    pub fn bind_global_scope(
        previous: Option<Rc<GlobalScope>>,
        root: &CompilationUnit,
    ) -> Rc<GlobalScope> {
        let mut scopes = ScopeArena::new();
        let parent = create_parent_scope(&mut scopes, previous.as_ref());
        let scope = scopes.push(Some(parent));
        let mut binder = Binder::new(scopes, scope, None);

        for declaration in root.functions() {
            if let Err(error) = binder.bind_function_declaration(declaration) {
                binder.diagnostics.push(error);
            }
        }

        let mut statements = vec![];
        for statement in &root.statements {
            if let Stmt::FnDecl(_) = statement {
                continue;
            }

            match binder.bind_statement(statement) {
                Ok(bound) => statements.push(bound),
                Err(error) => binder.diagnostics.push(error),
            }
        }

        binder.sort_diagnostics();
        let functions = binder.scopes.functions(scope);
        let variables = binder.scopes.variables(scope);

        tracing::debug!(
            functions = functions.len(),
            variables = variables.len(),
            diagnostics = binder.diagnostics.len(),
            "bound submission"
        );

        let statement = if binder.diagnostics.is_empty() {
            Some(BoundBlock { statements })
        } else {
            None
        };

        Rc::new(GlobalScope {
            previous,
            diagnostics: binder.diagnostics,
            functions,
            variables,
            statement,
        })
    }

    /// Binds and lowers the bodies of the functions declared by
    /// `global_scope`, then lowers its top-level statements.
    ///
    /// Function bodies are bound even when the global scope failed, so
    /// their errors are reported too. Bodies that bound cleanly stay
    /// callable from later submissions.
    pub fn bind_program(
        global_scope: &Rc<GlobalScope>,
        previous: Option<Rc<BoundProgram>>,
    ) -> BoundProgram {
        let mut diagnostics = global_scope.diagnostics.clone();
        let mut functions = HashMap::new();

        for function in &global_scope.functions {
            let declaration = match &function.declaration {
                Some(declaration) => Rc::clone(declaration),
                None => continue,
            };

            let mut scopes = ScopeArena::new();
            let parent = create_function_scope(&mut scopes, global_scope);
            let scope = scopes.push(Some(parent));
            for parameter in &function.parameters {
                scopes.declare(scope, Symbol::Variable(Rc::clone(parameter)));
            }

            let mut binder = Binder::new(scopes, scope, Some(Rc::clone(function)));
            let body = binder.bind_block(&declaration.body);
            let body = lower(&BoundStmt::Block(body));

            if binder.diagnostics.is_empty()
                && function.return_type != TypeSymbol::Void
                && !ControlFlowGraph::all_paths_return(&body)
            {
                binder.diagnostics.push(Error::new(
                    ErrorImpl::NotAllPathsReturn {
                        function: function.name.clone(),
                    },
                    declaration.span.clone(),
                ));
            }

            tracing::debug!(
                function = %function.name,
                diagnostics = binder.diagnostics.len(),
                "bound function body"
            );

            // A body with errors is reported but never becomes callable
            if binder.diagnostics.is_empty() {
                functions.insert(Rc::clone(function), body);
            }
            binder.sort_diagnostics();
            diagnostics.append(&mut binder.diagnostics);
        }

        let statement = match &global_scope.statement {
            Some(statement) => lower(&BoundStmt::Block(statement.clone())),
            None => BoundBlock::default(),
        };

        BoundProgram {
            previous,
            diagnostics,
            functions,
            statement,
        }
    }

    /// Runs `bind` inside a new nested scope.
    fn in_scope<T>(&mut self, bind: impl FnOnce(&mut Self) -> T) -> T {
        let parent = self.scope;
        self.scope = self.scopes.push(Some(parent));
        let result = bind(self);
        self.scope = parent;
        result
    }

    fn new_loop_labels(&mut self) -> (LabelSymbol, LabelSymbol) {
        self.label_count += 1;
        (
            LabelSymbol::new(format!("break{}", self.label_count)),
            LabelSymbol::new(format!("continue{}", self.label_count)),
        )
    }

    /// Runs `bind` with `labels` as the innermost loop.
    fn in_loop<T>(
        &mut self,
        labels: &(LabelSymbol, LabelSymbol),
        bind: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.loop_stack.push(labels.clone());
        let result = bind(self);
        self.loop_stack.pop();
        result
    }

    /// Joins two parts that were bound independently, so an error in one
    /// does not hide errors in the other. When both failed, the first
    /// error is recorded here and the second is returned.
    fn both<A, B>(&mut self, first: BindResult<A>, second: BindResult<B>) -> BindResult<(A, B)> {
        match (first, second) {
            (Ok(first), Ok(second)) => Ok((first, second)),
            (Err(error), Ok(_)) | (Ok(_), Err(error)) => Err(error),
            (Err(first), Err(second)) => {
                self.diagnostics.push(first);
                Err(second)
            }
        }
    }

    /// Orders diagnostics by source position.
    fn sort_diagnostics(&mut self) {
        self.diagnostics
            .sort_by_key(|error| (error.line(), error.column()));
    }

    fn bind_type_clause(&self, clause: &TypeClause) -> BindResult<TypeSymbol> {
        lookup_type(&clause.name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownType {
                    type_: clause.name.clone(),
                },
                clause.span.clone(),
            )
        })
    }

    fn bind_function_declaration(&mut self, declaration: &Rc<FnDeclStmt>) -> BindResult<()> {
        let mut parameters = vec![];
        let mut seen = HashSet::new();

        for parameter in &declaration.parameters {
            let type_ = self.bind_type_clause(&parameter.type_clause)?;
            if type_ == TypeSymbol::Void {
                return Err(Error::new(
                    ErrorImpl::InvalidType {
                        expected: String::from("a value type"),
                        received: type_.to_string(),
                    },
                    parameter.type_clause.span.clone(),
                ));
            }

            if !seen.insert(parameter.name.as_str()) {
                return Err(Error::new(
                    ErrorImpl::SymbolAlreadyDeclared {
                        name: parameter.name.clone(),
                    },
                    parameter.span.clone(),
                ));
            }

            parameters.push(VariableSymbol::parameter(&parameter.name, type_));
        }

        let return_type = match &declaration.return_type {
            Some(clause) => self.bind_type_clause(clause)?,
            None => TypeSymbol::Void,
        };

        let function = FunctionSymbol::new(
            &declaration.identifier,
            parameters,
            return_type,
            Some(Rc::clone(declaration)),
        );

        if !self.scopes.declare(self.scope, Symbol::Function(function)) {
            return Err(Error::new(
                ErrorImpl::SymbolAlreadyDeclared {
                    name: declaration.identifier.clone(),
                },
                declaration.span.clone(),
            ));
        }

        Ok(())
    }

    fn bind_block(&mut self, block: &BlockStmt) -> BoundBlock {
        self.in_scope(|binder| {
            let mut statements = vec![];
            for statement in block.iter() {
                match binder.bind_statement(statement) {
                    Ok(bound) => statements.push(bound),
                    Err(error) => binder.diagnostics.push(error),
                }
            }
            BoundBlock { statements }
        })
    }

    fn bind_scoped_statement(&mut self, stmt: &Stmt) -> BindResult<BoundStmt> {
        self.in_scope(|binder| binder.bind_statement(stmt))
    }

    pub fn bind_statement(&mut self, stmt: &Stmt) -> BindResult<BoundStmt> {
        match stmt {
            Stmt::Block(block) => Ok(BoundStmt::Block(self.bind_block(block))),
            Stmt::Expression(stmt) => Ok(BoundStmt::Expression(
                self.bind_expression(&stmt.expression, true)?,
            )),
            Stmt::VarDecl(stmt) => self.bind_variable_declaration(stmt),
            Stmt::If(stmt) => self.bind_if_statement(stmt),
            Stmt::While(stmt) => self.bind_while_statement(stmt),
            Stmt::For(stmt) => self.bind_for_statement(stmt),
            Stmt::Break(stmt) => match self.loop_stack.last() {
                Some((break_label, _)) => Ok(BoundStmt::Goto(break_label.clone())),
                None => Err(Error::new(
                    ErrorImpl::InvalidBreakOrContinue {
                        keyword: String::from("break"),
                    },
                    stmt.span.clone(),
                )),
            },
            Stmt::Continue(stmt) => match self.loop_stack.last() {
                Some((_, continue_label)) => Ok(BoundStmt::Goto(continue_label.clone())),
                None => Err(Error::new(
                    ErrorImpl::InvalidBreakOrContinue {
                        keyword: String::from("continue"),
                    },
                    stmt.span.clone(),
                )),
            },
            Stmt::Return(stmt) => self.bind_return_statement(stmt),
            Stmt::FnDecl(declaration) => Err(Error::new(
                ErrorImpl::InvalidSyntax {
                    message: String::from("functions can only be declared at the top level"),
                },
                declaration.span.clone(),
            )),
        }
    }

    fn bind_variable_declaration(&mut self, stmt: &VarDeclStmt) -> BindResult<BoundStmt> {
        let read_only = match stmt.keyword.kind {
            TokenKind::Var => false,
            TokenKind::Val => true,
            _ => {
                return Err(Error::new(
                    ErrorImpl::UnknownDeclarationKeyword {
                        keyword: stmt.keyword.value.clone(),
                    },
                    stmt.keyword.span.clone(),
                ))
            }
        };

        let explicit_type = match &stmt.explicit_type {
            Some(clause) => {
                let type_ = self.bind_type_clause(clause)?;
                if type_ == TypeSymbol::Void {
                    return Err(Error::new(
                        ErrorImpl::InvalidType {
                            expected: String::from("a value type"),
                            received: type_.to_string(),
                        },
                        clause.span.clone(),
                    ));
                }
                Some(type_)
            }
            None => None,
        };

        let initializer = match (&stmt.assigned_value, explicit_type) {
            (Some(value), Some(type_)) => {
                let bound = self.bind_expression(value, false)?;
                self.bind_conversion(bound, type_, value.get_span())?
            }
            (Some(value), None) => self.bind_expression(value, false)?,
            (None, Some(type_)) => match default_value(type_) {
                Some(value) => BoundExpr::Literal(value),
                None => unreachable!("void declarations are rejected above"),
            },
            (None, None) => {
                return Err(Error::new(
                    ErrorImpl::InvalidSyntax {
                        message: String::from("declaration needs an initializer or a type"),
                    },
                    stmt.span.clone(),
                ))
            }
        };

        let kind = if self.function.is_some() {
            VariableKind::Local
        } else {
            VariableKind::Global
        };
        let variable = VariableSymbol::new(&stmt.identifier, read_only, initializer.type_(), kind);

        if !self
            .scopes
            .declare(self.scope, Symbol::Variable(Rc::clone(&variable)))
        {
            return Err(Error::new(
                ErrorImpl::SymbolAlreadyDeclared {
                    name: stmt.identifier.clone(),
                },
                stmt.identifier_span.clone(),
            ));
        }

        Ok(BoundStmt::VariableDeclaration {
            variable,
            initializer,
        })
    }

    fn bind_if_statement(&mut self, stmt: &IfStmt) -> BindResult<BoundStmt> {
        let condition = self.bind_condition(&stmt.condition);
        let then_stmt = self.bind_scoped_statement(&stmt.then_body);
        let else_stmt = match &stmt.else_body {
            Some(else_body) => self
                .bind_scoped_statement(else_body)
                .map(|else_stmt| Some(Box::new(else_stmt))),
            None => Ok(None),
        };

        let branches = self.both(then_stmt, else_stmt);
        let (condition, (then_stmt, else_stmt)) = self.both(condition, branches)?;

        Ok(BoundStmt::If {
            condition,
            then_stmt: Box::new(then_stmt),
            else_stmt,
        })
    }

    fn bind_while_statement(&mut self, stmt: &WhileStmt) -> BindResult<BoundStmt> {
        let condition = self.bind_condition(&stmt.condition);
        let labels = self.new_loop_labels();
        let body = self.in_loop(&labels, |binder| binder.bind_scoped_statement(&stmt.body));
        let (condition, body) = self.both(condition, body)?;
        let (break_label, continue_label) = labels;

        Ok(BoundStmt::While {
            condition,
            body: Box::new(body),
            break_label,
            continue_label,
        })
    }

    fn bind_for_statement(&mut self, stmt: &ForStmt) -> BindResult<BoundStmt> {
        self.in_scope(|binder| {
            let initializer = binder.bind_statement(&stmt.initializer)?;
            let condition = binder.bind_condition(&stmt.condition);
            let step = binder.bind_expression(&stmt.step, true);

            let labels = binder.new_loop_labels();
            let body =
                binder.in_loop(&labels, |binder| binder.bind_scoped_statement(&stmt.body));
            let header = binder.both(condition, step);
            let ((condition, step), body) = binder.both(header, body)?;
            let (break_label, continue_label) = labels;

            Ok(BoundStmt::For {
                initializer: Box::new(initializer),
                condition,
                step,
                body: Box::new(body),
                break_label,
                continue_label,
            })
        })
    }

    fn bind_return_statement(&mut self, stmt: &ReturnStmt) -> BindResult<BoundStmt> {
        let function = match &self.function {
            Some(function) => Rc::clone(function),
            None => {
                return Err(Error::new(
                    ErrorImpl::ReturnOutsideFunction,
                    stmt.span.clone(),
                ))
            }
        };

        match (&stmt.value, function.return_type) {
            (None, TypeSymbol::Void) => Ok(BoundStmt::Return(None)),
            (None, return_type) => Err(Error::new(
                ErrorImpl::MissingReturnValue {
                    function: function.name.clone(),
                    expected: return_type.to_string(),
                },
                stmt.span.clone(),
            )),
            (Some(_), TypeSymbol::Void) => Err(Error::new(
                ErrorImpl::UnexpectedReturnValue {
                    function: function.name.clone(),
                },
                stmt.span.clone(),
            )),
            (Some(value), return_type) => {
                let bound = self.bind_expression(value, false)?;
                let converted = self.bind_conversion(bound, return_type, value.get_span())?;
                Ok(BoundStmt::Return(Some(converted)))
            }
        }
    }

    /// Conditions must already be `bool`; no conversion applies.
    fn bind_condition(&mut self, condition: &Expr) -> BindResult<BoundExpr> {
        let bound = self.bind_expression(condition, false)?;
        if bound.type_() != TypeSymbol::Boolean {
            return Err(Error::new(
                ErrorImpl::InvalidType {
                    expected: TypeSymbol::Boolean.to_string(),
                    received: bound.type_().to_string(),
                },
                condition.get_span().clone(),
            ));
        }
        Ok(bound)
    }

    /// Wraps `expression` in an implicit conversion to `type_` if needed.
    fn bind_conversion(
        &self,
        expression: BoundExpr,
        type_: TypeSymbol,
        span: &Span,
    ) -> BindResult<BoundExpr> {
        let from = expression.type_();
        if from == type_ {
            return Ok(expression);
        }

        match lookup_conversion(from, type_) {
            Some(conversion) => Ok(BoundExpr::Conversion {
                type_: conversion.to,
                expression: Box::new(expression),
            }),
            None => Err(Error::new(
                ErrorImpl::TypeMatchError {
                    expected: type_.to_string(),
                    received: from.to_string(),
                },
                span.clone(),
            )),
        }
    }

    pub fn bind_expression(&mut self, expr: &Expr, can_be_void: bool) -> BindResult<BoundExpr> {
        let bound = match expr {
            Expr::Literal(literal) => BoundExpr::Literal(literal.value.clone()),
            Expr::Symbol(symbol) => match self.scopes.lookup_variable(self.scope, &symbol.value) {
                Some(variable) => BoundExpr::Variable(variable),
                None => {
                    return Err(Error::new(
                        ErrorImpl::UndefinedVariable {
                            variable: symbol.value.clone(),
                        },
                        symbol.span.clone(),
                    ))
                }
            },
            Expr::Grouping(grouping) => self.bind_expression(&grouping.expression, can_be_void)?,
            Expr::Prefix(prefix) => self.bind_prefix_expression(prefix)?,
            Expr::Binary(binary) => self.bind_binary_expression(binary)?,
            Expr::Assignment(assignment) => self.bind_assignment_expression(assignment)?,
            Expr::Call(call) => self.bind_call_expression(call)?,
        };

        if !can_be_void && bound.type_() == TypeSymbol::Void {
            return Err(Error::new(
                ErrorImpl::ExpressionMustHaveValue,
                expr.get_span().clone(),
            ));
        }

        Ok(bound)
    }

    fn bind_prefix_expression(&mut self, prefix: &PrefixExpr) -> BindResult<BoundExpr> {
        let operand = self.bind_expression(&prefix.right_expr, false)?;

        match bind_unary_operator(prefix.operator.kind, operand.type_()) {
            Some(operator) => Ok(BoundExpr::Unary {
                operator,
                operand: Box::new(operand),
            }),
            None => Err(Error::new(
                ErrorImpl::UndefinedUnaryOperator {
                    operator: prefix.operator.value.clone(),
                    operand: operand.type_().to_string(),
                },
                prefix.operator.span.clone(),
            )),
        }
    }

    fn bind_binary_expression(&mut self, binary: &BinaryExpr) -> BindResult<BoundExpr> {
        let left = self.bind_expression(&binary.left, false)?;
        let right = self.bind_expression(&binary.right, false)?;

        match bind_binary_operator(binary.operator.kind, left.type_(), right.type_()) {
            Some(operator) => Ok(BoundExpr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                span: binary.operator.span.clone(),
            }),
            None => Err(Error::new(
                ErrorImpl::UndefinedBinaryOperator {
                    operator: binary.operator.value.clone(),
                    left: left.type_().to_string(),
                    right: right.type_().to_string(),
                },
                binary.operator.span.clone(),
            )),
        }
    }

    /// Assignment never declares: the target must already be in scope.
    fn bind_assignment_expression(&mut self, assignment: &AssignmentExpr) -> BindResult<BoundExpr> {
        let symbol = match assignment.assignee.as_ref() {
            Expr::Symbol(symbol) => symbol,
            other => {
                return Err(Error::new(
                    ErrorImpl::InvalidSyntax {
                        message: String::from("only variables can be assigned to"),
                    },
                    other.get_span().clone(),
                ))
            }
        };

        let variable = self
            .scopes
            .lookup_variable(self.scope, &symbol.value)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UndefinedVariable {
                        variable: symbol.value.clone(),
                    },
                    symbol.span.clone(),
                )
            })?;

        if variable.read_only {
            return Err(Error::new(
                ErrorImpl::ReadOnlyAssignment {
                    variable: variable.name.clone(),
                },
                assignment.operator.span.clone(),
            ));
        }

        let value = self.bind_expression(&assignment.value, false)?;
        let expression = self.bind_conversion(value, variable.type_, assignment.value.get_span())?;

        Ok(BoundExpr::Assignment {
            variable,
            expression: Box::new(expression),
        })
    }

    fn bind_call_expression(&mut self, call: &CallExpr) -> BindResult<BoundExpr> {
        let symbol = match call.callee.as_ref() {
            Expr::Symbol(symbol) => symbol,
            other => {
                return Err(Error::new(
                    ErrorImpl::InvalidSyntax {
                        message: String::from("only named functions can be called"),
                    },
                    other.get_span().clone(),
                ))
            }
        };

        let function = self
            .scopes
            .lookup_function(self.scope, &symbol.value)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UndefinedFunction {
                        function: symbol.value.clone(),
                    },
                    symbol.span.clone(),
                )
            })?;

        if call.arguments.len() != function.parameters.len() {
            return Err(Error::new(
                ErrorImpl::WrongArgumentCount {
                    function: function.name.clone(),
                    expected: function.parameters.len(),
                    received: call.arguments.len(),
                },
                call.span.clone(),
            ));
        }

        let mut arguments = vec![];
        for (index, (argument, parameter)) in
            call.arguments.iter().zip(&function.parameters).enumerate()
        {
            let bound = self.bind_expression(argument, false)?;
            let received = bound.type_();

            let converted = self
                .bind_conversion(bound, parameter.type_, argument.get_span())
                .map_err(|_| {
                    Error::new(
                        ErrorImpl::ArgumentTypeMatchError {
                            function: function.name.clone(),
                            position: index + 1,
                            expected: parameter.type_.to_string(),
                            received: received.to_string(),
                        },
                        argument.get_span().clone(),
                    )
                })?;
            arguments.push(converted);
        }

        Ok(BoundExpr::Call {
            function,
            arguments,
            span: call.span.clone(),
        })
    }
}
