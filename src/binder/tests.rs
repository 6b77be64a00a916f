use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::{
    errors::errors::{Error, ErrorImpl},
    parser::parser::SyntaxTree,
    symbols::symbols::{TypeSymbol, VariableKind},
};

use super::{
    binder::Binder,
    bound_tree::{BoundExpr, BoundStmt},
    program::{BoundProgram, GlobalScope},
};

fn bind(text: &str) -> Rc<GlobalScope> {
    let tree = SyntaxTree::parse(text, None);
    assert_no_diagnostics(&tree.diagnostics);
    Binder::bind_global_scope(None, &tree.root)
}

fn bind_after(previous: &Rc<GlobalScope>, text: &str) -> Rc<GlobalScope> {
    let tree = SyntaxTree::parse(text, None);
    assert_no_diagnostics(&tree.diagnostics);
    Binder::bind_global_scope(Some(Rc::clone(previous)), &tree.root)
}

fn program(text: &str) -> BoundProgram {
    let scope = bind(text);
    assert_no_diagnostics(&scope.diagnostics);
    Binder::bind_program(&scope, None)
}

fn assert_no_diagnostics(diagnostics: &[Error]) {
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
}

fn error_names(diagnostics: &[Error]) -> Vec<&str> {
    diagnostics.iter().map(|error| error.get_error_name()).collect()
}

#[test]
fn test_typed_declaration_binds_variable() {
    let scope = bind("val x: int = 2 + 3; x");

    assert_no_diagnostics(&scope.diagnostics);
    assert_eq!(scope.variables.len(), 1);

    let x = &scope.variables[0];
    assert_eq!(x.name, "x");
    assert_eq!(x.type_, TypeSymbol::Integer);
    assert!(x.read_only);
    assert_eq!(x.kind, VariableKind::Global);

    let statement = scope.statement.as_ref().expect("bound statement");
    assert_eq!(statement.statements.len(), 2);
    match &statement.statements[1] {
        BoundStmt::Expression(BoundExpr::Variable(variable)) => assert_eq!(variable, x),
        other => panic!("expected variable reference, found {:?}", other),
    }
}

#[test]
fn test_undefined_function_reports_once_without_statement() {
    let scope = bind("foo(1)");

    assert_eq!(error_names(&scope.diagnostics), vec!["UndefinedFunction"]);
    assert!(scope.statement.is_none());
}

#[test]
fn test_integer_condition_is_invalid_type() {
    let scope = bind("if (1) {}");

    assert_eq!(scope.diagnostics.len(), 1);
    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::InvalidType {
            expected: String::from("bool"),
            received: String::from("int"),
        }
    );
}

#[test]
fn test_redefinition_in_block_and_shadowing_in_nested_block() {
    let scope = bind(
        "{
            var a: int = 3;
            var a: int = 3;
            {
                var a: int = 3;
            }
        }",
    );

    assert_eq!(error_names(&scope.diagnostics), vec!["SymbolAlreadyDeclared"]);
    assert_eq!(scope.diagnostics[0].line(), 3);
}

#[test]
fn test_break_outside_loop() {
    let scope = bind("break");

    assert_eq!(scope.diagnostics.len(), 1);
    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::InvalidBreakOrContinue {
            keyword: String::from("break"),
        }
    );
}

#[test]
fn test_sibling_statements_report_independent_errors() {
    let scope = bind("x = 1; continue; var y = true + 1; y");

    assert_eq!(
        error_names(&scope.diagnostics),
        vec![
            "UndefinedVariable",
            "InvalidBreakOrContinue",
            "UndefinedBinaryOperator",
            "UndefinedVariable",
        ]
    );
}

#[test]
fn test_val_reassignment_rejected() {
    let scope = bind("val x = 1; x = 2");

    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::ReadOnlyAssignment {
            variable: String::from("x"),
        }
    );
}

#[test]
fn test_var_reassignment_allowed() {
    let scope = bind("var x = 1; x = 2");
    assert_no_diagnostics(&scope.diagnostics);
}

#[test]
fn test_declaration_without_initializer_uses_default() {
    let scope = bind("var x: double");
    let statement = scope.statement.as_ref().expect("bound statement");

    assert_eq!(statement.to_string(), "var x = 0.0\n");
}

#[test]
fn test_implicit_conversions_at_boundaries() {
    let scope = bind("var d: double = 1; var s: string = 2b; d = 3");
    let statement = scope.statement.as_ref().expect("bound statement");

    assert_eq!(
        statement.to_string(),
        "var d = double(1)\nvar s = string(2b)\nd = double(3)\n"
    );
}

#[test]
fn test_no_narrowing_conversion() {
    let scope = bind("var x: int = 1.5");

    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::TypeMatchError {
            expected: String::from("int"),
            received: String::from("double"),
        }
    );
}

#[test]
fn test_operators_never_coerce() {
    let scope = bind("1 + 2.0");

    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::UndefinedBinaryOperator {
            operator: String::from("+"),
            left: String::from("int"),
            right: String::from("double"),
        }
    );
}

#[test]
fn test_unary_operator_on_wrong_type() {
    let scope = bind("!1");

    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::UndefinedUnaryOperator {
            operator: String::from("!"),
            operand: String::from("int"),
        }
    );
}

#[test]
fn test_void_value_rejected() {
    let scope = bind("var x = print(\"hi\")");
    assert_eq!(error_names(&scope.diagnostics), vec!["ExpressionMustHaveValue"]);

    let scope = bind("print(\"hi\")");
    assert_no_diagnostics(&scope.diagnostics);
}

#[test]
fn test_unknown_type() {
    let scope = bind("var x: float = 1");

    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::UnknownType {
            type_: String::from("float"),
        }
    );
}

#[test]
fn test_call_argument_checks() {
    let scope = bind(
        "fun add(a: int, b: int): int { return a + b }
        add(1)",
    );
    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::WrongArgumentCount {
            function: String::from("add"),
            expected: 2,
            received: 1,
        }
    );

    let scope = bind(
        "fun add(a: int, b: int): int { return a + b }
        add(1, true)",
    );
    assert_eq!(
        scope.diagnostics[0].kind(),
        &ErrorImpl::ArgumentTypeMatchError {
            function: String::from("add"),
            position: 2,
            expected: String::from("int"),
            received: String::from("bool"),
        }
    );
}

#[test]
fn test_functions_declared_before_statements() {
    let scope = bind(
        "val result = even(4)
        fun even(n: int): bool { if (n == 0) { return true } return odd(n - 1) }
        fun odd(n: int): bool { if (n == 0) { return false } return even(n - 1) }",
    );

    assert_no_diagnostics(&scope.diagnostics);
    assert_eq!(scope.functions.len(), 2);
    assert_eq!(scope.variables[0].type_, TypeSymbol::Boolean);

    let program = Binder::bind_program(&scope, None);
    assert_no_diagnostics(&program.diagnostics);
    assert_eq!(program.functions.len(), 2);
}

#[test]
fn test_function_body_cannot_see_top_level_variables() {
    let scope = bind(
        "var x = 1
        fun f(): int { return x }",
    );
    assert_no_diagnostics(&scope.diagnostics);

    let program = Binder::bind_program(&scope, None);
    assert_eq!(error_names(&program.diagnostics), vec!["UndefinedVariable"]);
}

#[test]
fn test_parameters_are_read_only() {
    let program = program("fun f(a: int) { a = 2 }");
    assert_eq!(error_names(&program.diagnostics), vec!["ReadOnlyAssignment"]);
}

#[test]
fn test_duplicate_parameter() {
    let scope = bind("fun f(a: int, a: int) {}");
    assert_eq!(error_names(&scope.diagnostics), vec!["SymbolAlreadyDeclared"]);
}

#[test]
fn test_not_all_paths_return() {
    let program = program("fun f(a: int): int { if (a > 0) { return 1 } }");

    assert_eq!(
        program.diagnostics[0].kind(),
        &ErrorImpl::NotAllPathsReturn {
            function: String::from("f"),
        }
    );
}

#[test]
fn test_all_paths_return_through_else() {
    let program = program("fun f(a: int): int { if (a > 0) { return 1 } else { return 2 } }");
    assert_no_diagnostics(&program.diagnostics);
}

#[test]
fn test_return_checks() {
    let scope = bind("return");
    assert_eq!(error_names(&scope.diagnostics), vec!["ReturnOutsideFunction"]);

    let program = program("fun f() { return 1 }");
    assert_eq!(error_names(&program.diagnostics), vec!["UnexpectedReturnValue"]);

    let program = self::program("fun f(): int { return }");
    assert_eq!(error_names(&program.diagnostics), vec!["MissingReturnValue"]);
}

#[test]
fn test_nested_function_declaration_rejected() {
    let program = program("fun f() { fun g() {} }");
    assert_eq!(error_names(&program.diagnostics), vec!["InvalidSyntax"]);
}

#[test]
fn test_loop_labels_are_unique_per_loop() {
    let scope = bind("while (true) { break } while (true) { continue }");
    let statement = scope.statement.as_ref().expect("bound statement");

    let labels: Vec<String> = statement
        .statements
        .iter()
        .map(|statement| match statement {
            BoundStmt::While {
                body,
                break_label,
                continue_label,
                ..
            } => format!("{} {} {}", break_label, continue_label, body),
            other => panic!("expected while, found {:?}", other),
        })
        .collect();

    assert_eq!(
        labels,
        vec![
            "break1 continue1 {\n    goto break1\n}\n",
            "break2 continue2 {\n    goto continue2\n}\n",
        ]
    );
}

#[test]
fn test_previous_submission_symbols_visible() {
    let first = bind("var x = 1; fun twice(n: int): int { return n * 2 }");
    let second = bind_after(&first, "x = twice(x)");

    assert_no_diagnostics(&second.diagnostics);
    assert_eq!(second.chain().len(), 2);
}

#[test]
fn test_redeclaring_in_later_submission_shadows() {
    let first = bind("var x = 1");
    let second = bind_after(&first, "var x = \"text\"");

    assert_no_diagnostics(&second.diagnostics);
    assert_eq!(second.variables[0].type_, TypeSymbol::String);
    assert!(first.variables[0] != second.variables[0]);
}

#[test]
fn test_printer_formats_structured_statements() {
    let scope = bind(
        "var i = 0
        for (var j = 0; j < 3; j = j + 1) {
            if (j == 1) { i = -i } else { print(\"odd\") }
        }",
    );
    let statement = scope.statement.as_ref().expect("bound statement");

    let expected = "\
var i = 0
for var j = 0; j < 3; j = j + 1
{
    if j == 1
    {
        i = -i
    }
    else
    {
        print(\"odd\")
    }
}
";
    assert_eq!(statement.to_string(), expected);
}

#[test]
fn test_bodies_bound_after_condition_errors() {
    let scope = bind(
        "while (1) { x = 2 }
        for (var i = 0; i; i = i + 1) { y }
        if (2) { z } else { w }",
    );

    assert_eq!(
        error_names(&scope.diagnostics),
        vec![
            "InvalidType",
            "UndefinedVariable",
            "InvalidType",
            "UndefinedVariable",
            "InvalidType",
            "UndefinedVariable",
            "UndefinedVariable",
        ]
    );
    let lines: Vec<u32> = scope.diagnostics.iter().map(|error| error.line()).collect();
    assert_eq!(lines, vec![1, 1, 2, 2, 3, 3, 3]);
}

#[test]
fn test_function_bodies_bound_when_top_level_fails() {
    let tree = SyntaxTree::parse(
        "missing()
        fun ok(): int { return 1 }
        fun broken(): int { return nope }",
        None,
    );
    let scope = Binder::bind_global_scope(None, &tree.root);
    assert_eq!(error_names(&scope.diagnostics), vec!["UndefinedFunction"]);

    let program = Binder::bind_program(&scope, None);
    assert_eq!(
        error_names(&program.diagnostics),
        vec!["UndefinedFunction", "UndefinedVariable"]
    );
    assert_eq!(program.functions.len(), 1);
    assert!(program.functions.keys().all(|function| function.name == "ok"));
}
