use std::{
    collections::HashMap,
    rc::Rc,
    sync::{atomic::AtomicBool, Arc},
};

use pretty_assertions::assert_eq;

use crate::{
    binder::{binder::Binder, program::BoundProgram},
    errors::errors::ErrorImpl,
    parser::parser::SyntaxTree,
};

use super::{
    evaluator::{EvalResult, Evaluator},
    value::{Value, Variables},
};

fn lowered_program(text: &str) -> BoundProgram {
    let tree = SyntaxTree::parse(text, None);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);

    let scope = Binder::bind_global_scope(None, &tree.root);
    let program = Binder::bind_program(&scope, None);
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
    program
}

/// The top-level statements exactly as bound, with `if`/`while`/`for`
/// left structured.
fn structured_program(text: &str) -> BoundProgram {
    let tree = SyntaxTree::parse(text, None);
    let scope = Binder::bind_global_scope(None, &tree.root);
    assert!(scope.diagnostics.is_empty(), "{:?}", scope.diagnostics);

    BoundProgram {
        previous: None,
        diagnostics: vec![],
        functions: HashMap::new(),
        statement: scope.statement.clone().expect("bound statement"),
    }
}

fn run(program: &BoundProgram, variables: &mut Variables) -> EvalResult<Option<Value>> {
    Evaluator::new(program, variables)
        .with_output(Vec::new())
        .evaluate()
}

fn eval(text: &str) -> Value {
    let program = lowered_program(text);
    let mut variables = Variables::new();
    run(&program, &mut variables)
        .expect("evaluation")
        .unwrap_or(Value::Null)
}

fn eval_error(text: &str) -> ErrorImpl {
    let program = lowered_program(text);
    let mut variables = Variables::new();
    match run(&program, &mut variables) {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(error) => error.kind().clone(),
    }
}

#[test]
fn test_declaration_value() {
    assert_eq!(eval("val x: int = 2 + 3; x"), Value::Integer(5));
}

#[test]
fn test_while_loop_final_state() {
    let program = lowered_program("var y = 1; while (y < 5) { y = y + 1; }");
    let mut variables = Variables::new();
    run(&program, &mut variables).expect("evaluation");

    assert_eq!(variables.find("y"), Some(&Value::Integer(5)));
}

#[test]
fn test_assignment_yields_value() {
    assert_eq!(eval("var a = 0; var b = 0; a = b = 7"), Value::Integer(7));
    assert_eq!(eval("var a = 0; var b = 0; a = b = 7; a + b"), Value::Integer(14));
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("7 / 2"), Value::Integer(3));
    assert_eq!(eval("-7 / 2"), Value::Integer(-3));
    assert_eq!(eval("-7 % 3"), Value::Integer(-1));
    assert_eq!(eval("2 + 3 * 4"), Value::Integer(14));
    assert_eq!(eval("2147483647 + 1"), Value::Integer(i32::MIN));
}

#[test]
fn test_power() {
    assert_eq!(eval("2 ** 10"), Value::Integer(1024));
    assert_eq!(eval("2 ** 3 ** 2"), Value::Integer(512));
    assert_eq!(eval("2 ** -1"), Value::Integer(0));
    assert_eq!(eval("3b ** 2b"), Value::Byte(9));
    assert_eq!(eval("2b ** 7b"), Value::Byte(-128));
    assert_eq!(eval("2.0 ** 3.0"), Value::Double(8.0));
}

#[test]
fn test_byte_arithmetic_wraps() {
    assert_eq!(eval("127b + 1b"), Value::Byte(-128));
    assert_eq!(eval("10b / 3b"), Value::Byte(3));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_error("1 / 0"), ErrorImpl::DivisionByZero);
    assert_eq!(eval_error("var x = 0; 5 % x"), ErrorImpl::DivisionByZero);
    assert_eq!(eval_error("1b / 0b"), ErrorImpl::DivisionByZero);
}

#[test]
fn test_double_arithmetic() {
    assert_eq!(eval("1.5 * 2.0"), Value::Double(3.0));
    assert_eq!(eval("1.0 / 0.0"), Value::Double(f64::INFINITY));
    assert_eq!(eval("1.5 * 2.0").to_string(), "3.0");
}

#[test]
fn test_comparisons_and_equality() {
    assert_eq!(eval("1 < 2 && 2 <= 2"), Value::Boolean(true));
    assert_eq!(eval("\"ab\" == \"a\" + \"b\""), Value::Boolean(true));
    assert_eq!(eval("true != false"), Value::Boolean(true));
    assert_eq!(eval("2.5 >= 3.0"), Value::Boolean(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    let program = lowered_program("var x = 0; false && (x = 1) == 1; true || (x = 2) == 2; x");
    let mut variables = Variables::new();

    assert_eq!(run(&program, &mut variables).expect("evaluation"), Some(Value::Integer(0)));
}

#[test]
fn test_conversions() {
    assert_eq!(eval("var d: double = 2; d"), Value::Double(2.0));
    assert_eq!(eval("var i: int = -100b; i"), Value::Integer(-100));
    assert_eq!(eval("var s: string = 2.0; s"), Value::String(String::from("2.0")));
    assert_eq!(eval("var s: string = true; s + \"!\""), Value::String(String::from("true!")));
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval("-(3 - 5)"), Value::Integer(2));
    assert_eq!(eval("+4"), Value::Integer(4));
    assert_eq!(eval("!true"), Value::Boolean(false));
    assert_eq!(eval("-2.5"), Value::Double(-2.5));
}

#[test]
fn test_if_else() {
    assert_eq!(eval("var x = 3; if (x > 2) { x = 10 } else { x = 20 } x"), Value::Integer(10));
    assert_eq!(eval("var x = 1; if (x > 2) { x = 10 } else { x = 20 } x"), Value::Integer(20));
}

#[test]
fn test_for_with_break_and_continue() {
    let text = "
        var total = 0
        for (var i = 0; i < 10; i = i + 1) {
            if (i % 2 == 0) { continue }
            if (i > 7) { break }
            total = total + i
        }
        total";

    assert_eq!(eval(text), Value::Integer(1 + 3 + 5 + 7));
}

#[test]
fn test_function_calls_and_recursion() {
    let text = "
        fun fib(n: int): int {
            if (n < 2) { return n }
            return fib(n - 1) + fib(n - 2)
        }
        fib(15)";

    assert_eq!(eval(text), Value::Integer(610));
}

#[test]
fn test_function_locals_do_not_leak() {
    let text = "
        var x = 1
        fun f(x: int): int { var y = x * 10; return y }
        x = f(x + 1)
        x";

    let program = lowered_program(text);
    let mut variables = Variables::new();
    let value = run(&program, &mut variables).expect("evaluation");

    assert_eq!(value, Some(Value::Integer(20)));
    assert_eq!(variables.len(), 1);
    assert_eq!(variables.find("y"), None);
}

#[test]
fn test_void_call_has_no_value() {
    let program = lowered_program("fun noop() { return } noop()");
    let mut variables = Variables::new();

    assert_eq!(run(&program, &mut variables).expect("evaluation"), None);
}

#[test]
fn test_print_writes_to_output() {
    let program = lowered_program(
        "for (var i = 1; i <= 3; i = i + 1) { var n: string = i; print(\"line \" + n) }",
    );
    let mut variables = Variables::new();
    let mut output = Vec::new();

    Evaluator::new(&program, &mut variables)
        .with_output(&mut output)
        .evaluate()
        .expect("evaluation");

    assert_eq!(String::from_utf8(output).expect("utf-8"), "line 1\nline 2\nline 3\n");
}

#[test]
fn test_iteration_limit_stops_infinite_loop() {
    let program = lowered_program("var x = 0; while (true) { x = x + 1 }");
    let mut variables = Variables::new();

    let result = Evaluator::new(&program, &mut variables)
        .with_output(Vec::new())
        .with_iteration_limit(Some(100))
        .evaluate();

    let error = result.expect_err("loop should be stopped");
    assert_eq!(error.kind(), &ErrorImpl::EvaluationInterrupted);
    assert!(matches!(variables.find("x"), Some(Value::Integer(count)) if *count > 0));
}

#[test]
fn test_interrupt_flag_stops_evaluation() {
    let program = lowered_program("while (true) { }");
    let mut variables = Variables::new();
    let interrupt = Arc::new(AtomicBool::new(true));

    let result = Evaluator::new(&program, &mut variables)
        .with_output(Vec::new())
        .with_interrupt(interrupt)
        .evaluate();

    assert_eq!(
        result.expect_err("loop should be stopped").kind(),
        &ErrorImpl::EvaluationInterrupted
    );
}

#[test]
fn test_structured_loop_respects_iteration_limit() {
    let program = structured_program("for (var i = 0; true; i = i + 1) { }");
    let mut variables = Variables::new();

    let result = Evaluator::new(&program, &mut variables)
        .with_output(Vec::new())
        .with_iteration_limit(Some(10))
        .evaluate();

    assert_eq!(
        result.expect_err("loop should be stopped").kind(),
        &ErrorImpl::EvaluationInterrupted
    );
}

#[test]
fn test_lowering_preserves_behavior() {
    let sources = [
        "var y = 1; while (y < 5) { y = y + 1; } y",
        "var x = 3; if (x > 2) { x = 10 } else { x = 20 } x",
        "var n = 0; for (var i = 0; i < 20; i = i + 1) { if (i == 13) { break } if (i % 3 == 0) { continue } n = n + i } n",
        "var a = 0; var b = 1; var k = 0; while (k < 10) { var t = a + b; a = b; b = t; k = k + 1 } a",
        "var s = 0; var i = 0; while (true) { i = i + 1; if (i > 4) { break } s = s * 10 + i } s",
        "var z = 0; { var w = 5; z = w * w } if (z == 25) { z = z + 1 }",
    ];

    for source in sources {
        let mut lowered_variables = Variables::new();
        let lowered = run(&lowered_program(source), &mut lowered_variables).expect("lowered");

        let mut structured_variables = Variables::new();
        let structured =
            run(&structured_program(source), &mut structured_variables).expect("structured");

        assert_eq!(lowered, structured, "{}", source);
        assert_eq!(lowered_variables.len(), structured_variables.len(), "{}", source);
        for name in ["y", "x", "n", "a", "b", "s", "z"] {
            assert_eq!(
                lowered_variables.find(name),
                structured_variables.find(name),
                "{} in {}",
                name,
                source
            );
        }
    }
}

#[test]
fn test_globals_persist_across_evaluations() {
    let tree = SyntaxTree::parse("var counter = 41", None);
    let first = Binder::bind_global_scope(None, &tree.root);
    let first_program = Rc::new(Binder::bind_program(&first, None));

    let mut variables = Variables::new();
    run(&first_program, &mut variables).expect("first");

    let tree = SyntaxTree::parse("counter = counter + 1", None);
    let second = Binder::bind_global_scope(Some(first), &tree.root);
    let second_program = Binder::bind_program(&second, Some(first_program));

    assert_eq!(run(&second_program, &mut variables).expect("second"), Some(Value::Integer(42)));
}

#[test]
fn test_statements_without_values_keep_previous_result() {
    let sources = [
        "var y = 10; while (y < 5) { y = y + 1 }",
        "var y = 10; { }",
        "var y = 10; if (y < 5) { y = 1 }",
    ];

    for source in sources {
        let mut variables = Variables::new();
        let lowered = run(&lowered_program(source), &mut variables).expect("lowered");
        assert_eq!(lowered, Some(Value::Integer(10)), "{}", source);

        let mut variables = Variables::new();
        let structured = run(&structured_program(source), &mut variables).expect("structured");
        assert_eq!(structured, Some(Value::Integer(10)), "{}", source);
    }
}

#[test]
fn test_runtime_errors_point_at_operator() {
    let program = lowered_program("var a = 1\nvar b = 0\na % b");
    let mut variables = Variables::new();

    let error = run(&program, &mut variables).expect_err("modulus by zero");
    assert_eq!(error.kind(), &ErrorImpl::DivisionByZero);
    assert_eq!((error.line(), error.column()), (3, 3));
}
