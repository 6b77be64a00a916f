use std::{
    rc::Rc,
    sync::{atomic::AtomicBool, Arc},
};

use pretty_assertions::assert_eq;

use crate::{
    evaluator::value::{Value, Variables},
    parser::parser::SyntaxTree,
};

use super::compilation::{Compilation, EvaluationOptions, EvaluationResult};

fn submit(
    previous: Option<&Rc<Compilation>>,
    text: &str,
    variables: &mut Variables,
) -> (Rc<Compilation>, EvaluationResult) {
    let tree = SyntaxTree::parse(text, None);
    let compilation = match previous {
        Some(previous) => previous.continue_with(tree),
        None => Compilation::new(tree),
    };

    let result = compilation.evaluate_with(variables, Vec::new(), &EvaluationOptions::default());
    (compilation, result)
}

fn names(result: &EvaluationResult) -> Vec<&str> {
    result
        .diagnostics
        .iter()
        .map(|error| error.get_error_name())
        .collect()
}

#[test]
fn test_variables_persist_between_submissions() {
    let mut variables = Variables::new();

    let (first, result) = submit(None, "var x = 10", &mut variables);
    assert_eq!(result.value, Some(Value::Integer(10)));

    let (second, result) = submit(Some(&first), "x = x * 2", &mut variables);
    assert_eq!(result.value, Some(Value::Integer(20)));

    let (_, result) = submit(Some(&second), "x + 1", &mut variables);
    assert_eq!(result.value, Some(Value::Integer(21)));
}

#[test]
fn test_functions_persist_between_submissions() {
    let mut variables = Variables::new();

    let (first, result) = submit(
        None,
        "fun square(n: int): int { return n * n }",
        &mut variables,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, None);

    let (second, _) = submit(
        Some(&first),
        "fun cube(n: int): int { return square(n) * n }",
        &mut variables,
    );
    let (_, result) = submit(Some(&second), "cube(3)", &mut variables);

    assert_eq!(result.value, Some(Value::Integer(27)));
}

#[test]
fn test_later_submission_shadows_earlier_declaration() {
    let mut variables = Variables::new();

    let (first, _) = submit(None, "var x = 1", &mut variables);
    let (second, result) = submit(Some(&first), "var x = true", &mut variables);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let (_, result) = submit(Some(&second), "!x", &mut variables);
    assert_eq!(result.value, Some(Value::Boolean(false)));
}

#[test]
fn test_parse_errors_stop_before_binding() {
    let mut variables = Variables::new();
    let (compilation, result) = submit(None, "var x = (1 + ", &mut variables);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.value, None);
    assert_eq!(compilation.diagnostics(), compilation.syntax_tree.diagnostics);
    assert!(variables.is_empty());
}

#[test]
fn test_binding_errors_reported_in_order() {
    let mut variables = Variables::new();
    let (_, result) = submit(None, "foo(1); var y: bool = 1; break", &mut variables);

    assert_eq!(
        names(&result),
        vec!["UndefinedFunction", "TypeMatchError", "InvalidBreakOrContinue"]
    );
    assert!(variables.is_empty());
}

#[test]
fn test_function_body_errors_reported() {
    let mut variables = Variables::new();
    let (_, result) = submit(None, "fun f(): int { }", &mut variables);

    assert_eq!(names(&result), vec!["NotAllPathsReturn"]);
}

#[test]
fn test_runtime_error_reported_as_diagnostic() {
    let mut variables = Variables::new();
    let (_, result) = submit(None, "var zero = 0; 10 / zero", &mut variables);

    assert_eq!(names(&result), vec!["DivisionByZero"]);
    assert_eq!(result.value, None);
}

#[test]
fn test_evaluation_options_apply() {
    let tree = SyntaxTree::parse("while (true) { }", None);
    let compilation = Compilation::new(tree);
    let mut variables = Variables::new();

    let options = EvaluationOptions {
        interrupt: Some(Arc::new(AtomicBool::new(false))),
        max_loop_iterations: Some(5),
    };
    let result = compilation.evaluate_with(&mut variables, Vec::new(), &options);

    assert_eq!(names(&result), vec!["EvaluationInterrupted"]);
}

#[test]
fn test_print_output_goes_to_sink() {
    let tree = SyntaxTree::parse("print(\"hello\"); print(\"world\")", None);
    let compilation = Compilation::new(tree);
    let mut variables = Variables::new();
    let mut output = Vec::new();

    let result =
        compilation.evaluate_with(&mut variables, &mut output, &EvaluationOptions::default());

    assert!(result.diagnostics.is_empty());
    assert_eq!(String::from_utf8(output).expect("utf-8"), "hello\nworld\n");
}

#[test]
fn test_emit_tree() {
    let tree = SyntaxTree::parse(
        "fun abs(n: int): int { if (n < 0) { return -n } return n }
        var x = abs(-4)",
        None,
    );
    let compilation = Compilation::new(tree);

    let mut output = Vec::new();
    compilation.emit_tree(&mut output).expect("emit tree");

    assert_eq!(
        String::from_utf8(output).expect("utf-8"),
        "\
fun abs(n: int): int
goto Label1 unless n < 0
return -n
Label1:
return n

var x = abs(-4)
"
    );
}

#[test]
fn test_emit_control_flow_graph_of_top_level() {
    let tree = SyntaxTree::parse("var x = 1; if (x == 1) { x = 2 }", None);
    let compilation = Compilation::new(tree);

    let mut output = Vec::new();
    compilation
        .emit_control_flow_graph(&mut output)
        .expect("emit graph");

    assert_eq!(
        String::from_utf8(output).expect("utf-8"),
        "\
digraph ControlFlow {
    N0 [label = \"<Start>\", shape = box]
    N1 [label = \"var x = 1\\lgoto Label1 unless x == 1\", shape = box]
    N2 [label = \"x = 2\", shape = box]
    N3 [label = \"Label1:\", shape = box]
    N4 [label = \"<End>\", shape = box]
    N0 -> N1
    N1 -> N3 [label = \"!(x == 1)\"]
    N1 -> N2 [label = \"x == 1\"]
    N2 -> N3
    N3 -> N4
}
"
    );
}

#[test]
fn test_emit_control_flow_graph_of_last_function() {
    let tree = SyntaxTree::parse("fun one(): int { return 1 }", None);
    let compilation = Compilation::new(tree);

    let mut output = Vec::new();
    compilation
        .emit_control_flow_graph(&mut output)
        .expect("emit graph");

    let text = String::from_utf8(output).expect("utf-8");
    assert!(text.contains("N1 [label = \"return 1\", shape = box]"), "{}", text);
    assert!(text.contains("N1 -> N2\n"), "{}", text);
}

#[test]
fn test_functions_of_failed_submission_stay_callable() {
    let mut variables = Variables::new();

    let (first, result) = submit(None, "fun f(): int { return 1 } foo()", &mut variables);
    assert_eq!(names(&result), vec!["UndefinedFunction"]);

    let (_, result) = submit(Some(&first), "f()", &mut variables);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, Some(Value::Integer(1)));
}

#[test]
fn test_function_with_body_errors_is_not_callable() {
    let mut variables = Variables::new();

    let (first, result) = submit(None, "fun g(): int { return nope }", &mut variables);
    assert_eq!(names(&result), vec!["UndefinedVariable"]);

    let (_, result) = submit(Some(&first), "g() + 1", &mut variables);
    assert_eq!(names(&result), vec!["UncallableFunction"]);
    assert_eq!(result.diagnostics[0].column(), 1);
}

#[test]
fn test_variable_of_failed_submission_reads_default() {
    let mut variables = Variables::new();

    let (first, result) = submit(None, "var a = 5; foo()", &mut variables);
    assert_eq!(names(&result), vec!["UndefinedFunction"]);

    let (_, result) = submit(Some(&first), "a", &mut variables);
    assert_eq!(result.value, Some(Value::Integer(0)));
}
