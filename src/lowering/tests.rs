use std::collections::HashSet;

use pretty_assertions::assert_eq;

use crate::{
    ast::types::LiteralValue,
    binder::{
        binder::Binder,
        bound_tree::{BoundBlock, BoundExpr, BoundStmt},
    },
    parser::parser::SyntaxTree,
    symbols::symbols::LabelSymbol,
};

use super::lowerer::{flatten, lower};

fn bound_block(text: &str) -> BoundBlock {
    let tree = SyntaxTree::parse(text, None);
    let scope = Binder::bind_global_scope(None, &tree.root);
    assert!(scope.diagnostics.is_empty(), "{:?}", scope.diagnostics);

    scope.statement.clone().expect("bound statement")
}

fn lowered(text: &str) -> BoundBlock {
    lower(&BoundStmt::Block(bound_block(text)))
}

fn literal(value: i32) -> BoundStmt {
    BoundStmt::Expression(BoundExpr::Literal(LiteralValue::Integer(value)))
}

#[test]
fn test_lower_if_without_else() {
    let block = lowered("var x = 1; if (x > 0) { x = 2 }");

    assert_eq!(
        block.to_string(),
        "var x = 1\ngoto Label1 unless x > 0\nx = 2\nLabel1:\n"
    );
}

#[test]
fn test_lower_if_with_else() {
    let block = lowered("var x = 1; if (x > 0) { x = 2 } else { x = 3 }");

    assert_eq!(
        block.to_string(),
        "\
var x = 1
goto Label1 unless x > 0
x = 2
goto Label2
Label1:
x = 3
Label2:
"
    );
}

#[test]
fn test_lower_while() {
    let block = lowered("var i = 0; while (i < 3) { i = i + 1 }");

    assert_eq!(
        block.to_string(),
        "\
var i = 0
goto continue1
Label1:
i = i + 1
continue1:
goto Label1 if i < 3
break1:
"
    );
}

#[test]
fn test_lower_for_runs_step_after_continue_label() {
    let block = lowered("for (var i = 0; i < 3; i = i + 1) { continue }");

    assert_eq!(
        block.to_string(),
        "\
var i = 0
goto Label1
Label2:
goto continue1
continue1:
i = i + 1
Label1:
goto Label2 if i < 3
break1:
"
    );
}

#[test]
fn test_lowered_block_has_no_structured_statements() {
    let block = lowered(
        "var total = 0
        for (var i = 0; i < 10; i = i + 1) {
            if (i % 2 == 0) { continue }
            while (total > 100) { break }
            { total = total + i }
        }",
    );

    for statement in &block.statements {
        assert!(
            matches!(
                statement,
                BoundStmt::VariableDeclaration { .. }
                    | BoundStmt::Expression(_)
                    | BoundStmt::Label(_)
                    | BoundStmt::Goto(_)
                    | BoundStmt::ConditionalGoto { .. }
            ),
            "unexpected statement {:?}",
            statement
        );
    }
}

#[test]
fn test_generated_labels_are_unique() {
    let block = lowered(
        "var x = 0
        if (x == 0) { x = 1 } else { x = 2 }
        if (x == 1) { x = 3 }
        while (x < 10) { if (x == 5) { break } x = x + 1 }",
    );

    let labels: Vec<&LabelSymbol> = block
        .statements
        .iter()
        .filter_map(|statement| match statement {
            BoundStmt::Label(label) => Some(label),
            _ => None,
        })
        .collect();
    let unique: HashSet<&LabelSymbol> = labels.iter().copied().collect();

    assert_eq!(labels.len(), unique.len());
}

#[test]
fn test_lowering_is_idempotent() {
    let once = lowered(
        "var x = 0
        while (x < 5) { if (x == 2) { x = x + 2 } else { x = x + 1 } }",
    );
    let twice = lower(&BoundStmt::Block(once.clone()));

    assert_eq!(twice.to_string(), once.to_string());
}

#[test]
fn test_flatten_preserves_order() {
    let nested = BoundStmt::Block(BoundBlock {
        statements: vec![
            literal(1),
            BoundStmt::Block(BoundBlock {
                statements: vec![
                    literal(2),
                    BoundStmt::Block(BoundBlock {
                        statements: vec![literal(3)],
                    }),
                ],
            }),
            BoundStmt::Block(BoundBlock::default()),
            literal(4),
        ],
    });

    let flat = flatten(nested);
    assert_eq!(flat.to_string(), "1\n2\n3\n4\n");

    let again = flatten(BoundStmt::Block(flat.clone()));
    assert_eq!(again.to_string(), flat.to_string());
}

#[test]
fn test_label_counter_restarts_per_lowering() {
    let first = lowered("if (true) { 1 }");
    let second = lowered("if (false) { 2 }");

    assert_eq!(first.to_string(), "goto Label1 unless true\n1\nLabel1:\n");
    assert_eq!(second.to_string(), "goto Label1 unless false\n2\nLabel1:\n");
}
