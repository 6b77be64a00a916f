use crate::{
    binder::bound_tree::{BoundBlock, BoundExpr, BoundStmt},
    symbols::symbols::LabelSymbol,
};

/// Rewrites structured control flow into labels and gotos.
///
/// Label names come from a counter that lives for one `lower` call, so they
/// are unique within the unit being lowered.
struct Lowerer {
    label_count: usize,
}

impl Lowerer {
    fn new() -> Self {
        Lowerer { label_count: 0 }
    }

    fn generate_label(&mut self) -> LabelSymbol {
        self.label_count += 1;
        LabelSymbol::new(format!("Label{}", self.label_count))
    }

    fn rewrite_statement(&mut self, stmt: &BoundStmt) -> BoundStmt {
        match stmt {
            BoundStmt::Block(block) => BoundStmt::Block(BoundBlock {
                statements: block
                    .statements
                    .iter()
                    .map(|statement| self.rewrite_statement(statement))
                    .collect(),
            }),
            BoundStmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => self.rewrite_if(condition, then_stmt, else_stmt.as_deref()),
            BoundStmt::While {
                condition,
                body,
                break_label,
                continue_label,
            } => self.rewrite_while(condition, body, break_label, continue_label),
            BoundStmt::For {
                initializer,
                condition,
                step,
                body,
                break_label,
                continue_label,
            } => {
                // The continue label sits before the step so `continue`
                // still advances the loop
                let while_body = BoundStmt::Block(BoundBlock {
                    statements: vec![
                        (**body).clone(),
                        BoundStmt::Label(continue_label.clone()),
                        BoundStmt::Expression(step.clone()),
                    ],
                });
                let while_stmt = BoundStmt::While {
                    condition: condition.clone(),
                    body: Box::new(while_body),
                    break_label: break_label.clone(),
                    continue_label: self.generate_label(),
                };

                let result = BoundStmt::Block(BoundBlock {
                    statements: vec![(**initializer).clone(), while_stmt],
                });
                self.rewrite_statement(&result)
            }
            BoundStmt::VariableDeclaration { .. }
            | BoundStmt::Expression(_)
            | BoundStmt::Label(_)
            | BoundStmt::Goto(_)
            | BoundStmt::ConditionalGoto { .. }
            | BoundStmt::Return(_) => stmt.clone(),
        }
    }

    /// `if c T`        -> `goto end unless c; T; end:`
    /// `if c T else F` -> `goto else unless c; T; goto end; else:; F; end:`
    fn rewrite_if(
        &mut self,
        condition: &BoundExpr,
        then_stmt: &BoundStmt,
        else_stmt: Option<&BoundStmt>,
    ) -> BoundStmt {
        let result = match else_stmt {
            None => {
                let end_label = self.generate_label();
                vec![
                    BoundStmt::ConditionalGoto {
                        label: end_label.clone(),
                        condition: condition.clone(),
                        jump_if_true: false,
                    },
                    then_stmt.clone(),
                    BoundStmt::Label(end_label),
                ]
            }
            Some(else_stmt) => {
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                vec![
                    BoundStmt::ConditionalGoto {
                        label: else_label.clone(),
                        condition: condition.clone(),
                        jump_if_true: false,
                    },
                    then_stmt.clone(),
                    BoundStmt::Goto(end_label.clone()),
                    BoundStmt::Label(else_label),
                    else_stmt.clone(),
                    BoundStmt::Label(end_label),
                ]
            }
        };

        self.rewrite_statement(&BoundStmt::Block(BoundBlock { statements: result }))
    }

    /// `while c B` -> `goto continue; body:; B; continue:; goto body if c; break:`
    fn rewrite_while(
        &mut self,
        condition: &BoundExpr,
        body: &BoundStmt,
        break_label: &LabelSymbol,
        continue_label: &LabelSymbol,
    ) -> BoundStmt {
        let body_label = self.generate_label();
        let result = vec![
            BoundStmt::Goto(continue_label.clone()),
            BoundStmt::Label(body_label.clone()),
            body.clone(),
            BoundStmt::Label(continue_label.clone()),
            BoundStmt::ConditionalGoto {
                label: body_label,
                condition: condition.clone(),
                jump_if_true: true,
            },
            BoundStmt::Label(break_label.clone()),
        ];

        self.rewrite_statement(&BoundStmt::Block(BoundBlock { statements: result }))
    }
}

/// Inlines nested blocks into one ordered statement list.
pub fn flatten(stmt: BoundStmt) -> BoundBlock {
    let mut statements = vec![];
    let mut stack = vec![stmt];

    while let Some(current) = stack.pop() {
        match current {
            BoundStmt::Block(block) => stack.extend(block.statements.into_iter().rev()),
            other => statements.push(other),
        }
    }

    BoundBlock { statements }
}

/// Lowers `stmt` into a flat block containing only declarations,
/// expression statements, labels, gotos and returns.
pub fn lower(stmt: &BoundStmt) -> BoundBlock {
    let mut lowerer = Lowerer::new();
    let result = flatten(lowerer.rewrite_statement(stmt));

    tracing::trace!(
        labels = lowerer.label_count,
        statements = result.statements.len(),
        "lowered block"
    );

    result
}
