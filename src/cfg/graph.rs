use std::{
    collections::{HashMap, HashSet},
    io::{self, Write},
};

use crate::{
    ast::types::LiteralValue,
    binder::{
        bound_tree::{BoundBlock, BoundExpr, BoundStmt},
        operators::bind_unary_operator,
        printer::write_stmt,
    },
    lexer::tokens::TokenKind,
    symbols::symbols::{LabelSymbol, TypeSymbol},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Start,
    End,
    Body,
}

/// A maximal run of statements with a single entry and a single exit.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub kind: BlockKind,
    pub statements: Vec<BoundStmt>,
}

impl BasicBlock {
    fn new(kind: BlockKind, statements: Vec<BoundStmt>) -> Self {
        BasicBlock { kind, statements }
    }

    fn label_text(&self) -> String {
        match self.kind {
            BlockKind::Start => String::from("<Start>"),
            BlockKind::End => String::from("<End>"),
            BlockKind::Body => {
                let mut text = String::new();
                for statement in &self.statements {
                    // Writing into a String cannot fail
                    let _ = write_stmt(&mut text, statement, 0);
                }
                text
            }
        }
    }
}

/// A directed edge between two blocks, identified by their index in
/// `ControlFlowGraph::blocks`.
#[derive(Debug, Clone)]
pub struct BasicBlockEdge {
    pub from: usize,
    pub to: usize,
    pub condition: Option<BoundExpr>,
}

/// Blocks are ordered Start, body blocks in statement order, End.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub blocks: Vec<BasicBlock>,
    pub edges: Vec<BasicBlockEdge>,
}

/// Splits a flat lowered list at labels and after jumps.
fn partition(statements: &[BoundStmt]) -> Vec<Vec<BoundStmt>> {
    let mut blocks = vec![];
    let mut current = vec![];

    for statement in statements {
        match statement {
            BoundStmt::Label(_) => {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.push(statement.clone());
            }
            _ if statement.is_jump() => {
                current.push(statement.clone());
                blocks.push(std::mem::take(&mut current));
            }
            _ => current.push(statement.clone()),
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// `!c`, except that a literal is complemented directly.
pub fn negate(condition: &BoundExpr) -> BoundExpr {
    if let BoundExpr::Literal(LiteralValue::Boolean(value)) = condition {
        return BoundExpr::Literal(LiteralValue::Boolean(!value));
    }

    match bind_unary_operator(TokenKind::Not, TypeSymbol::Boolean) {
        Some(operator) => BoundExpr::Unary {
            operator,
            operand: Box::new(condition.clone()),
        },
        None => unreachable!("logical negation is defined for bool"),
    }
}

fn is_literal_false(condition: &BoundExpr) -> bool {
    matches!(condition, BoundExpr::Literal(LiteralValue::Boolean(false)))
}

fn quote(text: &str) -> String {
    let escaped = text
        .trim_end()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\l");
    format!("\"{}\"", escaped)
}

impl ControlFlowGraph {
    pub fn create(body: &BoundBlock) -> ControlFlowGraph {
        let partitions = partition(&body.statements);
        let count = partitions.len();
        // Node ids: 0 is Start, 1..=count are the bodies, count + 1 is End
        let end = count + 1;

        let mut label_targets = HashMap::new();
        for (index, statements) in partitions.iter().enumerate() {
            if let Some(BoundStmt::Label(label)) = statements.first() {
                label_targets.insert(label.clone(), index + 1);
            }
        }

        let mut edges = vec![BasicBlockEdge {
            from: 0,
            to: if count == 0 { end } else { 1 },
            condition: None,
        }];

        for (index, statements) in partitions.iter().enumerate() {
            let from = index + 1;
            let next = from + 1;

            let target = |label: &LabelSymbol| match label_targets.get(label) {
                Some(target) => *target,
                None => panic!("branch to undefined label '{}'", label),
            };

            match statements.last() {
                Some(BoundStmt::Goto(label)) => edges.push(BasicBlockEdge {
                    from,
                    to: target(label),
                    condition: None,
                }),
                Some(BoundStmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                }) => {
                    let negated = negate(condition);
                    let (then_condition, else_condition) = if *jump_if_true {
                        (condition.clone(), negated)
                    } else {
                        (negated, condition.clone())
                    };

                    // An edge guarded by a literal `false` is never taken
                    for (to, condition) in [(target(label), then_condition), (next, else_condition)] {
                        if !is_literal_false(&condition) {
                            edges.push(BasicBlockEdge {
                                from,
                                to,
                                condition: Some(condition),
                            });
                        }
                    }
                }
                Some(BoundStmt::Return(_)) => edges.push(BasicBlockEdge {
                    from,
                    to: end,
                    condition: None,
                }),
                _ => edges.push(BasicBlockEdge {
                    from,
                    to: next,
                    condition: None,
                }),
            }
        }

        // Drop body blocks nothing can reach, repeating since removing one
        // can orphan its successors
        let mut removed = HashSet::new();
        loop {
            let reachable: HashSet<usize> = edges.iter().map(|edge| edge.to).collect();
            let orphans: Vec<usize> = (1..=count)
                .filter(|id| !removed.contains(id) && !reachable.contains(id))
                .collect();
            if orphans.is_empty() {
                break;
            }

            removed.extend(orphans);
            edges.retain(|edge| !removed.contains(&edge.from));
        }

        let mut remap = HashMap::new();
        let mut blocks = vec![BasicBlock::new(BlockKind::Start, vec![])];
        remap.insert(0, 0);
        for (index, statements) in partitions.into_iter().enumerate() {
            if removed.contains(&(index + 1)) {
                continue;
            }
            remap.insert(index + 1, blocks.len());
            blocks.push(BasicBlock::new(BlockKind::Body, statements));
        }
        remap.insert(end, blocks.len());
        blocks.push(BasicBlock::new(BlockKind::End, vec![]));

        for edge in &mut edges {
            edge.from = remap[&edge.from];
            edge.to = remap[&edge.to];
        }

        tracing::debug!(
            blocks = blocks.len(),
            edges = edges.len(),
            unreachable = removed.len(),
            "built control flow graph"
        );

        ControlFlowGraph { blocks, edges }
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn end(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn outgoing(&self, block: usize) -> impl Iterator<Item = &BasicBlockEdge> {
        self.edges.iter().filter(move |edge| edge.from == block)
    }

    pub fn incoming(&self, block: usize) -> impl Iterator<Item = &BasicBlockEdge> {
        self.edges.iter().filter(move |edge| edge.to == block)
    }

    /// True if every path that reaches End leaves its last block through
    /// a `return`.
    pub fn all_paths_return(body: &BoundBlock) -> bool {
        let graph = ControlFlowGraph::create(body);

        let result = graph.incoming(graph.end()).all(|edge| {
            matches!(
                graph.blocks[edge.from].statements.last(),
                Some(BoundStmt::Return(_))
            )
        });
        result
    }

    /// Writes the graph in Graphviz dot format.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "digraph ControlFlow {{")?;

        for (id, block) in self.blocks.iter().enumerate() {
            writeln!(
                writer,
                "    N{} [label = {}, shape = box]",
                id,
                quote(&block.label_text())
            )?;
        }

        for edge in &self.edges {
            match &edge.condition {
                Some(condition) => writeln!(
                    writer,
                    "    N{} -> N{} [label = {}]",
                    edge.from,
                    edge.to,
                    quote(&condition.to_string())
                )?,
                None => writeln!(writer, "    N{} -> N{}", edge.from, edge.to)?,
            }
        }

        writeln!(writer, "}}")
    }
}
