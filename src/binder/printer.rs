//! Source-like text for bound nodes, used by `--show-program` and as the
//! node labels of control-flow graphs.

use std::fmt::{self, Display, Write};

use crate::ast::types::LiteralValue;

use super::bound_tree::{BoundBlock, BoundExpr, BoundStmt};

const INDENT: &str = "    ";

fn write_literal(f: &mut impl Write, value: &LiteralValue) -> fmt::Result {
    match value {
        LiteralValue::Integer(value) => write!(f, "{}", value),
        LiteralValue::Byte(value) => write!(f, "{}b", value),
        LiteralValue::Double(value) => write!(f, "{:?}", value),
        LiteralValue::Boolean(value) => write!(f, "{}", value),
        LiteralValue::String(value) => write!(f, "{:?}", value),
    }
}

fn write_operand(f: &mut impl Write, expr: &BoundExpr) -> fmt::Result {
    match expr {
        BoundExpr::Binary { .. } | BoundExpr::Assignment { .. } => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

impl Display for BoundExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundExpr::Literal(value) => write_literal(f, value),
            BoundExpr::Variable(variable) => write!(f, "{}", variable.name),
            BoundExpr::Assignment {
                variable,
                expression,
            } => write!(f, "{} = {}", variable.name, expression),
            BoundExpr::Unary { operator, operand } => {
                write!(f, "{}", operator.text())?;
                write_operand(f, operand)
            }
            BoundExpr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                write_operand(f, left)?;
                write!(f, " {} ", operator.text())?;
                write_operand(f, right)
            }
            BoundExpr::Call {
                function,
                arguments,
                ..
            } => {
                write!(f, "{}(", function.name)?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
            BoundExpr::Conversion { type_, expression } => {
                write!(f, "{}({})", type_, expression)
            }
        }
    }
}

fn write_indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

/// Nested statements go one level deeper unless they are blocks, which
/// print their own braces.
fn write_nested(f: &mut impl Write, stmt: &BoundStmt, depth: usize) -> fmt::Result {
    match stmt {
        BoundStmt::Block(_) => write_stmt(f, stmt, depth),
        _ => write_stmt(f, stmt, depth + 1),
    }
}

pub fn write_stmt(f: &mut impl Write, stmt: &BoundStmt, depth: usize) -> fmt::Result {
    match stmt {
        BoundStmt::Block(block) => {
            write_indent(f, depth)?;
            writeln!(f, "{{")?;
            for statement in &block.statements {
                write_stmt(f, statement, depth + 1)?;
            }
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        BoundStmt::VariableDeclaration {
            variable,
            initializer,
        } => {
            write_indent(f, depth)?;
            let keyword = if variable.read_only { "val" } else { "var" };
            writeln!(f, "{} {} = {}", keyword, variable.name, initializer)
        }
        BoundStmt::Expression(expression) => {
            write_indent(f, depth)?;
            writeln!(f, "{}", expression)
        }
        BoundStmt::If {
            condition,
            then_stmt,
            else_stmt,
        } => {
            write_indent(f, depth)?;
            writeln!(f, "if {}", condition)?;
            write_nested(f, then_stmt, depth)?;
            if let Some(else_stmt) = else_stmt {
                write_indent(f, depth)?;
                writeln!(f, "else")?;
                write_nested(f, else_stmt, depth)?;
            }
            Ok(())
        }
        BoundStmt::While {
            condition, body, ..
        } => {
            write_indent(f, depth)?;
            writeln!(f, "while {}", condition)?;
            write_nested(f, body, depth)
        }
        BoundStmt::For {
            initializer,
            condition,
            step,
            body,
            ..
        } => {
            let mut header = String::new();
            write_stmt(&mut header, initializer, 0)?;
            write_indent(f, depth)?;
            writeln!(f, "for {}; {}; {}", header.trim_end(), condition, step)?;
            write_nested(f, body, depth)
        }
        BoundStmt::Label(label) => {
            // Labels sit one level left of the code they mark
            write_indent(f, depth.saturating_sub(1))?;
            writeln!(f, "{}:", label)
        }
        BoundStmt::Goto(label) => {
            write_indent(f, depth)?;
            writeln!(f, "goto {}", label)
        }
        BoundStmt::ConditionalGoto {
            label,
            condition,
            jump_if_true,
        } => {
            write_indent(f, depth)?;
            let keyword = if *jump_if_true { "if" } else { "unless" };
            writeln!(f, "goto {} {} {}", label, keyword, condition)
        }
        BoundStmt::Return(expression) => {
            write_indent(f, depth)?;
            match expression {
                Some(expression) => writeln!(f, "return {}", expression),
                None => writeln!(f, "return"),
            }
        }
    }
}

impl Display for BoundStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl Display for BoundBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write_stmt(f, statement, 0)?;
        }
        Ok(())
    }
}
