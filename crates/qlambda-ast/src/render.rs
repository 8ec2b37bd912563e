//! Source-like rendering of expression trees, for diagnostics only.

use std::fmt::{self, Write};

use crate::ast::Ast;
use crate::ops::{BinOp, UnOp};

/// Token used for the free variable of a one-argument expression.
const VAR_TOKEN: &str = "_";

/// Render a tree using `_` for the free variable.
pub fn render<V: fmt::Debug>(ast: &Ast<V>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_node(&mut out, ast, VAR_TOKEN);
    out
}

/// Infix nodes; their children and postfix targets get parentheses.
fn is_infix<V>(ast: &Ast<V>) -> bool {
    matches!(ast, Ast::BinOp(op, _, _) if *op != BinOp::GetItem)
}

fn write_grouped<V: fmt::Debug>(out: &mut String, ast: &Ast<V>, token: &str) -> fmt::Result {
    if is_infix(ast) {
        out.push('(');
        write_node(out, ast, token)?;
        out.push(')');
        Ok(())
    } else {
        write_node(out, ast, token)
    }
}

fn write_node<V: fmt::Debug>(out: &mut String, ast: &Ast<V>, token: &str) -> fmt::Result {
    match ast {
        Ast::Var => out.write_str(token),
        Ast::Const(v) => write!(out, "{v:?}"),
        Ast::UnaryOp(op, inner) => {
            if op.is_call_style() {
                write!(out, "{}(", op.symbol())?;
                write_node(out, inner, token)?;
                out.write_char(')')
            } else {
                // Keyword operators need a space before the operand.
                let sep = if *op == UnOp::Not { " " } else { "" };
                write!(out, "({}{sep}", op.symbol())?;
                write_node(out, inner, token)?;
                out.write_char(')')
            }
        }
        Ast::BinOp(BinOp::GetItem, target, index) => {
            write_grouped(out, target, token)?;
            out.write_char('[')?;
            write_node(out, index, token)?;
            out.write_char(']')
        }
        Ast::BinOp(op, lhs, rhs) => {
            write_grouped(out, lhs, token)?;
            write!(out, " {} ", op.symbol())?;
            write_grouped(out, rhs, token)
        }
        Ast::GetAttr(name, target) => {
            write_grouped(out, target, token)?;
            write!(out, ".{name}")
        }
        Ast::Call {
            callee,
            args,
            kwargs,
        } => {
            write_grouped(out, callee, token)?;
            out.write_char('(')?;
            let mut first = true;
            for arg in args {
                if !first {
                    out.write_str(", ")?;
                }
                first = false;
                write_node(out, arg, token)?;
            }
            for (name, value) in kwargs {
                if !first {
                    out.write_str(", ")?;
                }
                first = false;
                write!(out, "{name}=")?;
                write_node(out, value, token)?;
            }
            out.write_char(')')
        }
    }
}
