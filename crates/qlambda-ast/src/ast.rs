//! The expression tree.
//!
//! A tree describes a computation over one implicit input (`Var`). Trees are
//! never mutated after construction; rewrites build new trees.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ops::{BinOp, UnOp};

/// Keyword arguments, in call order.
pub type Kwargs<T> = IndexMap<String, T>;

/// A quick-lambda expression over operand values of type `V`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Ast<V> {
    /// The single free variable.
    Var,
    /// Embedded literal.
    Const(V),
    /// Unary operator applied to a sub-expression.
    UnaryOp(UnOp, Box<Ast<V>>),
    /// Binary operator applied to two sub-expressions.
    BinOp(BinOp, Box<Ast<V>>, Box<Ast<V>>),
    /// Function application; callee and arguments are expressions too.
    Call {
        callee: Box<Ast<V>>,
        args: Vec<Ast<V>>,
        kwargs: Kwargs<Ast<V>>,
    },
    /// Member access. The name is a dotted path after attribute merging.
    GetAttr(String, Box<Ast<V>>),
}

impl<V> Ast<V> {
    pub fn constant(value: V) -> Self {
        Ast::Const(value)
    }

    pub fn unary(op: UnOp, operand: Ast<V>) -> Self {
        Ast::UnaryOp(op, Box::new(operand))
    }

    pub fn binary(op: BinOp, lhs: Ast<V>, rhs: Ast<V>) -> Self {
        Ast::BinOp(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn attr(name: impl Into<String>, target: Ast<V>) -> Self {
        Ast::GetAttr(name.into(), Box::new(target))
    }

    pub fn call(callee: Ast<V>, args: Vec<Ast<V>>, kwargs: Kwargs<Ast<V>>) -> Self {
        Ast::Call {
            callee: Box::new(callee),
            args,
            kwargs,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Ast::Var)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Ast::Var | Ast::Const(_) => 1,
            Ast::UnaryOp(_, inner) | Ast::GetAttr(_, inner) => 1 + inner.node_count(),
            Ast::BinOp(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Ast::Call {
                callee,
                args,
                kwargs,
            } => {
                1 + callee.node_count()
                    + args.iter().map(Ast::node_count).sum::<usize>()
                    + kwargs.values().map(Ast::node_count).sum::<usize>()
            }
        }
    }
}

impl<V: Clone> Ast<V> {
    /// Replace every `Var` with `replacement`.
    ///
    /// `next.substitute(&first)` evaluates to `next(first(x))`.
    pub fn substitute(&self, replacement: &Ast<V>) -> Ast<V> {
        match self {
            Ast::Var => replacement.clone(),
            Ast::Const(v) => Ast::Const(v.clone()),
            Ast::UnaryOp(op, inner) => Ast::unary(*op, inner.substitute(replacement)),
            Ast::BinOp(op, lhs, rhs) => Ast::binary(
                *op,
                lhs.substitute(replacement),
                rhs.substitute(replacement),
            ),
            Ast::Call {
                callee,
                args,
                kwargs,
            } => Ast::call(
                callee.substitute(replacement),
                args.iter().map(|a| a.substitute(replacement)).collect(),
                kwargs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.substitute(replacement)))
                    .collect(),
            ),
            Ast::GetAttr(name, target) => Ast::attr(name.clone(), target.substitute(replacement)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus_one_doubled() -> Ast<i64> {
        Ast::binary(
            BinOp::Mul,
            Ast::binary(BinOp::Add, Ast::Var, Ast::Const(1)),
            Ast::Const(2),
        )
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(plus_one_doubled(), plus_one_doubled());
        let other = Ast::binary(
            BinOp::Mul,
            Ast::binary(BinOp::Add, Ast::Var, Ast::Const(2)),
            Ast::Const(2),
        );
        assert_ne!(plus_one_doubled(), other);
    }

    #[test]
    fn test_kwargs_compare_as_mapping() {
        let mut a = Kwargs::new();
        a.insert("x".to_string(), Ast::Const(1));
        a.insert("y".to_string(), Ast::Var);
        let mut b = Kwargs::new();
        b.insert("y".to_string(), Ast::Var);
        b.insert("x".to_string(), Ast::Const(1));
        assert_eq!(
            Ast::call(Ast::Var, vec![], a),
            Ast::call(Ast::Var, vec![], b)
        );
    }

    #[test]
    fn test_node_count() {
        assert_eq!(Ast::<i64>::Var.node_count(), 1);
        assert_eq!(plus_one_doubled().node_count(), 5);
        let call = Ast::call(
            Ast::attr("upper", Ast::<i64>::Var),
            vec![Ast::Const(1)],
            Kwargs::new(),
        );
        assert_eq!(call.node_count(), 4);
    }

    #[test]
    fn test_substitute() {
        let inner: Ast<i64> = Ast::binary(BinOp::Add, Ast::Var, Ast::Const(1));
        let outer: Ast<i64> = Ast::binary(BinOp::Mul, Ast::Var, Ast::Const(2));
        assert_eq!(outer.substitute(&inner), plus_one_doubled());
        assert_eq!(Ast::<i64>::Var.substitute(&inner), inner);
        assert_eq!(Ast::Const(7).substitute(&inner), Ast::Const(7));
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(Ast::binary(BinOp::Add, Ast::Var, Ast::Const(1i64))).unwrap();
        assert_eq!(json, serde_json::json!({"BinOp": ["Add", "Var", {"Const": 1}]}));
    }
}
