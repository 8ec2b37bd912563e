//! The placeholders and the two-argument functions built from `Y`.

use std::fmt;

use qlambda_ast::{Ast, BinOp, EvalError, Operand, UnOp};
use qlambda_eval::Value;

use crate::expr::Expr;

/// The first-role placeholder. Expressions built from it take one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct First;

/// The second-role placeholder. Expressions built from it take two
/// arguments and cannot be nested inside one-argument trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Second;

/// First-role placeholder: `X + 1` is `|x| x + 1`.
pub const X: First = First;

/// Second-role placeholder: `X + Y` is `|x, y| x + y`.
pub const Y: Second = Second;

/// The generic placeholder `_`, as an expression.
pub fn placeholder() -> Expr {
    Expr::from_ast(Ast::Var)
}

impl First {
    /// The projection `x -> x`.
    pub fn eval(&self, x: &Value) -> Value {
        x.clone()
    }

    pub fn arity(&self) -> usize {
        1
    }

    /// Member access on the argument.
    pub fn attr(self, name: impl Into<String>) -> Expr {
        Expr::from(self).attr(name)
    }
}

impl Second {
    /// The projection `(x, y) -> y`.
    pub fn eval(&self, _x: &Value, y: &Value) -> Value {
        y.clone()
    }

    pub fn arity(&self) -> usize {
        2
    }

    /// Named access on the second placeholder. The name is only rendered:
    /// the result is the projection `(x, y) -> y`, never a member lookup.
    pub fn attr(self, name: impl Into<String>) -> Lambda2 {
        Lambda2 {
            body: Body::Attr(name.into()),
        }
    }
}

impl fmt::Display for First {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("X")
    }
}

impl fmt::Display for Second {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Y")
    }
}

// ─── Lambda2 ────────────────────────────────────────────────────────

/// An operand position in a two-argument body.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    X,
    Y,
    Const(Value),
}

impl Slot {
    fn pick<'a>(&'a self, x: &'a Value, y: &'a Value) -> &'a Value {
        match self {
            Slot::X => x,
            Slot::Y => y,
            Slot::Const(v) => v,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::X => f.write_str("X"),
            Slot::Y => f.write_str("Y"),
            Slot::Const(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Binary(BinOp, Slot, Slot),
    /// Unary operator on `y`.
    Unary(UnOp),
    /// Rendered as `Y.name`; evaluates to `y` itself.
    Attr(String),
}

/// A two-argument function `(x, y) -> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda2 {
    body: Body,
}

impl Lambda2 {
    pub(crate) fn binary(op: BinOp, lhs: Slot, rhs: Slot) -> Self {
        Self {
            body: Body::Binary(op, lhs, rhs),
        }
    }

    pub(crate) fn unary(op: UnOp) -> Self {
        Self {
            body: Body::Unary(op),
        }
    }

    pub fn arity(&self) -> usize {
        2
    }

    pub fn eval(&self, x: &Value, y: &Value) -> Result<Value, EvalError> {
        match &self.body {
            Body::Binary(op, lhs, rhs) => lhs.pick(x, y).binary(*op, rhs.pick(x, y)),
            Body::Unary(op) => y.unary(*op),
            Body::Attr(_) => Ok(y.clone()),
        }
    }

    /// Detach into a plain closure.
    pub fn to_fn(
        &self,
    ) -> impl Fn(&Value, &Value) -> Result<Value, EvalError> + Send + Sync + 'static {
        let this = self.clone();
        move |x: &Value, y: &Value| this.eval(x, y)
    }
}

impl fmt::Display for Lambda2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Binary(BinOp::GetItem, lhs, rhs) => write!(f, "{lhs}[{rhs}]"),
            Body::Binary(op, lhs, rhs) => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Body::Unary(op) if op.is_call_style() => write!(f, "{}(Y)", op.symbol()),
            Body::Unary(UnOp::Not) => f.write_str("(not Y)"),
            Body::Unary(op) => write!(f, "({}Y)", op.symbol()),
            Body::Attr(path) => write!(f, "Y.{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections() {
        let v = Value::string("abc");
        assert_eq!(X.eval(&v), v);
        assert_eq!(Y.eval(&Value::Int(1), &v), v);
        assert_eq!(X.arity(), 1);
        assert_eq!(Y.arity(), 2);
    }

    #[test]
    fn test_binary_slots() {
        let sub = Lambda2::binary(BinOp::Sub, Slot::Y, Slot::X);
        assert_eq!(sub.eval(&Value::Int(3), &Value::Int(10)), Ok(Value::Int(7)));
        assert_eq!(sub.to_string(), "Y - X");

        let item = Lambda2::binary(BinOp::GetItem, Slot::X, Slot::Y);
        let t = Value::tuple(vec![Value::Int(5), Value::Int(6)]);
        assert_eq!(item.eval(&t, &Value::Int(1)), Ok(Value::Int(6)));
        assert_eq!(item.to_string(), "X[Y]");
    }

    #[test]
    fn test_attr_projects_second_argument() {
        let real = Y.attr("real");
        assert_eq!(real.arity(), 2);
        let z = Value::complex(1.5, 2.0);
        assert_eq!(real.eval(&Value::string("ignored"), &z), Ok(z));
        assert_eq!(
            real.eval(&Value::complex(1.0, 1.0), &Value::string("s")),
            Ok(Value::string("s"))
        );
        assert_eq!(Y.attr("missing").eval(&Value::None, &Value::Int(3)), Ok(Value::Int(3)));
        assert_eq!(real.to_string(), "Y.real");
    }

    #[test]
    fn test_unary_display() {
        assert_eq!(Lambda2::unary(UnOp::Neg).to_string(), "(-Y)");
        assert_eq!(Lambda2::unary(UnOp::Abs).to_string(), "abs(Y)");
        assert_eq!(Lambda2::unary(UnOp::Not).to_string(), "(not Y)");
    }

    #[test]
    fn test_placeholder_is_identity() {
        let f = placeholder();
        assert_eq!(f.eval(&Value::Int(4)), Ok(Value::Int(4)));
        assert_eq!(f.to_string(), "_");
    }
}
