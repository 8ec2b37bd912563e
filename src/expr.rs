//! One-argument expressions and their lazily compiled closures.

use std::fmt;
use std::sync::OnceLock;

use qlambda_ast::{Ast, BuildError, EvalError, Kwargs, UnOp, render, simplify_with};
use qlambda_eval::{Compiled, NativeFn, Value};
use tracing::debug;

use crate::options::Options;
use crate::placeholder::{First, Second};

/// A one-argument expression.
///
/// The tree is compiled on first evaluation and the closure is cached;
/// clones made after that share the cached closure.
#[derive(Clone)]
pub struct Expr {
    ast: Ast<Value>,
    compiled: OnceLock<Compiled<Value>>,
}

impl Expr {
    pub fn from_ast(ast: Ast<Value>) -> Self {
        Self {
            ast,
            compiled: OnceLock::new(),
        }
    }

    /// An expression ignoring its argument.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::from_ast(Ast::Const(value.into()))
    }

    pub fn ast(&self) -> &Ast<Value> {
        &self.ast
    }

    pub fn into_ast(self) -> Ast<Value> {
        self.ast
    }

    pub fn arity(&self) -> usize {
        1
    }

    /// The cached closure, compiling with default options on first use.
    ///
    /// Racing callers may each compile; the first stored closure wins.
    pub fn compiled(&self) -> Result<&Compiled<Value>, EvalError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let compiled = self.compile_with(&Options::default())?;
        debug!(expr = %self, nodes = self.ast.node_count(), "compiled expression");
        Ok(self.compiled.get_or_init(|| compiled))
    }

    /// Simplify and compile with explicit options. Not cached.
    pub fn compile_with(&self, options: &Options) -> Result<Compiled<Value>, EvalError> {
        let tree = simplify_with(&self.ast, &options.simplify)?;
        Ok(qlambda_eval::compile_with(&tree, &options.compile))
    }

    /// Evaluate against one argument.
    pub fn eval(&self, x: &Value) -> Result<Value, EvalError> {
        self.compiled()?.call(x)
    }

    /// Detach the compiled closure.
    pub fn to_fn(
        &self,
    ) -> Result<impl Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static, EvalError>
    {
        let compiled = self.compiled()?.clone();
        Ok(move |x: &Value| compiled.call(x))
    }

    /// Member access on the result.
    pub fn attr(self, name: impl Into<String>) -> Expr {
        Expr::from_ast(Ast::attr(name, self.ast))
    }

    /// Call the result with positional arguments.
    pub fn call(self, args: impl IntoIterator<Item = Term>) -> Result<Expr, BuildError> {
        self.call_kw(args, Vec::<(String, Term)>::new())
    }

    /// Call the result with positional and keyword arguments.
    pub fn call_kw<K: Into<String>>(
        self,
        args: impl IntoIterator<Item = Term>,
        kwargs: impl IntoIterator<Item = (K, Term)>,
    ) -> Result<Expr, BuildError> {
        let (args, kwargs) = lower_arguments(args, kwargs, "call argument")?;
        Ok(Expr::from_ast(Ast::call(self.ast, args, kwargs)))
    }

    /// Feed this expression's result into `next`: `(X + 1).then(X * 2)`
    /// is `(X + 1) * 2`.
    pub fn then(self, next: impl Into<Expr>) -> Expr {
        Expr::from_ast(next.into().ast.substitute(&self.ast))
    }

    pub(crate) fn apply_unary(self, op: UnOp) -> Expr {
        Expr::from_ast(Ast::unary(op, self.ast))
    }
}

impl From<First> for Expr {
    fn from(_: First) -> Self {
        Expr::from_ast(Ast::Var)
    }
}

impl From<Ast<Value>> for Expr {
    fn from(ast: Ast<Value>) -> Self {
        Expr::from_ast(ast)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ast == other.ast
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.ast))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

// ─── Arguments ──────────────────────────────────────────────────────

/// A call argument: a placeholder, an expression, or a plain value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A one-argument tree (including `X` itself).
    Expr(Ast<Value>),
    Value(Value),
    /// The second-role placeholder, which no call can accept.
    Second,
}

impl Term {
    fn lower(self, context: &'static str) -> Result<Ast<Value>, BuildError> {
        match self {
            Term::Expr(ast) => Ok(ast),
            Term::Value(value) => Ok(Ast::Const(value)),
            Term::Second => Err(BuildError::UnsupportedArity { context }),
        }
    }
}

impl From<First> for Term {
    fn from(_: First) -> Self {
        Term::Expr(Ast::Var)
    }
}

impl From<Second> for Term {
    fn from(_: Second) -> Self {
        Term::Second
    }
}

impl From<Expr> for Term {
    fn from(expr: Expr) -> Self {
        Term::Expr(expr.ast)
    }
}

impl From<&Expr> for Term {
    fn from(expr: &Expr) -> Self {
        Term::Expr(expr.ast.clone())
    }
}

macro_rules! term_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Term {
                fn from(v: $ty) -> Self {
                    Term::Value(Value::from(v))
                }
            }
        )*
    };
}

term_from_value!(Value, NativeFn, (), bool, i64, f64, &str, String);

fn lower_arguments<K: Into<String>>(
    args: impl IntoIterator<Item = Term>,
    kwargs: impl IntoIterator<Item = (K, Term)>,
    context: &'static str,
) -> Result<(Vec<Ast<Value>>, Kwargs<Ast<Value>>), BuildError> {
    let args = args
        .into_iter()
        .map(|term| term.lower(context))
        .collect::<Result<Vec<_>, _>>()?;
    let kwargs = kwargs
        .into_iter()
        .map(|(name, term)| Ok((name.into(), term.lower(context)?)))
        .collect::<Result<Kwargs<_>, BuildError>>()?;
    Ok((args, kwargs))
}

// ─── Free functions ─────────────────────────────────────────────────

/// Call a plain function with expression arguments: `fcall(f, [X.into()])`
/// is `|x| f(x)`. Nothing is called until the expression is evaluated.
pub fn fcall(
    func: impl Into<Value>,
    args: impl IntoIterator<Item = Term>,
) -> Result<Expr, BuildError> {
    fcall_kw(func, args, Vec::<(String, Term)>::new())
}

/// [`fcall`] with keyword arguments.
pub fn fcall_kw<K: Into<String>>(
    func: impl Into<Value>,
    args: impl IntoIterator<Item = Term>,
    kwargs: impl IntoIterator<Item = (K, Term)>,
) -> Result<Expr, BuildError> {
    let (args, kwargs) = lower_arguments(args, kwargs, "wrapped call argument")?;
    Ok(Expr::from_ast(Ast::call(
        Ast::Const(func.into()),
        args,
        kwargs,
    )))
}

/// Chain expressions left to right, starting from the identity.
pub fn pipeline(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    exprs
        .into_iter()
        .fold(Expr::from(First), |acc, next| acc.then(next))
}
