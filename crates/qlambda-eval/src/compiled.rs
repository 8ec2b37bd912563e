//! Lowering of expression trees into native closures.
//!
//! Each node becomes one boxed closure that captures its already-lowered
//! children. A few very common shapes are specialized so they skip the
//! generic child dispatch:
//!
//! - `op(_)` applies the operator straight to the input
//! - `_ op c`, `c op _` and `_ op _` close over the constant and the operator
//! - `_.a.b` resolves a pre-split member path in one closure
//!
//! Compilation never evaluates anything except unary operators on simple
//! constants, and then only when the operator succeeds; a failing fold is
//! left for call time so it surfaces from the closure.

use std::fmt;
use std::sync::Arc;

use qlambda_ast::{Ast, BinOp, EvalError, Kwargs, Operand, UnOp};
use serde::{Deserialize, Serialize};

type EvalFn<V> = dyn Fn(&V) -> Result<V, EvalError> + Send + Sync;

/// A compiled one-argument function.
pub struct Compiled<V> {
    f: Arc<EvalFn<V>>,
}

impl<V> Clone for Compiled<V> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<V> fmt::Debug for Compiled<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Compiled(..)")
    }
}

impl<V: Operand> Compiled<V> {
    /// Wrap an arbitrary function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&V) -> Result<V, EvalError> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Apply to one input.
    #[inline]
    pub fn call(&self, input: &V) -> Result<V, EvalError> {
        (self.f)(input)
    }
}

/// Toggles for the compiler's optimizations. Results are identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Emit the specialized closures for common node shapes.
    pub specialize: bool,
    /// Fold unary operators applied to simple constants.
    pub fold_unary_constants: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            specialize: true,
            fold_unary_constants: true,
        }
    }
}

/// Compile with default options.
pub fn compile<V: Operand>(ast: &Ast<V>) -> Compiled<V> {
    compile_with(ast, &CompileOptions::default())
}

/// Compile a tree into a closure.
#[tracing::instrument(level = "trace", skip_all)]
pub fn compile_with<V: Operand>(ast: &Ast<V>, options: &CompileOptions) -> Compiled<V> {
    Compiled {
        f: lower(ast, options),
    }
}

fn node<V, F>(f: F) -> Arc<EvalFn<V>>
where
    V: Operand,
    F: Fn(&V) -> Result<V, EvalError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn lower<V: Operand>(ast: &Ast<V>, options: &CompileOptions) -> Arc<EvalFn<V>> {
    match ast {
        Ast::Var => node(|x: &V| Ok(x.clone())),
        Ast::Const(value) => {
            let value = value.clone();
            node(move |_: &V| Ok(value.clone()))
        }
        Ast::UnaryOp(op, inner) => lower_unary(*op, inner, options),
        Ast::BinOp(op, lhs, rhs) => lower_binary(*op, lhs, rhs, options),
        Ast::Call {
            callee,
            args,
            kwargs,
        } => lower_call(callee, args, kwargs, options),
        Ast::GetAttr(name, target) => lower_attr(name, target, options),
    }
}

fn lower_unary<V: Operand>(op: UnOp, inner: &Ast<V>, options: &CompileOptions) -> Arc<EvalFn<V>> {
    match inner {
        Ast::Var if options.specialize => return node(move |x: &V| x.unary(op)),
        Ast::Const(value) if options.fold_unary_constants && value.is_simple() => {
            if let Ok(folded) = value.unary(op) {
                return node(move |_: &V| Ok(folded.clone()));
            }
        }
        _ => {}
    }
    let inner = lower(inner, options);
    node(move |x: &V| inner(x)?.unary(op))
}

fn lower_binary<V: Operand>(
    op: BinOp,
    lhs: &Ast<V>,
    rhs: &Ast<V>,
    options: &CompileOptions,
) -> Arc<EvalFn<V>> {
    if options.specialize {
        match (lhs, rhs) {
            (Ast::Var, Ast::Var) => return node(move |x: &V| x.binary(op, x)),
            (Ast::Var, Ast::Const(c)) => {
                let c = c.clone();
                return node(move |x: &V| x.binary(op, &c));
            }
            (Ast::Const(c), Ast::Var) => {
                let c = c.clone();
                return node(move |x: &V| c.binary(op, x));
            }
            _ => {}
        }
    }
    let lhs = lower(lhs, options);
    let rhs = lower(rhs, options);
    node(move |x: &V| {
        let a = lhs(x)?;
        let b = rhs(x)?;
        a.binary(op, &b)
    })
}

fn lower_call<V: Operand>(
    callee: &Ast<V>,
    args: &[Ast<V>],
    kwargs: &Kwargs<Ast<V>>,
    options: &CompileOptions,
) -> Arc<EvalFn<V>> {
    let callee = lower(callee, options);
    let args: Vec<_> = args.iter().map(|a| lower(a, options)).collect();
    let kwargs: Vec<(String, Arc<EvalFn<V>>)> = kwargs
        .iter()
        .map(|(k, v)| (k.clone(), lower(v, options)))
        .collect();
    // Callee first, then positional arguments, then keywords, in order.
    node(move |x: &V| {
        let f = callee(x)?;
        let args = args.iter().map(|a| a(x)).collect::<Result<Vec<_>, _>>()?;
        let kwargs = kwargs
            .iter()
            .map(|(k, v)| Ok((k.clone(), v(x)?)))
            .collect::<Result<Kwargs<V>, EvalError>>()?;
        f.call(&args, &kwargs)
    })
}

fn lower_attr<V: Operand>(name: &str, target: &Ast<V>, options: &CompileOptions) -> Arc<EvalFn<V>> {
    let path: Vec<String> = name.split('.').map(str::to_owned).collect();
    if options.specialize && target.is_var() {
        return node(move |x: &V| resolve_path(x, &path));
    }
    let target = lower(target, options);
    node(move |x: &V| resolve_path(&target(x)?, &path))
}

fn resolve_path<V: Operand>(value: &V, path: &[String]) -> Result<V, EvalError> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(value.clone());
    };
    let mut current = value.get_attr(first)?;
    for segment in rest {
        current = current.get_attr(segment)?;
    }
    Ok(current)
}
