//! Placeholder expressions ("quick lambdas") compiled into closures.
//!
//! Operators applied to the placeholders [`X`] and [`Y`] record an
//! expression tree instead of computing anything. A one-argument tree is
//! an [`Expr`]; on first evaluation it is simplified, compiled into a
//! native closure and cached. Trees that use `Y` are two-argument
//! [`Lambda2`] functions.
//!
//! # Example
//!
//! ```
//! use quick_lambda::{Value, X, Y};
//!
//! let f = (X + 1) * 2;
//! assert_eq!(f.to_string(), "(_ + 1) * 2");
//! assert_eq!(f.eval(&Value::Int(10)).unwrap(), Value::Int(22));
//!
//! let upper = X.attr("upper").call([]).unwrap();
//! assert_eq!(upper.eval(&"abc".into()).unwrap(), Value::from("ABC"));
//! assert!(upper.eval(&Value::Int(42)).is_err());
//!
//! let sub = Y - X;
//! assert_eq!(sub.eval(&Value::Int(3), &Value::Int(10)).unwrap(), Value::Int(7));
//! ```

mod combine;
mod expr;
mod options;
mod placeholder;

pub use combine::Combine;
pub use expr::{Expr, Term, fcall, fcall_kw, pipeline};
pub use options::Options;
pub use placeholder::{First, Lambda2, Second, Slot, X, Y, placeholder};
pub use qlambda_ast::{
    Ast, BinOp, BuildError, ErrorKind, EvalError, Kwargs, Operand, SimplifyOptions, UnOp, render,
    simplify,
};
pub use qlambda_eval::{CompileOptions, Compiled, NativeFn, Value};

/// Either failure, for callers that build and evaluate in one place.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Build(e) => e.kind(),
            Error::Eval(e) => e.kind(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
