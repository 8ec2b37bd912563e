//! Expression trees for quick lambdas.
//!
//! This crate holds the value-independent half of the pipeline: the tree,
//! its operator tags, the [`Operand`] protocol values implement, the error
//! taxonomy, the renderer and the simplifier.
//!
//! # Example
//!
//! ```
//! use qlambda_ast::{Ast, BinOp, render};
//!
//! let tree: Ast<i64> = Ast::binary(
//!     BinOp::Mul,
//!     Ast::binary(BinOp::Add, Ast::Var, Ast::Const(1)),
//!     Ast::Const(2),
//! );
//! assert_eq!(render(&tree), "(_ + 1) * 2");
//! ```

pub mod ast;
mod error;
mod operand;
mod ops;
pub mod render;
pub mod simplify;

pub use ast::{Ast, Kwargs};
pub use error::{BuildError, ErrorKind, EvalError};
pub use operand::Operand;
pub use ops::{BinOp, UnOp};
pub use render::render;
pub use simplify::{SimplifyOptions, simplify, simplify_with};
