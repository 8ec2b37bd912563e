//! Value model and closure compiler for quick-lambda expression trees.
//!
//! This crate provides a dynamically typed [`Value`] that implements the
//! [`Operand`](qlambda_ast::Operand) protocol, plus the compiler that lowers
//! any `Ast<V: Operand>` into a native closure.
//!
//! # Example
//!
//! ```
//! use qlambda_ast::{Ast, BinOp};
//! use qlambda_eval::{Value, compile};
//!
//! let tree = Ast::binary(
//!     BinOp::Mul,
//!     Ast::binary(BinOp::Add, Ast::Var, Ast::Const(Value::Int(1))),
//!     Ast::Const(Value::Int(2)),
//! );
//! let f = compile(&tree);
//! assert_eq!(f.call(&Value::Int(10)).unwrap(), Value::Int(22));
//! ```

pub mod compiled;
mod members;
mod native;
mod ops;
pub mod value;

pub use compiled::{CompileOptions, Compiled, compile, compile_with};
pub use native::{Method, NativeFn};
pub use qlambda_ast::Kwargs;
pub use value::{OrderedFloat, Record, Value};
