//! The protocol a value type implements to flow through expressions.

use std::fmt;

use crate::ast::Kwargs;
use crate::error::EvalError;
use crate::ops::{BinOp, UnOp};

/// Runtime behaviour of the values an expression computes with.
///
/// Every method is fallible: failures surface from the compiled closure
/// unchanged.
pub trait Operand: Clone + fmt::Debug + Send + Sync + 'static {
    /// Whether member access on a constant of this value may be resolved
    /// ahead of time. Values that do not opt in are never folded.
    fn is_simple(&self) -> bool {
        false
    }

    /// Resolve a single named member.
    fn get_attr(&self, name: &str) -> Result<Self, EvalError>;

    /// Resolve a dotted member path (`"real.imag"`) one segment at a time.
    fn get_attr_path(&self, path: &str) -> Result<Self, EvalError> {
        let mut segments = path.split('.');
        let mut current = match segments.next() {
            Some(first) => self.get_attr(first)?,
            None => return Ok(self.clone()),
        };
        for segment in segments {
            current = current.get_attr(segment)?;
        }
        Ok(current)
    }

    /// Apply this value as a function.
    fn call(&self, args: &[Self], kwargs: &Kwargs<Self>) -> Result<Self, EvalError>;

    fn unary(&self, op: UnOp) -> Result<Self, EvalError>;

    fn binary(&self, op: BinOp, rhs: &Self) -> Result<Self, EvalError>;
}
