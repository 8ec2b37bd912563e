use qlambda_ast::SimplifyOptions;
use qlambda_eval::CompileOptions;
use serde::{Deserialize, Serialize};

/// Simplifier and compiler settings used when turning an [`Expr`](crate::Expr)
/// into a closure. Every rewrite and specialization is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub simplify: SimplifyOptions,
    pub compile: CompileOptions,
}

impl Options {
    /// No rewrites and no specialized closures.
    pub fn unoptimized() -> Self {
        Self {
            simplify: SimplifyOptions {
                fold_constants: false,
                merge_attributes: false,
            },
            compile: CompileOptions {
                specialize: false,
                fold_unary_constants: false,
            },
        }
    }
}
