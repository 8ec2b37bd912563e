//! Operator tags shared by the tree, the renderer and the evaluators.

use serde::{Deserialize, Serialize};

/// Unary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    /// Arithmetic negation (`-x`).
    Neg,
    /// Unary plus (`+x`).
    Pos,
    /// Bitwise inversion (`~x`).
    Invert,
    /// Logical negation on truthiness (`not x`).
    Not,
    /// Absolute value (`abs(x)`).
    Abs,
    /// Length of a sequence (`len(x)`).
    Len,
}

impl UnOp {
    pub const ALL: [UnOp; 6] = [
        UnOp::Neg,
        UnOp::Pos,
        UnOp::Invert,
        UnOp::Not,
        UnOp::Abs,
        UnOp::Len,
    ];

    /// Display symbol (prefix text, or function name for call-style operators).
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Pos => "+",
            UnOp::Invert => "~",
            UnOp::Not => "not",
            UnOp::Abs => "abs",
            UnOp::Len => "len",
        }
    }

    /// True for operators rendered as a call (`abs(x)`) rather than a prefix.
    pub fn is_call_style(self) -> bool {
        matches!(self, UnOp::Abs | UnOp::Len)
    }
}

/// Binary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Indexing (`x[i]`).
    GetItem,
}

impl BinOp {
    pub const ALL: [BinOp; 19] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::TrueDiv,
        BinOp::FloorDiv,
        BinOp::Mod,
        BinOp::Pow,
        BinOp::LShift,
        BinOp::RShift,
        BinOp::BitAnd,
        BinOp::BitOr,
        BinOp::BitXor,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::Lt,
        BinOp::Le,
        BinOp::Gt,
        BinOp::Ge,
        BinOp::GetItem,
    ];

    /// Infix display symbol. `GetItem` renders as a postfix subscript.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::TrueDiv => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::GetItem => "[]",
        }
    }

    /// True for the six comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }
}
