//! Operator overloading for the builder.
//!
//! Every binary operator goes through [`Combine`], whose associated
//! `Output` encodes the arity rules at the type level:
//!
//! | left \ right      | `X` / `Expr` / value | `Y`                   |
//! |-------------------|----------------------|-----------------------|
//! | `X`               | `Expr`               | `Lambda2`             |
//! | `Expr`            | `Expr`               | `Err(UnsupportedArity)` |
//! | `Y`               | `Lambda2` (`Expr`: error) | `Lambda2`        |
//! | value             | `Expr`               | `Lambda2`             |
//!
//! Mixing `Y` with a one-argument tree yields a `Result` that is always an
//! error, so the mistake is reported where the expression is built.

use std::ops;

use qlambda_ast::{Ast, BinOp, BuildError, UnOp};
use qlambda_eval::Value;

use crate::expr::Expr;
use crate::placeholder::{First, Lambda2, Second, Slot};

/// Combine two builder operands with a binary operator.
pub trait Combine<Rhs> {
    type Output;

    fn combine(self, op: BinOp, rhs: Rhs) -> Self::Output;
}

/// Lowering of one-argument operands into tree nodes.
trait Lower {
    fn lower(self) -> Ast<Value>;
}

impl Lower for First {
    fn lower(self) -> Ast<Value> {
        Ast::Var
    }
}

impl Lower for Expr {
    fn lower(self) -> Ast<Value> {
        self.into_ast()
    }
}

/// Lowering of two-argument operands into slots.
trait IntoSlot {
    fn into_slot(self) -> Slot;
}

impl IntoSlot for First {
    fn into_slot(self) -> Slot {
        Slot::X
    }
}

impl IntoSlot for Second {
    fn into_slot(self) -> Slot {
        Slot::Y
    }
}

macro_rules! literal_operands {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Lower for $ty {
                fn lower(self) -> Ast<Value> {
                    Ast::Const(Value::from(self))
                }
            }

            impl IntoSlot for $ty {
                fn into_slot(self) -> Slot {
                    Slot::Const(Value::from(self))
                }
            }
        )*
    };
}

literal_operands!(Value, bool, i64, f64, &str, String);

// ─── Arity table ────────────────────────────────────────────────────

macro_rules! one_arg {
    ($lhs:ty => [$($rhs:ty),* $(,)?]) => {
        $(
            impl Combine<$rhs> for $lhs {
                type Output = Expr;

                fn combine(self, op: BinOp, rhs: $rhs) -> Expr {
                    Expr::from_ast(Ast::binary(op, self.lower(), rhs.lower()))
                }
            }
        )*
    };
}

macro_rules! two_arg {
    ($lhs:ty => [$($rhs:ty),* $(,)?]) => {
        $(
            impl Combine<$rhs> for $lhs {
                type Output = Lambda2;

                fn combine(self, op: BinOp, rhs: $rhs) -> Lambda2 {
                    Lambda2::binary(op, self.into_slot(), rhs.into_slot())
                }
            }
        )*
    };
}

one_arg!(First => [First, Expr, Value, bool, i64, f64, &str, String]);
one_arg!(Expr => [First, Expr, Value, bool, i64, f64, &str, String]);
one_arg!(Value => [First, Expr]);
one_arg!(i64 => [First, Expr]);
one_arg!(f64 => [First, Expr]);

two_arg!(First => [Second]);
two_arg!(Second => [First, Second, Value, bool, i64, f64, &str, String]);
two_arg!(Value => [Second]);
two_arg!(i64 => [Second]);
two_arg!(f64 => [Second]);

impl Combine<Second> for Expr {
    type Output = Result<Lambda2, BuildError>;

    fn combine(self, _op: BinOp, _rhs: Second) -> Self::Output {
        Err(BuildError::UnsupportedArity {
            context: "expression combined with the second placeholder",
        })
    }
}

impl Combine<Expr> for Second {
    type Output = Result<Lambda2, BuildError>;

    fn combine(self, _op: BinOp, _rhs: Expr) -> Self::Output {
        Err(BuildError::UnsupportedArity {
            context: "second placeholder combined with an expression",
        })
    }
}

// ─── std::ops ───────────────────────────────────────────────────────

macro_rules! placeholder_ops {
    (@op $ty:ty, $trait:ident, $method:ident, $op:expr) => {
        impl<R> ops::$trait<R> for $ty
        where
            $ty: Combine<R>,
        {
            type Output = <$ty as Combine<R>>::Output;

            fn $method(self, rhs: R) -> Self::Output {
                self.combine($op, rhs)
            }
        }
    };
    ($($ty:ty),*) => {
        $(
            placeholder_ops!(@op $ty, Add, add, BinOp::Add);
            placeholder_ops!(@op $ty, Sub, sub, BinOp::Sub);
            placeholder_ops!(@op $ty, Mul, mul, BinOp::Mul);
            placeholder_ops!(@op $ty, Div, div, BinOp::TrueDiv);
            placeholder_ops!(@op $ty, Rem, rem, BinOp::Mod);
            placeholder_ops!(@op $ty, BitAnd, bitand, BinOp::BitAnd);
            placeholder_ops!(@op $ty, BitOr, bitor, BinOp::BitOr);
            placeholder_ops!(@op $ty, BitXor, bitxor, BinOp::BitXor);
            placeholder_ops!(@op $ty, Shl, shl, BinOp::LShift);
            placeholder_ops!(@op $ty, Shr, shr, BinOp::RShift);

            impl $ty {
                pub fn pow<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Pow, rhs)
                }

                pub fn floordiv<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::FloorDiv, rhs)
                }

                pub fn equals<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Eq, rhs)
                }

                pub fn not_equals<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Ne, rhs)
                }

                pub fn lt<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Lt, rhs)
                }

                pub fn le<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Le, rhs)
                }

                pub fn gt<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Gt, rhs)
                }

                pub fn ge<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::Ge, rhs)
                }

                /// Indexing: `X.get_item(0)` is `|x| x[0]`.
                pub fn get_item<R>(self, rhs: R) -> <Self as Combine<R>>::Output
                where
                    Self: Combine<R>,
                {
                    self.combine(BinOp::GetItem, rhs)
                }
            }
        )*
    };
}

placeholder_ops!(First, Second, Expr);

/// Reflected operators for plain values on the left (`1 + X`).
macro_rules! reflected_ops {
    (@op $lhs:ty, $rhs:ty, $trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait<$rhs> for $lhs {
            type Output = <$lhs as Combine<$rhs>>::Output;

            fn $method(self, rhs: $rhs) -> Self::Output {
                self.combine($op, rhs)
            }
        }
    };
    (@rhs $lhs:ty, $rhs:ty) => {
        reflected_ops!(@op $lhs, $rhs, Add, add, BinOp::Add);
        reflected_ops!(@op $lhs, $rhs, Sub, sub, BinOp::Sub);
        reflected_ops!(@op $lhs, $rhs, Mul, mul, BinOp::Mul);
        reflected_ops!(@op $lhs, $rhs, Div, div, BinOp::TrueDiv);
        reflected_ops!(@op $lhs, $rhs, Rem, rem, BinOp::Mod);
        reflected_ops!(@op $lhs, $rhs, BitAnd, bitand, BinOp::BitAnd);
        reflected_ops!(@op $lhs, $rhs, BitOr, bitor, BinOp::BitOr);
        reflected_ops!(@op $lhs, $rhs, BitXor, bitxor, BinOp::BitXor);
        reflected_ops!(@op $lhs, $rhs, Shl, shl, BinOp::LShift);
        reflected_ops!(@op $lhs, $rhs, Shr, shr, BinOp::RShift);
    };
    ($($lhs:ty),*) => {
        $(
            reflected_ops!(@rhs $lhs, First);
            reflected_ops!(@rhs $lhs, Second);
            reflected_ops!(@rhs $lhs, Expr);
        )*
    };
}

reflected_ops!(Value, i64, f64);

// ─── Unary operators ────────────────────────────────────────────────

macro_rules! one_arg_unary {
    ($($ty:ty),*) => {
        $(
            impl ops::Neg for $ty {
                type Output = Expr;

                fn neg(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Neg)
                }
            }

            /// `!X` is bitwise inversion (`~x`); see `logical_not` for `not x`.
            impl ops::Not for $ty {
                type Output = Expr;

                fn not(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Invert)
                }
            }

            impl $ty {
                /// Unary plus.
                pub fn pos(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Pos)
                }

                pub fn abs(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Abs)
                }

                pub fn len(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Len)
                }

                /// Truthiness negation (`not x`).
                pub fn logical_not(self) -> Expr {
                    Expr::from_ast(self.lower()).apply_unary(UnOp::Not)
                }
            }
        )*
    };
}

one_arg_unary!(First, Expr);

impl ops::Neg for Second {
    type Output = Lambda2;

    fn neg(self) -> Lambda2 {
        Lambda2::unary(UnOp::Neg)
    }
}

impl ops::Not for Second {
    type Output = Lambda2;

    fn not(self) -> Lambda2 {
        Lambda2::unary(UnOp::Invert)
    }
}

impl Second {
    pub fn pos(self) -> Lambda2 {
        Lambda2::unary(UnOp::Pos)
    }

    pub fn abs(self) -> Lambda2 {
        Lambda2::unary(UnOp::Abs)
    }

    pub fn len(self) -> Lambda2 {
        Lambda2::unary(UnOp::Len)
    }

    pub fn logical_not(self) -> Lambda2 {
        Lambda2::unary(UnOp::Not)
    }
}
