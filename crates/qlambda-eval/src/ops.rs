//! Operator semantics for [`Value`] and its [`Operand`] implementation.
//!
//! Numbers follow the usual tower: `bool` < `int` < `float` < `complex`, with
//! the wider operand deciding the result type. `/` always yields a float,
//! `//` and `%` round toward negative infinity, and integer overflow is an
//! error rather than a wrap.

use std::cmp::Ordering;
use std::sync::Arc;

use qlambda_ast::{BinOp, EvalError, Kwargs, Operand, UnOp};

use crate::members;
use crate::value::Value;

impl Operand for Value {
    fn is_simple(&self) -> bool {
        matches!(
            self,
            Value::None
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Complex(..)
                | Value::Str(_)
                | Value::Bytes(_)
        )
    }

    fn get_attr(&self, name: &str) -> Result<Self, EvalError> {
        members::get_attr(self, name)
    }

    fn call(&self, args: &[Self], kwargs: &Kwargs<Self>) -> Result<Self, EvalError> {
        match self {
            Value::Func(f) => f.call(args, kwargs),
            other => Err(EvalError::NotCallable {
                type_name: other.type_name().to_string(),
            }),
        }
    }

    fn unary(&self, op: UnOp) -> Result<Self, EvalError> {
        unary(op, self)
    }

    fn binary(&self, op: BinOp, rhs: &Self) -> Result<Self, EvalError> {
        binary(op, self, rhs)
    }
}

// ─── Numeric tower ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
    Complex(f64, f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Bool(b) => Some(Num::Int(*b as i64)),
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Float(f) => Some(Num::Float(f.0)),
            Value::Complex(re, im) => Some(Num::Complex(re.0, im.0)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
            Num::Complex(re, _) => re,
        }
    }

    fn to_complex(self) -> (f64, f64) {
        match self {
            Num::Complex(re, im) => (re, im),
            other => (other.to_f64(), 0.0),
        }
    }
}

fn overflow(op: BinOp) -> EvalError {
    EvalError::arithmetic(op.symbol(), "integer overflow")
}

fn zero_division(op: BinOp, what: &str) -> EvalError {
    EvalError::arithmetic(op.symbol(), format!("{what} by zero"))
}

fn zero_power(op: BinOp) -> EvalError {
    EvalError::arithmetic(op.symbol(), "0.0 cannot be raised to a negative power")
}

fn mismatch(op: BinOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::mismatch(
        op.symbol(),
        format!("'{}' and '{}'", lhs.type_name(), rhs.type_name()),
    )
}

fn int_binary(op: BinOp, a: i64, b: i64) -> Result<Option<Value>, EvalError> {
    let result = match op {
        BinOp::Add => a.checked_add(b).ok_or_else(|| overflow(op))?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(op))?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(op))?,
        BinOp::TrueDiv => {
            if b == 0 {
                return Err(zero_division(op, "division"));
            }
            return Ok(Some(Value::float(a as f64 / b as f64)));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(zero_division(op, "integer division"));
            }
            let q = a.checked_div(b).ok_or_else(|| overflow(op))?;
            if (a % b != 0) && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(zero_division(op, "integer modulo"));
            }
            let r = a.checked_rem(b).unwrap_or(0);
            if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(zero_power(op));
                }
                return Ok(Some(Value::float((a as f64).powf(b as f64))));
            }
            let exp = u32::try_from(b).map_err(|_| overflow(op))?;
            a.checked_pow(exp).ok_or_else(|| overflow(op))?
        }
        BinOp::LShift => {
            if b < 0 {
                return Err(EvalError::arithmetic(op.symbol(), "negative shift count"));
            }
            if a == 0 {
                0
            } else if b >= 63 {
                return Err(overflow(op));
            } else {
                let shifted = a << b;
                if shifted >> b != a {
                    return Err(overflow(op));
                }
                shifted
            }
        }
        BinOp::RShift => {
            if b < 0 {
                return Err(EvalError::arithmetic(op.symbol(), "negative shift count"));
            }
            a >> b.min(63)
        }
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        _ => return Ok(None),
    };
    Ok(Some(Value::Int(result)))
}

fn float_binary(op: BinOp, a: f64, b: f64) -> Result<Option<Value>, EvalError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::TrueDiv => {
            if b == 0.0 {
                return Err(zero_division(op, "float division"));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division(op, "float floor division"));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(zero_division(op, "float modulo"));
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(zero_power(op));
            }
            a.powf(b)
        }
        _ => return Ok(None),
    };
    Ok(Some(Value::float(result)))
}

fn complex_binary(
    op: BinOp,
    (ar, ai): (f64, f64),
    (br, bi): (f64, f64),
) -> Result<Option<Value>, EvalError> {
    let (re, im) = match op {
        BinOp::Add => (ar + br, ai + bi),
        BinOp::Sub => (ar - br, ai - bi),
        BinOp::Mul => (ar * br - ai * bi, ar * bi + ai * br),
        BinOp::TrueDiv => {
            let denom = br * br + bi * bi;
            if denom == 0.0 {
                return Err(zero_division(op, "complex division"));
            }
            ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
        }
        _ => return Ok(None),
    };
    Ok(Some(Value::complex(re, im)))
}

fn numeric(op: BinOp, a: Num, b: Num) -> Result<Option<Value>, EvalError> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => int_binary(op, x, y),
        (Num::Complex(..), _) | (_, Num::Complex(..)) => {
            complex_binary(op, a.to_complex(), b.to_complex())
        }
        _ => float_binary(op, a.to_f64(), b.to_f64()),
    }
}

// ─── Sequences ──────────────────────────────────────────────────────

/// Longest sequence (in elements) that repetition will build.
const MAX_REPEAT_LEN: usize = i32::MAX as usize;

fn repeat_count(op: BinOp, n: i64, len: usize) -> Result<usize, EvalError> {
    let n = usize::try_from(n.max(0)).unwrap_or(0);
    if len == 0 {
        return Ok(0);
    }
    match n.checked_mul(len) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(n),
        _ => Err(EvalError::arithmetic(
            op.symbol(),
            "repeated sequence too long",
        )),
    }
}

fn sequence_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Option<Value>, EvalError> {
    let result = match (op, lhs, rhs) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Value::string(format!("{a}{b}")),
        (BinOp::Add, Value::Bytes(a), Value::Bytes(b)) => Value::bytes([&a[..], &b[..]].concat()),
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Value::tuple(a.iter().chain(b.iter()).cloned().collect())
        }
        (BinOp::Mul, seq, count) | (BinOp::Mul, count, seq)
            if matches!(count, Value::Int(_) | Value::Bool(_))
                && matches!(seq, Value::Str(_) | Value::Bytes(_) | Value::Tuple(_)) =>
        {
            let n = count.as_int().unwrap_or(0);
            match seq {
                Value::Str(s) => Value::string(s.repeat(repeat_count(op, n, s.len())?)),
                Value::Bytes(b) => Value::bytes(b.repeat(repeat_count(op, n, b.len())?)),
                Value::Tuple(t) => {
                    let n = repeat_count(op, n, t.len())?;
                    Value::Tuple(Arc::new(
                        t.iter().cycle().take(t.len() * n).cloned().collect(),
                    ))
                }
                _ => return Ok(None),
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn get_item(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let op = BinOp::GetItem;
    let len = match target {
        Value::Str(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::Tuple(t) => t.len(),
        _ => return Err(mismatch(op, target, index)),
    };
    let Some(i) = index.as_int() else {
        return Err(mismatch(op, target, index));
    };
    let resolved = if i < 0 { i + len as i64 } else { i };
    let Some(pos) = usize::try_from(resolved).ok().filter(|p| *p < len) else {
        return Err(EvalError::arithmetic(
            op.symbol(),
            format!("{} index out of range", target.type_name()),
        ));
    };
    Ok(match target {
        Value::Str(s) => s
            .chars()
            .nth(pos)
            .map_or(Value::None, |c| Value::string(c.to_string())),
        Value::Bytes(b) => Value::Int(b[pos] as i64),
        Value::Tuple(t) => t[pos].clone(),
        _ => Value::None,
    })
}

// ─── Comparison ─────────────────────────────────────────────────────

/// Value equality across the numeric tower (`1 == 1.0 == True`).
pub(crate) fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    if let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) {
        return match (a, b) {
            (Num::Int(x), Num::Int(y)) => x == y,
            (Num::Complex(..), _) | (_, Num::Complex(..)) => a.to_complex() == b.to_complex(),
            _ => a.to_f64() == b.to_f64(),
        };
    }
    match (lhs, rhs) {
        (Value::Tuple(a), Value::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Record(a), Value::Record(b)) => {
            a.type_name == b.type_name
                && a.fields.len() == b.fields.len()
                && a.fields
                    .iter()
                    .all(|(k, v)| b.fields.get(k).is_some_and(|w| loose_eq(v, w)))
        }
        _ => lhs == rhs,
    }
}

fn ordering(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, EvalError> {
    if let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) {
        return match (a, b) {
            (Num::Complex(..), _) | (_, Num::Complex(..)) => Err(mismatch(op, lhs, rhs)),
            (Num::Int(x), Num::Int(y)) => Ok(Some(x.cmp(&y))),
            _ => Ok(a.to_f64().partial_cmp(&b.to_f64())),
        };
    }
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Bytes(a), Value::Bytes(b)) => Ok(Some(a.cmp(b))),
        (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if !loose_eq(x, y) {
                    return ordering(op, x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(mismatch(op, lhs, rhs)),
    }
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let result = match ordering(op, lhs, rhs)? {
        // Unordered floats (NaN) compare false under every operator.
        None => false,
        Some(ord) => match op {
            BinOp::Lt => ord == Ordering::Less,
            BinOp::Le => ord != Ordering::Greater,
            BinOp::Gt => ord == Ordering::Greater,
            BinOp::Ge => ord != Ordering::Less,
            _ => false,
        },
    };
    Ok(Value::Bool(result))
}

// ─── Entry points ───────────────────────────────────────────────────

pub(crate) fn binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => return Ok(Value::Bool(loose_eq(lhs, rhs))),
        BinOp::Ne => return Ok(Value::Bool(!loose_eq(lhs, rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => return compare(op, lhs, rhs),
        BinOp::GetItem => return get_item(lhs, rhs),
        _ => {}
    }

    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        match op {
            BinOp::BitAnd => return Ok(Value::Bool(a & b)),
            BinOp::BitOr => return Ok(Value::Bool(a | b)),
            BinOp::BitXor => return Ok(Value::Bool(a ^ b)),
            _ => {}
        }
    }

    let result = match (Num::of(lhs), Num::of(rhs)) {
        (Some(a), Some(b)) => numeric(op, a, b)?,
        _ => sequence_binary(op, lhs, rhs)?,
    };
    result.ok_or_else(|| mismatch(op, lhs, rhs))
}

pub(crate) fn unary(op: UnOp, value: &Value) -> Result<Value, EvalError> {
    let unsupported = || EvalError::mismatch(op.symbol(), format!("'{}'", value.type_name()));
    let int_overflow = || EvalError::arithmetic(op.symbol(), "integer overflow");

    match op {
        UnOp::Not => return Ok(Value::Bool(!value.is_truthy())),
        UnOp::Len => {
            return match value {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::Bytes(b) => Ok(Value::Int(b.len() as i64)),
                Value::Tuple(t) => Ok(Value::Int(t.len() as i64)),
                _ => Err(unsupported()),
            };
        }
        _ => {}
    }

    match (op, Num::of(value).ok_or_else(unsupported)?) {
        (UnOp::Neg, Num::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(int_overflow),
        (UnOp::Neg, Num::Float(f)) => Ok(Value::float(-f)),
        (UnOp::Neg, Num::Complex(re, im)) => Ok(Value::complex(-re, -im)),
        (UnOp::Pos, Num::Int(n)) => Ok(Value::Int(n)),
        (UnOp::Pos, Num::Float(f)) => Ok(Value::float(f)),
        (UnOp::Pos, Num::Complex(re, im)) => Ok(Value::complex(re, im)),
        (UnOp::Invert, Num::Int(n)) => Ok(Value::Int(!n)),
        (UnOp::Abs, Num::Int(n)) => n.checked_abs().map(Value::Int).ok_or_else(int_overflow),
        (UnOp::Abs, Num::Float(f)) => Ok(Value::float(f.abs())),
        (UnOp::Abs, Num::Complex(re, im)) => Ok(Value::float(re.hypot(im))),
        _ => Err(unsupported()),
    }
}
