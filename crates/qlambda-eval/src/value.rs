//! Runtime values for compiled expressions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{self, SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};

use crate::native::NativeFn;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value.
    None,
    Bool(bool),
    Int(i64),
    /// Floating point (wrapped for Eq).
    Float(OrderedFloat<f64>),
    /// Complex number as (real, imaginary).
    Complex(OrderedFloat<f64>, OrderedFloat<f64>),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Tuple(Arc<Vec<Value>>),
    /// Named type with ordered fields.
    Record(Arc<Record>),
    /// Native callable, including bound methods.
    Func(NativeFn),
}

/// Wrapper for floats that implements Hash and Eq via total ordering.
#[derive(Clone, Copy)]
pub struct OrderedFloat<T>(pub T);

impl PartialEq for OrderedFloat<f64> {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for OrderedFloat<f64> {}

impl Hash for OrderedFloat<f64> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for OrderedFloat<f64> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat<f64> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// An object with a type name and named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: IndexMap<String, Value>,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => ar == br && ai == bi,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{:?}", v.0),
            Value::Complex(re, im) => write!(f, "({:?}{:+?}j)", re.0, im.0),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "b{:?}", String::from_utf8_lossy(v)),
            Value::Tuple(v) => {
                write!(f, "(")?;
                for (i, val) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{val:?}")?;
                }
                if v.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Record(r) => {
                write!(f, "{}(", r.type_name)?;
                for (i, (name, val)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}={val:?}")?;
                }
                write!(f, ")")
            }
            Value::Func(func) => write!(f, "{func:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(v.0),
            Value::Complex(re, im) => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(&re.0)?;
                tuple.serialize_element(&im.0)?;
                tuple.end()
            }
            Value::Str(v) => serializer.serialize_str(v),
            Value::Bytes(v) => serializer.serialize_bytes(v),
            Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(r) => {
                let mut map = serializer.serialize_map(Some(r.fields.len()))?;
                for (name, val) in &r.fields {
                    map.serialize_entry(name, val)?;
                }
                map.end()
            }
            Value::Func(func) => Err(ser::Error::custom(format!(
                "cannot serialize function '{}'",
                func.name()
            ))),
        }
    }
}

impl Value {
    /// Create a float value.
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Create a complex value.
    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(OrderedFloat(re), OrderedFloat(im))
    }

    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a bytes value.
    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    /// Create a tuple value.
    pub fn tuple(values: Vec<Value>) -> Self {
        Value::Tuple(Arc::new(values))
    }

    /// Create a record value.
    pub fn record<K: Into<String>>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Record(Arc::new(Record {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    /// Wrap a native function.
    pub fn function<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&[Value], &crate::Kwargs<Value>) -> Result<Value, qlambda_ast::EvalError>
            + Send
            + Sync
            + 'static,
    {
        Value::Func(NativeFn::new(name, f))
    }

    /// Name of the value's type, as used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(..) => "complex",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Tuple(_) => "tuple",
            Value::Record(r) => &r.type_name,
            Value::Func(_) => "function",
        }
    }

    /// Try to get as i64 (bools count as integers).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to get as f64 (integers are widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(v.0),
            Value::Int(v) => Some(*v as f64),
            Value::Bool(v) => Some(*v as i64 as f64),
            _ => None,
        }
    }

    /// Try to get as str.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a "truthy" value for conditions.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => v.0 != 0.0,
            Value::Complex(re, im) => re.0 != 0.0 || im.0 != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::Record(_) | Value::Func(_) => true,
        }
    }
}

// Convenience From implementations
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::tuple(v)
    }
}

impl From<NativeFn> for Value {
    fn from(v: NativeFn) -> Self {
        Value::Func(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_forms() {
        assert_eq!(format!("{:?}", Value::None), "None");
        assert_eq!(format!("{:?}", Value::float(1.0)), "1.0");
        assert_eq!(format!("{:?}", Value::complex(3.0, -4.0)), "(3.0-4.0j)");
        assert_eq!(format!("{:?}", Value::string("abc")), "\"abc\"");
        assert_eq!(format!("{:?}", Value::tuple(vec![Value::Int(1)])), "(1,)");
        assert_eq!(
            format!(
                "{:?}",
                Value::record("Point", [("x", Value::Int(1)), ("y", Value::Int(2))])
            ),
            "Point(x=1, y=2)"
        );
    }

    #[test]
    fn test_structural_equality_is_strict() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::float(1.0));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_eq!(Value::float(f64::NAN), Value::float(f64::NAN));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(!Value::tuple(vec![]).is_truthy());
        assert!(Value::complex(0.0, 1.0).is_truthy());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_eq!(Value::from("a"), Value::string("a"));
        assert_eq!(Value::from(None::<i64>), Value::None);
        assert_eq!(Value::from(Some(2.5)), Value::float(2.5));
    }
}
