//! Native callables: plain functions and methods bound to a receiver.

use std::fmt;
use std::sync::Arc;

use qlambda_ast::{EvalError, Kwargs};

use crate::value::Value;

/// Signature of a built-in method; the receiver comes first.
pub type Method = fn(&Value, &[Value], &Kwargs<Value>) -> Result<Value, EvalError>;

type NativeImpl = dyn Fn(&[Value], &Kwargs<Value>) -> Result<Value, EvalError> + Send + Sync;

#[derive(Clone)]
enum Callable {
    Bound { receiver: Arc<Value>, method: Method },
    Native(Arc<NativeImpl>),
}

/// A named native function.
///
/// Two bound methods are equal when they share a name and an equal receiver;
/// plain functions are equal only to clones of themselves.
#[derive(Clone)]
pub struct NativeFn {
    name: Arc<str>,
    callable: Callable,
}

impl NativeFn {
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&[Value], &Kwargs<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Callable::Native(Arc::new(f)),
        }
    }

    pub(crate) fn bound(receiver: Value, name: String, method: Method) -> Self {
        Self {
            name: name.into(),
            callable: Callable::Bound {
                receiver: Arc::new(receiver),
                method,
            },
        }
    }

    /// Qualified name (`"str.upper"` for bound methods).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with positional and keyword arguments. Errors pass through as raised.
    pub fn call(&self, args: &[Value], kwargs: &Kwargs<Value>) -> Result<Value, EvalError> {
        match &self.callable {
            Callable::Bound { receiver, method } => method(&**receiver, args, kwargs),
            Callable::Native(f) => f(args, kwargs),
        }
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        match (&self.callable, &other.callable) {
            (Callable::Bound { receiver: a, .. }, Callable::Bound { receiver: b, .. }) => {
                self.name == other.name && a == b
            }
            (Callable::Native(a), Callable::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.callable {
            Callable::Bound { receiver, .. } => {
                write!(f, "<bound method {} of {receiver:?}>", self.name)
            }
            Callable::Native(_) => write!(f, "<function {}>", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double() -> NativeFn {
        NativeFn::new("double", |args, _| match args {
            [Value::Int(n)] => Ok(Value::Int(n * 2)),
            _ => Err(EvalError::call_failed("double", "expected one int")),
        })
    }

    #[test]
    fn test_call_native() {
        let f = double();
        assert_eq!(f.call(&[Value::Int(4)], &Kwargs::new()), Ok(Value::Int(8)));
        assert!(f.call(&[], &Kwargs::new()).is_err());
        assert_eq!(f.name(), "double");
    }

    #[test]
    fn test_native_identity() {
        let f = double();
        assert_eq!(f, f.clone());
        assert_ne!(f, double());
        assert_eq!(format!("{f:?}"), "<function double>");
    }

    #[test]
    fn test_bound_equality() {
        fn first(receiver: &Value, _: &[Value], _: &Kwargs<Value>) -> Result<Value, EvalError> {
            Ok(receiver.clone())
        }
        let a = NativeFn::bound(Value::Int(1), "int.first".into(), first);
        let b = NativeFn::bound(Value::Int(1), "int.first".into(), first);
        let c = NativeFn::bound(Value::Int(2), "int.first".into(), first);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.call(&[], &Kwargs::new()), Ok(Value::Int(1)));
        assert_eq!(format!("{a:?}"), "<bound method int.first of 1>");
    }
}
