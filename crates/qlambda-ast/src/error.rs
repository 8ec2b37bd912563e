//! Error taxonomy for building and evaluating expressions.

/// Coarse failure kinds shared by construction and evaluation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedArity,
    AttributeNotFound,
    CallFailed,
    OperatorTypeMismatch,
}

/// Raised while building an expression, before anything is evaluated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The second-role placeholder ended up somewhere only a one-argument
    /// expression can live.
    #[error("placeholder expressions do not accept a second argument ({context})")]
    UnsupportedArity { context: &'static str },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::UnsupportedArity { .. } => ErrorKind::UnsupportedArity,
        }
    }
}

/// Raised while evaluating a compiled expression (or while folding constants).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("'{type_name}' object has no attribute '{attr}'")]
    AttributeNotFound { type_name: String, attr: String },

    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: String },

    #[error("{callee}(): {reason}")]
    CallFailed { callee: String, reason: String },

    #[error("unsupported operand type(s) for {op}: {operands}")]
    OperatorTypeMismatch { op: &'static str, operands: String },

    /// Operator applied to well-typed operands that still failed
    /// (division by zero, overflow, index out of range).
    #[error("{op}: {reason}")]
    Arithmetic { op: &'static str, reason: String },
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::AttributeNotFound { .. } => ErrorKind::AttributeNotFound,
            EvalError::NotCallable { .. } | EvalError::CallFailed { .. } => ErrorKind::CallFailed,
            EvalError::OperatorTypeMismatch { .. } | EvalError::Arithmetic { .. } => {
                ErrorKind::OperatorTypeMismatch
            }
        }
    }

    pub fn attribute_not_found(type_name: impl Into<String>, attr: impl Into<String>) -> Self {
        EvalError::AttributeNotFound {
            type_name: type_name.into(),
            attr: attr.into(),
        }
    }

    pub fn call_failed(callee: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::CallFailed {
            callee: callee.into(),
            reason: reason.into(),
        }
    }

    pub fn mismatch(op: &'static str, operands: impl Into<String>) -> Self {
        EvalError::OperatorTypeMismatch {
            op,
            operands: operands.into(),
        }
    }

    pub fn arithmetic(op: &'static str, reason: impl Into<String>) -> Self {
        EvalError::Arithmetic {
            op,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            BuildError::UnsupportedArity { context: "call" }.kind(),
            ErrorKind::UnsupportedArity
        );
        assert_eq!(
            EvalError::attribute_not_found("int", "upper").kind(),
            ErrorKind::AttributeNotFound
        );
        assert_eq!(
            EvalError::NotCallable {
                type_name: "int".into()
            }
            .kind(),
            ErrorKind::CallFailed
        );
        assert_eq!(
            EvalError::arithmetic("/", "division by zero").kind(),
            ErrorKind::OperatorTypeMismatch
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            EvalError::attribute_not_found("int", "upper").to_string(),
            "'int' object has no attribute 'upper'"
        );
        assert_eq!(
            EvalError::mismatch("+", "'str' and 'int'").to_string(),
            "unsupported operand type(s) for +: 'str' and 'int'"
        );
    }
}
