use super::error::EvaluationError;
use crate::common::{write_joined, Int};
use std::fmt;

/// The value of an evaluated expression.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Object {
    Integer(Int),
    /// Outcome of a comparison.
    SF(bool),
    /// Kept dice of a B or R list that was not compared.
    List(Vec<Int>),
}

impl Object {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::SF(_) => "success/failure",
            Self::List(_) => "list",
        }
    }

    pub fn as_integer(&self) -> Result<Int, EvaluationError> {
        match self {
            Self::Integer(x) => Ok(*x),
            other => Err(EvaluationError::TypeMismatch {
                expected: "integer",
                found: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(x) => fmt::Display::fmt(x, f),
            Self::SF(true) => f.write_str("success"),
            Self::SF(false) => f.write_str("failure"),
            Self::List(values) => write_joined(f, values, ","),
        }
    }
}
