use crate::common::Int;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RollerError {
    #[error("no dice left to replay at roll #{position}")]
    Exhausted { position: usize },
    #[error("roll #{position} expected a d{expected} but a d{actual} was rolled")]
    SidesMismatch {
        position: usize,
        expected: Int,
        actual: Int,
    },
    #[error("rolled {value} on a d{sides}")]
    OutOfRange { value: Int, sides: Int },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum EvaluationError {
    #[error("cannot divide by zero")]
    ZeroDivision,
    #[error("integer overflow")]
    Overflow,
    #[error("{0}")]
    Roller(#[from] RollerError),
    #[error("cannot roll {0} dice")]
    InvalidDiceCount(Int),
    #[error("cannot roll a die with {0} sides")]
    InvalidSides(Int),
    #[error("empty range [{low}...{high}]")]
    EmptyRange { low: Int, high: Int },
    #[error("reroll threshold {threshold} can never be reached on a d{sides}")]
    UnboundedReroll { threshold: Int, sides: Int },
    #[error("explode threshold {threshold} would never stop")]
    UnboundedExplosion { threshold: Int },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("roll argument at position {position} was not resolved")]
    UnresolvedArgument { position: usize },
    #[error("too many dice rolled")]
    TooManyRolls,
    #[error("{0} cannot be evaluated to a value")]
    NotEvaluable(&'static str),
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ResolutionError {
    #[error("nested roll at position {position}")]
    NestedRoll { position: usize },
    #[error("{0}")]
    Evaluation(#[from] EvaluationError),
}
