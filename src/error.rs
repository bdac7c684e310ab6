use crate::eval::{EvaluationError, ResolutionError};
use crate::parse::ParseError;

/// Any failure between command text and its value.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
