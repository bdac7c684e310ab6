use super::lexer::TokenKind;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum LexError {
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedCharacter { position: usize, found: char },
    #[error("unterminated bracket at position {position}")]
    UnterminatedBracket { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { position, .. } | Self::UnterminatedBracket { position } => {
                *position
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source_name}: error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub source_name: String,
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub slice: String,
}

impl ParseError {
    pub fn position(&self) -> usize {
        self.span.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    Lex(LexError),
    IntegerOverflow,
    ChainedComparison,
    RandomInCalc,
    MisplacedListRoll,
    NotRandom,
    EmptyChoice,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::Lex(err) => fmt::Display::fmt(err, f),
            Self::IntegerOverflow => f.write_str("integer literal is too large"),
            Self::ChainedComparison => f.write_str("comparisons cannot be chained"),
            Self::RandomInCalc => f.write_str("a calculation cannot roll dice"),
            Self::MisplacedListRoll => {
                f.write_str("B and R rolls must stand alone or be the left side of a comparison")
            }
            Self::NotRandom => f.write_str("expression does not roll any dice"),
            Self::EmptyChoice => f.write_str("choice has no items"),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a, b),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp)?;
            }
            write!(f, "or {}", last)
        }
    }
}
