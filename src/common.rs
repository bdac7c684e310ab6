use std::fmt::{self, Write};
use std::num::NonZeroU32;
pub use vec1::vec1;

pub type Int = i32;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Binding strength of an expression, from loosest to tightest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Precedence {
    Lowest,
    Comparison,
    Additive,
    Multiplicative,
    Roll,
    Prefix,
    Primary,
}

impl Precedence {
    /// The precedence one step tighter than `self`.
    pub const fn next(self) -> Self {
        match self {
            Self::Lowest => Self::Comparison,
            Self::Comparison => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Roll,
            Self::Roll => Self::Prefix,
            Self::Prefix | Self::Primary => Self::Primary,
        }
    }
}

/// A single rolled die.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Die {
    pub value: Int,
    pub sides: Int,
}

impl Die {
    pub const fn new(value: Int, sides: Int) -> Self {
        Self { value, sides }
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.sides)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Rounding {
    Truncate,
    Up,
    Nearest,
}

impl Rounding {
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Truncate => "",
            Self::Up => "U",
            Self::Nearest => "R",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div(Rounding),
}

impl ArithOp {
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Add | Self::Sub => Precedence::Additive,
            Self::Mul | Self::Div(_) => Precedence::Multiplicative,
        }
    }

    /// Whether `(a op b) op c` may drop its parentheses.
    pub const fn left_flatten(&self) -> bool {
        true
    }

    /// Whether `a op (b op c)` may drop its parentheses.
    pub const fn right_flatten(&self) -> bool {
        matches!(self, Self::Add | Self::Mul)
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div(_) => "/",
        }
    }

    pub const fn sexp_symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div(Rounding::Truncate) => "/",
            Self::Div(Rounding::Up) => "/U",
            Self::Div(Rounding::Nearest) => "/R",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn apply(&self, lhs: Int, rhs: Int) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Writes `items` separated by `sep`.
pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut impl Write,
    items: impl IntoIterator<Item = T>,
    sep: &str,
) -> fmt::Result {
    let mut first = true;
    for item in items {
        if !first {
            f.write_str(sep)?;
        }
        first = false;
        write!(f, "{}", item)?;
    }
    Ok(())
}
