//! Dice notation for tabletop RPG chat bots.
//!
//! Command text is tokenized and parsed into a [`Command`], roll arguments are
//! resolved to integers, the rolls are executed against a [`Roller`], and the
//! tree can be rendered back to canonical notation at every step.
//!
//! ```no_run
//! let roll = rust_dicebot::roll("2d6+1>=8").unwrap();
//! println!("{} -> {}", roll.command, roll.value);
//! ```

mod common;
pub mod dicebot;
mod error;
pub mod eval;
pub mod notation;
pub mod parse;
pub mod testcase;

pub use common::{ArithOp, CompareOp, Die, Int, NonEmpty, NonZeroUInt, Precedence, Rounding, UInt};
pub use error::Error;
pub use eval::{Environment, EvalOptions, Evaluator, Object, ReplayRoller, Roller};
pub use parse::{ast::Command, parse};

pub type Result<T> = std::result::Result<T, Error>;

/// An evaluated command.
#[derive(Debug, Clone, PartialEq)]
pub struct Roll {
    /// The command with its rolls replaced by their results.
    pub command: Command,
    pub value: Object,
    pub rolled_dice: Vec<Die>,
}

/// Parses and evaluates `input` with the thread-local RNG.
pub fn roll(input: &str) -> Result<Roll> {
    roll_with(input, rand::thread_rng())
}

pub fn roll_with<R: Roller>(input: &str, roller: R) -> Result<Roll> {
    let mut command = parse("roll", input)?;
    let mut env = Environment::new();
    let mut evaluator = Evaluator::new(roller);

    evaluator.resolve_command(&mut command, &mut env)?;
    let value = evaluator.evaluate_command(&mut command, &mut env)?;
    Ok(Roll {
        command,
        value,
        rolled_dice: env.rolled_dice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::replay;
    use crate::eval::{EvaluationError, ResolutionError};
    use crate::parse::ParseErrorKind;

    #[test]
    fn test_roll_with_replay() {
        let roll = roll_with("2d6+1-1-2-3-4", replay("4/6, 1/6")).unwrap();
        assert_eq!(roll.value, Object::Integer(-4));
        assert_eq!(roll.rolled_dice, vec![Die::new(4, 6), Die::new(1, 6)]);
        assert_eq!(roll.command.to_string(), "5[4,1]+1-1-2-3-4");
    }

    #[test]
    fn test_roll_errors() {
        match roll_with("2d6+", replay("")) {
            Err(Error::Parse(err)) => assert!(matches!(
                err.kind,
                ParseErrorKind::UnexpectedToken { .. }
            )),
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert_eq!(
            roll_with("(1d6)d6", replay("")),
            Err(Error::Resolution(ResolutionError::NestedRoll { position: 2 }))
        );
        assert_eq!(
            roll_with("1d6/0", replay("3/6")),
            Err(Error::Evaluation(EvaluationError::ZeroDivision))
        );
    }

    #[test]
    fn test_roll_thread_rng() {
        let roll = roll("3d6").unwrap();
        match roll.value {
            Object::Integer(sum) => assert!((3..=18).contains(&sum)),
            other => panic!("not an integer: {:?}", other),
        }
        assert_eq!(roll.rolled_dice.len(), 3);
    }
}
