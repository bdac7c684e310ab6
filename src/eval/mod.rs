mod env;
mod error;
mod evaluate;
mod object;
mod resolve;
mod roller;

use crate::common::*;

pub use env::Environment;
pub use error::{EvaluationError, ResolutionError, RollerError};
pub use object::Object;
pub use roller::{ReplayRoller, Roller};

pub type DefaultRoller = rand::rngs::ThreadRng;

type EResult<T> = Result<T, EvaluationError>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EvalOptions {
    /// Upper bound on the dice drawn into one [`Environment`].
    pub max_rolls: Option<usize>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_rolls: Some(1000),
        }
    }
}

/// Resolves roll arguments and evaluates trees, drawing dice from `R`.
#[derive(Debug, Clone)]
pub struct Evaluator<R = DefaultRoller> {
    options: EvalOptions,
    roller: R,
}

impl<R: Roller> Evaluator<R> {
    pub fn new(roller: R) -> Self {
        Self::with_options(EvalOptions::default(), roller)
    }

    pub fn with_options(options: EvalOptions, roller: R) -> Self {
        Self { options, roller }
    }

    pub fn roller(&self) -> &R {
        &self.roller
    }

    pub fn into_roller(self) -> R {
        self.roller
    }

    fn check_roll_limit(&self, env: &Environment, n: usize) -> EResult<()> {
        match self.options.max_rolls {
            Some(max) if env.num_rolled().saturating_add(n) > max => {
                Err(EvaluationError::TooManyRolls)
            }
            _ => Ok(()),
        }
    }

    /// Draws one die and logs it.
    fn roll_die(&mut self, sides: Int, env: &mut Environment) -> EResult<Die> {
        self.check_roll_limit(env, 1)?;
        let n = UInt::try_from(sides)
            .ok()
            .and_then(NonZeroUInt::new)
            .ok_or(EvaluationError::InvalidSides(sides))?;

        let value = Int::try_from(self.roller.roll(n)?).unwrap_or(Int::MAX);
        if !(1..=sides).contains(&value) {
            return Err(RollerError::OutOfRange { value, sides }.into());
        }

        let die = Die::new(value, sides);
        env.push_rolled_die(die);
        Ok(die)
    }

    fn roll_dice(&mut self, count: Int, sides: Int, env: &mut Environment) -> EResult<Vec<Die>> {
        check_roll_args(count, sides)?;
        let n = usize::try_from(count).map_err(|_| EvaluationError::InvalidDiceCount(count))?;
        self.check_roll_limit(env, n)?;
        (0..n).map(|_| self.roll_die(sides, env)).collect()
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

fn check_roll_args(count: Int, sides: Int) -> EResult<()> {
    if count < 1 {
        Err(EvaluationError::InvalidDiceCount(count))
    } else if sides < 1 {
        Err(EvaluationError::InvalidSides(sides))
    } else {
        Ok(())
    }
}
