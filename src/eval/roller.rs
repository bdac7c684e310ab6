use super::error::RollerError;
use crate::common::{Die, Int, NonZeroUInt, UInt};
use rand::Rng;

/// Source of die faces.
pub trait Roller {
    /// Draws a face in `1..=sides`.
    fn roll(&mut self, sides: NonZeroUInt) -> Result<UInt, RollerError>;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroUInt) -> Result<UInt, RollerError> {
        Ok(self.gen_range(1..=sides.get()))
    }
}

/// Replays a recorded sequence of dice.
///
/// Fails once the sequence runs out, or when a die is requested with a
/// different number of sides than was recorded.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ReplayRoller {
    dice: Vec<Die>,
    position: usize,
}

impl ReplayRoller {
    pub fn new(dice: Vec<Die>) -> Self {
        Self { dice, position: 0 }
    }

    /// Dice not yet replayed.
    pub fn remaining(&self) -> &[Die] {
        self.dice.get(self.position..).unwrap_or_default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_empty()
    }
}

impl Roller for ReplayRoller {
    fn roll(&mut self, sides: NonZeroUInt) -> Result<UInt, RollerError> {
        let position = self.position + 1;
        let die = self
            .dice
            .get(self.position)
            .ok_or(RollerError::Exhausted { position })?;

        let actual = Int::try_from(sides.get()).unwrap_or(Int::MAX);
        if die.sides != actual {
            return Err(RollerError::SidesMismatch {
                position,
                expected: die.sides,
                actual,
            });
        }

        let value = UInt::try_from(die.value).map_err(|_| RollerError::OutOfRange {
            value: die.value,
            sides: die.sides,
        })?;
        self.position += 1;
        Ok(value)
    }
}
