use super::{CommandResult, DiceBot};
use crate::eval::{Evaluator, Roller};

/// The bot used when no game system is selected.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Basic;

impl DiceBot for Basic {
    fn game_id(&self) -> &'static str {
        "DiceBot"
    }

    fn game_name(&self) -> &'static str {
        "DiceBot (no game system)"
    }

    fn usage(&self) -> &'static str {
        "\
Type dice notation at the start of a chat line to roll; text after a space is a comment.
  3D6+1>=9      roll 3d6+1 against a target of 9 or more
  1D100<=50     roll under 50 on a d100
  3U6[5]        3d6, each die of 5 or more adds another die
  3B6           3d6 reported one by one
  10B6>=4       count the dice of 10d6 that show 4 or more
  3R6>=4        3d6 with ones rerolled, counting dice of 4 or more
  3R6[3]        3d6, dice below 3 are rerolled until they reach it
  (8/2)D(4+6)<=(5*3)  arithmetic is allowed in counts, sides and targets
  [1...3]D6     roll between 1 and 3 dice
  C(10-4*3/2+2) calculate without rolling
  choice[a,b,c] pick one of the items
  S3D6          prefix any command with S for a secret roll
  3D6/2         divide, rounding down; /2U rounds up and /2R to nearest"
    }

    fn execute_command<R: Roller>(
        &self,
        _command: &str,
        _evaluator: &mut Evaluator<R>,
    ) -> Option<CommandResult> {
        None
    }
}
