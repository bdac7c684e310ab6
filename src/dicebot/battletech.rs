use super::{CommandResult, DiceBot, SparseTable, SparseTableItem};
use crate::eval::{Environment, Evaluator, Roller};
use tracing::warn;

const CRITICAL_HIT_TABLE: SparseTable = SparseTable::new(
    "Critical Hit Table",
    2,
    6,
    &[
        SparseTableItem {
            max: 7,
            content: "No critical hit",
        },
        SparseTableItem {
            max: 9,
            content: "1 critical hit",
        },
        SparseTableItem {
            max: 11,
            content: "2 critical hits",
        },
        SparseTableItem {
            max: 12,
            content: "Location blown off (arm, leg, head) or 3 critical hits (torso)",
        },
    ],
);

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BattleTech;

impl BattleTech {
    fn execute_table<R: Roller>(
        &self,
        table: &SparseTable,
        evaluator: &mut Evaluator<R>,
    ) -> CommandResult {
        let mut result = CommandResult::new(self.game_id());
        let mut env = Environment::new();

        match table.roll(evaluator, &mut env) {
            Ok(roll) => {
                result.push_part(format!("{}({})", table.name, roll.sum));
                result.push_part(roll.item.content);
            }
            Err(err) => {
                warn!(game = self.game_id(), table = table.name, %err, "table roll failed");
                result.push_part(err.to_string());
            }
        }
        result.rolled_dice = env.rolled_dice();
        result
    }
}

impl DiceBot for BattleTech {
    fn game_id(&self) -> &'static str {
        "BattleTech"
    }

    fn game_name(&self) -> &'static str {
        "BattleTech"
    }

    fn usage(&self) -> &'static str {
        "\
CT  Critical Hit Table (2D6)
Prefix with S for a secret roll, e.g. SCT."
    }

    fn execute_command<R: Roller>(
        &self,
        command: &str,
        evaluator: &mut Evaluator<R>,
    ) -> Option<CommandResult> {
        let upper = command.to_ascii_uppercase();
        let (secret, name) = match upper.strip_prefix('S') {
            Some(rest) if rest == "CT" => (true, rest),
            _ => (false, upper.as_str()),
        };

        let mut result = match name {
            "CT" => self.execute_table(&CRITICAL_HIT_TABLE, evaluator),
            _ => return None,
        };
        result.secret = secret;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::dicebot::GameSystem;

    fn execute(line: &str, dice: &str) -> Option<String> {
        let mut evaluator = Evaluator::new(replay(dice));
        let game: GameSystem = BattleTech.into();
        game.execute(line, &mut evaluator).map(|result| result.to_string())
    }

    #[test]
    fn test_critical_hit_table() {
        assert_eq!(
            execute("CT", "3/6,4/6").as_deref(),
            Some("BattleTech : Critical Hit Table(7) ＞ No critical hit")
        );
        assert_eq!(
            execute("ct", "5/6,5/6").as_deref(),
            Some("BattleTech : Critical Hit Table(10) ＞ 2 critical hits")
        );
        assert_eq!(
            execute("SCT", "6/6,6/6").as_deref(),
            Some(
                "BattleTech : Critical Hit Table(12) ＞ \
                 Location blown off (arm, leg, head) or 3 critical hits (torso)###secret dice###"
            )
        );
    }

    #[test]
    fn test_falls_back_to_notation() {
        assert_eq!(
            execute("2d6>=8", "3/6,4/6").as_deref(),
            Some("BattleTech : (2D6>=8) ＞ 7[3,4] ＞ 7 ＞ failure")
        );
        assert_eq!(execute("CTX", ""), None);
    }

    #[test]
    fn test_table_roll_error() {
        assert_eq!(
            execute("CT", "3/6").as_deref(),
            Some("BattleTech : no dice left to replay at roll #2")
        );
    }
}
