//! Game systems and the chat command front end.

mod basic;
mod battletech;
mod table;

pub use basic::Basic;
pub use battletech::BattleTech;
pub use table::{SparseTable, SparseTableItem, TableError, TableRoll};

use crate::common::Die;
use crate::eval::{Environment, Evaluator, Roller};
use crate::notation::{command_notation, infix_notation, parenthesize};
use crate::parse::ast::{Command, CommandKind, Node};
use std::fmt;
use tracing::{debug, warn};

/// A game system's bot.
#[enum_dispatch::enum_dispatch]
pub trait DiceBot {
    fn game_id(&self) -> &'static str;

    fn game_name(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    /// Runs a command specific to this game.
    ///
    /// Returns `None` when `command` is not one of them, in which case it is
    /// tried as plain dice notation.
    fn execute_command<R: Roller>(
        &self,
        command: &str,
        evaluator: &mut Evaluator<R>,
    ) -> Option<CommandResult>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[enum_dispatch::enum_dispatch(DiceBot)]
pub enum GameSystem {
    Basic(Basic),
    BattleTech(BattleTech),
}

impl GameSystem {
    pub fn all() -> [GameSystem; 2] {
        [Basic.into(), BattleTech.into()]
    }

    /// Looks a game system up by its id, ignoring case.
    pub fn find(game_id: &str) -> Option<GameSystem> {
        Self::all()
            .into_iter()
            .find(|system| system.game_id().eq_ignore_ascii_case(game_id))
    }

    /// Runs one chat line.
    ///
    /// The first word is the command and the rest of the line is a comment,
    /// except for `choice[...]` whose items may contain spaces. Lines that are
    /// not commands give `None`.
    pub fn execute<R: Roller>(
        &self,
        line: &str,
        evaluator: &mut Evaluator<R>,
    ) -> Option<CommandResult> {
        let command = command_word(line)?;

        if let Some(result) = self.execute_command(command, evaluator) {
            debug!(game = self.game_id(), command, "game command");
            return Some(result);
        }

        match crate::parse::parse(self.game_id(), command) {
            Ok(parsed) => Some(self.execute_notation(parsed, evaluator)),
            Err(err) => {
                debug!(game = self.game_id(), command, %err, "not a command");
                None
            }
        }
    }

    fn execute_notation<R: Roller>(
        &self,
        mut command: Command,
        evaluator: &mut Evaluator<R>,
    ) -> CommandResult {
        let mut result = CommandResult::new(self.game_id());
        result.secret = command.secret;

        let notation = command_notation(&command, true);
        let mut env = Environment::new();
        match notation_parts(&mut command, evaluator, &mut env) {
            Ok(parts) => result.message_parts = parts,
            Err(err) => {
                warn!(game = self.game_id(), %notation, %err, "evaluation failed");
                result.message_parts = vec![notation, err.to_string()];
            }
        }
        result.rolled_dice = env.rolled_dice();
        result
    }
}

impl Default for GameSystem {
    fn default() -> Self {
        Basic.into()
    }
}

fn command_word(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let unsecret = line
        .strip_prefix(&['s', 'S'][..])
        .unwrap_or(line);
    let is_choice = unsecret
        .get(..7)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("choice["));

    if is_choice {
        Some(line.trim_end())
    } else {
        line.split_whitespace().next()
    }
}

fn notation_parts<R: Roller>(
    command: &mut Command,
    evaluator: &mut Evaluator<R>,
    env: &mut Environment,
) -> crate::Result<Vec<String>> {
    if command.kind == CommandKind::Calc {
        let notation = command_notation(command, true);
        let value = evaluator.evaluate_command(command, env)?;
        return Ok(vec![notation, value.to_string()]);
    }
    if let Node::ChoiceList(choice) = &command.expr {
        let chosen = evaluator.choose(choice, env)?;
        let notation = parenthesize(&command_notation(command, true));
        return Ok(vec![notation, chosen.to_string()]);
    }

    let mut parts = Vec::new();
    evaluator.resolve_command(command, env)?;
    parts.push(parenthesize(&command_notation(command, true)));
    let value = evaluator.evaluate_command(command, env)?;

    match (command.kind, &mut command.expr) {
        (CommandKind::BRollList | CommandKind::RRollList, _) => parts.push(value.to_string()),
        (CommandKind::BRollComp | CommandKind::RRollComp, Node::Compare(cmp)) => {
            parts.push(infix_notation(&cmp.left, true));
            parts.push(format!("successes {}", value));
        }
        (kind, Node::Compare(cmp)) if kind.is_comparison() => {
            let rolled = infix_notation(&cmp.left, true);
            // already rolled, so no dice are drawn
            let left = evaluator.evaluate(&mut cmp.left, env)?.to_string();
            if rolled != left {
                parts.push(rolled);
            }
            parts.push(left);
            parts.push(value.to_string());
        }
        (_, expr) => {
            let rolled = infix_notation(expr, true);
            let value = value.to_string();
            if rolled != value {
                parts.push(rolled);
            }
            parts.push(value);
        }
    }
    Ok(parts)
}

/// The reply to one command.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandResult {
    pub game_id: &'static str,
    pub message_parts: Vec<String>,
    pub secret: bool,
    pub rolled_dice: Vec<Die>,
}

impl CommandResult {
    pub fn new(game_id: &'static str) -> Self {
        Self {
            game_id,
            message_parts: Vec::new(),
            secret: false,
            rolled_dice: Vec::new(),
        }
    }

    pub fn push_part(&mut self, part: impl Into<String>) {
        self.message_parts.push(part.into());
    }

    pub fn message(&self) -> String {
        self.message_parts.join(" ＞ ")
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.game_id, self.message())?;
        if self.secret {
            f.write_str("###secret dice###")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use pretty_assertions::assert_eq;

    fn execute(game: GameSystem, line: &str, dice: &str) -> Option<String> {
        init_test_logging();
        let mut evaluator = Evaluator::new(replay(dice));
        let result = game.execute(line, &mut evaluator);
        assert!(evaluator.roller().is_exhausted(), "unused dice for {:?}", line);
        result.map(|result| result.to_string())
    }

    fn check(line: &str, dice: &str, expected: &str) {
        assert_eq!(
            execute(GameSystem::default(), line, dice).as_deref(),
            Some(expected),
            "input: {:?}",
            line
        );
    }

    #[test]
    fn test_command_word() {
        assert_eq!(command_word("2d6+1 attack!"), Some("2d6+1"));
        assert_eq!(command_word("  S2d6"), Some("S2d6"));
        assert_eq!(command_word("choice[a b, c d] which?"), Some("choice[a b, c d] which?"));
        assert_eq!(command_word("Schoice[a, b]"), Some("Schoice[a, b]"));
        assert_eq!(command_word("   "), None);
    }

    #[test]
    fn test_find() {
        assert_eq!(GameSystem::find("DiceBot"), Some(Basic.into()));
        assert_eq!(GameSystem::find("battletech"), Some(BattleTech.into()));
        assert_eq!(GameSystem::find("Satasupe"), None);
    }

    #[test]
    fn test_sum_roll_messages() {
        check(
            "2d6+1-1-2-3-4",
            "4/6,1/6",
            "DiceBot : (2D6+1-1-2-3-4) ＞ 5[4,1]+1-1-2-3-4 ＞ -4",
        );
        check("1d20", "9/20", "DiceBot : (1D20) ＞ 9");
        check("[1...3]d6 comment", "2/3,5/6,4/6", "DiceBot : (2D6) ＞ 9[5,4] ＞ 9");
    }

    #[test]
    fn test_comparison_messages() {
        check("2d6>=7", "4/6,1/6", "DiceBot : (2D6>=7) ＞ 5[4,1] ＞ 5 ＞ failure");
        check("1d100<=50", "42/100", "DiceBot : (1D100<=50) ＞ 42 ＞ success");
        check(
            "3u6[6]+1>=10",
            "6/6,2/6,3/6,5/6",
            "DiceBot : (3U6[6]+1>=10) ＞ 16[6,2,3,5]+1 ＞ 17 ＞ success",
        );
    }

    #[test]
    fn test_list_messages() {
        check("2b6", "4/6,1/6", "DiceBot : (2B6) ＞ 4,1");
        check("3b6>=4", "4/6,1/6,6/6", "DiceBot : (3B6>=4) ＞ 4,1,6 ＞ successes 2");
        check(
            "3r6>=4",
            "4/6,1/6,2/6,5/6",
            "DiceBot : (3R6>=4) ＞ 4,2,5 ＞ successes 2",
        );
    }

    #[test]
    fn test_calc_and_choice_messages() {
        check("C(10-4*3/2+2)", "", "DiceBot : C(10-4*3/2+2) ＞ 6");
        check("choice[A,B,C]", "2/3", "DiceBot : (CHOICE[A,B,C]) ＞ B");
        check(
            "choice[Call of Cthulhu, Sword World]",
            "1/2",
            "DiceBot : (CHOICE[Call of Cthulhu,Sword World]) ＞ Call of Cthulhu",
        );
    }

    #[test]
    fn test_secret_and_errors() {
        check("S2d6", "4/6,1/6", "DiceBot : (2D6) ＞ 5[4,1] ＞ 5###secret dice###");
        check(
            "2r6[7]",
            "",
            "DiceBot : 2R6[7] ＞ reroll threshold 7 can never be reached on a d6",
        );
        check("C(1/0)", "", "DiceBot : C(1/0) ＞ cannot divide by zero");
    }

    #[test]
    fn test_not_commands() {
        assert_eq!(execute(GameSystem::default(), "hello", ""), None);
        assert_eq!(execute(GameSystem::default(), "C(1d6)", ""), None);
        assert_eq!(execute(GameSystem::default(), "", ""), None);
    }

    #[test]
    fn test_rolled_dice_recorded() {
        let mut evaluator = Evaluator::new(replay("4/6,1/6"));
        let result = GameSystem::default().execute("S2d6", &mut evaluator).unwrap();
        assert!(result.secret);
        assert_eq!(result.rolled_dice, vec![Die::new(4, 6), Die::new(1, 6)]);
        assert_eq!(result.message(), "(2D6) ＞ 5[4,1] ＞ 5");
    }
}
