//! Text fixtures that pin a bot's replies to recorded dice.
//!
//! ```text
//! input:
//! 2d6+1
//! output:
//! DiceBot : (2D6+1) ＞ 5[4,1]+1 ＞ 6
//! rand:4/6,1/6
//! ```
//!
//! A fixture file holds several cases separated by a line of 28 `=`; its
//! stem names the game system.

use crate::common::{Die, Int};
use crate::dicebot::GameSystem;
use crate::eval::{Evaluator, ReplayRoller};
use std::path::Path;

const SEPARATOR: &str = "\n============================\n";

#[derive(thiserror::Error, Debug)]
pub enum TestCaseError {
    #[error("{game_id}#{index}: malformed test case")]
    Syntax { game_id: String, index: usize },
    #[error("die #{index}: {text:?} is not of the form value/sides")]
    Dice { index: usize, text: String },
    #[error("{0}: no such game system")]
    UnknownGame(String),
    #[error("{name}: output mismatch\nexpected: {expected:?}\n  actual: {actual:?}")]
    OutputMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("{name}: {count} recorded dice were not rolled")]
    UnusedDice { name: String, count: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiceBotTestCase {
    pub game_id: String,
    pub index: usize,
    pub input: Vec<String>,
    pub output: String,
    pub dice: Vec<Die>,
}

impl DiceBotTestCase {
    pub fn name(&self) -> String {
        format!("{}#{}", self.game_id, self.index)
    }

    /// Runs every input line through the game's bot, replaying the recorded
    /// dice, and compares the joined replies with the expected output.
    pub fn run(&self) -> Result<(), TestCaseError> {
        let game = GameSystem::find(&self.game_id)
            .ok_or_else(|| TestCaseError::UnknownGame(self.game_id.clone()))?;
        let mut evaluator = Evaluator::new(ReplayRoller::new(self.dice.clone()));

        let replies: Vec<_> = self
            .input
            .iter()
            .filter_map(|line| game.execute(line, &mut evaluator))
            .map(|result| result.to_string())
            .collect();
        let actual = replies.join("\n");

        if actual != self.output {
            return Err(TestCaseError::OutputMismatch {
                name: self.name(),
                expected: self.output.clone(),
                actual,
            });
        }

        let count = evaluator.roller().remaining().len();
        if count > 0 {
            return Err(TestCaseError::UnusedDice {
                name: self.name(),
                count,
            });
        }
        Ok(())
    }
}

pub fn parse(source: &str, game_id: &str, index: usize) -> Result<DiceBotTestCase, TestCaseError> {
    let syntax = || TestCaseError::Syntax {
        game_id: game_id.to_string(),
        index,
    };

    let body = source.strip_prefix("input:\n").ok_or_else(syntax)?;
    let (rest, rand) = body.rsplit_once("\nrand:").ok_or_else(syntax)?;
    let (input, output) = rest.rsplit_once("\noutput:").ok_or_else(syntax)?;
    if input.is_empty() {
        return Err(syntax());
    }

    Ok(DiceBotTestCase {
        game_id: game_id.to_string(),
        index,
        input: input.split('\n').map(str::to_string).collect(),
        output: output.trim_start_matches('\n').to_string(),
        dice: parse_dice(rand)?,
    })
}

/// Parses recorded dice such as `4/6, 1/6`.
pub fn parse_dice(source: &str) -> Result<Vec<Die>, TestCaseError> {
    if source.is_empty() {
        return Ok(Vec::new());
    }

    source
        .split(',')
        .enumerate()
        .map(|(i, text)| {
            parse_die(text.trim()).ok_or_else(|| TestCaseError::Dice {
                index: i + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

fn parse_die(text: &str) -> Option<Die> {
    let (value, sides) = text.split_once('/')?;
    Some(Die::new(parse_digits(value)?, parse_digits(sides)?))
}

fn parse_digits(s: &str) -> Option<Int> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<DiceBotTestCase>, TestCaseError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let game_id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    parse_cases(&content, game_id)
}

fn parse_cases(content: &str, game_id: &str) -> Result<Vec<DiceBotTestCase>, TestCaseError> {
    let content = content.replace("\r\n", "\n");
    content
        .trim_end_matches('\n')
        .split(SEPARATOR)
        .enumerate()
        .map(|(i, source)| parse(source, game_id, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        let case = parse(
            "input:\n2d6+1-1-2-3-4\noutput:\nDiceBot : (2D6+1-1-2-3-4) ＞ 5[4,1]+1-1-2-3-4 ＞ -4\nrand:4/6,1/6",
            "DiceBot",
            1,
        )
        .unwrap();
        assert_eq!(
            case,
            DiceBotTestCase {
                game_id: "DiceBot".to_string(),
                index: 1,
                input: vec!["2d6+1-1-2-3-4".to_string()],
                output: "DiceBot : (2D6+1-1-2-3-4) ＞ 5[4,1]+1-1-2-3-4 ＞ -4".to_string(),
                dice: vec![Die::new(4, 6), Die::new(1, 6)],
            }
        );
    }

    #[test]
    fn test_parse_multiline() {
        let case = parse(
            "input:\nCT\nSCT\noutput:\nfirst\nsecond\nrand:1/6, 3/6",
            "BattleTech",
            2,
        )
        .unwrap();
        assert_eq!(case.input, vec!["CT", "SCT"]);
        assert_eq!(case.output, "first\nsecond");
        assert_eq!(case.dice, vec![Die::new(1, 6), Die::new(3, 6)]);
        assert_eq!(case.name(), "BattleTech#2");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("", "DiceBot", 1), Err(TestCaseError::Syntax { .. })));
        assert!(matches!(
            parse("input:", "DiceBot", 1),
            Err(TestCaseError::Syntax { .. })
        ));
        assert!(matches!(
            parse("input:\noutput:x\nrand:", "DiceBot", 1),
            Err(TestCaseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_parse_cases_with_crlf() {
        let content = format!(
            "input:\r\n1d6\r\noutput:\r\nDiceBot : (1D6) ＞ 3\r\nrand:3/6{}input:\r\nC(1+2)\r\noutput:\r\nDiceBot : C(1+2) ＞ 3\r\nrand:\r\n",
            SEPARATOR.replace('\n', "\r\n")
        );
        let cases = parse_cases(&content, "DiceBot").unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].input, vec!["1d6"]);
        assert_eq!(cases[0].output, "DiceBot : (1D6) ＞ 3");
        assert_eq!(cases[0].dice, vec![Die::new(3, 6)]);
        assert_eq!(cases[1].input, vec!["C(1+2)"]);
        assert_eq!(cases[1].index, 2);
        for case in &cases {
            case.run().unwrap();
        }
    }

    #[test]
    fn test_parse_dice() {
        assert_eq!(parse_dice("").unwrap(), vec![]);
        assert_eq!(parse_dice("1/6").unwrap(), vec![Die::new(1, 6)]);
        assert_eq!(
            parse_dice("1/6,2/6, 3/6").unwrap(),
            vec![Die::new(1, 6), Die::new(2, 6), Die::new(3, 6)]
        );

        for bad in ["1", "1/6,1", "a1/6", "+1/6", "1/"] {
            assert!(
                matches!(parse_dice(bad), Err(TestCaseError::Dice { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_run() {
        let case = parse(
            "input:\nS2d6\noutput:\nDiceBot : (2D6) ＞ 5[4,1] ＞ 5###secret dice###\nrand:4/6,1/6",
            "DiceBot",
            1,
        )
        .unwrap();
        case.run().unwrap();
    }

    #[test]
    fn test_run_failures() {
        let mismatch = DiceBotTestCase {
            game_id: "DiceBot".to_string(),
            index: 1,
            input: vec!["1d6".to_string()],
            output: "DiceBot : (1D6) ＞ 4".to_string(),
            dice: vec![Die::new(3, 6)],
        };
        assert!(matches!(
            mismatch.run(),
            Err(TestCaseError::OutputMismatch { .. })
        ));

        let unused = DiceBotTestCase {
            output: "DiceBot : (1D6) ＞ 3".to_string(),
            dice: vec![Die::new(3, 6), Die::new(5, 6)],
            ..mismatch.clone()
        };
        assert!(matches!(
            unused.run(),
            Err(TestCaseError::UnusedDice { count: 1, .. })
        ));

        let unknown = DiceBotTestCase {
            game_id: "Satasupe".to_string(),
            ..mismatch
        };
        assert!(matches!(unknown.run(), Err(TestCaseError::UnknownGame(_))));
    }
}
