//! Canonical infix rendering of syntax trees.
//!
//! The output reparses to an equivalent tree that renders and evaluates the
//! same. Parentheses are emitted only where precedence or associativity
//! demands them.

use crate::common::*;
use crate::parse::ast::*;
use std::fmt;

/// Renders `node` in infix notation.
///
/// With `show_dice`, sum results of more than one die list their dice
/// (`5[4,1]`); otherwise only the sum is shown.
pub fn infix_notation(node: &Node, show_dice: bool) -> String {
    InfixNotation::new(show_dice).node(node)
}

/// Renders a whole command, including the `C(...)` of calculations.
pub fn command_notation(command: &Command, show_dice: bool) -> String {
    InfixNotation::new(show_dice).command(command)
}

pub fn parenthesize(s: &str) -> String {
    format!("({})", s)
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct InfixNotation {
    show_dice: bool,
}

impl InfixNotation {
    pub const fn new(show_dice: bool) -> Self {
        Self { show_dice }
    }

    pub fn command(&self, command: &Command) -> String {
        match command.kind {
            CommandKind::Calc => format!("C{}", parenthesize(&self.node(&command.expr))),
            _ => self.node(&command.expr),
        }
    }

    pub fn node(&self, node: &Node) -> String {
        self.str_node(node, true)
    }

    /// `leftmost` is whether `node` lies on the left spine of the current
    /// group. Negative numbers are bare only there.
    fn str_node(&self, node: &Node, leftmost: bool) -> String {
        match node {
            Node::Integer(int) => self.str_integer(int.value, leftmost),
            Node::Prefix(prefix) => self.str_prefix(prefix, leftmost),
            Node::Infix(infix) => self.str_infix(infix, leftmost),
            Node::RandomNumber(range) => self.str_random_number(range),
            Node::SumRoll(roll) => self.str_roll(&roll.count, "D", &roll.sides),
            Node::ListRoll(list) => self.str_list(&list.rolls, "B", None),
            Node::RerollList(list) => self.str_list(&list.rolls, "R", list.threshold.as_deref()),
            Node::ExplodeRoll(list) => self.str_list(&list.rolls, "U", list.threshold.as_deref()),
            Node::Compare(cmp) => self.str_compare(cmp, leftmost),
            Node::ChoiceList(choice) => format!("CHOICE[{}]", choice.items.join(",")),
            Node::SumRollResult(result) => self.str_sum_result(result),
            Node::DiceListResult(result) => {
                let values: Vec<_> = result.values().iter().map(Int::to_string).collect();
                values.join(",")
            }
        }
    }

    fn str_integer(&self, value: Int, leftmost: bool) -> String {
        if value < 0 && !leftmost {
            parenthesize(&value.to_string())
        } else {
            value.to_string()
        }
    }

    fn str_prefix(&self, prefix: &Prefix, leftmost: bool) -> String {
        let operand = if prefix.operand.is_primary() {
            self.str_node(&prefix.operand, false)
        } else {
            parenthesize(&self.node(&prefix.operand))
        };

        let negated = format!("-{}", operand);
        if leftmost {
            negated
        } else {
            parenthesize(&negated)
        }
    }

    fn str_infix(&self, infix: &Infix, leftmost: bool) -> String {
        let left = self.str_operand(&infix.left, infix.op, false, leftmost);
        let right = self.str_operand(&infix.right, infix.op, true, false);
        let suffix = match infix.op {
            ArithOp::Div(rounding) => rounding.suffix(),
            _ => "",
        };
        format!("{}{}{}{}", left, infix.op, right, suffix)
    }

    fn str_operand(&self, child: &Node, op: ArithOp, right: bool, leftmost: bool) -> String {
        let needs_parens = is_joined_list(child)
            || match child.precedence().cmp(&op.precedence()) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal if right => !op.right_flatten(),
                std::cmp::Ordering::Equal => !op.left_flatten(),
                std::cmp::Ordering::Greater => false,
            };

        if needs_parens {
            parenthesize(&self.node(child))
        } else {
            self.str_node(child, leftmost)
        }
    }

    /// Roll counts and sides; anything but a plain number or range is grouped.
    fn str_roll_operand(&self, node: &Node) -> String {
        match node {
            Node::Integer(int) if int.value >= 0 => int.value.to_string(),
            Node::RandomNumber(range) => self.str_random_number(range),
            other => parenthesize(&self.node(other)),
        }
    }

    fn str_bound(&self, node: &Node) -> String {
        match node {
            Node::Integer(int) if int.value < 0 => parenthesize(&int.value.to_string()),
            other if other.is_primary() => self.node(other),
            other => parenthesize(&self.node(other)),
        }
    }

    fn str_random_number(&self, range: &RandomNumber) -> String {
        format!("[{}...{}]", self.str_bound(&range.low), self.str_bound(&range.high))
    }

    fn str_roll(&self, count: &Node, letter: &str, sides: &Node) -> String {
        format!(
            "{}{}{}",
            self.str_roll_operand(count),
            letter,
            self.str_roll_operand(sides)
        )
    }

    fn str_list(&self, rolls: &[RollArgs], letter: &str, threshold: Option<&Node>) -> String {
        let rolls: Vec<_> = rolls
            .iter()
            .map(|args| self.str_roll(&args.count, letter, &args.sides))
            .collect();
        match threshold {
            Some(threshold) => format!("{}[{}]", rolls.join("+"), self.node(threshold)),
            None => rolls.join("+"),
        }
    }

    fn str_compare(&self, cmp: &Compare, leftmost: bool) -> String {
        format!(
            "{}{}{}",
            self.str_node(&cmp.left, leftmost),
            cmp.op,
            self.node(&cmp.right)
        )
    }

    fn str_sum_result(&self, result: &SumRollResult) -> String {
        let sum: i64 = result.dice.iter().map(|die| i64::from(die.value)).sum();
        if self.show_dice && result.dice.len() > 1 {
            let values: Vec<_> = result.dice.iter().map(|die| die.value.to_string()).collect();
            format!("{}[{}]", sum, values.join(","))
        } else {
            sum.to_string()
        }
    }
}

/// A list of several rolls sharing one threshold. Its `+` belongs to the list,
/// so it stays grouped inside arithmetic.
fn is_joined_list(node: &Node) -> bool {
    match node {
        Node::ListRoll(list) => list.rolls.len() > 1,
        Node::RerollList(list) => list.rolls.len() > 1,
        Node::ExplodeRoll(list) => list.rolls.len() > 1,
        _ => false,
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&command_notation(self, true))
    }
}
