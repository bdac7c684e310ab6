use super::{EResult, Environment, EvaluationError, Evaluator, Object, Roller};
use crate::common::*;
use crate::parse::ast::*;
use crate::parse::Token;

type Evaluated = (Object, Option<Node>);

impl<R: Roller> Evaluator<R> {
    /// Evaluates a resolved tree.
    ///
    /// Dice are drawn left to right, depth first. Rolls are replaced in
    /// place by their results and random numbers by the drawn integer, so
    /// evaluating the same tree again draws nothing.
    pub fn evaluate(&mut self, node: &mut Node, env: &mut Environment) -> EResult<Object> {
        let (object, replacement) = match node {
            Node::Integer(int) => (Object::Integer(int.value), None),
            Node::Prefix(prefix) => {
                let value = self.evaluate(&mut prefix.operand, env)?.as_integer()?;
                let negated = value.checked_neg().ok_or(EvaluationError::Overflow)?;
                (Object::Integer(negated), None)
            }
            Node::Infix(infix) => {
                let left = self.evaluate(&mut infix.left, env)?.as_integer()?;
                let right = self.evaluate(&mut infix.right, env)?.as_integer()?;
                (Object::Integer(arithmetic(infix.op, left, right)?), None)
            }
            Node::RandomNumber(range) => self.random_number(range, env)?,
            Node::SumRoll(roll) => {
                let count = resolved(&roll.count)?;
                let sides = resolved(&roll.sides)?;
                let dice = self.roll_dice(count, sides, env)?;
                sum_result(&roll.token, dice)?
            }
            Node::ListRoll(list) => {
                let mut dice = Vec::new();
                for args in list.rolls.iter() {
                    let (count, sides) = resolved_args(args)?;
                    dice.extend(self.roll_dice(count, sides, env)?);
                }
                list_result(&list.token, dice)
            }
            Node::RerollList(list) => {
                let threshold = list.threshold.as_deref().map(resolved).transpose()?;
                self.reroll_list(list, threshold, env)?
            }
            Node::ExplodeRoll(list) => self.explode_roll(list, env)?,
            Node::Compare(cmp) => (self.compare(cmp, env)?, None),
            Node::ChoiceList(_) => return Err(EvaluationError::NotEvaluable("choice")),
            Node::SumRollResult(result) => {
                let sum = result.value().ok_or(EvaluationError::Overflow)?;
                (Object::Integer(sum), None)
            }
            Node::DiceListResult(result) => (Object::List(result.values()), None),
        };

        if let Some(replacement) = replacement {
            *node = replacement;
        }
        Ok(object)
    }

    pub fn evaluate_command(
        &mut self,
        command: &mut Command,
        env: &mut Environment,
    ) -> EResult<Object> {
        self.evaluate(&mut command.expr, env)
    }

    /// Picks one item of a choice with a single die.
    pub fn choose<'c>(&mut self, choice: &'c ChoiceList, env: &mut Environment) -> EResult<&'c str> {
        let sides = Int::try_from(choice.items.len()).map_err(|_| EvaluationError::Overflow)?;
        let die = self.roll_die(sides, env)?;
        usize::try_from(die.value - 1)
            .ok()
            .and_then(|index| choice.items.get(index))
            .map(String::as_str)
            .ok_or(EvaluationError::InvalidSides(sides))
    }

    fn random_number(&mut self, range: &mut RandomNumber, env: &mut Environment) -> EResult<Evaluated> {
        let low = self.evaluate(&mut range.low, env)?.as_integer()?;
        let high = self.evaluate(&mut range.high, env)?.as_integer()?;
        if high < low {
            return Err(EvaluationError::EmptyRange { low, high });
        }

        let sides = high
            .checked_sub(low)
            .and_then(|width| width.checked_add(1))
            .ok_or(EvaluationError::Overflow)?;
        let die = self.roll_die(sides, env)?;
        let value = low + (die.value - 1);

        let leaf = Integer::synthetic(value, range.token.span.clone());
        Ok((Object::Integer(value), Some(leaf.into())))
    }

    fn reroll_list(
        &mut self,
        list: &RerollList,
        threshold: Option<Int>,
        env: &mut Environment,
    ) -> EResult<Evaluated> {
        let mut kept = Vec::new();
        for args in list.rolls.iter() {
            let (count, sides) = resolved_args(args)?;
            super::check_roll_args(count, sides)?;
            // without a threshold only ones are rerolled
            let threshold = threshold.unwrap_or_else(|| sides.min(2));
            if threshold > sides {
                return Err(EvaluationError::UnboundedReroll { threshold, sides });
            }

            for _ in 0..count {
                let mut die = self.roll_die(sides, env)?;
                while die.value < threshold {
                    die = self.roll_die(sides, env)?;
                }
                kept.push(die);
            }
        }
        Ok(list_result(&list.token, kept))
    }

    fn explode_roll(&mut self, list: &ExplodeRoll, env: &mut Environment) -> EResult<Evaluated> {
        let threshold = list.threshold.as_deref().map(resolved).transpose()?;
        if let Some(threshold) = threshold.filter(|&t| t <= 1) {
            return Err(EvaluationError::UnboundedExplosion { threshold });
        }
        let explodes = |die: &Die| threshold.map_or(false, |t| die.value >= t);

        let mut dice = Vec::new();
        for args in list.rolls.iter() {
            let (count, sides) = resolved_args(args)?;
            super::check_roll_args(count, sides)?;

            for _ in 0..count {
                let mut die = self.roll_die(sides, env)?;
                dice.push(die);
                while explodes(&die) {
                    die = self.roll_die(sides, env)?;
                    dice.push(die);
                }
            }
        }
        sum_result(&list.token, dice)
    }

    fn compare(&mut self, cmp: &mut Compare, env: &mut Environment) -> EResult<Object> {
        let left = self.evaluate(&mut cmp.left, env)?;
        let right = self.evaluate(&mut cmp.right, env)?.as_integer()?;
        compare_objects(cmp.op, left, right)
    }
}

fn resolved(node: &Node) -> EResult<Int> {
    match node {
        Node::Integer(int) => Ok(int.value),
        other => Err(EvaluationError::UnresolvedArgument {
            position: other.token().span.start,
        }),
    }
}

fn resolved_args(args: &RollArgs) -> EResult<(Int, Int)> {
    Ok((resolved(&args.count)?, resolved(&args.sides)?))
}

fn sum_result(token: &Token, dice: Vec<Die>) -> EResult<Evaluated> {
    let result = SumRollResult::new(token.clone(), dice);
    let sum = result.value().ok_or(EvaluationError::Overflow)?;
    Ok((Object::Integer(sum), Some(result.into())))
}

fn list_result(token: &Token, dice: Vec<Die>) -> Evaluated {
    let result = DiceListResult::new(token.clone(), dice);
    (Object::List(result.values()), Some(result.into()))
}

fn compare_objects(op: CompareOp, left: Object, right: Int) -> EResult<Object> {
    match left {
        Object::Integer(value) => Ok(Object::SF(op.apply(value, right))),
        Object::List(values) => {
            let successes = values.iter().filter(|&&v| op.apply(v, right)).count();
            Int::try_from(successes)
                .map(Object::Integer)
                .map_err(|_| EvaluationError::Overflow)
        }
        other => Err(EvaluationError::TypeMismatch {
            expected: "integer or list",
            found: other.type_name(),
        }),
    }
}

fn arithmetic(op: ArithOp, lhs: Int, rhs: Int) -> EResult<Int> {
    let value = match op {
        ArithOp::Add => lhs.checked_add(rhs),
        ArithOp::Sub => lhs.checked_sub(rhs),
        ArithOp::Mul => lhs.checked_mul(rhs),
        ArithOp::Div(rounding) => return divide(lhs, rhs, rounding),
    };
    value.ok_or(EvaluationError::Overflow)
}

fn divide(lhs: Int, rhs: Int, rounding: Rounding) -> EResult<Int> {
    if rhs == 0 {
        return Err(EvaluationError::ZeroDivision);
    }
    if rounding == Rounding::Nearest {
        return round_half_up(lhs, rhs);
    }

    let quotient = lhs.checked_div(rhs).ok_or(EvaluationError::Overflow)?;
    let remainder = lhs.checked_rem(rhs).ok_or(EvaluationError::Overflow)?;
    if remainder == 0 || rounding == Rounding::Truncate {
        return Ok(quotient);
    }

    let step = if (lhs < 0) != (rhs < 0) { -1 } else { 1 };
    quotient.checked_add(step).ok_or(EvaluationError::Overflow)
}

/// `floor(lhs / rhs + 1/2)`, so ties go toward positive infinity.
fn round_half_up(lhs: Int, rhs: Int) -> EResult<Int> {
    let mut numerator = 2 * i64::from(lhs) + i64::from(rhs);
    let mut denominator = 2 * i64::from(rhs);
    if denominator < 0 {
        numerator = -numerator;
        denominator = -denominator;
    }
    Int::try_from(numerator.div_euclid(denominator)).map_err(|_| EvaluationError::Overflow)
}
