use super::{Environment, Evaluator, ResolutionError, Roller};
use crate::parse::ast::*;

type RResult = Result<(), ResolutionError>;

impl<R: Roller> Evaluator<R> {
    /// Replaces the count, sides and threshold of every roll with integer leaves.
    ///
    /// Random numbers inside those arguments are drawn here and logged in
    /// `env`. A roll in argument position is rejected. Running this twice
    /// is the same as running it once.
    pub fn resolve_variable_arguments(&mut self, node: &mut Node, env: &mut Environment) -> RResult {
        match node {
            Node::Prefix(prefix) => self.resolve_variable_arguments(&mut prefix.operand, env),
            Node::Infix(infix) => {
                self.resolve_variable_arguments(&mut infix.left, env)?;
                self.resolve_variable_arguments(&mut infix.right, env)
            }
            Node::Compare(cmp) => {
                self.resolve_variable_arguments(&mut cmp.left, env)?;
                self.resolve_variable_arguments(&mut cmp.right, env)
            }
            Node::SumRoll(roll) => {
                self.resolve_argument(&mut roll.count, env)?;
                self.resolve_argument(&mut roll.sides, env)
            }
            Node::ListRoll(list) => self.resolve_list(&mut list.rolls, None, env),
            Node::RerollList(list) => {
                self.resolve_list(&mut list.rolls, list.threshold.as_deref_mut(), env)
            }
            Node::ExplodeRoll(list) => {
                self.resolve_list(&mut list.rolls, list.threshold.as_deref_mut(), env)
            }
            Node::RandomNumber(range) if range.is_variable() => {
                self.resolve_argument(&mut range.low, env)?;
                self.resolve_argument(&mut range.high, env)
            }
            _ => Ok(()),
        }
    }

    pub fn resolve_command(&mut self, command: &mut Command, env: &mut Environment) -> RResult {
        self.resolve_variable_arguments(&mut command.expr, env)
    }

    fn resolve_list(
        &mut self,
        rolls: &mut [RollArgs],
        threshold: Option<&mut Node>,
        env: &mut Environment,
    ) -> RResult {
        for args in rolls {
            self.resolve_argument(&mut args.count, env)?;
            self.resolve_argument(&mut args.sides, env)?;
        }
        match threshold {
            Some(threshold) => self.resolve_argument(threshold, env),
            None => Ok(()),
        }
    }

    fn resolve_argument(&mut self, slot: &mut Node, env: &mut Environment) -> RResult {
        if slot.is_variable() {
            return Err(ResolutionError::NestedRoll {
                position: slot.token().span.start,
            });
        }

        let value = self.evaluate(slot, env)?.as_integer()?;
        *slot = Integer::synthetic(value, slot.token().span.clone()).into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::eval::EvaluationError;
    use crate::parse::parse;

    fn resolve(s: &str, dice: &str) -> (Result<(), ResolutionError>, Command, Environment) {
        let mut command = parse("test", s).unwrap();
        let mut env = Environment::new();
        let mut evaluator = Evaluator::new(replay(dice));
        let result = evaluator.resolve_command(&mut command, &mut env);
        (result, command, env)
    }

    fn check(s: &str, dice: &str, expected: &str) {
        let (result, command, _) = resolve(s, dice);
        result.unwrap();
        assert_eq!(command.sexp(), expected);
    }

    #[test]
    fn test_resolve_arithmetic_arguments() {
        check(
            "(2*3-4)d6-1d4+1",
            "",
            "(DRollExpr (+ (- (DRoll 2 6) (DRoll 1 4)) 1))",
        );
        check("2d(1+5)", "", "(DRollExpr (DRoll 2 6))");
        check("-(1+1)d6", "", "(DRollExpr (- (DRoll 2 6)))");
        check(
            "3r6+(1+1)r6[2*3]",
            "",
            "(RRollList (RRollList 6 (RRoll 3 6) (RRoll 2 6)))",
        );
    }

    #[test]
    fn test_resolve_random_number_argument() {
        let (result, command, env) = resolve("[1...3]d6", "2/3");
        result.unwrap();
        assert_eq!(command.sexp(), "(DRollExpr (DRoll 2 6))");
        assert_eq!(env.rolled_dice(), vec![Die::new(2, 3)]);
    }

    #[test]
    fn test_top_level_random_number_untouched() {
        check("[1...3]+1", "", "(DRollExpr (+ (Rand 1 3) 1))");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (result, mut command, mut env) = resolve("[1...3]d([2...4]+2)", "3/3,1/3");
        result.unwrap();
        let once = command.sexp();

        let mut evaluator = Evaluator::new(replay(""));
        evaluator.resolve_command(&mut command, &mut env).unwrap();
        assert_eq!(command.sexp(), once);
        assert_eq!(once, "(DRollExpr (DRoll 3 4))");
        assert_eq!(env.num_rolled(), 2);
    }

    #[test]
    fn test_nested_roll() {
        let (result, _, _) = resolve("(2d6)d6", "");
        assert_eq!(result, Err(ResolutionError::NestedRoll { position: 2 }));

        let (result, _, _) = resolve("2d[1...2d6]", "");
        assert_eq!(result, Err(ResolutionError::NestedRoll { position: 2 }));
    }

    #[test]
    fn test_resolution_evaluation_errors() {
        let (result, _, _) = resolve("2d(6/0)", "");
        assert_eq!(
            result,
            Err(ResolutionError::Evaluation(EvaluationError::ZeroDivision))
        );

        let (result, _, _) = resolve("[3...1]d6", "");
        assert_eq!(
            result,
            Err(ResolutionError::Evaluation(EvaluationError::EmptyRange {
                low: 3,
                high: 1
            }))
        );
    }
}
