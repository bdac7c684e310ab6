use crate::common::Die;

/// Dice rolled during one evaluation, in roll order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Environment {
    rolled_dice: Vec<Die>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the roll log.
    pub fn rolled_dice(&self) -> Vec<Die> {
        self.rolled_dice.clone()
    }

    pub fn num_rolled(&self) -> usize {
        self.rolled_dice.len()
    }

    pub fn push_rolled_die(&mut self, die: Die) {
        self.rolled_dice.push(die);
    }

    pub fn append_rolled_dice(&mut self, dice: &[Die]) {
        self.rolled_dice.extend_from_slice(dice);
    }

    pub fn clear_rolled_dice(&mut self) {
        self.rolled_dice.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_append_only_copy() {
        let mut env = Environment::new();
        env.push_rolled_die(Die::new(4, 6));
        env.append_rolled_dice(&[Die::new(1, 6), Die::new(3, 4)]);

        let mut copy = env.rolled_dice();
        copy.clear();

        assert_eq!(env.num_rolled(), 3);
        assert_eq!(
            env.rolled_dice(),
            vec![Die::new(4, 6), Die::new(1, 6), Die::new(3, 4)]
        );

        env.clear_rolled_dice();
        assert!(env.rolled_dice().is_empty());
    }
}
