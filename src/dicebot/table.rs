use crate::common::Int;
use crate::eval::{Environment, Evaluator, Roller};
use crate::parse::parse;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TableError {
    #[error(transparent)]
    Roll(#[from] crate::Error),
    #[error("{table}: no entry for {sum}")]
    NoEntry { table: &'static str, sum: Int },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SparseTableItem {
    /// Largest sum that selects this item.
    pub max: Int,
    pub content: &'static str,
}

/// A table indexed by the sum of `dice_count` dice, where each item covers
/// the sums from just above the previous item's `max` up to its own.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SparseTable {
    pub name: &'static str,
    pub dice_count: Int,
    pub dice_sides: Int,
    pub items: &'static [SparseTableItem],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TableRoll {
    pub sum: Int,
    pub item: &'static SparseTableItem,
}

impl SparseTable {
    pub const fn new(
        name: &'static str,
        dice_count: Int,
        dice_sides: Int,
        items: &'static [SparseTableItem],
    ) -> Self {
        Self {
            name,
            dice_count,
            dice_sides,
            items,
        }
    }

    pub fn roll<R: Roller>(
        &self,
        evaluator: &mut Evaluator<R>,
        env: &mut Environment,
    ) -> Result<TableRoll, TableError> {
        let notation = format!("{}D{}", self.dice_count, self.dice_sides);
        let mut command = parse(self.name, &notation).map_err(crate::Error::from)?;
        let sum = evaluator
            .evaluate_command(&mut command, env)
            .map_err(crate::Error::from)?
            .as_integer()
            .map_err(crate::Error::from)?;
        self.select(sum)
    }

    pub fn select(&self, sum: Int) -> Result<TableRoll, TableError> {
        self.items
            .iter()
            .find(|item| sum <= item.max)
            .map(|item| TableRoll { sum, item })
            .ok_or(TableError::NoEntry {
                table: self.name,
                sum,
            })
    }
}
