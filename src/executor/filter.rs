//! Filter executor implementation.
//!
//! This executor applies a compiled expression to every row of a table and
//! produces the full boolean mask, so the match count is always exact.

use crate::access::Table;
use crate::error::Result;
use crate::expression::{CompiledExpression, PredicateEvaluator};
use log::debug;

/// Executor that filters table rows based on a compiled expression
pub struct FilterExecutor<'a> {
    /// Table to scan
    table: &'a Table,
    /// Compiled filter expression
    expression: &'a CompiledExpression,
}

impl<'a> FilterExecutor<'a> {
    /// Create a new filter executor
    ///
    /// # Arguments
    /// * `table` - The table whose rows are tested
    /// * `expression` - The compiled filter expression
    pub fn new(table: &'a Table, expression: &'a CompiledExpression) -> Self {
        Self { table, expression }
    }

    /// Evaluate the expression for every row.
    ///
    /// Fails on the first row that raises an evaluation error; no partial
    /// mask is returned.
    pub fn mask(&self) -> Result<Vec<bool>> {
        let evaluator = PredicateEvaluator::new(self.table, self.expression)?;
        self.table
            .rows()
            .iter()
            .map(|row| evaluator.matches(row))
            .collect()
    }

    /// Indices of matching rows, in table order
    pub fn matching_rows(&self) -> Result<Vec<usize>> {
        let matches: Vec<usize> = self
            .mask()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, matched)| matched.then_some(index))
            .collect();

        debug!(
            "filter matched {} of {} row(s)",
            matches.len(),
            self.table.len()
        );
        Ok(matches)
    }
}
