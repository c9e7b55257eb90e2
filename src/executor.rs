//! Executor layer for filter evaluation.
//!
//! Evaluation is synchronous CPU work over an already loaded table: the
//! filter executor computes the complete match set, then the limit executor
//! cuts one page out of it.

use crate::access::{Row, Table};
use crate::error::Result;
use crate::expression::CompiledExpression;
use serde::Serialize;

pub mod filter;
pub mod limit;

pub use filter::FilterExecutor;
pub use limit::LimitExecutor;

/// One page of filter output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    /// Column names, aligned with every row of `page`
    pub columns: Vec<String>,
    pub page: Vec<Row>,
    /// Table positions of the rows in `page`
    pub row_indices: Vec<usize>,
    /// Number of matching rows across the whole table
    pub total_count: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl FilterResult {
    /// Page rows as JSON objects keyed by column name
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.page
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(name, value)| (name.clone(), serde_json::Value::from(value)))
                    .collect()
            })
            .collect()
    }

    /// JSON rendering with records instead of positional rows
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "page": self.records(),
            "total_count": self.total_count,
            "offset": self.offset,
            "limit": self.limit,
            "has_more": self.has_more,
        })
    }
}

/// Apply `expression` to every row of `table` and return rows
/// `[offset, offset + limit)` of the match set
pub fn evaluate(
    expression: &CompiledExpression,
    table: &Table,
    offset: usize,
    limit: usize,
) -> Result<FilterResult> {
    let limiter = LimitExecutor::with_offset(limit, offset)?;
    let matches = FilterExecutor::new(table, expression).matching_rows()?;
    Ok(limiter.paginate(table, &matches))
}
