//! Limit executor implementation.
//!
//! This executor slices the full match set of a filter for pagination.
//! It supports both LIMIT and OFFSET.

use crate::access::Table;
use crate::error::{FilterError, Result};
use crate::executor::FilterResult;
use log::debug;

/// Executor that returns one page of matched rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitExecutor {
    /// Maximum number of rows to return
    limit: usize,
    /// Number of matched rows to skip before returning
    offset: usize,
}

impl LimitExecutor {
    /// Create a new limit executor with only limit
    pub fn new(limit: usize) -> Result<Self> {
        Self::with_offset(limit, 0)
    }

    /// Create a new limit executor with limit and offset
    ///
    /// # Arguments
    /// * `limit` - The maximum number of rows to return; must be positive
    /// * `offset` - The number of matched rows to skip
    pub fn with_offset(limit: usize, offset: usize) -> Result<Self> {
        if limit == 0 {
            return Err(FilterError::InvalidPagination { offset, limit });
        }
        Ok(Self { limit, offset })
    }

    /// Slice `matches` (row indices into `table`) into a page
    pub fn paginate(&self, table: &Table, matches: &[usize]) -> FilterResult {
        let total_count = matches.len();
        let start = self.offset.min(total_count);
        let end = self.offset.saturating_add(self.limit).min(total_count);

        let row_indices = matches[start..end].to_vec();
        let page = row_indices
            .iter()
            .filter_map(|&index| table.row(index).cloned())
            .collect();

        debug!(
            "page [{}, {}) of {} matched row(s)",
            start, end, total_count
        );

        FilterResult {
            columns: table.columns().to_vec(),
            page,
            row_indices,
            total_count,
            offset: self.offset,
            limit: self.limit,
            has_more: self.offset.saturating_add(self.limit) < total_count,
        }
    }
}
