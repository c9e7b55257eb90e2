//! Error types for filter compilation and evaluation.

use crate::access::LogicalType;
use thiserror::Error;

/// Errors that can occur while compiling or evaluating a filter query.
///
/// The caller either gets a complete result or exactly one of these; no
/// partially filtered output is ever produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Malformed query or mismatched column/operator/value tokens
    #[error("Query syntax error at offset {offset}: {message}")]
    QuerySyntax { offset: usize, message: String },

    /// Column referenced by the query is absent from the dataset schema
    #[error("Unknown column '{column}' at offset {offset}")]
    UnknownColumn { column: String, offset: usize },

    #[error("Operator '{operator}' is not supported for column '{column}' of type {column_type}")]
    UnsupportedOperatorForType {
        column: String,
        operator: String,
        column_type: LogicalType,
    },

    #[error("between expects exactly 2 comma-separated values, got {count} in '{raw}'")]
    InvalidBetweenValueCount { raw: String, count: usize },

    #[error("Named list '{list_name}' not found for user '{user_id}'")]
    ListNotFound { user_id: String, list_name: String },

    /// Bubbled unchanged from the schema provider
    #[error("Failed to resolve schema for dataset '{dataset_id}': {reason}")]
    SchemaResolution { dataset_id: String, reason: String },

    #[error("Failed to load dataset '{dataset_id}': {reason}")]
    DatasetLoad { dataset_id: String, reason: String },

    /// Column referenced by a compiled predicate is absent from the loaded table
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Runtime type clash while applying a predicate
    #[error(
        "Evaluation error on column '{column}' with operator '{operator}' \
         (raw value {raw_value:?}, cast value {cast_value}): {message}"
    )]
    Evaluation {
        column: String,
        operator: String,
        raw_value: Option<String>,
        cast_value: String,
        message: String,
    },

    #[error("Invalid pagination: offset={offset}, limit={limit} (limit must be positive)")]
    InvalidPagination { offset: usize, limit: usize },
}

impl FilterError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        FilterError::QuerySyntax {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
