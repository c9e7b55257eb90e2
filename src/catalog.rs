//! Interfaces to the collaborators that own schemas, datasets and named lists.
//!
//! The filter core only reads through these traits. Each call is an await
//! point; implementations are responsible for their own I/O timeouts.

use crate::access::{LogicalType, Table, Value};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub mod inference;
pub mod memory;

pub use inference::{infer_column_type, infer_schema};
pub use memory::{InMemoryCatalog, InMemoryListStore};

/// Column name to inferred logical type, resolved fresh per evaluation
pub type ColumnSchema = HashMap<String, LogicalType>;

/// Supplies the logical column types of a dataset
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Fails with `SchemaResolution` if the dataset cannot be introspected
    async fn get_column_schema(&self, dataset_id: &str) -> Result<ColumnSchema>;
}

/// Loads a dataset snapshot into memory
#[async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn load_dataset(&self, dataset_id: &str) -> Result<Arc<Table>>;
}

/// Stores user-owned named lists of scalar values
#[async_trait]
pub trait NamedListStore: Send + Sync {
    /// Fails with `ListNotFound` if the user has no list with that name
    async fn resolve_named_list(&self, user_id: &str, list_name: &str) -> Result<Vec<Value>>;
}
