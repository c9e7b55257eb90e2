//! In-memory collaborators for embedding and tests.

use crate::access::{Table, Value};
use crate::catalog::{infer_schema, ColumnSchema, DatasetLoader, NamedListStore, SchemaProvider};
use crate::error::{FilterError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered dataset and its optional explicit schema
struct DatasetEntry {
    table: Arc<Table>,
    schema: Option<ColumnSchema>,
}

/// Dataset registry that serves both schemas and table snapshots.
///
/// Without an explicit schema, column types are inferred from the data on
/// every schema request.
#[derive(Default)]
pub struct InMemoryCatalog {
    datasets: RwLock<HashMap<String, DatasetEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a dataset whose schema is inferred
    pub fn register(&self, dataset_id: impl Into<String>, table: Table) {
        self.datasets.write().insert(
            dataset_id.into(),
            DatasetEntry {
                table: Arc::new(table),
                schema: None,
            },
        );
    }

    /// Register (or replace) a dataset with a caller-supplied schema
    pub fn register_with_schema(
        &self,
        dataset_id: impl Into<String>,
        table: Table,
        schema: ColumnSchema,
    ) {
        self.datasets.write().insert(
            dataset_id.into(),
            DatasetEntry {
                table: Arc::new(table),
                schema: Some(schema),
            },
        );
    }

    pub fn remove(&self, dataset_id: &str) -> bool {
        self.datasets.write().remove(dataset_id).is_some()
    }

    pub fn dataset_ids(&self) -> Vec<String> {
        self.datasets.read().keys().cloned().collect()
    }
}

#[async_trait]
impl SchemaProvider for InMemoryCatalog {
    async fn get_column_schema(&self, dataset_id: &str) -> Result<ColumnSchema> {
        let datasets = self.datasets.read();
        let entry = datasets
            .get(dataset_id)
            .ok_or_else(|| FilterError::SchemaResolution {
                dataset_id: dataset_id.to_string(),
                reason: "dataset is not registered".to_string(),
            })?;

        Ok(match &entry.schema {
            Some(schema) => schema.clone(),
            None => infer_schema(&entry.table),
        })
    }
}

#[async_trait]
impl DatasetLoader for InMemoryCatalog {
    async fn load_dataset(&self, dataset_id: &str) -> Result<Arc<Table>> {
        self.datasets
            .read()
            .get(dataset_id)
            .map(|entry| entry.table.clone())
            .ok_or_else(|| FilterError::DatasetLoad {
                dataset_id: dataset_id.to_string(),
                reason: "dataset is not registered".to_string(),
            })
    }
}

/// Named lists keyed by (user, list name)
#[derive(Default)]
pub struct InMemoryListStore {
    lists: DashMap<(String, String), Vec<Value>>,
}

impl InMemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a user's list
    pub fn insert(&self, user_id: impl Into<String>, list_name: impl Into<String>, items: Vec<Value>) {
        self.lists.insert((user_id.into(), list_name.into()), items);
    }

    pub fn remove(&self, user_id: &str, list_name: &str) -> bool {
        self.lists
            .remove(&(user_id.to_string(), list_name.to_string()))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[async_trait]
impl NamedListStore for InMemoryListStore {
    async fn resolve_named_list(&self, user_id: &str, list_name: &str) -> Result<Vec<Value>> {
        self.lists
            .get(&(user_id.to_string(), list_name.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FilterError::ListNotFound {
                user_id: user_id.to_string(),
                list_name: list_name.to_string(),
            })
    }
}
