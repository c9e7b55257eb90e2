//! Filter sessions tying the query compiler to its collaborators.
//!
//! A session holds no per-request state. Every request resolves its own
//! schema, named lists and dataset snapshot, so concurrent requests share
//! nothing mutable.

use crate::catalog::{DatasetLoader, InMemoryCatalog, InMemoryListStore, NamedListStore, SchemaProvider};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::executor::{self, FilterExecutor, FilterResult};
use crate::expression::{CompiledExpression, ExpressionBuilder};
use crate::query::parse_query;
use log::{debug, info};
use std::sync::Arc;

/// One filter request against a user's dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub user_id: String,
    pub dataset_id: String,
    pub query: String,
    pub offset: usize,
    /// Falls back to the configured default page size
    pub limit: Option<usize>,
}

impl FilterRequest {
    pub fn new(
        user_id: impl Into<String>,
        dataset_id: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            dataset_id: dataset_id.into(),
            query: query.into(),
            offset: 0,
            limit: None,
        }
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// Entry point for compiling and running filter queries.
pub struct FilterSession {
    schemas: Arc<dyn SchemaProvider>,
    datasets: Arc<dyn DatasetLoader>,
    lists: Arc<dyn NamedListStore>,
    config: FilterConfig,
}

impl FilterSession {
    /// Creates a session with the default page-size configuration.
    pub fn new(
        schemas: Arc<dyn SchemaProvider>,
        datasets: Arc<dyn DatasetLoader>,
        lists: Arc<dyn NamedListStore>,
    ) -> Self {
        Self::with_config(schemas, datasets, lists, FilterConfig::default())
    }

    pub fn with_config(
        schemas: Arc<dyn SchemaProvider>,
        datasets: Arc<dyn DatasetLoader>,
        lists: Arc<dyn NamedListStore>,
        config: FilterConfig,
    ) -> Self {
        Self {
            schemas,
            datasets,
            lists,
            config,
        }
    }

    /// Creates a session whose catalog serves both schemas and datasets.
    pub fn in_memory(
        catalog: Arc<InMemoryCatalog>,
        lists: Arc<InMemoryListStore>,
        config: FilterConfig,
    ) -> Self {
        Self::with_config(catalog.clone(), catalog, lists, config)
    }

    /// Validates and compiles a query without touching the dataset rows.
    ///
    /// Syntax errors are reported before the schema is requested.
    pub async fn compile(
        &self,
        user_id: &str,
        dataset_id: &str,
        query: &str,
    ) -> Result<CompiledExpression> {
        let parsed = parse_query(query)?;
        let schema = self.schemas.get_column_schema(dataset_id).await?;
        debug!(
            "resolved schema for dataset '{}' ({} column(s))",
            dataset_id,
            schema.len()
        );

        ExpressionBuilder::new(&schema, self.lists.as_ref(), user_id)
            .compile_parsed(query, &parsed)
            .await
    }

    /// Runs a request and returns one page of matching rows.
    pub async fn filter(&self, request: &FilterRequest) -> Result<FilterResult> {
        let limit = self.config.resolve_limit(request.limit, request.offset)?;
        let expression = self
            .compile(&request.user_id, &request.dataset_id, &request.query)
            .await?;
        let table = self.datasets.load_dataset(&request.dataset_id).await?;

        let result = executor::evaluate(&expression, &table, request.offset, limit)?;
        info!(
            "filter on dataset '{}' for user '{}': {} match(es), returned {}",
            request.dataset_id,
            request.user_id,
            result.total_count,
            result.page.len()
        );
        Ok(result)
    }

    /// Number of rows matching `query`, without building a page.
    pub async fn count(&self, user_id: &str, dataset_id: &str, query: &str) -> Result<usize> {
        let expression = self.compile(user_id, dataset_id, query).await?;
        let table = self.datasets.load_dataset(dataset_id).await?;
        let matches = FilterExecutor::new(&table, &expression).matching_rows()?;
        Ok(matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{LogicalType, Table, Value};
    use crate::catalog::ColumnSchema;
    use crate::error::FilterError;

    fn session() -> FilterSession {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.register(
            "people",
            Table::from_json_str(
                r#"[
                    {"age": 25, "city": "NYC", "email": "a@example.com"},
                    {"age": 31, "city": "LA", "email": "b@corp.io"},
                    {"age": 17, "city": "SF", "email": null}
                ]"#,
            )
            .unwrap(),
        );
        let lists = Arc::new(InMemoryListStore::new());
        lists.insert(
            "u1",
            "west",
            vec![Value::String("LA".into()), Value::String("SF".into())],
        );
        FilterSession::in_memory(catalog, lists, FilterConfig::default())
    }

    #[tokio::test]
    async fn test_filter_end_to_end() {
        let session = session();
        let request = FilterRequest::new(
            "u1",
            "people",
            "(#{age} >= {18} and #{city} in {['NYC','LA']})",
        );

        let result = session.filter(&request).await.unwrap();
        assert_eq!(result.row_indices, vec![0, 1]);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.limit, 20);
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn test_filter_with_user_list() {
        let session = session();
        let request = FilterRequest::new("u1", "people", "#{city} inUserList {west}");

        let result = session.filter(&request).await.unwrap();
        assert_eq!(result.row_indices, vec![1, 2]);

        let request = FilterRequest::new("u2", "people", "#{city} inUserList {west}");
        assert_eq!(
            session.filter(&request).await.unwrap_err(),
            FilterError::ListNotFound {
                user_id: "u2".to_string(),
                list_name: "west".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_syntax_error_before_schema() {
        let session = session();
        let err = session
            .compile("u1", "missing", "#{age} >= ")
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::QuerySyntax { .. }));

        let err = session
            .compile("u1", "missing", "#{age} >= {1}")
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::SchemaResolution { .. }));
    }

    #[tokio::test]
    async fn test_explicit_schema_column_missing_from_rows() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let mut schema = ColumnSchema::new();
        schema.insert("age".to_string(), LogicalType::Integer);
        schema.insert("score".to_string(), LogicalType::Float);
        catalog.register_with_schema(
            "people",
            Table::from_json_str(r#"[{"age": 40}]"#).unwrap(),
            schema,
        );
        let session = FilterSession::in_memory(
            catalog,
            Arc::new(InMemoryListStore::new()),
            FilterConfig::default(),
        );

        let request = FilterRequest::new("u1", "people", "#{score} > {1.5}");
        assert_eq!(
            session.filter(&request).await.unwrap_err(),
            FilterError::ColumnNotFound {
                column: "score".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_limit_clamped_and_zero_rejected() {
        let session = FilterSession::in_memory(
            Arc::new({
                let catalog = InMemoryCatalog::new();
                catalog.register(
                    "people",
                    Table::from_json_str(r#"[{"age": 1}, {"age": 2}, {"age": 3}]"#).unwrap(),
                );
                catalog
            }),
            Arc::new(InMemoryListStore::new()),
            FilterConfig {
                default_limit: 1,
                max_limit: 2,
            },
        );

        let request = FilterRequest::new("u1", "people", "#{age} notNull").with_page(0, 50);
        let result = session.filter(&request).await.unwrap();
        assert_eq!(result.limit, 2);
        assert_eq!(result.page.len(), 2);
        assert!(result.has_more);

        let request = FilterRequest::new("u1", "people", "#{age} notNull").with_page(0, 0);
        assert!(matches!(
            session.filter(&request).await,
            Err(FilterError::InvalidPagination { .. })
        ));
    }

    #[tokio::test]
    async fn test_count() {
        let session = session();
        assert_eq!(
            session
                .count("u1", "people", "#{email} endsWith {'.com'} or #{email} null")
                .await
                .unwrap(),
            2
        );
    }
}
