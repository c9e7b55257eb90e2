//! Row-major in-memory table.

use crate::access::Value;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;

/// One record of a table, positionally aligned with the table's columns
pub type Row = Vec<Value>;

/// In-memory dataset that predicates are evaluated against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::default();
        for name in columns {
            table.add_column(name.into())?;
        }
        Ok(table)
    }

    fn add_column(&mut self, name: String) -> Result<usize> {
        if self.column_index.contains_key(&name) {
            bail!("Duplicate column name: {}", name);
        }
        let index = self.columns.len();
        self.column_index.insert(name.clone(), index);
        self.columns.push(name);
        Ok(index)
    }

    /// Append a row; its width must match the column count
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "Row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Build a table from JSON objects.
    ///
    /// Columns appear in first-seen order; keys missing from a record are NULL.
    pub fn from_records(records: Vec<serde_json::Map<String, serde_json::Value>>) -> Result<Self> {
        let mut table = Table::default();
        for record in &records {
            for key in record.keys() {
                if !table.column_index.contains_key(key) {
                    table.add_column(key.clone())?;
                }
            }
        }

        for mut record in records {
            let row = table
                .columns
                .iter()
                .map(|name| record.remove(name).map(Value::from).unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }

        Ok(table)
    }

    /// Parse a JSON array of objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(json).context("Dataset must be a JSON array of objects")?;
        Self::from_records(records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over every cell of one column
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
