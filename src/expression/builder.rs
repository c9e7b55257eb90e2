//! Compiles a parsed query into a typed predicate tree.
//!
//! Compilation runs in three passes so that cheap checks fail before any
//! I/O: every clause is checked against the schema, then named lists are
//! resolved through the list store, then predicates are built.

use crate::access::{LogicalType, Value};
use crate::catalog::{ColumnSchema, NamedListStore};
use crate::error::{FilterError, Result};
use crate::expression::cast::{cast, unquote};
use crate::expression::expr::{CompiledExpression, FilterExpr, Operand, Predicate};
use crate::expression::list::{between_bounds, parse_between, parse_in_list, resolve_named_list};
use crate::expression::operator::FilterOperator;
use crate::query::{parse_query, Clause, QueryExpr};
use log::debug;
use std::collections::HashMap;

/// Named lists resolved for one compilation, keyed by name and cast type
type ResolvedLists = HashMap<(String, LogicalType), Vec<Value>>;

pub struct ExpressionBuilder<'a> {
    schema: &'a ColumnSchema,
    lists: &'a dyn NamedListStore,
    user_id: &'a str,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(schema: &'a ColumnSchema, lists: &'a dyn NamedListStore, user_id: &'a str) -> Self {
        Self {
            schema,
            lists,
            user_id,
        }
    }

    /// Parse and compile a query string
    pub async fn compile(&self, query: &str) -> Result<CompiledExpression> {
        let parsed = parse_query(query)?;
        self.compile_parsed(query, &parsed).await
    }

    /// Compile an already parsed query
    pub async fn compile_parsed(
        &self,
        source: &str,
        parsed: &QueryExpr,
    ) -> Result<CompiledExpression> {
        for clause in parsed.clauses() {
            self.check_clause(clause)?;
        }

        let lists = self.resolve_lists(parsed).await?;
        let root = self.build(parsed, &lists)?;
        let compiled = CompiledExpression::new(source, root);

        debug!(
            "compiled filter with {} predicate(s): {}",
            compiled.predicates().len(),
            compiled
        );
        Ok(compiled)
    }

    /// Resolve the column type, reject text operators on non-text columns
    /// and check the `between` value count. Performs no I/O.
    fn check_clause(&self, clause: &Clause) -> Result<LogicalType> {
        let column_type =
            *self
                .schema
                .get(&clause.column)
                .ok_or_else(|| FilterError::UnknownColumn {
                    column: clause.column.clone(),
                    offset: clause.offset,
                })?;

        if !clause.operator.supports(column_type) {
            return Err(FilterError::UnsupportedOperatorForType {
                column: clause.column.clone(),
                operator: clause.operator.to_string(),
                column_type,
            });
        }

        if matches!(
            clause.operator,
            FilterOperator::Between | FilterOperator::NotBetween
        ) {
            between_bounds(clause.value.as_deref().unwrap_or_default())?;
        }

        Ok(column_type)
    }

    async fn resolve_lists(&self, parsed: &QueryExpr) -> Result<ResolvedLists> {
        let mut lists = ResolvedLists::new();

        for clause in parsed.clauses() {
            if !matches!(
                clause.operator,
                FilterOperator::InUserList | FilterOperator::NotInUserList
            ) {
                continue;
            }

            let column_type = self.check_clause(clause)?;
            let name = unquote(clause.value.as_deref().unwrap_or_default()).to_string();
            let key = (name, column_type);
            if lists.contains_key(&key) {
                continue;
            }

            let items = resolve_named_list(self.lists, self.user_id, &key.0, column_type).await?;
            lists.insert(key, items);
        }

        Ok(lists)
    }

    fn build(&self, expr: &QueryExpr, lists: &ResolvedLists) -> Result<FilterExpr> {
        Ok(match expr {
            QueryExpr::Clause(clause) => FilterExpr::Leaf(self.build_predicate(clause, lists)?),
            QueryExpr::And(operands) => FilterExpr::and(self.build_all(operands, lists)?),
            QueryExpr::Or(operands) => FilterExpr::or(self.build_all(operands, lists)?),
            QueryExpr::Group(inner) => FilterExpr::group(self.build(inner, lists)?),
        })
    }

    fn build_all(&self, operands: &[QueryExpr], lists: &ResolvedLists) -> Result<Vec<FilterExpr>> {
        operands
            .iter()
            .map(|operand| self.build(operand, lists))
            .collect()
    }

    fn build_predicate(&self, clause: &Clause, lists: &ResolvedLists) -> Result<Predicate> {
        let column_type = self.check_clause(clause)?;
        let raw = clause.value.as_deref().unwrap_or_default();
        let mut operator = clause.operator;

        let operand = match operator {
            FilterOperator::Null | FilterOperator::NotNull => Operand::None,
            FilterOperator::In | FilterOperator::NotIn => {
                Operand::Set(parse_in_list(raw, column_type))
            }
            FilterOperator::InUserList | FilterOperator::NotInUserList => {
                let key = (unquote(raw).to_string(), column_type);
                let items = lists.get(&key).cloned().ok_or_else(|| FilterError::ListNotFound {
                    user_id: self.user_id.to_string(),
                    list_name: key.0.clone(),
                })?;
                Operand::Set(items)
            }
            FilterOperator::Between | FilterOperator::NotBetween => {
                let (low, high) = parse_between(raw, column_type)?;
                Operand::Range(low, high)
            }
            FilterOperator::Is if is_null_word(raw) => {
                operator = FilterOperator::Null;
                Operand::None
            }
            _ => Operand::Scalar(cast(raw, column_type)),
        };

        Ok(Predicate {
            column: clause.column.clone(),
            column_type,
            operator,
            operand,
            raw_value: clause.value.clone(),
            offset: clause.offset,
        })
    }
}

fn is_null_word(raw: &str) -> bool {
    let word = unquote(raw);
    word.eq_ignore_ascii_case("null") || word.eq_ignore_ascii_case("none")
}
