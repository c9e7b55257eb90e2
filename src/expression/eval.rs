//! Row-wise interpretation of compiled predicates.

use crate::access::{Row, Table, Value};
use crate::error::{FilterError, Result};
use crate::expression::expr::{CompiledExpression, FilterExpr, Operand, Predicate};
use crate::expression::operator::FilterOperator;
use log::warn;
use std::cell::Cell;
use std::cmp::Ordering;

/// Evaluates a compiled expression against the rows of one table
pub struct PredicateEvaluator<'a> {
    table: &'a Table,
    expression: &'a CompiledExpression,
    /// Predicates in source order, parallel to `clash_reported`
    predicates: Vec<&'a Predicate>,
    /// Per predicate: set after its first equality test between incompatible types
    clash_reported: Vec<Cell<bool>>,
}

impl<'a> PredicateEvaluator<'a> {
    /// Create an evaluator, checking that every referenced column exists
    pub fn new(table: &'a Table, expression: &'a CompiledExpression) -> Result<Self> {
        for column in expression.columns() {
            if table.column_index(column).is_none() {
                return Err(FilterError::ColumnNotFound {
                    column: column.to_string(),
                });
            }
        }

        let predicates = expression.predicates();
        let clash_reported = predicates.iter().map(|_| Cell::new(false)).collect();

        Ok(Self {
            table,
            expression,
            predicates,
            clash_reported,
        })
    }

    /// Evaluate the whole expression for one row
    pub fn matches(&self, row: &Row) -> Result<bool> {
        self.evaluate(self.expression.root(), row)
    }

    fn evaluate(&self, expr: &FilterExpr, row: &Row) -> Result<bool> {
        match expr {
            FilterExpr::Leaf(predicate) => self.evaluate_predicate(predicate, row),
            FilterExpr::And(operands) => {
                for operand in operands {
                    if !self.evaluate(operand, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            FilterExpr::Or(operands) => {
                for operand in operands {
                    if self.evaluate(operand, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            FilterExpr::Group(inner) => self.evaluate(inner, row),
        }
    }

    /// Evaluate one predicate; negated operators complement their positive form
    pub fn evaluate_predicate(&self, predicate: &Predicate, row: &Row) -> Result<bool> {
        let cell = self.cell(predicate, row)?;
        match predicate.operator.negated_of() {
            Some(positive) => Ok(!self.apply(positive, predicate, cell)?),
            None => self.apply(predicate.operator, predicate, cell),
        }
    }

    fn cell<'r>(&self, predicate: &Predicate, row: &'r Row) -> Result<&'r Value> {
        self.table
            .column_index(&predicate.column)
            .and_then(|index| row.get(index))
            .ok_or_else(|| FilterError::ColumnNotFound {
                column: predicate.column.clone(),
            })
    }

    fn apply(&self, operator: FilterOperator, predicate: &Predicate, cell: &Value) -> Result<bool> {
        if operator == FilterOperator::Null {
            return Ok(cell.is_null());
        }
        if cell.is_null() {
            return Ok(false);
        }

        match (operator, &predicate.operand) {
            (FilterOperator::Eq | FilterOperator::Is, Operand::Scalar(literal)) => {
                Ok(self.equals(predicate, cell, literal))
            }
            (FilterOperator::Lt, Operand::Scalar(literal)) => {
                Ok(self.order(predicate, cell, literal)? == Ordering::Less)
            }
            (FilterOperator::Le, Operand::Scalar(literal)) => {
                Ok(self.order(predicate, cell, literal)? != Ordering::Greater)
            }
            (FilterOperator::Gt, Operand::Scalar(literal)) => {
                Ok(self.order(predicate, cell, literal)? == Ordering::Greater)
            }
            (FilterOperator::Ge, Operand::Scalar(literal)) => {
                Ok(self.order(predicate, cell, literal)? != Ordering::Less)
            }
            (FilterOperator::In | FilterOperator::InUserList, Operand::Set(items)) => {
                Ok(items.iter().any(|item| self.equals(predicate, cell, item)))
            }
            (FilterOperator::Between, Operand::Range(low, high)) => {
                if low.is_null() || high.is_null() {
                    return Ok(false);
                }
                Ok(self.order(predicate, cell, low)? != Ordering::Less
                    && self.order(predicate, cell, high)? != Ordering::Greater)
            }
            (
                FilterOperator::Contains | FilterOperator::BeginsWith | FilterOperator::EndsWith,
                Operand::Scalar(literal),
            ) => {
                let haystack = cell.to_text().to_lowercase();
                let needle = literal.to_text().to_lowercase();
                Ok(match operator {
                    FilterOperator::Contains => haystack.contains(&needle),
                    FilterOperator::BeginsWith => haystack.starts_with(&needle),
                    _ => haystack.ends_with(&needle),
                })
            }
            (operator, operand) => Err(self.error(
                predicate,
                format!("operand {:?} does not fit operator '{}'", operand, operator),
            )),
        }
    }

    /// Compare cell and literal; string-like columns compare as text
    fn compare(&self, predicate: &Predicate, cell: &Value, literal: &Value) -> Option<Ordering> {
        if literal.is_null() {
            return None;
        }
        if predicate.column_type.is_textual() {
            return Some(cell.to_text().cmp(&literal.to_text()));
        }
        cell.compare(literal)
    }

    /// Equality between incompatible types is a non-match
    fn equals(&self, predicate: &Predicate, cell: &Value, literal: &Value) -> bool {
        match self.compare(predicate, cell, literal) {
            Some(ordering) => ordering == Ordering::Equal,
            None => {
                if !literal.is_null() && self.first_clash(predicate) {
                    warn!(
                        "type clash in '{}': cell {} vs literal {}; treating as no match",
                        predicate, cell, literal
                    );
                }
                false
            }
        }
    }

    /// True only the first time `predicate` reports a type clash
    fn first_clash(&self, predicate: &Predicate) -> bool {
        self.predicates
            .iter()
            .position(|known| std::ptr::eq(*known, predicate))
            .and_then(|index| self.clash_reported.get(index))
            .map_or(false, |flag| !flag.replace(true))
    }

    /// Ordering between incompatible types is an evaluation error
    fn order(&self, predicate: &Predicate, cell: &Value, literal: &Value) -> Result<Ordering> {
        self.compare(predicate, cell, literal).ok_or_else(|| {
            self.error(
                predicate,
                format!("cannot order {} against {}", cell, literal),
            )
        })
    }

    fn error(&self, predicate: &Predicate, message: String) -> FilterError {
        let cast_value = match &predicate.operand {
            Operand::None => String::new(),
            Operand::Scalar(value) => value.to_string(),
            Operand::Set(_) | Operand::Range(_, _) => {
                predicate.to_string()
            }
        };

        FilterError::Evaluation {
            column: predicate.column.clone(),
            operator: predicate.operator.to_string(),
            raw_value: predicate.raw_value.clone(),
            cast_value,
            message,
        }
    }
}
