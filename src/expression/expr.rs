//! Compiled predicate tree.

use crate::access::{LogicalType, Value};
use crate::expression::operator::FilterOperator;
use std::fmt;

/// Typed right-hand side of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `null` / `notNull`
    None,
    Scalar(Value),
    /// `in` lists and resolved named lists
    Set(Vec<Value>),
    /// Inclusive `between` bounds
    Range(Value, Value),
}

/// A compiled boolean test over one column
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub column_type: LogicalType,
    pub operator: FilterOperator,
    pub operand: Operand,
    /// Literal text as written, kept for diagnostics
    pub raw_value: Option<String>,
    /// Offset of the clause in the source query
    pub offset: usize,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{{{}}} {}", self.column, self.operator)?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Scalar(value) => write!(f, " {}", value),
            Operand::Set(values) => write!(f, " [{}]", join(values)),
            Operand::Range(low, high) => write!(f, " [{}, {}]", low, high),
        }
    }
}

fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Boolean composition of predicates
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Leaf(Predicate),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Group(Box<FilterExpr>),
}

impl FilterExpr {
    pub fn and(operands: Vec<FilterExpr>) -> Self {
        FilterExpr::And(operands)
    }

    pub fn or(operands: Vec<FilterExpr>) -> Self {
        FilterExpr::Or(operands)
    }

    pub fn group(inner: FilterExpr) -> Self {
        FilterExpr::Group(Box::new(inner))
    }

    /// All predicates in left-to-right source order
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            FilterExpr::Leaf(predicate) => out.push(predicate),
            FilterExpr::And(operands) | FilterExpr::Or(operands) => {
                for operand in operands {
                    operand.collect_predicates(out);
                }
            }
            FilterExpr::Group(inner) => inner.collect_predicates(out),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Leaf(predicate) => write!(f, "{}", predicate),
            FilterExpr::And(operands) => write_joined(f, operands, " & "),
            FilterExpr::Or(operands) => write_joined(f, operands, " | "),
            FilterExpr::Group(inner) => write!(f, "({})", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[FilterExpr], separator: &str) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", operand)?;
    }
    Ok(())
}

/// A filter query compiled against one dataset schema.
///
/// Built fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    root: FilterExpr,
}

impl CompiledExpression {
    pub fn new(source: impl Into<String>, root: FilterExpr) -> Self {
        Self {
            source: source.into(),
            root,
        }
    }

    /// The query text this expression was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &FilterExpr {
        &self.root
    }

    pub fn predicates(&self) -> Vec<&Predicate> {
        self.root.predicates()
    }

    /// Distinct column names referenced, in first-use order
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for predicate in self.predicates() {
            if !columns.contains(&predicate.column.as_str()) {
                columns.push(&predicate.column);
            }
        }
        columns
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
