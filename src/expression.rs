//! Filter expression compilation and evaluation.
//!
//! This module provides:
//! - The operator set and its per-type applicability
//! - Type-aware casting of literal text
//! - Set, range and named-list literal parsing
//! - A compiled predicate tree and the builder producing it
//! - Row-wise interpretation of the tree (no code generation)

pub mod builder;
pub mod cast;
pub mod eval;
pub mod expr;
pub mod list;
pub mod operator;

pub use builder::ExpressionBuilder;
pub use cast::cast;
pub use eval::PredicateEvaluator;
pub use expr::{CompiledExpression, FilterExpr, Operand, Predicate};
pub use list::{parse_between, parse_in_list, resolve_named_list};
pub use operator::FilterOperator;
