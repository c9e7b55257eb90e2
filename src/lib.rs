pub mod access;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod expression;
pub mod query;
pub mod session;

pub use access::{LogicalType, Row, Table, Value};
pub use config::FilterConfig;
pub use error::{FilterError, Result};
pub use executor::{evaluate, FilterResult};
pub use expression::{cast, parse_between, parse_in_list, CompiledExpression, FilterOperator};
pub use session::{FilterRequest, FilterSession};
