//! Access layer for in-memory datasets.
//!
//! - **Table**: row-major records with a column-name index
//! - **Value**: cell values and typed literals
//! - **LogicalType**: the column types produced by schema inference

pub mod table;
pub mod value;

pub use table::{Row, Table};
pub use value::{LogicalType, Value};
