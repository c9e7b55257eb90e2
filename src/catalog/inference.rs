//! Logical type inference from dataset contents.

use crate::access::{LogicalType, Table, Value};
use crate::catalog::ColumnSchema;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Infer the logical type of every column of a table
pub fn infer_schema(table: &Table) -> ColumnSchema {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| (name.clone(), infer_column_type(table.column_values(index))))
        .collect()
}

/// Infer one column's type from its cells, ignoring NULLs.
///
/// Integer and float cells together widen to float. Any other mix, or a
/// column with no non-null cells, is `unknown`.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> LogicalType {
    let mut inferred: Option<LogicalType> = None;

    for value in values {
        let cell_type = match value {
            Value::Null => continue,
            Value::Boolean(_) => LogicalType::Boolean,
            Value::Integer(_) => LogicalType::Integer,
            Value::Float(_) => LogicalType::Float,
            Value::String(s) => infer_text_type(s),
        };

        inferred = Some(match (inferred, cell_type) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(LogicalType::Integer), LogicalType::Float)
            | (Some(LogicalType::Float), LogicalType::Integer) => LogicalType::Float,
            // Temporal strings mixed with free text stay text
            (Some(a), b) if a.is_textual() && b.is_textual() => LogicalType::String,
            _ => return LogicalType::Unknown,
        });
    }

    inferred.unwrap_or(LogicalType::Unknown)
}

fn infer_text_type(s: &str) -> LogicalType {
    let s = s.trim();
    if DateTime::parse_from_rfc3339(s).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(s, format).is_ok())
    {
        LogicalType::Datetime
    } else if NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() {
        LogicalType::Date
    } else if TIME_FORMATS
        .iter()
        .any(|format| NaiveTime::parse_from_str(s, format).is_ok())
    {
        LogicalType::Time
    } else {
        LogicalType::String
    }
}
