//! Type-aware casting of raw literal text.

use crate::access::{LogicalType, Value};
use log::warn;

const TRUE_WORDS: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_WORDS: [&str; 4] = ["false", "0", "no", "off"];

/// Trim whitespace and one pair of matching outer quotes
pub fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Convert a raw literal into a typed value for a column of `column_type`.
///
/// Numeric and boolean literals that do not parse fall back to a string
/// literal instead of failing; the mismatch is logged as a warning.
/// Temporal and textual types always yield a string literal.
pub fn cast(raw: &str, column_type: LogicalType) -> Value {
    let text = unquote(raw);

    match column_type {
        LogicalType::Integer => {
            if let Ok(i) = text.parse::<i64>() {
                return Value::Integer(i);
            }
            match parse_float(text) {
                Some(f) => Value::Float(f),
                None => fallback(text, column_type),
            }
        }
        LogicalType::Float => match parse_float(text) {
            Some(f) => Value::Float(f),
            None => fallback(text, column_type),
        },
        LogicalType::Boolean => match cast_bool(text) {
            Some(b) => Value::Boolean(b),
            None => fallback(text, column_type),
        },
        LogicalType::String
        | LogicalType::Datetime
        | LogicalType::Date
        | LogicalType::Time
        | LogicalType::Unknown => Value::String(text.to_string()),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn cast_bool(text: &str) -> Option<bool> {
    let lowered = text.to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        return Some(true);
    }
    if FALSE_WORDS.contains(&lowered.as_str()) {
        return Some(false);
    }
    // Any other number is truthy unless zero
    parse_float(text).map(|f| f != 0.0)
}

fn fallback(text: &str, column_type: LogicalType) -> Value {
    warn!(
        "literal '{}' does not parse as {}; comparing as a string",
        text, column_type
    );
    Value::String(text.to_string())
}
