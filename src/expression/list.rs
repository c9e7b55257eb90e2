//! Set and range literal parsing, and named-list resolution.

use crate::access::{LogicalType, Value};
use crate::catalog::NamedListStore;
use crate::error::{FilterError, Result};
use crate::expression::cast::{cast, unquote};
use log::debug;

/// Parse an `in`/`not in` literal: `[a, b, c]`, `(a, b)` or bare `a, b`.
///
/// Elements may be quoted with either quote style; commas inside quotes
/// do not split.
pub fn parse_in_list(raw: &str, column_type: LogicalType) -> Vec<Value> {
    split_elements(strip_brackets(raw))
        .into_iter()
        .map(|element| cast(element, column_type))
        .collect()
}

/// Parse a `between`/`notBetween` literal into its inclusive bounds
pub fn parse_between(raw: &str, column_type: LogicalType) -> Result<(Value, Value)> {
    let (low, high) = between_bounds(raw)?;
    Ok((cast(low, column_type), cast(high, column_type)))
}

/// Split a `between` literal into its two raw bounds without casting them
pub(crate) fn between_bounds(raw: &str) -> Result<(&str, &str)> {
    let elements = split_elements(strip_brackets(raw));
    match elements.as_slice() {
        [low, high] => Ok((low, high)),
        _ => Err(FilterError::InvalidBetweenValueCount {
            raw: raw.to_string(),
            count: elements.len(),
        }),
    }
}

/// Fetch a user's named list and cast every element to the column type.
///
/// A missing list is an error for the whole filter.
pub async fn resolve_named_list(
    store: &dyn NamedListStore,
    user_id: &str,
    list_name: &str,
    column_type: LogicalType,
) -> Result<Vec<Value>> {
    let list_name = unquote(list_name);
    let items = store.resolve_named_list(user_id, list_name).await?;
    debug!(
        "resolved named list '{}' for user '{}' ({} items)",
        list_name,
        user_id,
        items.len()
    );

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Null => Value::Null,
            other => cast(&other.to_text(), column_type),
        })
        .collect())
}

fn strip_brackets(raw: &str) -> &str {
    let trimmed = raw.trim();
    let bracketed = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('(') && trimmed.ends_with(')'));
    if bracketed && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Split on commas outside quotes, dropping blank elements
fn split_elements(body: &str) -> Vec<&str> {
    let mut elements = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, ',') => {
                elements.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    elements.push(&body[start..]);

    elements
        .into_iter()
        .filter(|element| !element.trim().is_empty())
        .collect()
}
