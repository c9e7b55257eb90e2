//! Operator definitions for filter predicates.

use crate::access::LogicalType;
use std::fmt;

/// Operators that can appear between a column and a value reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Is,

    // Set membership
    In,
    NotIn,
    InUserList,
    NotInUserList,

    // Range
    Between,
    NotBetween,

    // Text
    Contains,
    DoesNotContain,
    BeginsWith,
    EndsWith,

    // Missing values
    Null,
    NotNull,
}

impl FilterOperator {
    /// Match an operator keyword or symbol (keywords are case-insensitive).
    ///
    /// `not in` is accepted with any run of whitespace between the words.
    pub fn from_keyword(s: &str) -> Option<FilterOperator> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_lowercase().as_str() {
            "=" | "==" => Some(FilterOperator::Eq),
            "!=" => Some(FilterOperator::Ne),
            "<" => Some(FilterOperator::Lt),
            "<=" => Some(FilterOperator::Le),
            ">" => Some(FilterOperator::Gt),
            ">=" => Some(FilterOperator::Ge),
            "is" => Some(FilterOperator::Is),
            "in" => Some(FilterOperator::In),
            "not in" | "notin" => Some(FilterOperator::NotIn),
            "inuserlist" => Some(FilterOperator::InUserList),
            "notinuserlist" => Some(FilterOperator::NotInUserList),
            "between" => Some(FilterOperator::Between),
            "notbetween" => Some(FilterOperator::NotBetween),
            "contains" => Some(FilterOperator::Contains),
            "doesnotcontain" => Some(FilterOperator::DoesNotContain),
            "beginswith" => Some(FilterOperator::BeginsWith),
            "endswith" => Some(FilterOperator::EndsWith),
            "null" => Some(FilterOperator::Null),
            "notnull" => Some(FilterOperator::NotNull),
            _ => None,
        }
    }

    /// Number of value tokens the operator consumes
    pub fn arity(&self) -> usize {
        match self {
            FilterOperator::Null | FilterOperator::NotNull => 0,
            _ => 1,
        }
    }

    /// Substring/prefix/suffix operators, valid only on string-like columns
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FilterOperator::Contains
                | FilterOperator::DoesNotContain
                | FilterOperator::BeginsWith
                | FilterOperator::EndsWith
        )
    }

    /// Operators that need an ordering between cell and literal
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Lt
                | FilterOperator::Le
                | FilterOperator::Gt
                | FilterOperator::Ge
                | FilterOperator::Between
                | FilterOperator::NotBetween
        )
    }

    /// For a negated operator, the operator it complements row by row
    pub fn negated_of(&self) -> Option<FilterOperator> {
        match self {
            FilterOperator::Ne => Some(FilterOperator::Eq),
            FilterOperator::NotIn => Some(FilterOperator::In),
            FilterOperator::NotInUserList => Some(FilterOperator::InUserList),
            FilterOperator::NotBetween => Some(FilterOperator::Between),
            FilterOperator::DoesNotContain => Some(FilterOperator::Contains),
            FilterOperator::NotNull => Some(FilterOperator::Null),
            _ => None,
        }
    }

    /// Check whether the operator may be applied to a column of the given type
    pub fn supports(&self, column_type: LogicalType) -> bool {
        !self.is_text() || column_type.is_textual()
    }

    /// Get the canonical display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Lt => "<",
            FilterOperator::Le => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Ge => ">=",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not in",
            FilterOperator::InUserList => "inUserList",
            FilterOperator::NotInUserList => "notInUserList",
            FilterOperator::Between => "between",
            FilterOperator::NotBetween => "notBetween",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "doesNotContain",
            FilterOperator::BeginsWith => "beginsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Null => "null",
            FilterOperator::NotNull => "notNull",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword() {
        assert_eq!(FilterOperator::from_keyword("="), Some(FilterOperator::Eq));
        assert_eq!(FilterOperator::from_keyword("=="), Some(FilterOperator::Eq));
        assert_eq!(FilterOperator::from_keyword(">="), Some(FilterOperator::Ge));
        assert_eq!(
            FilterOperator::from_keyword("not   in"),
            Some(FilterOperator::NotIn)
        );
        assert_eq!(
            FilterOperator::from_keyword("notIn"),
            Some(FilterOperator::NotIn)
        );
        assert_eq!(
            FilterOperator::from_keyword("INUSERLIST"),
            Some(FilterOperator::InUserList)
        );
        assert_eq!(
            FilterOperator::from_keyword("doesNotContain"),
            Some(FilterOperator::DoesNotContain)
        );
        assert_eq!(FilterOperator::from_keyword("<>"), None);
        assert_eq!(FilterOperator::from_keyword("like"), None);
    }

    #[test]
    fn test_keyword_roundtrip_through_display() {
        let all = [
            FilterOperator::Eq,
            FilterOperator::Ne,
            FilterOperator::Lt,
            FilterOperator::Le,
            FilterOperator::Gt,
            FilterOperator::Ge,
            FilterOperator::Is,
            FilterOperator::In,
            FilterOperator::NotIn,
            FilterOperator::InUserList,
            FilterOperator::NotInUserList,
            FilterOperator::Between,
            FilterOperator::NotBetween,
            FilterOperator::Contains,
            FilterOperator::DoesNotContain,
            FilterOperator::BeginsWith,
            FilterOperator::EndsWith,
            FilterOperator::Null,
            FilterOperator::NotNull,
        ];
        for op in all {
            assert_eq!(FilterOperator::from_keyword(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_arity() {
        assert_eq!(FilterOperator::Null.arity(), 0);
        assert_eq!(FilterOperator::NotNull.arity(), 0);
        assert_eq!(FilterOperator::Between.arity(), 1);
    }

    #[test]
    fn test_text_operators_by_type() {
        assert!(FilterOperator::Contains.supports(LogicalType::String));
        assert!(FilterOperator::BeginsWith.supports(LogicalType::Date));
        assert!(FilterOperator::EndsWith.supports(LogicalType::Unknown));
        assert!(!FilterOperator::Contains.supports(LogicalType::Integer));
        assert!(!FilterOperator::DoesNotContain.supports(LogicalType::Float));
        assert!(!FilterOperator::EndsWith.supports(LogicalType::Boolean));
        assert!(FilterOperator::Gt.supports(LogicalType::Boolean));
    }

    #[test]
    fn test_negation_pairs() {
        assert_eq!(
            FilterOperator::NotBetween.negated_of(),
            Some(FilterOperator::Between)
        );
        assert_eq!(FilterOperator::Ne.negated_of(), Some(FilterOperator::Eq));
        assert_eq!(FilterOperator::Between.negated_of(), None);
    }
}
