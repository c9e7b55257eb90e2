// Parsed filter query, before type-aware compilation

use crate::expression::FilterOperator;

/// One `column operator [value]` triple as written in the query
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    /// Offset of the column marker, used to order and report clauses
    pub offset: usize,
    pub operator: FilterOperator,
    /// Inner text of the value marker; absent for `null`/`notNull`
    pub value: Option<String>,
}

/// Condition tree built by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    Clause(Clause),
    /// Operands of one `and` chain, in source order
    And(Vec<QueryExpr>),
    /// Operands of one `or` chain, in source order
    Or(Vec<QueryExpr>),
    /// Parenthesized sub-expression
    Group(Box<QueryExpr>),
}

impl QueryExpr {
    /// Conjunction of `operands`; a single operand is returned unwrapped
    pub fn and(mut operands: Vec<QueryExpr>) -> Self {
        if operands.len() == 1 {
            if let Some(only) = operands.pop() {
                return only;
            }
        }
        QueryExpr::And(operands)
    }

    /// Disjunction of `operands`; a single operand is returned unwrapped
    pub fn or(mut operands: Vec<QueryExpr>) -> Self {
        if operands.len() == 1 {
            if let Some(only) = operands.pop() {
                return only;
            }
        }
        QueryExpr::Or(operands)
    }

    pub fn group(inner: QueryExpr) -> Self {
        QueryExpr::Group(Box::new(inner))
    }

    /// All clauses in left-to-right source order
    pub fn clauses(&self) -> Vec<&Clause> {
        let mut clauses = Vec::new();
        self.collect_clauses(&mut clauses);
        clauses
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a Clause>) {
        match self {
            QueryExpr::Clause(clause) => out.push(clause),
            QueryExpr::And(operands) | QueryExpr::Or(operands) => {
                for operand in operands {
                    operand.collect_clauses(out);
                }
            }
            QueryExpr::Group(inner) => inner.collect_clauses(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(column: &str, offset: usize) -> QueryExpr {
        QueryExpr::Clause(Clause {
            column: column.to_string(),
            offset,
            operator: FilterOperator::NotNull,
            value: None,
        })
    }

    #[test]
    fn test_clauses_in_source_order() {
        let expr = QueryExpr::or(vec![
            QueryExpr::group(QueryExpr::and(vec![clause("a", 1), clause("b", 20)])),
            clause("c", 40),
        ]);
        let columns: Vec<&str> = expr.clauses().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_operand_is_unwrapped() {
        assert_eq!(QueryExpr::and(vec![clause("a", 0)]), clause("a", 0));
        assert_eq!(QueryExpr::or(vec![clause("a", 0)]), clause("a", 0));
        assert!(matches!(
            QueryExpr::or(vec![clause("a", 0), clause("b", 10)]),
            QueryExpr::Or(operands) if operands.len() == 2
        ));
    }
}
