// Filter query parser - converts tokens to a condition tree

use super::ast::{Clause, QueryExpr};
use super::lexer::{Lexer, TokenStream};
use super::token::{Conjunction, Token, TokenKind};
use crate::error::{FilterError, Result};
use crate::expression::FilterOperator;

/// Deepest parenthesis nesting accepted in one query
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursive-descent parser over the offset-ordered token stream.
///
/// Grammar (`or` binds looser than `and`):
///
/// ```text
/// expr    := and_expr ( "or" and_expr )*
/// and_expr:= primary ( "and" primary )*
/// primary := "(" expr ")" | clause
/// clause  := COLUMN OPERATOR VALUE?
/// ```
///
/// `and`/`or` chains become one n-ary node, so only parentheses add depth.
pub struct Parser<'a> {
    tokens: Vec<&'a Token>,
    position: usize,
    /// Parentheses currently open
    depth: usize,
    /// Offset reported for errors at end of input
    end_offset: usize,
}

impl<'a> Parser<'a> {
    pub fn new(stream: &'a TokenStream, end_offset: usize) -> Self {
        Parser {
            tokens: stream.merged(),
            position: 0,
            depth: 0,
            end_offset,
        }
    }

    /// Parse the whole token stream into one condition tree
    pub fn parse(&mut self) -> Result<QueryExpr> {
        if self.tokens.is_empty() {
            return Err(FilterError::syntax(0, "empty query"));
        }

        let expr = self.parse_or()?;

        if let Some(token) = self.current_token() {
            return Err(FilterError::syntax(
                token.start,
                format!("unexpected {} '{}'", token.kind, token.text),
            ));
        }

        Ok(expr)
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<QueryExpr> {
        let mut operands = vec![self.parse_and()?];

        while self.match_conjunction(Conjunction::Or) {
            self.advance();
            operands.push(self.parse_and()?);
        }

        Ok(QueryExpr::or(operands))
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<QueryExpr> {
        let mut operands = vec![self.parse_primary()?];

        while self.match_conjunction(Conjunction::And) {
            self.advance();
            operands.push(self.parse_primary()?);
        }

        Ok(QueryExpr::and(operands))
    }

    /// Parse a parenthesized group or a single clause
    fn parse_primary(&mut self) -> Result<QueryExpr> {
        if self.match_conjunction(Conjunction::LeftParen) {
            let open = self.current_offset();
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(FilterError::syntax(open, "nesting too deep"));
            }
            self.depth += 1;
            self.advance();
            let inner = self.parse_or()?;
            if !self.match_conjunction(Conjunction::RightParen) {
                return Err(FilterError::syntax(
                    open,
                    "unclosed parenthesis",
                ));
            }
            self.advance();
            self.depth -= 1;
            return Ok(QueryExpr::group(inner));
        }

        self.parse_clause()
    }

    /// Parse `#{column} operator {value}`
    fn parse_clause(&mut self) -> Result<QueryExpr> {
        let column = self.expect_kind(TokenKind::Column, "column reference")?;
        let column_name = column.text.trim().to_string();
        if column_name.is_empty() {
            return Err(FilterError::syntax(column.start, "empty column reference"));
        }

        let operator_token = self.expect_kind(TokenKind::Operator, "operator")?;
        let operator = FilterOperator::from_keyword(&operator_token.text).ok_or_else(|| {
            FilterError::syntax(
                operator_token.start,
                format!("unrecognized operator '{}'", operator_token.text),
            )
        })?;

        let value = if operator.arity() == 1 {
            Some(self.expect_kind(TokenKind::Value, "value reference")?.text.clone())
        } else {
            None
        };

        Ok(QueryExpr::Clause(Clause {
            column: column_name,
            offset: column.start,
            operator,
            value,
        }))
    }

    // Helper methods

    fn current_token(&self) -> Option<&'a Token> {
        self.tokens.get(self.position).copied()
    }

    fn current_offset(&self) -> usize {
        self.current_token()
            .map(|token| token.start)
            .unwrap_or(self.end_offset)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_conjunction(&self, conjunction: Conjunction) -> bool {
        self.current_token()
            .and_then(|token| token.conjunction())
            .map_or(false, |found| found == conjunction)
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Result<&'a Token> {
        match self.current_token() {
            Some(token) if token.kind == kind => {
                self.advance();
                Ok(token)
            }
            Some(token) => Err(FilterError::syntax(
                token.start,
                format!("expected {}, found {} '{}'", what, token.kind, token.text),
            )),
            None => Err(FilterError::syntax(
                self.end_offset,
                format!("expected {}, found end of query", what),
            )),
        }
    }
}

/// Tokenize and parse a filter query
pub fn parse_query(query: &str) -> Result<QueryExpr> {
    let stream = Lexer::new(query).tokenize()?;
    Parser::new(&stream, query.len()).parse()
}
