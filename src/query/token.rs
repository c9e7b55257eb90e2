// Filter query tokens for lexical analysis

use std::fmt;

/// The four independent token classes of a filter query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `#{name}` column reference
    Column,
    /// Operator keyword or symbol between a column and a value
    Operator,
    /// `{literal}` value reference
    Value,
    /// `and`, `or`, `(` or `)`
    Conjunction,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Column => "column",
            TokenKind::Operator => "operator",
            TokenKind::Value => "value",
            TokenKind::Conjunction => "conjunction",
        };
        f.write_str(name)
    }
}

/// A lexical unit with its byte span in the source query.
///
/// For markers, `text` is the inner text with the `#{`/`{` and `}`
/// delimiters removed, while `start..end` spans the whole marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    /// Conjunction keyword, lowercased (`and`, `or`, `(`, `)`)
    pub fn conjunction(&self) -> Option<Conjunction> {
        if self.kind != TokenKind::Conjunction {
            return None;
        }
        Conjunction::from_keyword(&self.text)
    }
}

/// Conjunction tokens recognized between clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
    LeftParen,
    RightParen,
}

impl Conjunction {
    pub fn from_keyword(s: &str) -> Option<Conjunction> {
        match s.to_lowercase().as_str() {
            "and" => Some(Conjunction::And),
            "or" => Some(Conjunction::Or),
            "(" => Some(Conjunction::LeftParen),
            ")" => Some(Conjunction::RightParen),
            _ => None,
        }
    }
}
