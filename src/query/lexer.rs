// Filter query lexer - splits a pseudo-query into column, operator, value and conjunction tokens

use super::token::{Conjunction, Token, TokenKind};
use crate::error::{FilterError, Result};
use crate::expression::FilterOperator;

const COLUMN_OPEN: &str = "#{";
const VALUE_OPEN: char = '{';
const MARKER_CLOSE: char = '}';

/// Token lists produced by independent scans of one query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    pub columns: Vec<Token>,
    pub operators: Vec<Token>,
    pub values: Vec<Token>,
    pub conjunctions: Vec<Token>,
}

impl TokenStream {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
            && self.operators.is_empty()
            && self.values.is_empty()
            && self.conjunctions.is_empty()
    }

    /// All tokens in source order
    pub fn merged(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self
            .columns
            .iter()
            .chain(&self.operators)
            .chain(&self.values)
            .chain(&self.conjunctions)
            .collect();
        tokens.sort_by_key(|token| token.start);
        tokens
    }

    /// Check that every operator has a column and, unless it is `null` or
    /// `notNull`, a value. The first token that cannot be paired is reported.
    pub fn validate_counts(&self) -> Result<()> {
        if self.columns.len() != self.operators.len() {
            let offset = if self.columns.len() > self.operators.len() {
                self.columns[self.operators.len()].start
            } else {
                self.operators[self.columns.len()].start
            };
            return Err(FilterError::syntax(
                offset,
                format!(
                    "{} column reference(s) but {} operator(s)",
                    self.columns.len(),
                    self.operators.len()
                ),
            ));
        }

        let mut values = self.values.iter();
        for operator in &self.operators {
            let arity = FilterOperator::from_keyword(&operator.text)
                .map(|op| op.arity())
                .unwrap_or(1);
            if arity == 1 && values.next().is_none() {
                return Err(FilterError::syntax(
                    operator.start,
                    format!("operator '{}' has no value reference", operator.text),
                ));
            }
        }

        if let Some(extra) = values.next() {
            return Err(FilterError::syntax(
                extra.start,
                format!("value reference '{{{}}}' has no operator", extra.text),
            ));
        }

        Ok(())
    }
}

pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input }
    }

    /// Tokenize the entire input and validate token counts
    pub fn tokenize(&self) -> Result<TokenStream> {
        let columns = self.scan_columns()?;
        let values = self.scan_values()?;

        let mut markers: Vec<(usize, usize)> = columns
            .iter()
            .chain(values.iter())
            .map(|token| (token.start, token.end))
            .collect();
        markers.sort_unstable();

        let stream = TokenStream {
            operators: self.scan_operators(&markers)?,
            conjunctions: self.scan_conjunctions(&markers),
            columns,
            values,
        };
        stream.validate_counts()?;

        Ok(stream)
    }

    /// Find every `#{name}` marker
    fn scan_columns(&self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut search = 0;

        while let Some(pos) = self.input[search..].find(COLUMN_OPEN) {
            let start = search + pos;
            let body = start + COLUMN_OPEN.len();
            let close = self.find_close(body).ok_or_else(|| {
                FilterError::syntax(start, "unterminated column reference")
            })?;
            tokens.push(Token::new(
                TokenKind::Column,
                &self.input[body..close],
                start,
                close + 1,
            ));
            search = close + 1;
        }

        Ok(tokens)
    }

    /// Find every `{literal}` marker that is not part of a column reference
    fn scan_values(&self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut search = 0;

        while let Some(pos) = self.input[search..].find(VALUE_OPEN) {
            let open = search + pos;
            let body = open + 1;
            let is_column = self.input[..open].ends_with('#');
            let close = if is_column {
                self.find_close(body)
            } else {
                self.find_value_close(body)
            }
            .ok_or_else(|| FilterError::syntax(open, "unterminated value reference"))?;

            if !is_column {
                tokens.push(Token::new(
                    TokenKind::Value,
                    &self.input[body..close],
                    open,
                    close + 1,
                ));
            }
            search = close + 1;
        }

        Ok(tokens)
    }

    fn find_close(&self, from: usize) -> Option<usize> {
        self.input[from..].find(MARKER_CLOSE).map(|pos| from + pos)
    }

    /// Like `find_close`, but a `}` inside a quoted list element does not
    /// end the literal. An element is quoted only if the quote opens it, so
    /// apostrophes inside bare words are ordinary characters. If quoting
    /// never balances, the first `}` closes the literal.
    fn find_value_close(&self, from: usize) -> Option<usize> {
        let mut quote: Option<char> = None;
        let mut element_start = true;

        for (pos, c) in self.input[from..].char_indices() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                MARKER_CLOSE => return Some(from + pos),
                '\'' | '"' if element_start => quote = Some(c),
                '[' | '(' | ',' => element_start = true,
                c if c.is_whitespace() => {}
                _ => element_start = false,
            }
        }

        self.find_close(from)
    }

    /// Scan the text outside markers for operator keywords
    fn scan_operators(&self, markers: &[(usize, usize)]) -> Result<Vec<Token>> {
        let words = self.plain_words(markers);
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let (start, word) = words[i];
            i += 1;

            if Conjunction::from_keyword(word).is_some() {
                continue;
            }

            if word.eq_ignore_ascii_case("not") {
                // `not in` is the only two-word operator
                let end = match words.get(i) {
                    Some(&(next_start, next))
                        if next.eq_ignore_ascii_case("in")
                            && self.input[start + word.len()..next_start]
                                .trim()
                                .is_empty() =>
                    {
                        next_start + next.len()
                    }
                    _ => return Err(FilterError::syntax(start, "expected 'in' after 'not'")),
                };
                tokens.push(Token::new(
                    TokenKind::Operator,
                    &self.input[start..end],
                    start,
                    end,
                ));
                i += 1;
                continue;
            }

            if FilterOperator::from_keyword(word).is_none() {
                return Err(FilterError::syntax(
                    start,
                    format!("unrecognized operator '{}'", word),
                ));
            }
            tokens.push(Token::new(
                TokenKind::Operator,
                word,
                start,
                start + word.len(),
            ));
        }

        Ok(tokens)
    }

    /// Scan the text outside markers for `and`, `or` and parentheses
    fn scan_conjunctions(&self, markers: &[(usize, usize)]) -> Vec<Token> {
        self.plain_words(markers)
            .into_iter()
            .filter(|(_, word)| Conjunction::from_keyword(word).is_some())
            .map(|(start, word)| {
                Token::new(TokenKind::Conjunction, word, start, start + word.len())
            })
            .collect()
    }

    /// Split the text between markers into words with their offsets.
    ///
    /// A word is a run of identifier characters, a run of comparison
    /// symbols, or any other single non-whitespace character.
    fn plain_words(&self, markers: &[(usize, usize)]) -> Vec<(usize, &'a str)> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for &(start, end) in markers {
            if start > cursor {
                segments.push((cursor, &self.input[cursor..start]));
            }
            cursor = cursor.max(end);
        }
        if cursor < self.input.len() {
            segments.push((cursor, &self.input[cursor..]));
        }

        let mut words = Vec::new();
        for (base, segment) in segments {
            let mut chars = segment.char_indices().peekable();
            while let Some((start, ch)) = chars.next() {
                if ch.is_whitespace() {
                    continue;
                }

                let mut end = start + ch.len_utf8();
                let same_class: Option<fn(char) -> bool> = if is_word_char(ch) {
                    Some(is_word_char)
                } else if is_symbol_char(ch) {
                    Some(is_symbol_char)
                } else {
                    None
                };

                if let Some(class) = same_class {
                    while let Some(&(next, next_ch)) = chars.peek() {
                        if !class(next_ch) {
                            break;
                        }
                        end = next + next_ch.len_utf8();
                        chars.next();
                    }
                }

                words.push((base + start, &segment[start..end]));
            }
        }

        words
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_symbol_char(ch: char) -> bool {
    matches!(ch, '=' | '!' | '<' | '>')
}
