// Query module - filter pseudo-query tokenizing and parsing
//
// Wire format: `#{column}` marks a column reference, `{literal}` a value
// reference; operator keywords, `and`, `or` and parentheses sit between them.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Clause, QueryExpr};
pub use lexer::{Lexer, TokenStream};
pub use parser::{parse_query, Parser};
pub use token::{Conjunction, Token, TokenKind};
