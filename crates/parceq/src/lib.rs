//! Search query parsing into normalized boolean expressions.
//!
//! This crate turns free-form query text into a boolean expression tree over terms, for a
//! retrieval engine to evaluate:
//!
//! - **Words**: `rust async` - adjacent words form one boosted term run
//! - **Phrases**: `"error handling"` - quoted text is a single term
//! - **Required**: `+rust` - the term must match
//! - **Excluded**: `-deprecated` - the term must not match
//! - **Infix**: `rust OR golang`, `a && b` - explicit conjunction and disjunction
//! - **Escapes**: `\-1`, `\(x\)` - operators taken literally
//!
//! Every term is issued by a [`TermAllocator`] and carries a unique id. A parsed query can be
//! expanded with shingles (n-grams of adjacent terms) via [`ParsedQuery::shingle`].
//!
//! # Example
//!
//! ```
//! use parceq::{Operator, parse_query_str};
//!
//! let query = parse_query_str("foo bar +baz").unwrap();
//! assert_eq!(query.expression().operator(), Operator::And);
//! assert_eq!(query.expression().to_string(), "AND([baz#2], BOOST([foo#0 bar#1]))");
//! ```

#![warn(missing_docs)]

mod error;
mod expression;
mod lexer;
mod parser;
mod query;
mod reader;
mod shingle;
mod term;

pub use error::{Construct, ParseError, QueryError, ReadError};
pub use expression::{Expression, Operator};
pub use lexer::{Lexer, Token, TokenKind, TokenStream, token_stream, tokenize};
pub use parser::parse;
pub use query::{ParsedQuery, parse_query, parse_query_str};
pub use reader::Utf8Chars;
pub use shingle::shingle;
pub use term::{Term, TermAllocator, TermId};
