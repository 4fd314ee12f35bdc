//! End-to-end query parsing.

use std::io::Read;

use crate::{
    error::{ParseError, QueryError},
    expression::Expression,
    lexer::{token_stream, tokenize},
    parser::parse,
    shingle::shingle,
    term::TermAllocator,
};

/// A parsed query together with the allocator that issued its terms.
///
/// Keeping the allocator lets later transforms such as [`ParsedQuery::shingle`] add terms
/// without reusing ids.
#[derive(Debug)]
pub struct ParsedQuery {
    /// Allocator shared by parsing and later transforms.
    allocator: TermAllocator,
    /// The normalized expression.
    expression: Expression,
}

impl ParsedQuery {
    /// Returns the parsed expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Returns the term allocator.
    pub fn allocator(&self) -> &TermAllocator {
        &self.allocator
    }

    /// Splits the query into its allocator and expression.
    pub fn into_parts(self) -> (TermAllocator, Expression) {
        (self.allocator, self.expression)
    }

    /// Replaces every term run with the OR of the run and its shingles up to `max_order`.
    ///
    /// New shingle terms are allocated from this query's allocator, in reading order.
    pub fn shingle(mut self, max_order: usize, separator: &str) -> Self {
        let allocator = &mut self.allocator;
        let expression = self
            .expression
            .flat_map_terms(|terms| shingle(terms, max_order, separator, allocator));
        log::debug!(
            "shingled query to order {max_order}: {} terms allocated",
            allocator.allocated()
        );
        Self {
            allocator: self.allocator,
            expression,
        }
    }
}

/// Reads and parses a query from a byte stream.
///
/// The whole stream is tokenized before parsing starts; a read failure aborts with
/// [`QueryError::Read`] and no partial result.
pub fn parse_query<R: Read>(reader: R) -> Result<ParsedQuery, QueryError> {
    let tokens = token_stream(reader).collect::<Result<Vec<_>, _>>()?;
    let mut allocator = TermAllocator::new();
    let expression = parse(tokens, &mut allocator)?;
    Ok(ParsedQuery {
        allocator,
        expression,
    })
}

/// Parses a query string.
pub fn parse_query_str(input: &str) -> Result<ParsedQuery, ParseError> {
    let mut allocator = TermAllocator::new();
    let expression = parse(tokenize(input), &mut allocator)?;
    Ok(ParsedQuery {
        allocator,
        expression,
    })
}
