//! Error types for query reading and parsing.
//!
//! Almost every input parses to some expression. The only failures are an I/O error while
//! reading query text and the parenthesized grouping construct, which the parser rejects.

use std::{fmt, io};

use thiserror::Error;

/// Failure while reading query text from an input stream.
#[derive(Debug, Error)]
#[error("failed to read query text: {source}")]
pub struct ReadError {
    /// Underlying I/O error.
    #[from]
    source: io::Error,
}

impl ReadError {
    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Consumes the error, returning the underlying I/O error.
    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}

/// A syntactic construct the parser recognizes but does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// Parenthesized grouping: `(a b) OR c`.
    Grouping,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grouping => write!(f, "parenthesized grouping"),
        }
    }
}

/// Parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The query uses a construct the parser does not implement.
    #[error("{construct} is not supported (at offset {offset})")]
    UnsupportedConstruct {
        /// The rejected construct.
        construct: Construct,
        /// Code point offset of the offending token in the query text.
        offset: usize,
    },
}

impl ParseError {
    /// Returns the code point offset the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnsupportedConstruct { offset, .. } => *offset,
        }
    }

    /// Returns a suggestion for resolving the error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::UnsupportedConstruct {
                construct: Construct::Grouping,
                ..
            } => "escape the parenthesis (\\() or quote the term to search for it literally",
        }
    }
}

/// Any error produced while turning query text into a parsed query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Reading the query text failed.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// The query text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
