//! parceq: search query inspection
//!
//! Command-line front end for the `parceq` query parser. It shows how free-form query text is
//! split into tokens and normalized into a boolean expression over terms, optionally expanded
//! with shingles, so that query behavior can be checked without running a search engine.

#![warn(missing_docs)]

pub mod cli;
