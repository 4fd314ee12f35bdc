//! Helpers shared by the query commands.

use std::io::{self, Read};

use parceq::ReadError;

/// Returns the query argument, or all of `input` when no argument was given.
///
/// Trailing line terminators are dropped from piped input, since only spaces separate
/// words and a final newline would otherwise end up inside the last word.
pub fn query_text<R: Read>(query: Option<&str>, mut input: R) -> Result<String, ReadError> {
    if let Some(query) = query {
        return Ok(query.to_string());
    }
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    let trimmed_len = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(trimmed_len);
    log::debug!("read {} bytes of query text from stdin", text.len());
    Ok(text)
}

/// Reads the query from the argument or standard input, reporting failures.
pub fn query_text_or_failure(query: Option<&str>) -> Option<String> {
    match query_text(query, io::stdin().lock()) {
        Ok(text) => Some(text),
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}
