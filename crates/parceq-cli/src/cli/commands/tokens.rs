//! Implementation of `parceq tokens`.

use std::process::ExitCode;

use parceq::tokenize;

use super::shared::query_text_or_failure;
use crate::cli::{
    args::TokensCommand,
    output::{token_table, tokens_json},
};

/// Prints the tokens of a query.
pub fn run(cmd: &TokensCommand) -> ExitCode {
    let Some(text) = query_text_or_failure(cmd.query.as_deref()) else {
        return ExitCode::FAILURE;
    };
    let tokens = tokenize(&text);
    log::debug!("lexed {} tokens", tokens.len());

    if cmd.json {
        match tokens_json(&tokens) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize tokens: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else if tokens.is_empty() {
        println!("(no tokens)");
    } else {
        println!("{}", token_table(&tokens));
    }
    ExitCode::SUCCESS
}
