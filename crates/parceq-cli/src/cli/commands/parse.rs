//! Implementation of `parceq parse`.

use std::process::ExitCode;

use parceq::parse_query_str;

use super::shared::query_text_or_failure;
use crate::cli::{
    args::ParseCommand,
    context::CommandContext,
    output::{format_parse_error, render_query},
};

/// Parses a query and prints the normalized expression.
///
/// Flags take precedence over the configured shingle and output settings.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let Some(text) = query_text_or_failure(cmd.query.as_deref()) else {
        return ExitCode::FAILURE;
    };

    let query = match parse_query_str(&text) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("{}", format_parse_error(&text, &e));
            return ExitCode::FAILURE;
        }
    };

    let settings = &ctx.config.shingle;
    let max_order = cmd.shingle.unwrap_or(settings.max_order);
    let separator = cmd.separator.as_deref().unwrap_or(&settings.separator);
    let query = if max_order > 1 {
        query.shingle(max_order, separator)
    } else {
        query
    };

    let format = cmd.format.unwrap_or(ctx.config.output.format);
    match render_query(&text, &query, format) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize expression: {e}");
            ExitCode::FAILURE
        }
    }
}
