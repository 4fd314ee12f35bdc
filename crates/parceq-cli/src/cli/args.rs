//! Clap argument definitions for the `parceq` CLI.

use clap::{ArgAction, Args, Parser, Subcommand};
use parceq_config::OutputFormat;

/// Parse a shingle order, which must be at least 1.
fn parse_order(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("shingle order must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse an output format from a string.
fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Top-level CLI options.
#[derive(Parser, Debug)]
#[command(name = "parceq")]
#[command(about = "Inspect how search queries are tokenized and parsed")]
pub struct Cli {
    /// Log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `parceq tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query text (read from stdin if omitted)
    pub query: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `parceq parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query text (read from stdin if omitted)
    pub query: Option<String>,

    /// Largest shingle order to add to each term run [default: 1]
    #[arg(short = 's', long, value_parser = parse_order)]
    pub shingle: Option<usize>,

    /// Separator placed between shingled words [default: " "]
    #[arg(long)]
    pub separator: Option<String>,

    /// Output format: tree, compact, json [default: tree]
    #[arg(short = 'f', long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
}

/// Arguments for `parceq init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.parceq.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `parceq` subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tokens of a query
    Tokens(TokensCommand),

    /// Parse a query and show the normalized expression
    #[command(after_help = "\
QUERY SYNTAX:
  word1 word2       Adjacent words, boosted as a group
  \"phrase\"          Quoted text is a single term
  +term             Term is required
  -term             Term is excluded
  a OR b, a || b    Either term (binds tighter than AND)
  a AND b, a && b   Both terms
  \\-1, \\(x\\)        Backslash makes an operator literal

EXAMPLES:
  parceq parse 'rust async'
  parceq parse 'rust -deprecated +tokio'
  parceq parse --shingle 2 'new york pizza'
  echo 'a OR b' | parceq parse --format json")]
    Parse(ParseCommand),

    /// Show effective configuration settings
    Config,

    /// Initialize parceq configuration in current directory
    Init(InitCommand),
}

impl Commands {
    /// Returns whether the command reads the merged configuration.
    ///
    /// `init` must work even when an existing config file is invalid.
    pub fn uses_config(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Config)
    }
}
