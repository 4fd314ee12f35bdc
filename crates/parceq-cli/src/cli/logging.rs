//! Diagnostic logging setup.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Maps the `-v` count to a log level.
///
/// Without `-v` the level comes from `RUST_LOG`, falling back to warnings only.
fn level_for(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Installs the global logger, writing to stderr.
pub fn init(verbose: u8) {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .parse_env(Env::default())
        .format_timestamp(None);
    if let Some(level) = level_for(verbose) {
        builder.filter_level(level);
    }
    builder.init();
}
