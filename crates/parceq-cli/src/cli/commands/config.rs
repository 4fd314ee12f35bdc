//! Implementation of `parceq config`.

use std::process::ExitCode;

use crate::cli::context::CommandContext;

/// Shows effective configuration settings as TOML, preceded by the files they came from.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;
    let toml = match config.settings_to_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.sources.is_empty() {
        println!("# no configuration files found, showing defaults");
    }
    for path in &config.sources {
        println!("# from {}", path.display());
    }
    print!("{toml}");
    ExitCode::SUCCESS
}
