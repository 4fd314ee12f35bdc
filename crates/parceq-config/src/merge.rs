//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules.

use std::path::PathBuf;

use crate::{
    Config, OutputSettings, ShingleSettings,
    parse::{RawConfig, RawOutputSettings, RawShingleSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to the
/// working directory), lowest precedence last (global config). Each setting takes the first
/// defined value; anything left undefined keeps its default.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut shingle = ShingleSettings::default();
    let mut output = OutputSettings::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(raw) = &parsed.config.shingle {
            apply_raw_shingle(&mut shingle, raw);
        }
        if let Some(raw) = &parsed.config.output {
            apply_raw_output(&mut output, raw);
        }
    }

    Config {
        shingle,
        output,
        sources: configs.iter().map(|c| c.path.clone()).collect(),
    }
}

/// Applies raw shingle settings to result, overwriting any present values.
fn apply_raw_shingle(result: &mut ShingleSettings, raw: &RawShingleSettings) {
    if let Some(v) = raw.max_order {
        result.max_order = v;
    }
    if let Some(v) = &raw.separator {
        result.separator.clone_from(v);
    }
}

/// Applies raw output settings to result.
fn apply_raw_output(result: &mut OutputSettings, raw: &RawOutputSettings) {
    if let Some(v) = raw.format {
        result.format = v;
    }
}
