//! Configuration system for parceq.
//!
//! parceq uses TOML configuration files named `.parceq.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.parceq.toml` files found, then loading `~/.parceq.toml` as the global config with lowest
//! precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawOutputSettings, RawShingleSettings, parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::config_template;
use validate::validate_raw;

/// Default largest shingle order; 1 leaves term runs unexpanded.
pub const DEFAULT_MAX_ORDER: usize = 1;

/// Default string placed between the terms of a shingle.
pub const DEFAULT_SEPARATOR: &str = " ";

/// Top-level merged configuration for parceq.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.parceq.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Shingle expansion settings.
    pub shingle: ShingleSettings,
    /// Output settings.
    pub output: OutputSettings,
    /// Files the configuration was loaded from, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.parceq.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first. Every file is
    /// parsed and validated before any merging happens.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                validate_raw(&config, path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same layout as a `.parceq.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            shingle: &self.shingle,
            output: &self.output,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Shingle expansion settings.
    shingle: &'a ShingleSettings,
    /// Output settings.
    output: &'a OutputSettings,
}

/// Settings for shingle expansion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShingleSettings {
    /// Largest shingle order to generate.
    pub max_order: usize,
    /// String placed between the terms of a shingle.
    pub separator: String,
}

impl Default for ShingleSettings {
    fn default() -> Self {
        Self {
            max_order: DEFAULT_MAX_ORDER,
            separator: String::from(DEFAULT_SEPARATOR),
        }
    }
}

/// Settings for rendering parsed queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// How parsed expressions are rendered.
    pub format: OutputFormat,
}

/// Rendering style for parsed expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree, one node per line.
    #[default]
    Tree,
    /// Single-line form.
    Compact,
    /// JSON document.
    Json,
}

impl OutputFormat {
    /// Every format, in display order.
    pub const ALL: [Self; 3] = [Self::Tree, Self::Compact, Self::Json];

    /// Returns the name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format '{s}' (expected tree, compact or json)"))
    }
}
