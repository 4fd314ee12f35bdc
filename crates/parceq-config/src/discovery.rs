//! Locating `.parceq.toml` files.
//!
//! A query run from some directory picks up every `.parceq.toml` in that directory and its
//! ancestors, nearest first, followed by the per-user file in the home directory. A file that
//! sets `root = true` closes the search: nothing above it, and not the per-user file, is read.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".parceq.toml";

/// Lists the configuration files that apply to queries run from `cwd`, nearest first.
///
/// The per-user file comes last unless a `root = true` file was met on the way up. Entries
/// that are directories rather than files are ignored. The result is empty when nothing
/// applies.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let closes_search = is_root_config(&candidate);
        configs.push(candidate);
        if closes_search {
            log::debug!("configuration search closed by {}", dir.display());
            return configs;
        }
    }

    if let Some(user_config) = global_config_path().filter(|path| path.is_file())
        && !configs.contains(&user_config)
    {
        configs.push(user_config);
    }
    configs
}

/// Path of the per-user configuration file, `~/.parceq.toml`, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// True when `path` is the per-user configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|user_config| path == user_config)
}
