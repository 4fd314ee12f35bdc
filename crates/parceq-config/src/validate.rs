//! Configuration validation.
//!
//! Values that parse but make no sense are rejected per file, before merging, so the error
//! can name the file that set them.

use std::path::Path;

use crate::{ConfigError, parse::RawConfig};

/// Checks the settings in one raw config file.
pub fn validate_raw(config: &RawConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(shingle) = &config.shingle
        && shingle.max_order == Some(0)
    {
        return Err(invalid(path, "shingle.max_order", "must be at least 1"));
    }
    Ok(())
}

/// Builds an `InvalidSetting` error.
fn invalid(path: &Path, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        path: path.to_path_buf(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
