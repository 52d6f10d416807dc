// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load configuration from a TOML file, falling back to defaults when the
/// file is missing or malformed.
pub fn load_or_default(path: &Path) -> Config {
    Config::load_or_default(path)
}

/// Load and validate configuration. Validation failures are fatal.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path);
    config.validate()?;
    Ok(config)
}
