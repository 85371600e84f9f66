// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated model.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for the
/// checked version.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `DagBisect.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("DagBisect.toml")
}

/// Build the effective configuration for a CLI invocation.
///
/// - An explicit `--config` path must exist.
/// - Without one, `DagBisect.toml` is used if present, else built-in defaults.
/// - `--server`, `--user` and `--token` override the file.
///
/// Validation runs after the overrides are applied.
pub fn load_for_cli(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load_from_path(&path)?
            } else {
                debug!(path = %path.display(), "no config file; using defaults");
                RawConfigFile::default()
            }
        }
    };

    if let Some(url) = &args.server {
        raw.server.url = url.clone();
    }
    if let Some(user) = &args.user {
        raw.server.user = user.clone();
    }
    if let Some(token) = &args.token {
        raw.server.token = Some(token.clone());
    }

    ConfigFile::try_from(raw)
}
