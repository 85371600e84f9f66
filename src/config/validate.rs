// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, SearchSection, ServerSection};
use crate::errors::{BisectError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BisectError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_server(&raw.server)?;
        validate_search(&raw.search)?;
        Ok(ConfigFile::new_unchecked(raw.server, raw.search))
    }
}

fn validate_server(server: &ServerSection) -> Result<()> {
    let url = server.url.trim();
    if url.is_empty() {
        return Err(BisectError::ConfigError(
            "[server].url must not be empty".to_string(),
        ));
    }
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        return Err(BisectError::ConfigError(format!(
            "[server].url must start with ws:// or wss:// (got '{}')",
            url
        )));
    }
    if server.connect_timeout_secs == 0 {
        return Err(BisectError::ConfigError(
            "[server].connect_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_search(search: &SearchSection) -> Result<()> {
    if search.batch == 0 {
        return Err(BisectError::ConfigError(
            "[search].batch must be >= 1 (got 0)".to_string(),
        ));
    }
    // Sampling uses interval = size / batch with size > threshold, so this
    // keeps the interval at 1 or more.
    if search.threshold < search.batch {
        return Err(BisectError::ConfigError(format!(
            "[search].threshold ({}) must be >= [search].batch ({})",
            search.threshold, search.batch
        )));
    }
    Ok(())
}
