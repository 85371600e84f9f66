// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::errors::{BisectError, Result};
use crate::protocol::Credentials;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [server]
/// url = "ws://127.0.0.1:1234"
/// user = "abc12"
/// token = "597feceb"
///
/// [search]
/// threshold = 1000
/// batch = 10
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub search: SearchSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub search: SearchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(server: ServerSection, search: SearchSection) -> Self {
        Self { server, search }
    }

    /// Credentials announced on connect.
    ///
    /// Only the network client needs a user id, so it is checked here rather
    /// than at load time.
    pub fn credentials(&self) -> Result<Credentials> {
        let user = self.server.user.trim();
        if user.is_empty() {
            return Err(BisectError::ConfigError(
                "no user id configured (set [server].user or pass --user)".to_string(),
            ));
        }
        Ok(Credentials::new(user, self.server.token.clone()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.server.connect_timeout_secs)
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// WebSocket URL of the oracle (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,

    /// User id announced after connecting.
    #[serde(default)]
    pub user: String,

    /// Optional token sent along with the user id.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_url() -> String {
    "ws://127.0.0.1:1234".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            user: String::new(),
            token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    /// Candidate-graph size above which traversals are sampled.
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Rough number of candidates ranked per sampled round.
    #[serde(default = "default_batch")]
    pub batch: usize,

    /// Reject repositories with dangling parent references or cycles.
    #[serde(default = "default_validate_repository")]
    pub validate_repository: bool,
}

fn default_threshold() -> usize {
    1000
}

fn default_batch() -> usize {
    10
}

fn default_validate_repository() -> bool {
    true
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            batch: default_batch(),
            validate_repository: default_validate_repository(),
        }
    }
}
