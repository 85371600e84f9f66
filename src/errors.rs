// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BisectError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Degenerate instance: {0}")]
    DegenerateInstance(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BisectError>;
