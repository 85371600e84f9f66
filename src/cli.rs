// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagbisect`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "dagbisect",
    version,
    about = "Find the first bad node of a DAG by asking an oracle.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `DagBisect.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Oracle WebSocket URL; overrides `[server].url`.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// User id to announce; overrides `[server].user`.
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Token sent with the user id; overrides `[server].token`.
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGBISECT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the config, print the effective settings, and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Solve a problem file offline instead of connecting to a server.
    ///
    /// The file holds `{"good": .., "bad": .., "dag": [[node, [parents..]], ..]}`.
    #[arg(long, value_name = "PATH", requires = "culprit")]
    pub problem: Option<PathBuf>,

    /// The node the simulated oracle treats as the first bad one.
    #[arg(long, value_name = "NODE", requires = "problem")]
    pub culprit: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
