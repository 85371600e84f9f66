// src/engine/mod.rs

//! Bisection engine.
//!
//! This module ties together:
//! - the per-instance search state ([`bisection`])
//! - the session state machine reacting to oracle events ([`core`],
//!   [`event_handlers`])
//! - the async shell that talks to a [`Transport`](crate::transport::Transport)
//!   ([`runtime`])
//!
//! The core is synchronous and does no IO; the runtime only decodes frames,
//! feeds them to the core and sends back what the core asks for.

use serde::{Deserialize, Serialize};

use crate::config::SearchSection;
use crate::dag::Node;

/// Oracle classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Good,
    Bad,
}

/// Tuning knobs for the search, derived from `[search]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Graph size above which traversals are sampled.
    pub threshold: usize,
    /// Target number of sampled candidates per round.
    pub batch: usize,
    /// Reject repositories with dangling parents or cycles.
    pub validate_repository: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from(&SearchSection::default())
    }
}

impl From<&SearchSection> for SearchParams {
    fn from(section: &SearchSection) -> Self {
        Self {
            threshold: section.threshold,
            batch: section.batch,
            validate_repository: section.validate_repository,
        }
    }
}

/// Events flowing into the session from the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new repository DAG as `(node, parents)` pairs.
    Repository {
        name: String,
        dag: Vec<(Node, Vec<Node>)>,
    },
    /// Start a bisection between a known-good and a known-bad node.
    Instance { good: Node, bad: Node },
    /// Classification of the last node asked about.
    Answer(Verdict),
    /// Final score; the oracle is done with us.
    Score,
}

impl SessionEvent {
    /// Short name used in logs and protocol errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Repository { .. } => "Repo",
            SessionEvent::Instance { .. } => "Instance",
            SessionEvent::Answer(_) => "Answer",
            SessionEvent::Score => "Score",
        }
    }
}

pub mod bisection;
pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use bisection::{Bisection, Move};
pub use self::core::{CoreSession, Repository, SessionState, SessionStats};
pub use event_handlers::{SessionCommand, SessionStep};
pub use runtime::Runtime;
