// src/engine/core.rs

//! Pure core session state machine.
//!
//! [`CoreSession`] consumes [`SessionEvent`]s one at a time and returns a
//! [`SessionStep`] describing what the IO shell should send. It owns the
//! repository graph (kept across instances) and the bisection in progress
//! (dropped when solved).
//!
//! There are no channels, sockets or Tokio types in here, so the whole
//! protocol can be driven from plain unit tests.

use std::fmt;

use crate::dag::DagGraph;
use crate::engine::bisection::Bisection;
use crate::engine::event_handlers::{
    SessionStep, handle_answer, handle_instance, handle_repository, handle_score,
};
use crate::engine::{SearchParams, SessionEvent};
use crate::errors::{BisectError, Result};

/// Protocol state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a repository, an instance or the score.
    Idle,
    /// Waiting for the answer to the last question.
    InProgress,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::InProgress => f.write_str("in progress"),
        }
    }
}

/// Repository DAG shared by every instance of a session.
#[derive(Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub graph: DagGraph,
}

/// Counters kept across the whole session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub repositories: usize,
    /// Questions asked for each solved instance, in order.
    pub questions_per_instance: Vec<usize>,
}

impl SessionStats {
    pub fn instances_solved(&self) -> usize {
        self.questions_per_instance.len()
    }

    pub fn total_questions(&self) -> usize {
        self.questions_per_instance.iter().sum()
    }

    pub(crate) fn record_solution(&mut self, questions: usize) {
        self.questions_per_instance.push(questions);
    }
}

#[derive(Debug)]
pub struct CoreSession {
    params: SearchParams,
    repository: Option<Repository>,
    bisection: Option<Bisection>,
    stats: SessionStats,
}

impl CoreSession {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            repository: None,
            bisection: None,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.bisection.is_some() {
            SessionState::InProgress
        } else {
            SessionState::Idle
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    /// The instance currently waiting for an answer.
    pub fn bisection(&self) -> Option<&Bisection> {
        self.bisection.as_ref()
    }

    /// Handle a single event.
    ///
    /// Any error is fatal for the session: the caller should report it and
    /// close the connection.
    pub fn step(&mut self, event: SessionEvent) -> Result<SessionStep> {
        match (self.state(), event) {
            (SessionState::Idle, SessionEvent::Repository { name, dag }) => handle_repository(
                &mut self.repository,
                &mut self.stats,
                &self.params,
                name,
                dag,
            ),
            (SessionState::Idle, SessionEvent::Instance { good, bad }) => handle_instance(
                self.repository.as_ref(),
                &mut self.bisection,
                &mut self.stats,
                &self.params,
                good,
                bad,
            ),
            (SessionState::Idle, SessionEvent::Score) => Ok(handle_score()),
            (SessionState::InProgress, SessionEvent::Answer(verdict)) => {
                handle_answer(&mut self.bisection, &mut self.stats, verdict)
            }
            (state, event) => Err(BisectError::Protocol(format!(
                "unexpected {} message while {}",
                event.kind(),
                state
            ))),
        }
    }
}
