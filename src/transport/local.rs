// src/transport/local.rs

//! In-process oracle for offline runs and tests.
//!
//! [`LocalTransport`] plays the server side of the protocol: it hands out a
//! `Repo` and an `Instance`, answers each `Question` through a
//! [`SimulatedOracle`], records the `Solution`, and finishes with a `Score`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::dag::{DagGraph, Node, Sampling, explore};
use crate::engine::Verdict;
use crate::errors::{BisectError, Result};
use crate::protocol::{
    ClientMessage, InstanceBody, ProblemBody, RepoBody, ServerMessage, decode_client,
    encode_server,
};
use crate::transport::{Transport, TransportFuture};

/// Answers questions for a DAG with a single known culprit.
///
/// A node is bad iff it is the culprit or descends from it.
#[derive(Debug, Clone)]
pub struct SimulatedOracle {
    graph: DagGraph,
    culprit: Node,
}

impl SimulatedOracle {
    pub fn new(graph: DagGraph, culprit: impl Into<Node>) -> Result<Self> {
        let culprit = culprit.into();
        if !graph.contains(&culprit) {
            return Err(BisectError::UnknownNode(culprit));
        }
        Ok(Self { graph, culprit })
    }

    pub fn culprit(&self) -> &str {
        &self.culprit
    }

    pub fn verdict(&self, node: &str) -> Result<Verdict> {
        if node == self.culprit {
            return Ok(Verdict::Bad);
        }
        // Walk the whole ancestry with the culprit as boundary: reaching it
        // means the culprit is an ancestor.
        let walk = explore(&self.graph, node, &self.culprit, Sampling::Exhaustive)?;
        Ok(if walk.reached_boundary {
            Verdict::Bad
        } else {
            Verdict::Good
        })
    }
}

/// What happened during a local run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalReport {
    /// User id announced by the client, if any.
    pub user: Option<String>,
    /// Questions in the order they were asked.
    pub questions: Vec<Node>,
    pub solution: Option<Node>,
}

/// Server side of the protocol, run in-process against a [`SimulatedOracle`].
pub struct LocalTransport {
    oracle: SimulatedOracle,
    outbox: VecDeque<ServerMessage>,
    report: Arc<Mutex<LocalReport>>,
    closed: bool,
}

impl LocalTransport {
    /// Prepare a run of `problem` whose answers come from `culprit`.
    ///
    /// When `split` is true the problem is sent as separate `Repo` and
    /// `Instance` messages, otherwise as a single `Problem`.
    pub fn new(problem: ProblemBody, culprit: impl Into<Node>, split: bool) -> Result<Self> {
        let graph = DagGraph::from_edges(problem.dag.clone());
        let oracle = SimulatedOracle::new(graph, culprit)?;

        let outbox = if split {
            VecDeque::from([
                ServerMessage::Repo(RepoBody {
                    name: problem.name.clone().unwrap_or_else(|| "local".to_string()),
                    instance_count: Some(1),
                    dag: problem.dag,
                }),
                ServerMessage::Instance(InstanceBody {
                    good: problem.good,
                    bad: problem.bad,
                }),
            ])
        } else {
            VecDeque::from([ServerMessage::Problem(problem)])
        };

        Ok(Self {
            oracle,
            outbox,
            report: Arc::new(Mutex::new(LocalReport::default())),
            closed: false,
        })
    }

    /// Shared handle to the report; stays readable after the transport has
    /// been moved into a runtime.
    pub fn report(&self) -> Arc<Mutex<LocalReport>> {
        Arc::clone(&self.report)
    }

    fn handle_client_frame(&mut self, frame: &str) -> Result<()> {
        let message = decode_client(frame)?;
        let mut report = self
            .report
            .lock()
            .map_err(|_| BisectError::Transport("local report lock poisoned".to_string()))?;

        match message {
            ClientMessage::User(credentials) => {
                report.user = Some(credentials.user().to_string());
            }
            ClientMessage::Question(node) => {
                let verdict = self.oracle.verdict(&node)?;
                debug!(node = %node, ?verdict, "simulated oracle answered");
                report.questions.push(node);
                self.outbox.push_back(ServerMessage::Answer(verdict));
            }
            ClientMessage::Solution(node) => {
                let correct = node == self.oracle.culprit();
                report.solution = Some(node);
                self.outbox.push_back(ServerMessage::Score(serde_json::json!({
                    "questions": report.questions.len(),
                    "correct": correct,
                })));
            }
        }
        Ok(())
    }
}

impl Transport for LocalTransport {
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        Box::pin(async move { self.handle_client_frame(&frame) })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            if self.closed {
                return Ok(None);
            }
            match self.outbox.pop_front() {
                Some(message) => encode_server(&message).map(Some),
                None => Ok(None),
            }
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.closed = true;
            Ok(())
        })
    }
}
