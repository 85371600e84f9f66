// src/engine/event_handlers.rs

//! Event handling logic for the core session.

use tracing::{debug, info};

use crate::dag::{DagGraph, Node};
use crate::engine::bisection::{Bisection, Move};
use crate::engine::core::{Repository, SessionStats};
use crate::engine::{SearchParams, Verdict};
use crate::errors::{BisectError, Result};

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Send a question about this node.
    Ask(Node),
    /// Send this node as the instance's solution.
    Solve(Node),
    /// Close the connection.
    Close,
}

/// Decision returned by the core after handling a single
/// [`SessionEvent`](crate::engine::SessionEvent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<SessionCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl SessionStep {
    fn proceed(commands: Vec<SessionCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Replace the session's repository with a freshly built graph.
pub fn handle_repository(
    repository: &mut Option<Repository>,
    stats: &mut SessionStats,
    params: &SearchParams,
    name: String,
    dag: Vec<(Node, Vec<Node>)>,
) -> Result<SessionStep> {
    let graph = DagGraph::from_edges(dag);
    if params.validate_repository {
        graph.validate()?;
    }

    info!(
        repository = %name,
        nodes = graph.len(),
        edges = graph.edge_count(),
        "loaded repository"
    );

    *repository = Some(Repository { name, graph });
    stats.repositories += 1;

    Ok(SessionStep::proceed(Vec::new()))
}

/// Start a new instance on the current repository.
///
/// Instances whose bad node has no unresolved ancestors are solved on the
/// spot, without any question.
pub fn handle_instance(
    repository: Option<&Repository>,
    bisection: &mut Option<Bisection>,
    stats: &mut SessionStats,
    params: &SearchParams,
    good: Node,
    bad: Node,
) -> Result<SessionStep> {
    let repo = repository.ok_or_else(|| {
        BisectError::Protocol("Instance received before any Repo".to_string())
    })?;

    let started = Bisection::start(&repo.graph, &good, &bad, *params)?;
    info!(
        repository = %repo.name,
        good = %good,
        bad = %bad,
        candidates = started.graph_size(),
        "starting bisection instance"
    );

    Ok(advance(started, bisection, stats))
}

/// Feed an answer into the instance in progress.
pub fn handle_answer(
    bisection: &mut Option<Bisection>,
    stats: &mut SessionStats,
    verdict: Verdict,
) -> Result<SessionStep> {
    let mut current = bisection.take().ok_or_else(|| {
        BisectError::Protocol("Answer received with no instance in progress".to_string())
    })?;

    current.record_answer(verdict)?;
    Ok(advance(current, bisection, stats))
}

/// The oracle sent its score: close and stop.
pub fn handle_score() -> SessionStep {
    info!("score received; closing session");
    SessionStep {
        commands: vec![SessionCommand::Close],
        keep_running: false,
    }
}

/// Turn the instance's next move into a command. Solved instances are
/// dropped, which puts the session back in the idle state.
fn advance(
    current: Bisection,
    slot: &mut Option<Bisection>,
    stats: &mut SessionStats,
) -> SessionStep {
    match current.next_move().clone() {
        Move::Ask(node) => {
            debug!(
                node = %node,
                candidates = current.graph_size(),
                "asking oracle"
            );
            *slot = Some(current);
            SessionStep::proceed(vec![SessionCommand::Ask(node)])
        }
        Move::Solve(node) => {
            info!(
                solution = %node,
                questions = current.questions_asked(),
                "instance solved"
            );
            stats.record_solution(current.questions_asked());
            SessionStep::proceed(vec![SessionCommand::Solve(node)])
        }
    }
}
