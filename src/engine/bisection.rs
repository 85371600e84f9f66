// src/engine/bisection.rs

//! State of a single bisection instance.
//!
//! A [`Bisection`] owns a private copy of the repository graph, trimmed to the
//! ancestry of the bad node, and shrinks it after every answer:
//!
//! - `Good`: the node and all its ancestors are good. They are removed from
//!   the graph and the node becomes the new good boundary.
//! - `Bad`: the node becomes the new bad boundary and the graph is cut down
//!   to the node plus its ancestry.
//!
//! After each change the frontier and rankings are rebuilt from scratch. When
//! no unresolved candidate is left, the bad boundary is the answer.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::dag::{DagGraph, Node, RankingPass, Sampling, explore, rank_candidates, select_question};
use crate::engine::{SearchParams, Verdict};
use crate::errors::{BisectError, Result};

/// What the session should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    /// Ask the oracle about this node.
    Ask(Node),
    /// This node is the first bad node.
    Solve(Node),
}

/// Per-instance search state.
#[derive(Debug, Clone)]
pub struct Bisection {
    graph: DagGraph,
    good: Node,
    bad: Node,
    /// Every node whose status is known (`true` = good).
    resolved: HashMap<Node, bool>,
    params: SearchParams,
    round: RankingPass,
    sampling: Sampling,
    frontier_len: usize,
    next: Move,
    questions: usize,
}

impl Bisection {
    /// Start a bisection over a fork of `repository`.
    ///
    /// Fails if either boundary is unknown, if `good == bad`, or if `good` is
    /// not an ancestor of `bad`.
    pub fn start(
        repository: &DagGraph,
        good: &str,
        bad: &str,
        params: SearchParams,
    ) -> Result<Self> {
        if good == bad {
            return Err(BisectError::DegenerateInstance(format!(
                "good and bad are the same node '{}'",
                good
            )));
        }
        for node in [good, bad] {
            if !repository.contains(node) {
                return Err(BisectError::UnknownNode(node.to_string()));
            }
        }

        let mut graph = repository.clone();
        let trimmed = graph.trim(bad, good)?;
        if !trimmed.reached_boundary {
            return Err(BisectError::DegenerateInstance(format!(
                "good node '{}' is not an ancestor of bad node '{}'",
                good, bad
            )));
        }

        let resolved = HashMap::from([(good.to_string(), true), (bad.to_string(), false)]);

        let mut bisection = Self {
            graph,
            good: good.to_string(),
            bad: bad.to_string(),
            resolved,
            params,
            round: RankingPass::default(),
            sampling: Sampling::Exhaustive,
            frontier_len: 0,
            next: Move::Solve(bad.to_string()),
            questions: 0,
        };
        bisection.recompute()?;
        Ok(bisection)
    }

    /// The move decided by the last round.
    pub fn next_move(&self) -> &Move {
        &self.next
    }

    pub fn good(&self) -> &str {
        &self.good
    }

    pub fn bad(&self) -> &str {
        &self.bad
    }

    /// Current candidate-graph size.
    pub fn graph_size(&self) -> usize {
        self.graph.len()
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Number of answers consumed so far.
    pub fn questions_asked(&self) -> usize {
        self.questions
    }

    /// Known status of `node`, if any (`Some(true)` = good).
    pub fn status_of(&self, node: &str) -> Option<bool> {
        self.resolved.get(node).copied()
    }

    /// The last ranking round, for diagnostics.
    pub fn last_round(&self) -> &RankingPass {
        &self.round
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Length of the frontier the last round ranked.
    pub fn frontier_len(&self) -> usize {
        self.frontier_len
    }

    /// Apply the oracle's answer about the pending question and rerank.
    pub fn record_answer(&mut self, verdict: Verdict) -> Result<()> {
        let asked = match &self.next {
            Move::Ask(node) => node.clone(),
            Move::Solve(node) => {
                return Err(BisectError::Protocol(format!(
                    "answer received after '{}' was already declared the solution",
                    node
                )));
            }
        };

        let ancestry = self
            .round
            .ancestors
            .remove(&asked)
            .ok_or_else(|| BisectError::UnknownNode(asked.clone()))?;

        let size_before = self.graph.len();
        self.questions += 1;

        match verdict {
            Verdict::Good => self.mark_good(asked.clone(), ancestry),
            Verdict::Bad => self.mark_bad(asked.clone(), ancestry),
        }

        debug!(
            node = %asked,
            ?verdict,
            size_before,
            size_after = self.graph.len(),
            "applied answer"
        );

        self.recompute()
    }

    fn mark_good(&mut self, node: Node, ancestry: HashSet<Node>) {
        let mut removed = ancestry;
        for ancestor in removed.iter() {
            self.resolved.insert(ancestor.clone(), true);
        }
        self.resolved.insert(node.clone(), true);

        removed.insert(node.clone());
        removed.insert(std::mem::replace(&mut self.good, node));
        self.graph.remove_nodes(&removed);
    }

    fn mark_bad(&mut self, node: Node, ancestry: HashSet<Node>) {
        self.resolved.insert(node.clone(), false);

        let mut keep = ancestry;
        keep.insert(node.clone());
        self.graph.restrict_to(&keep);
        self.bad = node;
    }

    /// Rebuild frontier and rankings for the current graph and decide the
    /// next move.
    fn recompute(&mut self) -> Result<()> {
        let size = self.graph.len();
        self.sampling = Sampling::for_graph_size(size, self.params.threshold, self.params.batch);

        let mut frontier = explore(&self.graph, &self.bad, &self.good, self.sampling)?;
        let mut pass = rank_candidates(&self.graph, &frontier.order, &self.good, &self.resolved)?;

        if !pass.has_candidates() && self.sampling.is_sampled() {
            warn!(
                size,
                sampling = ?self.sampling,
                "sampled round produced no candidates; ranking exhaustively"
            );
            self.sampling = Sampling::Exhaustive;
            frontier = explore(&self.graph, &self.bad, &self.good, self.sampling)?;
            pass = rank_candidates(&self.graph, &frontier.order, &self.good, &self.resolved)?;
        }

        self.frontier_len = frontier.order.len();
        self.next = match select_question(&pass) {
            Some(node) => Move::Ask(node),
            None => Move::Solve(self.bad.clone()),
        };

        debug!(
            size,
            sampling = ?self.sampling,
            frontier = self.frontier_len,
            candidates = pass.rankings.len(),
            fallbacks = pass.fallbacks,
            exact = pass.exact.is_some(),
            next = ?self.next,
            "ranking round complete"
        );

        self.round = pass;
        Ok(())
    }
}
