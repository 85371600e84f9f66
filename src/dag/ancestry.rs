// src/dag/ancestry.rs

//! Ancestry cache and ranking pass.
//!
//! The frontier is processed in reverse discovery order (most ancestral
//! first), so a node's parents have usually been handled by the time the node
//! itself is. Their cached ancestor sets are unioned instead of re-walking the
//! graph. When a parent is still a live candidate but has no cached set (it
//! fell between two sampled nodes) the node's ancestry is recomputed with an
//! exhaustive traversal instead.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::dag::Node;
use crate::dag::frontier::{Sampling, explore};
use crate::dag::graph::DagGraph;
use crate::dag::ranking::{halfway, rank};
use crate::errors::Result;

/// Output of one ranking round.
#[derive(Debug, Clone, Default)]
pub struct RankingPass {
    /// Ancestor sets (relative to the good boundary) of every processed node.
    pub ancestors: HashMap<Node, HashSet<Node>>,
    /// Balanced-split scores of processed, unresolved nodes.
    pub rankings: HashMap<Node, usize>,
    /// Node whose score hit the halfway mark; the pass stopped there.
    pub exact: Option<Node>,
    /// Number of nodes whose ancestry needed a fresh traversal.
    pub fallbacks: usize,
}

impl RankingPass {
    pub fn ancestors_of(&self, node: &str) -> Option<&HashSet<Node>> {
        self.ancestors.get(node)
    }

    pub fn has_candidates(&self) -> bool {
        !self.rankings.is_empty()
    }
}

/// Compute ancestor sets for `frontier` and score every node not in
/// `resolved`.
///
/// Scores use the current graph size as `n`. The pass ends early at the first
/// node whose score equals `halfway(n)`.
pub fn rank_candidates(
    graph: &DagGraph,
    frontier: &[Node],
    good: &str,
    resolved: &HashMap<Node, bool>,
) -> Result<RankingPass> {
    let n = graph.len();
    let target = halfway(n);
    let mut pass = RankingPass::default();

    for node in frontier.iter().rev() {
        let ancestry = ancestry_of(graph, node, good, &mut pass)?;
        let size = ancestry.len();
        pass.ancestors.insert(node.clone(), ancestry);

        if resolved.contains_key(node) {
            continue;
        }

        let score = rank(size, n);
        trace!(node = %node, ancestors = size, score, "ranked candidate");
        pass.rankings.insert(node.clone(), score);

        if score == target {
            pass.exact = Some(node.clone());
            break;
        }
    }

    Ok(pass)
}

fn ancestry_of(
    graph: &DagGraph,
    node: &str,
    good: &str,
    pass: &mut RankingPass,
) -> Result<HashSet<Node>> {
    let mut ancestry: HashSet<Node> = HashSet::new();

    for parent in graph.parents_of(node)? {
        if parent == good {
            continue;
        }

        if let Some(cached) = pass.ancestors.get(parent) {
            ancestry.extend(cached.iter().cloned());
            ancestry.insert(parent.clone());
        } else if graph.contains(parent) {
            pass.fallbacks += 1;
            trace!(node, parent = %parent, "sampling gap; recomputing ancestry");
            let mut full = explore(graph, node, good, Sampling::Exhaustive)?.into_ancestry(node);
            full.remove(good);
            return Ok(full);
        }
        // Parents missing from the graph were pruned earlier.
    }

    ancestry.remove(good);
    Ok(ancestry)
}
