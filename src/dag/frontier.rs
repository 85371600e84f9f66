// src/dag/frontier.rs

//! Breadth-first reachability over parent edges.
//!
//! A traversal starts at one node and follows parent edges, never stepping
//! onto the `boundary` node and silently skipping parents that are no longer
//! in the graph. Every reachable node is visited exactly once; in sampled mode
//! only every `interval`-th discovered node is emitted into the output order,
//! which caps the size of the ranking pool on large graphs.

use std::collections::{HashSet, VecDeque};

use crate::dag::Node;
use crate::dag::graph::DagGraph;
use crate::errors::Result;

/// Which discovered nodes a traversal emits into [`Traversal::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Emit every visited node.
    Exhaustive,
    /// Emit a node only when the visit counter is a multiple of `interval`.
    Interval(usize),
}

impl Sampling {
    /// Pick the mode for a candidate graph of `size` nodes.
    ///
    /// Sampling kicks in above `threshold`, with `interval = size / batch`
    /// (never below 1), so roughly `batch` nodes are emitted per round.
    pub fn for_graph_size(size: usize, threshold: usize, batch: usize) -> Self {
        if size > threshold {
            Sampling::Interval((size / batch.max(1)).max(1))
        } else {
            Sampling::Exhaustive
        }
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self, Sampling::Interval(_))
    }

    fn emits(&self, count: usize) -> bool {
        match *self {
            Sampling::Exhaustive => true,
            Sampling::Interval(interval) => count % interval == 0,
        }
    }
}

/// Result of one traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Emitted nodes in discovery order; the start node comes first when it
    /// is emitted.
    pub order: Vec<Node>,
    /// Every node visited, emitted or not (includes the start node).
    pub visited: HashSet<Node>,
    /// Whether some visited node lists the boundary as a parent.
    pub reached_boundary: bool,
}

impl Traversal {
    /// Visited nodes other than `start`, i.e. its ancestry within the graph.
    pub fn into_ancestry(mut self, start: &str) -> HashSet<Node> {
        self.visited.remove(start);
        self.visited
    }
}

/// Walk parent edges breadth-first from `start`.
///
/// Fails with `UnknownNode` if `start` is not in `graph`.
pub fn explore(
    graph: &DagGraph,
    start: &str,
    boundary: &str,
    sampling: Sampling,
) -> Result<Traversal> {
    let mut traversal = Traversal::default();
    let mut queue: VecDeque<Node> = VecDeque::new();

    // Visit counter; the start node is visit number 1.
    let mut count: usize = 1;

    graph.parents_of(start)?;
    if sampling.emits(count) {
        traversal.order.push(start.to_string());
    }
    traversal.visited.insert(start.to_string());
    queue.push_back(start.to_string());
    count += 1;

    while let Some(node) = queue.pop_front() {
        for parent in graph.parents_of(&node)? {
            if parent == boundary {
                traversal.reached_boundary = true;
                continue;
            }
            if !graph.contains(parent) || traversal.visited.contains(parent) {
                continue;
            }

            traversal.visited.insert(parent.clone());
            if sampling.emits(count) {
                traversal.order.push(parent.clone());
            }
            count += 1;
            queue.push_back(parent.clone());
        }
    }

    Ok(traversal)
}
