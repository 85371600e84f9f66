// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::Node;
use crate::dag::frontier::{Sampling, Traversal, explore};
use crate::errors::{BisectError, Result};

/// Parent relation of a DAG, keyed by node id.
///
/// Edges point from a node to its direct parents. Parent sets are ordered so
/// that every traversal over the graph visits nodes in a reproducible order.
///
/// Acyclicity is not enforced on construction; call [`DagGraph::validate`]
/// when the input is untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DagGraph {
    parents: HashMap<Node, BTreeSet<Node>>,
}

impl DagGraph {
    /// Build a graph from `(node, parents)` pairs.
    ///
    /// A node listed twice keeps the parents of its last entry.
    pub fn from_edges<I, P>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Node, P)>,
        P: IntoIterator<Item = Node>,
    {
        let parents = edges
            .into_iter()
            .map(|(node, ps)| (node, ps.into_iter().collect()))
            .collect();
        Self { parents }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.parents.contains_key(node)
    }

    /// All node ids, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(|s| s.as_str())
    }

    /// Total number of parent edges.
    pub fn edge_count(&self) -> usize {
        self.parents.values().map(BTreeSet::len).sum()
    }

    /// Direct parents of `node`.
    ///
    /// Fails with [`BisectError::UnknownNode`] if `node` is not in the graph.
    pub fn parents_of(&self, node: &str) -> Result<&BTreeSet<Node>> {
        self.parents
            .get(node)
            .ok_or_else(|| BisectError::UnknownNode(node.to_string()))
    }

    /// Check that every parent reference resolves and that there are no cycles.
    pub fn validate(&self) -> Result<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for node in self.parents.keys() {
            graph.add_node(node.as_str());
        }

        for (node, parents) in self.parents.iter() {
            for parent in parents {
                if !self.parents.contains_key(parent) {
                    return Err(BisectError::MalformedGraph(format!(
                        "node '{}' has unknown parent '{}'",
                        node, parent
                    )));
                }
                if parent == node {
                    return Err(BisectError::DagCycle(format!(
                        "node '{}' lists itself as a parent",
                        node
                    )));
                }
                // Edge direction: parent -> child.
                graph.add_edge(parent.as_str(), node.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(BisectError::DagCycle(format!(
                "cycle detected in parent relation involving node '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// Restrict the graph to the nodes reachable backward from `anchor`
    /// without passing through `boundary`, plus `boundary` itself.
    ///
    /// Returns the exhaustive traversal used to compute the restriction.
    pub fn trim(&mut self, anchor: &str, boundary: &str) -> Result<Traversal> {
        let traversal = explore(self, anchor, boundary, Sampling::Exhaustive)?;

        let mut kept: HashMap<Node, BTreeSet<Node>> =
            HashMap::with_capacity(traversal.order.len() + 1);
        for node in traversal.order.iter() {
            if let Some(ps) = self.parents.remove(node) {
                kept.insert(node.clone(), ps);
            }
        }
        if let Some(ps) = self.parents.remove(boundary) {
            kept.insert(boundary.to_string(), ps);
        }

        debug!(
            anchor,
            boundary,
            before = self.parents.len() + kept.len(),
            after = kept.len(),
            "trimmed graph to ancestry of anchor"
        );

        self.parents = kept;
        Ok(traversal)
    }

    /// Keep exactly the nodes in `keep`; everything else is dropped.
    ///
    /// Parent sets are kept as-is, so they may mention dropped nodes.
    /// Traversals skip such references.
    pub fn restrict_to(&mut self, keep: &HashSet<Node>) {
        self.parents.retain(|node, _| keep.contains(node));
    }

    /// Remove `removed` from the graph and drop every parent edge that points
    /// at a removed node.
    pub fn remove_nodes(&mut self, removed: &HashSet<Node>) {
        self.parents.retain(|node, _| !removed.contains(node));
        for ps in self.parents.values_mut() {
            ps.retain(|p| !removed.contains(p));
        }
    }
}
