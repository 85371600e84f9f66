#![allow(dead_code)]

use dagbisect::dag::{DagGraph, Node};
use dagbisect::engine::{SearchParams, SessionEvent};
use dagbisect::protocol::{DagEntry, ProblemBody};

/// Builder for `(node, parents)` listings, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DagBuilder {
    entries: Vec<DagEntry>,
}

impl DagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` with the given direct parents.
    pub fn node(mut self, name: &str, parents: &[&str]) -> Self {
        self.entries.push((
            name.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
        ));
        self
    }

    /// Linear history: each name's parent is the previous one.
    pub fn chain(names: &[&str]) -> Self {
        let mut builder = Self::new();
        let mut previous: Option<&str> = None;
        for name in names {
            builder = match previous {
                Some(parent) => builder.node(name, &[parent]),
                None => builder.node(name, &[]),
            };
            previous = Some(name);
        }
        builder
    }

    /// Linear history `n0 <- n1 <- ... <- n{len-1}`.
    pub fn numbered_chain(len: usize) -> Self {
        let names: Vec<String> = (0..len).map(numbered).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        Self::chain(&refs)
    }

    pub fn entries(&self) -> &[DagEntry] {
        &self.entries
    }

    pub fn build_entries(self) -> Vec<DagEntry> {
        self.entries
    }

    pub fn build_graph(self) -> DagGraph {
        DagGraph::from_edges(self.entries)
    }

    pub fn repository_event(self, name: &str) -> SessionEvent {
        SessionEvent::Repository {
            name: name.to_string(),
            dag: self.entries,
        }
    }

    pub fn problem(self, good: &str, bad: &str) -> ProblemBody {
        ProblemBody {
            name: None,
            good: good.to_string(),
            bad: bad.to_string(),
            dag: self.entries,
        }
    }
}

/// Node name used by [`DagBuilder::numbered_chain`].
pub fn numbered(i: usize) -> Node {
    format!("n{i}")
}

/// `good = A`, `bad = D`, with `B` and `C` both between them.
pub fn diamond() -> DagBuilder {
    DagBuilder::new()
        .node("A", &[])
        .node("B", &["A"])
        .node("C", &["A"])
        .node("D", &["B", "C"])
}

pub fn instance_event(good: &str, bad: &str) -> SessionEvent {
    SessionEvent::Instance {
        good: good.to_string(),
        bad: bad.to_string(),
    }
}

/// Search params with a custom sampling threshold and batch.
pub fn params(threshold: usize, batch: usize) -> SearchParams {
    SearchParams {
        threshold,
        batch,
        validate_repository: true,
    }
}
