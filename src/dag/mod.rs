// src/dag/mod.rs

//! DAG representation and the bisection search primitives.
//!
//! - [`graph`] holds the parent relation of a repository DAG and the pruning
//!   operations applied as answers arrive.
//! - [`frontier`] walks parent edges breadth-first from a start node, either
//!   exhaustively or emitting only every `interval`-th node.
//! - [`ancestry`] computes ancestor sets for a frontier in reverse discovery
//!   order and scores unresolved nodes.
//! - [`ranking`] holds the balanced-split score and question selection.

pub mod ancestry;
pub mod frontier;
pub mod graph;
pub mod ranking;

/// Canonical node identifier used throughout the crate.
pub type Node = String;

pub use ancestry::{RankingPass, rank_candidates};
pub use frontier::{Sampling, Traversal, explore};
pub use graph::DagGraph;
pub use ranking::{halfway, rank, select_question};
