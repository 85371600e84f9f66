// tests/graph_store.rs

use std::collections::HashSet;

use dagbisect::dag::DagGraph;
use dagbisect::errors::BisectError;
use dagbisect_test_utils::builders::{DagBuilder, diamond};

fn set(nodes: &[&str]) -> HashSet<String> {
    nodes.iter().map(|s| s.to_string()).collect()
}

/// A <- B <- C <- D, plus an unrelated X <- Y.
fn chain_with_side_branch() -> DagGraph {
    DagBuilder::chain(&["A", "B", "C", "D"])
        .node("X", &[])
        .node("Y", &["X"])
        .build_graph()
}

#[test]
fn parents_of_known_and_unknown_nodes() {
    let graph = diamond().build_graph();

    let parents: Vec<&str> = graph.parents_of("D").unwrap().iter().map(|s| s.as_str()).collect();
    assert_eq!(parents, vec!["B", "C"]);
    assert!(graph.parents_of("A").unwrap().is_empty());

    match graph.parents_of("nope") {
        Err(BisectError::UnknownNode(node)) => assert_eq!(node, "nope"),
        other => panic!("expected UnknownNode, got {:?}", other),
    }
}

#[test]
fn later_entry_for_same_node_wins() {
    let graph = DagBuilder::new()
        .node("A", &[])
        .node("B", &[])
        .node("C", &["A"])
        .node("C", &["B"])
        .build_graph();

    assert_eq!(graph.len(), 3);
    assert!(graph.parents_of("C").unwrap().contains("B"));
    assert!(!graph.parents_of("C").unwrap().contains("A"));
}

#[test]
fn trim_keeps_ancestry_of_anchor_plus_boundary() {
    let mut graph = chain_with_side_branch();

    let traversal = graph.trim("D", "A").unwrap();

    assert!(traversal.reached_boundary);
    assert_eq!(graph.len(), 4);
    let nodes: HashSet<String> = graph.nodes().map(|s| s.to_string()).collect();
    assert_eq!(nodes, set(&["A", "B", "C", "D"]));
}

#[test]
fn trim_does_not_walk_past_the_boundary() {
    // Z is only reachable through the boundary B.
    let mut graph = DagBuilder::new()
        .node("Z", &[])
        .node("B", &["Z"])
        .node("C", &["B"])
        .node("D", &["C"])
        .build_graph();

    graph.trim("D", "B").unwrap();

    assert!(graph.contains("B"));
    assert!(!graph.contains("Z"));
    assert_eq!(graph.len(), 3);
}

#[test]
fn trim_is_a_fixed_point() {
    let mut graph = chain_with_side_branch();
    graph.trim("D", "B").unwrap();
    let once = graph.clone();

    graph.trim("D", "B").unwrap();

    assert_eq!(graph, once);
}

#[test]
fn trim_from_unknown_anchor_fails() {
    let mut graph = chain_with_side_branch();
    assert!(matches!(
        graph.trim("missing", "A"),
        Err(BisectError::UnknownNode(_))
    ));
}

#[test]
fn remove_nodes_drops_dangling_edges() {
    let mut graph = diamond().build_graph();

    graph.remove_nodes(&set(&["A", "B"]));

    assert_eq!(graph.len(), 2);
    let parents: Vec<&str> = graph.parents_of("D").unwrap().iter().map(|s| s.as_str()).collect();
    assert_eq!(parents, vec!["C"]);
    assert!(graph.parents_of("C").unwrap().is_empty());
}

#[test]
fn restrict_to_keeps_exactly_the_given_nodes() {
    let mut graph = diamond().build_graph();

    graph.restrict_to(&set(&["B", "D"]));

    assert_eq!(graph.len(), 2);
    assert!(graph.contains("B"));
    assert!(!graph.contains("C"));
    // Edges are left alone; traversals skip the missing parent.
    assert!(graph.parents_of("D").unwrap().contains("C"));
}

#[test]
fn validate_accepts_a_dag() {
    assert!(diamond().build_graph().validate().is_ok());
}

#[test]
fn validate_rejects_dangling_parent() {
    let graph = DagBuilder::new().node("A", &["ghost"]).build_graph();

    match graph.validate() {
        Err(BisectError::MalformedGraph(msg)) => {
            assert!(msg.contains("ghost"));
            assert!(msg.contains("A"));
        }
        other => panic!("expected MalformedGraph, got {:?}", other),
    }
}

#[test]
fn validate_rejects_cycles() {
    let graph = DagBuilder::new()
        .node("A", &["C"])
        .node("B", &["A"])
        .node("C", &["B"])
        .build_graph();

    match graph.validate() {
        Err(BisectError::DagCycle(msg)) => assert!(msg.contains("cycle")),
        other => panic!("expected DagCycle, got {:?}", other),
    }
}

#[test]
fn validate_rejects_self_parent() {
    let graph = DagBuilder::new().node("A", &["A"]).build_graph();
    assert!(matches!(graph.validate(), Err(BisectError::DagCycle(_))));
}

#[test]
fn edge_count_sums_parent_sets() {
    assert_eq!(diamond().build_graph().edge_count(), 4);
}
