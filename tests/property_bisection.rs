// tests/property_bisection.rs

use std::collections::BTreeSet;

use proptest::prelude::*;

use dagbisect::dag::{DagGraph, Node};
use dagbisect::engine::{Bisection, Move, Verdict};
use dagbisect_test_utils::builders::{DagBuilder, params};

/// A random DAG as per-node parent index lists.
///
/// Acyclicity comes from only letting node `i` have parents in `0..i`.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (2..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), num_nodes)
            .prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, picks)| {
                        if i == 0 {
                            BTreeSet::new()
                        } else {
                            picks.into_iter().map(|p| p % i).collect()
                        }
                    })
                    .collect::<Vec<BTreeSet<usize>>>()
            })
    })
}

fn name(i: usize) -> Node {
    format!("c{i:03}")
}

fn build(parents: &[BTreeSet<usize>]) -> DagGraph {
    let mut builder = DagBuilder::new();
    for (i, ps) in parents.iter().enumerate() {
        let names: Vec<Node> = ps.iter().map(|&p| name(p)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        builder = builder.node(&name(i), &refs);
    }
    builder.build_graph()
}

/// Strict ancestor sets, computed independently of the crate.
fn ancestor_sets(parents: &[BTreeSet<usize>]) -> Vec<BTreeSet<usize>> {
    let mut out: Vec<BTreeSet<usize>> = Vec::with_capacity(parents.len());
    for ps in parents {
        let mut set = BTreeSet::new();
        for &p in ps {
            set.insert(p);
            set.extend(out[p].iter().copied());
        }
        out.push(set);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn solution_is_the_culprit(
        parents in dag_strategy(40),
        bad_seed in any::<usize>(),
        culprit_seed in any::<usize>(),
        good_seed in any::<usize>(),
        sampled in any::<bool>(),
    ) {
        let n = parents.len();
        let anc = ancestor_sets(&parents);
        let bad = bad_seed % n;

        let culprits: Vec<usize> = anc[bad].iter().copied().chain(std::iter::once(bad)).collect();
        let culprit = culprits[culprit_seed % culprits.len()];

        // Good nodes: ancestors of bad that the culprit does not reach.
        let goods: Vec<usize> = anc[bad]
            .iter()
            .copied()
            .filter(|&g| g != culprit && !anc[g].contains(&culprit))
            .collect();
        if goods.is_empty() {
            return Ok(());
        }
        let good = goods[good_seed % goods.len()];

        let graph = build(&parents);
        let search = if sampled { params(3, 2) } else { params(1000, 10) };
        let mut bisection = Bisection::start(&graph, &name(good), &name(bad), search)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut asked = 0;
        let solution = loop {
            match bisection.next_move().clone() {
                Move::Solve(node) => break node,
                Move::Ask(node) => {
                    let idx: usize = node[1..]
                        .parse()
                        .map_err(|_| TestCaseError::fail("bad node id"))?;
                    let verdict = if idx == culprit || anc[idx].contains(&culprit) {
                        Verdict::Bad
                    } else {
                        Verdict::Good
                    };

                    let before = bisection.graph_size();
                    bisection
                        .record_answer(verdict)
                        .map_err(|e| TestCaseError::fail(e.to_string()))?;
                    prop_assert!(bisection.graph_size() < before);

                    asked += 1;
                    prop_assert!(asked <= n, "more questions than nodes");
                }
            }
        };

        prop_assert_eq!(solution, name(culprit));
    }

    #[test]
    fn trim_is_idempotent(
        parents in dag_strategy(30),
        anchor_seed in any::<usize>(),
        boundary_seed in any::<usize>(),
    ) {
        let n = parents.len();
        let anchor = name(anchor_seed % n);
        let boundary = name(boundary_seed % n);
        prop_assume!(anchor != boundary);

        let mut graph = build(&parents);
        graph.trim(&anchor, &boundary).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let once = graph.clone();
        graph.trim(&anchor, &boundary).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(graph, once);
    }

    #[test]
    fn random_dags_validate(parents in dag_strategy(30)) {
        prop_assert!(build(&parents).validate().is_ok());
    }
}
