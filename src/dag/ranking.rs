// src/dag/ranking.rs

//! Balanced-split scoring and question selection.

use crate::dag::Node;
use crate::dag::ancestry::RankingPass;

/// Score of a node with `ancestors` ancestors in a graph of `n` nodes.
///
/// With `x = ancestors + 1` this is `min(x, n + 1 - x)`: the size of the
/// smaller side of the split that asking about the node induces.
pub fn rank(ancestors: usize, n: usize) -> usize {
    let x = ancestors + 1;
    x.min((n + 1).saturating_sub(x))
}

/// Best possible score in a graph of `n` nodes.
pub fn halfway(n: usize) -> usize {
    (n + 1) / 2
}

/// Pick the node to ask about, or `None` when no candidate is left.
///
/// An exact halfway hit wins outright. Otherwise the highest score wins, ties
/// going to the lexicographically smallest node id.
pub fn select_question(pass: &RankingPass) -> Option<Node> {
    if let Some(exact) = &pass.exact {
        return Some(exact.clone());
    }

    pass.rankings
        .iter()
        .fold(None::<(&Node, usize)>, |best, (node, &score)| match best {
            Some((best_node, best_score))
                if best_score > score || (best_score == score && best_node < node) =>
            {
                Some((best_node, best_score))
            }
            _ => Some((node, score)),
        })
        .map(|(node, _)| node.clone())
}
