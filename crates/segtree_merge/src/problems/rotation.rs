//! Tree rotations: a full binary tree has distinct values on its leaves.
//! Swapping the two children of any branch is free; minimise the number of
//! inversions in the left-to-right leaf sequence.

use crate::arena::{MergeArena, NodeId};
use crate::domain::Discretizer;
use crate::policy::Sum;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationNode {
    Leaf(i64),
    Branch(usize, usize),
}

/// Minimum number of inversions over all rotations of the tree at `root`.
///
/// Panics if two leaves hold the same value.
pub fn min_inversions(nodes: &[RotationNode], root: usize) -> u64 {
    let leaves = nodes
        .iter()
        .filter_map(|node| match *node {
            RotationNode::Leaf(value) => Some(value),
            RotationNode::Branch(..) => None,
        })
        .collect::<Vec<_>>();
    let ranks = Discretizer::new(&leaves);
    let Ok(domain) = ranks.domain() else {
        return 0;
    };
    assert_eq!(ranks.len(), leaves.len(), "leaf values must be distinct");

    let mut arena = MergeArena::<Sum>::with_capacity(domain, leaves.len());
    let mut tree_of = vec![NodeId::EMPTY; nodes.len()];
    let mut stack = vec![(root, false)];
    let mut total = 0_u64;

    while let Some((v, expanded)) = stack.pop() {
        match nodes[v] {
            RotationNode::Leaf(value) => {
                let rank = ranks.rank(value).unwrap_or_default();
                tree_of[v] = arena.insert(NodeId::EMPTY, rank, 1);
            }
            RotationNode::Branch(l, r) if !expanded => {
                stack.push((v, true));
                stack.push((r, false));
                stack.push((l, false));
            }
            RotationNode::Branch(l, r) => {
                let a = std::mem::take(&mut tree_of[l]);
                let b = std::mem::take(&mut tree_of[r]);
                let mut keep = 0_i64;
                let mut swap = 0_i64;
                tree_of[v] = arena.merge_with(a, b, |o| {
                    keep += o.right_a * o.left_b;
                    swap += o.left_a * o.right_b;
                });
                total += keep.min(swap) as u64;
            }
        }
    }
    total
}
