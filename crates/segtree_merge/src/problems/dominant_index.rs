//! Dominant indices: for every vertex `v`, the smallest `j` maximising the
//! number of descendants of `v` at distance exactly `j` (`v` itself counts at
//! distance 0).

use crate::arena::{MergeArena, NodeId};
use crate::domain::Domain;
use crate::policy::Mode;
use crate::traversal::fold_subtrees;
use crate::tree::RootedTree;

pub fn dominant_indices(tree: &RootedTree) -> Vec<usize> {
    let depth = tree.depths();
    let Some(&max_depth) = depth.iter().max() else {
        return Vec::new();
    };
    let Ok(domain) = Domain::with_len(max_depth) else {
        return Vec::new();
    };

    let mut arena = MergeArena::<Mode>::with_capacity(domain, tree.len());
    let mut answer = vec![0; tree.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| arena.insert(NodeId::EMPTY, depth[v], 1),
        |arena, v, root| answer[v] = arena.total(root).position - depth[v],
    );
    answer
}
