//! Offline `k`-th smallest value inside a subtree.

use super::group_by_vertex;
use crate::arena::{MergeArena, NodeId};
use crate::domain::Discretizer;
use crate::policy::Sum;
use crate::traversal::fold_subtrees;
use crate::tree::RootedTree;

/// For each query `(v, k)`, the `k`-th (1-based) smallest of the values in
/// the subtree of `v`, counting duplicates. `None` when `k` is zero or
/// exceeds the subtree size.
pub fn subtree_kth(
    tree: &RootedTree,
    values: &[i64],
    queries: &[(usize, usize)],
) -> Vec<Option<i64>> {
    assert_eq!(tree.len(), values.len());
    let ranks = Discretizer::new(values);
    let Ok(domain) = ranks.domain() else {
        return vec![None; queries.len()];
    };

    let asked = group_by_vertex(
        tree.len(),
        queries.iter().enumerate().map(|(i, &(v, _))| (v, i)),
    );
    let mut arena = MergeArena::<Sum>::with_capacity(domain, tree.len());
    let mut answer = vec![None; queries.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| {
            let rank = ranks.rank(values[v]).unwrap_or_default();
            arena.insert(NodeId::EMPTY, rank, 1)
        },
        |arena, v, root| {
            for &i in &asked[v] {
                let k = queries[i].1;
                answer[i] = k
                    .checked_sub(1)
                    .and_then(|k| arena.kth(root, k))
                    .and_then(|rank| ranks.value(rank));
            }
        },
    );
    answer
}
