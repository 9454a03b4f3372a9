//! Blood cousins: two vertices are `p`-th cousins if they are distinct and
//! share their `p`-th ancestor. Count the `p`-th cousins of `v`.

use super::group_by_vertex;
use crate::arena::{MergeArena, NodeId};
use crate::domain::Domain;
use crate::policy::Sum;
use crate::traversal::fold_subtrees;
use crate::tree::{Ancestors, RootedTree};

/// One answer per query `(v, p)`; 0 when `v` has no `p`-th ancestor.
pub fn count_cousins(forest: &RootedTree, queries: &[(usize, usize)]) -> Vec<usize> {
    let depth = forest.depths();
    let Some(&max_depth) = depth.iter().max() else {
        return vec![0; queries.len()];
    };
    let Ok(domain) = Domain::with_len(max_depth) else {
        return vec![0; queries.len()];
    };

    // Every query is answered at the shared ancestor, looking at the depth
    // of the vertex it was asked for.
    let ancestors = Ancestors::new(forest);
    let asked = group_by_vertex(
        forest.len(),
        queries
            .iter()
            .enumerate()
            .filter_map(|(i, &(v, p))| Some((ancestors.kth_ancestor(v, p)?, i))),
    );

    let mut arena = MergeArena::<Sum>::with_capacity(domain, forest.len());
    let mut answer = vec![0; queries.len()];
    fold_subtrees(
        forest,
        &mut arena,
        |arena, v| arena.insert(NodeId::EMPTY, depth[v], 1),
        |arena, a, root| {
            for &i in &asked[a] {
                let v = queries[i].0;
                answer[i] = arena.get(root, depth[v]) as usize - 1;
            }
        },
    );
    answer
}
