//! Tree requests: can the letters on the vertices at absolute depth `h`
//! inside the subtree of `v` be rearranged into a palindrome?

use super::group_by_vertex;
use crate::arena::{MergeArena, NodeId};
use crate::domain::Domain;
use crate::policy::XorMask;
use crate::traversal::fold_subtrees;
use crate::tree::RootedTree;

/// `letters[v]` is a lowercase ASCII letter; each query is `(v, h)` with the
/// roots at depth 1. No letters at depth `h` is an empty palindrome.
pub fn palindrome_requests(
    tree: &RootedTree,
    letters: &[u8],
    queries: &[(usize, usize)],
) -> Vec<bool> {
    assert_eq!(tree.len(), letters.len());
    let depth = tree.depths();
    let Some(&max_depth) = depth.iter().max() else {
        return vec![true; queries.len()];
    };
    let Ok(domain) = Domain::with_len(max_depth) else {
        return vec![true; queries.len()];
    };

    let asked = group_by_vertex(
        tree.len(),
        queries.iter().enumerate().map(|(i, &(v, _))| (v, i)),
    );
    let mut arena = MergeArena::<XorMask>::with_capacity(domain, tree.len());
    let mut answer = vec![true; queries.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| {
            assert!(letters[v].is_ascii_lowercase(), "letters must be in a..=z");
            arena.insert(NodeId::EMPTY, depth[v], 1_u32 << (letters[v] - b'a'))
        },
        |arena, v, root| {
            for &i in &asked[v] {
                // Depths no vertex reaches hold no letters.
                let h = queries[i].1;
                answer[i] = !domain.contains(h) || arena.get(root, h).count_ones() <= 1;
            }
        },
    );
    answer
}
