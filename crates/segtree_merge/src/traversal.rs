use log::debug;

use crate::arena::{MergeArena, NodeId};
use crate::policy::MergePolicy;
use crate::tree::RootedTree;

/// Bottom-up tree-DP over a forest.
///
/// For every vertex `v` in post-order: `seed(arena, v)` builds the tree of
/// `v`'s own contributions, the finished trees of `v`'s children are merged
/// into it, then `visit(arena, v, root)` reads the subtree's tree before the
/// parent absorbs it. Returns the final root of every forest root, in
/// [`RootedTree::roots`] order.
///
/// The traversal keeps an explicit stack, so its depth does not depend on the
/// height of `tree`.
pub fn fold_subtrees<P, S, V>(
    tree: &RootedTree,
    arena: &mut MergeArena<P>,
    mut seed: S,
    mut visit: V,
) -> Vec<NodeId>
where
    P: MergePolicy,
    S: FnMut(&mut MergeArena<P>, usize) -> NodeId,
    V: FnMut(&mut MergeArena<P>, usize, NodeId),
{
    let n = tree.len();
    let mut root_of = vec![NodeId::EMPTY; n];
    let nodes_before = arena.len();

    for v in tree.postorder() {
        let mut root = seed(arena, v);
        for c in tree.children(v) {
            let child = std::mem::take(&mut root_of[c]);
            root = arena.merge(root, child);
        }
        visit(arena, v, root);
        root_of[v] = root;
    }

    debug!(
        "folded {} vertices, {} arena nodes allocated",
        n,
        arena.len() - nodes_before
    );
    tree.roots().map(|r| root_of[r]).collect()
}

#[cfg(test)]
mod tests {
    use super::fold_subtrees;
    use crate::arena::{MergeArena, NodeId};
    use crate::domain::Domain;
    use crate::policy::Sum;
    use crate::tree::RootedTree;

    #[test]
    fn star_tree_folds_leaves_into_root() {
        // Root 0 with leaf children 1 and 2 holding values 1 and 2.
        let tree = RootedTree::from_parents(&[None, Some(0), Some(0)]);
        let value = [None, Some(1), Some(2)];
        let mut arena = MergeArena::<Sum>::new(Domain::with_len(2).unwrap());
        let mut totals = vec![0; 3];
        let roots = fold_subtrees(
            &tree,
            &mut arena,
            |arena, v| match value[v] {
                Some(pos) => arena.insert(NodeId::EMPTY, pos, 1),
                None => NodeId::EMPTY,
            },
            |arena, v, root| totals[v] = arena.total(root),
        );
        assert_eq!(totals, vec![2, 1, 1]);
        assert_eq!(roots.len(), 1);

        let direct = arena.insert(NodeId::EMPTY, 1, 1);
        let direct = arena.insert(direct, 2, 1);
        for pos in 1..=2 {
            assert_eq!(arena.get(roots[0], pos), arena.get(direct, pos));
        }
    }

    #[test]
    fn subtree_counts_match_sizes() {
        let parents = [None, Some(0), Some(1), Some(1), None, Some(4), Some(0)];
        let tree = RootedTree::from_parents(&parents);
        let depth = tree.depths();
        let mut arena = MergeArena::<Sum>::new(Domain::with_len(3).unwrap());
        let mut counts = vec![0; parents.len()];
        let roots = fold_subtrees(
            &tree,
            &mut arena,
            |arena, v| arena.insert(NodeId::EMPTY, depth[v], 1),
            |arena, v, root| counts[v] = arena.total(root) as usize,
        );
        assert_eq!(counts, tree.subtree_sizes());
        assert_eq!(roots.len(), 2);
        assert_eq!(arena.query(roots[0], 2..=3), 4);
        assert_eq!(arena.query(roots[1], 1..=1), 1);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let parents = (0..n).map(|v: usize| v.checked_sub(1)).collect::<Vec<_>>();
        let tree = RootedTree::from_parents(&parents);
        let mut arena = MergeArena::<Sum>::with_capacity(Domain::with_len(n).unwrap(), n);
        let roots = fold_subtrees(
            &tree,
            &mut arena,
            |arena, v| arena.insert(NodeId::EMPTY, v + 1, 1),
            |_, _, _| {},
        );
        assert_eq!(arena.total(roots[0]), n as i64);
        assert_eq!(arena.kth(roots[0], n / 2), Some(n / 2 + 1));
    }
}
