//! Dominating colours: every vertex has a colour; a colour dominates a
//! subtree if no other colour occurs more often in it. Report, per vertex,
//! the sum of all colours dominating its subtree.

use crate::arena::{MergeArena, NodeId};
use crate::domain::Domain;
use crate::policy::ModeSum;
use crate::traversal::fold_subtrees;
use crate::tree::RootedTree;

/// `colours[v] >= 1`. Colours may be large; the tree only allocates the
/// positions that occur.
pub fn dominating_colour_sums(tree: &RootedTree, colours: &[usize]) -> Vec<u64> {
    assert_eq!(tree.len(), colours.len());
    let Some(&max_colour) = colours.iter().max() else {
        return Vec::new();
    };
    let domain = match Domain::with_len(max_colour) {
        Ok(domain) => domain,
        Err(err) => panic!("colours must be positive: {err}"),
    };

    let mut arena = MergeArena::<ModeSum>::with_capacity(domain, tree.len());
    let mut answer = vec![0; tree.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| arena.insert(NodeId::EMPTY, colours[v], 1),
        |arena, v, root| answer[v] = arena.total(root).sum,
    );
    answer
}
