mod arena;
mod domain;
mod error;
mod traversal;
mod tree;

pub mod policy;
pub mod problems;

pub use arena::{MergeArena, NodeId, Overlap};
pub use domain::{Discretizer, Domain};
pub use error::SegtreeError;
pub use policy::{
    AssignAdd, Max, MergePolicy, Mode, ModeAgg, ModeSum, ModeSumAgg, RangeAdd, RangeAssignAdd,
    Sum, XorMask,
};
pub use traversal::fold_subtrees;
pub use tree::{Ancestors, RootedTree};

#[cfg(test)]
mod tests {
    use super::*;
    use bench::{TREE_SHAPES, random_parents};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn subtree_members(parents: &[Option<usize>], v: usize) -> Vec<usize> {
        (0..parents.len())
            .filter(|&w| {
                let mut x = Some(w);
                while let Some(y) = x {
                    if y == v {
                        return true;
                    }
                    x = parents[y];
                }
                false
            })
            .collect()
    }

    #[test]
    fn subtree_range_adds_match_naive() {
        const V: usize = 24;
        let mut rng = StdRng::seed_from_u64(0x1A2_7AD);
        for shape in TREE_SHAPES {
            let n = 30;
            let parents = random_parents(&mut rng, n, shape);
            let updates = (0..n)
                .map(|_| {
                    let l = rng.random_range(1..=V);
                    let r = rng.random_range(l..=V);
                    (l, r, rng.random_range(-5..=5_i64))
                })
                .collect::<Vec<_>>();
            let tree = RootedTree::from_parents(&parents);
            let mut arena = MergeArena::<RangeAdd>::new(Domain::with_len(V).unwrap());

            let mut sampled = Vec::new();
            fold_subtrees(
                &tree,
                &mut arena,
                |arena, v| {
                    let (l, r, w) = updates[v];
                    arena.range_update(NodeId::EMPTY, l..=r, w)
                },
                |arena, v, root| {
                    let l = v % V + 1;
                    let r = (l + v / 3).min(V);
                    sampled.push((v, l, r, arena.query(root, l..=r)));
                },
            );

            for (v, l, r, got) in sampled {
                let mut expected = 0;
                for w in subtree_members(&parents, v) {
                    let (ul, ur, add) = updates[w];
                    let overlap = ur.min(r) as i64 - ul.max(l) as i64 + 1;
                    expected += add * overlap.max(0);
                }
                assert_eq!(got, expected, "{shape:?} v={v} [{l}, {r}]");
            }
        }
    }

    #[test]
    fn forest_fold_keeps_trees_apart() {
        let parents = [None, Some(0), None, Some(2), Some(2)];
        let tree = RootedTree::from_parents(&parents);
        let mut arena = MergeArena::<Max>::new(Domain::new(10, 14).unwrap());
        let roots = fold_subtrees(
            &tree,
            &mut arena,
            |arena, v| arena.insert(NodeId::EMPTY, 10 + v, 10 * v as i64),
            |_, _, _| {},
        );
        assert_eq!(roots.len(), 2);
        assert_eq!(arena.total(roots[0]), 10);
        assert_eq!(arena.total(roots[1]), 40);
        assert_eq!(arena.query(roots[0], 12..), i64::MIN);
        assert_eq!(arena.query(roots[1], ..=11), i64::MIN);
    }
}
