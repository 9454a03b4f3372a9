//! Path drops: every operation `(x, y, z)` places one item of type `z` on
//! each vertex of the path `x - y`. Afterwards report, per vertex, the type
//! it holds most items of.

use super::group_by_vertex;
use crate::arena::{MergeArena, NodeId};
use crate::domain::Discretizer;
use crate::policy::Mode;
use crate::traversal::fold_subtrees;
use crate::tree::{Ancestors, RootedTree};

/// Most frequent type per vertex, the smallest type on ties, `None` for
/// vertices no path touches. Both endpoints of an operation must lie in the
/// same tree.
pub fn path_modes(tree: &RootedTree, operations: &[(usize, usize, u64)]) -> Vec<Option<u64>> {
    let kinds = Discretizer::new(&operations.iter().map(|&(_, _, z)| z).collect::<Vec<_>>());
    let Ok(domain) = kinds.domain() else {
        return vec![None; tree.len()];
    };

    // Tree difference: a path's count at `v` is the sum of the marks in the
    // subtree of `v`.
    let ancestors = Ancestors::new(tree);
    let mut marks = Vec::with_capacity(4 * operations.len());
    for &(x, y, z) in operations {
        let lca = ancestors
            .lca(x, y)
            .unwrap_or_else(|| panic!("vertices {x} and {y} lie in different trees"));
        let rank = kinds.rank(z).unwrap_or_default();
        marks.push((x, (rank, 1)));
        marks.push((y, (rank, 1)));
        marks.push((lca, (rank, -1)));
        if let Some(above) = tree.parent(lca) {
            marks.push((above, (rank, -1)));
        }
    }
    let at = group_by_vertex(tree.len(), marks.iter().enumerate().map(|(i, &(v, _))| (v, i)));

    let mut arena = MergeArena::<Mode>::with_capacity(domain, marks.len());
    let mut answer = vec![None; tree.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| {
            at[v].iter().fold(NodeId::EMPTY, |root, &i| {
                let (rank, delta) = marks[i].1;
                arena.insert(root, rank, delta)
            })
        },
        |arena, v, root| {
            let best = arena.total(root);
            if best.count > 0 {
                answer[v] = kinds.value(best.position);
            }
        },
    );
    answer
}

#[cfg(test)]
mod tests {
    use super::path_modes;
    use crate::tree::RootedTree;
    use bench::{TREE_SHAPES, random_parents};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    fn brute_force(
        parents: &[Option<usize>],
        operations: &[(usize, usize, u64)],
    ) -> Vec<Option<u64>> {
        let n = parents.len();
        let depth = |mut x: usize| {
            let mut d = 0;
            while let Some(p) = parents[x] {
                x = p;
                d += 1;
            }
            d
        };
        let mut held = vec![BTreeMap::<u64, usize>::new(); n];
        for &(x, y, z) in operations {
            let (mut x, mut y) = (x, y);
            let (mut dx, mut dy) = (depth(x), depth(y));
            let mut path = Vec::new();
            while dx > dy {
                path.push(x);
                x = parents[x].unwrap();
                dx -= 1;
            }
            while dy > dx {
                path.push(y);
                y = parents[y].unwrap();
                dy -= 1;
            }
            while x != y {
                path.push(x);
                path.push(y);
                x = parents[x].unwrap();
                y = parents[y].unwrap();
            }
            path.push(x);
            for v in path {
                *held[v].entry(z).or_default() += 1;
            }
        }
        held.iter()
            .map(|count| {
                let best = count.values().copied().max()?;
                count.iter().find(|&(_, &c)| c == best).map(|(&z, _)| z)
            })
            .collect()
    }

    #[test]
    fn sample() {
        // 0 - 1 - 2 - 3 and 1 - 4.
        let tree = RootedTree::from_edges(5, &[(0, 1), (1, 2), (2, 3), (1, 4)], 0);
        let operations = [(3, 4, 7), (0, 2, 5), (2, 2, 5), (4, 4, 9)];
        assert_eq!(
            path_modes(&tree, &operations),
            vec![Some(5), Some(5), Some(5), Some(7), Some(7)]
        );
    }

    #[test]
    fn untouched_vertices_hold_nothing() {
        let tree = RootedTree::from_parents(&[None, Some(0), Some(0)]);
        assert_eq!(path_modes(&tree, &[(1, 1, 4)]), vec![None, Some(4), None]);
        assert_eq!(path_modes(&tree, &[]), vec![None; 3]);
    }

    #[test]
    fn random_trees_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x9A7B);
        for shape in TREE_SHAPES {
            for n in 1..30 {
                let parents = random_parents(&mut rng, n, shape);
                let kinds = rng.random_range(1..=4_u64);
                let operations = (0..rng.random_range(0..2 * n))
                    .map(|_| {
                        (
                            rng.random_range(0..n),
                            rng.random_range(0..n),
                            rng.random_range(0..kinds) * 1_000_000_007,
                        )
                    })
                    .collect::<Vec<_>>();
                let tree = RootedTree::from_parents(&parents);
                assert_eq!(
                    path_modes(&tree, &operations),
                    brute_force(&parents, &operations),
                    "{shape:?} n={n}"
                );
            }
        }
    }
}
