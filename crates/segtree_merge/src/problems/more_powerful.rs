//! "More powerful" triples. Call `x` more powerful than `y` if `x` is a proper
//! ancestor of `y`. For a query `(a, k)`, count ordered pairs `(b, c)` of
//! vertices with `a`, `b`, `c` pairwise distinct, both `a` and `b` more
//! powerful than `c`, and `a`, `b` at most `k` edges apart.

use super::group_by_vertex;
use crate::arena::{MergeArena, NodeId};
use crate::domain::Domain;
use crate::policy::Sum;
use crate::traversal::fold_subtrees;
use crate::tree::RootedTree;

pub fn count_triples(tree: &RootedTree, queries: &[(usize, usize)]) -> Vec<u64> {
    let depth = tree.depths();
    let Some(&max_depth) = depth.iter().max() else {
        return vec![0; queries.len()];
    };
    let Ok(domain) = Domain::with_len(max_depth) else {
        return vec![0; queries.len()];
    };
    let size = tree.subtree_sizes();

    let asked = group_by_vertex(
        tree.len(),
        queries.iter().enumerate().map(|(i, &(a, _))| (a, i)),
    );
    let mut arena = MergeArena::<Sum>::with_capacity(domain, tree.len());
    let mut answer = vec![0; queries.len()];
    fold_subtrees(
        tree,
        &mut arena,
        |arena, v| arena.insert(NodeId::EMPTY, depth[v], size[v] as i64 - 1),
        |arena, a, root| {
            let below = size[a] as u64 - 1;
            for &i in &asked[a] {
                let k = queries[i].1;
                // `b` above `a`: any of the nearest `k` ancestors, `c` below `a`.
                let above = (depth[a] - 1).min(k) as u64 * below;
                // `b` below `a`: `c` ranges over the proper descendants of `b`.
                let lo = depth[a] + 1;
                let hi = depth[a].saturating_add(k);
                answer[i] = above + arena.query(root, lo..=hi) as u64;
            }
        },
    );
    answer
}

#[cfg(test)]
mod tests {
    use super::count_triples;
    use crate::tree::RootedTree;
    use bench::{TREE_SHAPES, random_parents};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(parents: &[Option<usize>], a: usize, k: usize) -> u64 {
        let n = parents.len();
        let depth = |mut x: usize| {
            let mut d = 0;
            while let Some(p) = parents[x] {
                x = p;
                d += 1;
            }
            d
        };
        let above = |x: usize, y: usize| {
            let mut z = parents[y];
            while let Some(w) = z {
                if w == x {
                    return true;
                }
                z = parents[w];
            }
            false
        };
        let mut count = 0;
        for b in (0..n).filter(|&b| b != a) {
            let close = if above(a, b) {
                depth(b) - depth(a) <= k
            } else if above(b, a) {
                depth(a) - depth(b) <= k
            } else {
                false
            };
            if !close {
                continue;
            }
            count += (0..n)
                .filter(|&c| c != a && c != b && above(a, c) && above(b, c))
                .count() as u64;
        }
        count
    }

    #[test]
    fn sample() {
        // 0 - 1 - 2 - 3 with 4 hanging off 1.
        let tree = RootedTree::from_edges(5, &[(0, 1), (1, 2), (2, 3), (1, 4)], 0);
        let queries = [(0, 1), (1, 1), (1, 2), (2, 1), (3, 5), (0, 0)];
        assert_eq!(count_triples(&tree, &queries), vec![3, 4, 4, 1, 0, 0]);
    }

    #[test]
    fn random_trees_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x9_0BE7);
        for shape in TREE_SHAPES {
            for n in 1..30 {
                let parents = random_parents(&mut rng, n, shape);
                let queries = (0..n)
                    .map(|_| (rng.random_range(0..n), rng.random_range(0..=n)))
                    .collect::<Vec<_>>();
                let tree = RootedTree::from_parents(&parents);
                let expected = queries
                    .iter()
                    .map(|&(a, k)| brute_force(&parents, a, k))
                    .collect::<Vec<_>>();
                assert_eq!(count_triples(&tree, &queries), expected, "{shape:?} n={n}");
            }
        }
    }
}
