//! Rooted forests stored CSR-style, with iterative traversals.

const NONE: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct RootedTree {
    parent: Vec<u32>,
    offsets: Vec<usize>,
    children: Vec<u32>,
    roots: Vec<u32>,
    preorder: Vec<u32>,
}

impl RootedTree {
    /// Builds a forest from parent links; `None` marks a root.
    ///
    /// Panics if a parent is out of range or the links contain a cycle.
    pub fn from_parents(parents: &[Option<usize>]) -> Self {
        let n = parents.len();
        assert!(n < NONE as usize, "too many vertices");
        let mut parent = vec![NONE; n];
        let mut degree = vec![0_usize; n];
        let mut roots = Vec::new();
        for (v, &p) in parents.iter().enumerate() {
            match p {
                Some(p) => {
                    assert!(p < n, "parent out of range");
                    parent[v] = p as u32;
                    degree[p] += 1;
                }
                None => roots.push(v as u32),
            }
        }

        let mut offsets = vec![0_usize; n + 1];
        for v in 0..n {
            offsets[v + 1] = offsets[v] + degree[v];
        }
        let mut children = vec![0_u32; offsets[n]];
        let mut cursor = offsets[..n].to_vec();
        for v in 0..n {
            let p = parent[v];
            if p != NONE {
                children[cursor[p as usize]] = v as u32;
                cursor[p as usize] += 1;
            }
        }

        let mut tree = Self {
            parent,
            offsets,
            children,
            roots,
            preorder: Vec::with_capacity(n),
        };
        tree.preorder = tree.compute_preorder();
        assert_eq!(tree.preorder.len(), n, "parent links contain a cycle");
        tree
    }

    /// Orients an undirected tree on `n` vertices away from `root`.
    ///
    /// Panics if the edges do not form a single tree.
    pub fn from_edges(n: usize, edges: &[(usize, usize)], root: usize) -> Self {
        assert!(root < n, "root out of range");
        assert_eq!(edges.len() + 1, n, "a tree on n vertices has n - 1 edges");
        let mut adj = vec![Vec::new(); n];
        for &(u, v) in edges {
            assert!(u < n && v < n, "edge endpoint out of range");
            adj[u].push(v);
            adj[v].push(u);
        }

        let mut parents = vec![None; n];
        let mut seen = vec![false; n];
        let mut stack = Vec::with_capacity(n);
        seen[root] = true;
        stack.push(root);
        while let Some(v) = stack.pop() {
            for &to in &adj[v] {
                if !seen[to] {
                    seen[to] = true;
                    parents[to] = Some(v);
                    stack.push(to);
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "edges do not connect every vertex");
        Self::from_parents(&parents)
    }

    fn compute_preorder(&self) -> Vec<u32> {
        let mut order = Vec::with_capacity(self.parent.len());
        let mut stack = Vec::new();
        for &root in &self.roots {
            stack.push(root);
            while let Some(v) = stack.pop() {
                order.push(v);
                let v = v as usize;
                for &c in self.children[self.offsets[v]..self.offsets[v + 1]].iter().rev() {
                    stack.push(c);
                }
            }
        }
        order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    pub fn parent(&self, v: usize) -> Option<usize> {
        let p = self.parent[v];
        (p != NONE).then_some(p as usize)
    }

    #[inline]
    pub fn children(&self, v: usize) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.children[self.offsets[v]..self.offsets[v + 1]]
            .iter()
            .map(|&c| c as usize)
    }

    #[inline]
    pub fn roots(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.roots.iter().map(|&r| r as usize)
    }

    /// Parents before children, each subtree contiguous.
    pub fn preorder(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.preorder.iter().map(|&v| v as usize)
    }

    /// Children before parents, each subtree contiguous.
    pub fn postorder(&self) -> Vec<usize> {
        let n = self.len();
        let mut order = Vec::with_capacity(n);
        let mut stack: Vec<(u32, usize)> = Vec::new();
        for &root in &self.roots {
            stack.push((root, self.offsets[root as usize]));
            while let Some(top) = stack.last_mut() {
                let (v, next) = *top;
                let v = v as usize;
                if next < self.offsets[v + 1] {
                    top.1 += 1;
                    let c = self.children[next];
                    stack.push((c, self.offsets[c as usize]));
                } else {
                    order.push(v);
                    stack.pop();
                }
            }
        }
        order
    }

    /// Depth of every vertex; roots have depth 1.
    pub fn depths(&self) -> Vec<usize> {
        let mut depth = vec![0_usize; self.len()];
        for v in self.preorder() {
            depth[v] = self.parent(v).map_or(1, |p| depth[p] + 1);
        }
        depth
    }

    pub fn subtree_sizes(&self) -> Vec<usize> {
        let mut size = vec![1_usize; self.len()];
        for v in self.preorder().rev() {
            if let Some(p) = self.parent(v) {
                size[p] += size[v];
            }
        }
        size
    }
}

/// Binary lifting table for ancestor queries.
#[derive(Clone, Debug)]
pub struct Ancestors {
    up: Vec<Vec<u32>>,
    depth: Vec<usize>,
}

impl Ancestors {
    pub fn new(tree: &RootedTree) -> Self {
        let n = tree.len();
        let depth = tree.depths();
        let max_depth = depth.iter().copied().max().unwrap_or(1);
        let levels = (usize::BITS - max_depth.leading_zeros()).max(1) as usize;

        let mut up = Vec::with_capacity(levels);
        up.push(tree.parent.clone());
        for j in 1..levels {
            let prev = &up[j - 1];
            let next = (0..n)
                .map(|v| {
                    let mid = prev[v];
                    if mid == NONE { NONE } else { prev[mid as usize] }
                })
                .collect::<Vec<_>>();
            up.push(next);
        }
        Self { up, depth }
    }

    #[inline]
    pub fn depth(&self, v: usize) -> usize {
        self.depth[v]
    }

    /// The ancestor `k` levels above `v` (`k = 0` is `v` itself).
    pub fn kth_ancestor(&self, v: usize, k: usize) -> Option<usize> {
        if k >= self.depth[v] {
            return None;
        }
        let mut v = v as u32;
        let mut k = k;
        let mut j = 0;
        while k > 0 {
            if k & 1 == 1 {
                v = self.up[j][v as usize];
            }
            k >>= 1;
            j += 1;
        }
        Some(v as usize)
    }

    /// Lowest common ancestor, `None` if `u` and `v` lie in different trees.
    pub fn lca(&self, u: usize, v: usize) -> Option<usize> {
        let (mut u, mut v) = if self.depth[u] >= self.depth[v] {
            (u, v)
        } else {
            (v, u)
        };
        u = self.kth_ancestor(u, self.depth[u] - self.depth[v])?;
        if u == v {
            return Some(u);
        }
        for j in (0..self.up.len()).rev() {
            let (pu, pv) = (self.up[j][u], self.up[j][v]);
            if pu != pv {
                u = pu as usize;
                v = pv as usize;
            }
        }
        let (pu, pv) = (self.up[0][u], self.up[0][v]);
        (pu == pv && pu != NONE).then_some(pu as usize)
    }
}
