use std::ops::{Bound, RangeBounds};

use crate::domain::Domain;
use crate::error::SegtreeError;
use crate::policy::MergePolicy;

/// Handle to a node of a [`MergeArena`]. `EMPTY` (index 0) is the empty tree.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const EMPTY: Self = Self(0);

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

struct Node<P: MergePolicy> {
    ch: [NodeId; 2],
    agg: P::Agg,
    lazy: P::Act,
    lazy_pending: bool,
}

impl<P: MergePolicy> Clone for Node<P> {
    fn clone(&self) -> Self {
        Self {
            ch: self.ch,
            agg: self.agg.clone(),
            lazy: self.lazy.clone(),
            lazy_pending: self.lazy_pending,
        }
    }
}

impl<P: MergePolicy> Node<P> {
    fn new(agg: P::Agg) -> Self {
        Self {
            ch: [NodeId::EMPTY; 2],
            agg,
            lazy: P::act_unit(),
            lazy_pending: false,
        }
    }
}

/// Child aggregates seen by [`MergeArena::merge_with`] at a position where
/// both trees have a node. Absent children read as `agg_unit()`.
#[derive(Clone, Copy, Debug)]
pub struct Overlap<'a, A> {
    pub left_a: &'a A,
    pub right_a: &'a A,
    pub left_b: &'a A,
    pub right_b: &'a A,
}

type Hook<'h, A> = Option<&'h mut dyn for<'o> FnMut(Overlap<'o, A>)>;

#[inline(always)]
fn mid(lo: usize, hi: usize) -> usize {
    lo + (hi - lo) / 2
}

/// Node arena for dynamic-node segment trees over one [`Domain`].
///
/// Every root returned by the arena covers the whole domain, so any two
/// roots of the same arena can be merged. Nodes are never freed one by one;
/// the arena is dropped (or [`clear`](Self::clear)ed) when the computation
/// that owns it is done.
///
/// `merge` is destructive: the returned root reuses nodes of both inputs and
/// neither input handle may be used again afterwards.
pub struct MergeArena<P: MergePolicy> {
    domain: Domain,
    nodes: Vec<Node<P>>,
    limit: usize,
}

impl<P: MergePolicy> MergeArena<P> {
    /// Growable arena, limited only by the `u32` node index.
    pub fn new(domain: Domain) -> Self {
        Self::with_node_limit(domain, u32::MAX as usize - 1)
    }

    /// Arena sized for `insertions` point inserts (and merges of the
    /// resulting trees). Range updates may need more; use
    /// [`with_node_limit`](Self::with_node_limit) for those.
    pub fn with_capacity(domain: Domain, insertions: usize) -> Self {
        let limit = domain.node_bound(insertions);
        let mut arena = Self::with_node_limit(domain, limit);
        arena.nodes.reserve(limit);
        arena
    }

    pub fn with_node_limit(domain: Domain, limit: usize) -> Self {
        let limit = limit.min(u32::MAX as usize - 1);
        let mut nodes = Vec::new();
        // Slot 0 is the sentinel behind `NodeId::EMPTY`.
        nodes.push(Node::new(P::agg_unit()));
        Self {
            domain,
            nodes,
            limit,
        }
    }

    #[inline]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Number of allocated nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity_limit(&self) -> usize {
        self.limit
    }

    /// Drops every node. All previously returned roots become invalid.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
    }

    #[inline(always)]
    fn node(&self, x: NodeId) -> &Node<P> {
        debug_assert!(!x.is_empty());
        debug_assert!(x.idx() < self.nodes.len(), "node id from another arena");
        &self.nodes[x.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, x: NodeId) -> &mut Node<P> {
        debug_assert!(!x.is_empty());
        debug_assert!(x.idx() < self.nodes.len(), "node id from another arena");
        &mut self.nodes[x.idx()]
    }

    #[inline(always)]
    fn agg(&self, x: NodeId) -> P::Agg {
        if x.is_empty() {
            P::agg_unit()
        } else {
            self.node(x).agg.clone()
        }
    }

    #[inline(always)]
    fn agg_or<'a>(&'a self, x: NodeId, unit: &'a P::Agg) -> &'a P::Agg {
        if x.is_empty() {
            unit
        } else {
            &self.node(x).agg
        }
    }

    fn try_alloc(&mut self, agg: P::Agg) -> Result<NodeId, SegtreeError> {
        if self.len() >= self.limit {
            return Err(SegtreeError::CapacityExhausted { limit: self.limit });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(agg));
        Ok(id)
    }

    fn alloc_fresh(&mut self, lo: usize, hi: usize) -> Result<NodeId, SegtreeError> {
        let agg = if lo == hi {
            P::agg_leaf(lo)
        } else {
            P::agg_unit()
        };
        self.try_alloc(agg)
    }

    fn clone_node(&mut self, x: NodeId) -> Result<NodeId, SegtreeError> {
        let copy = self.node(x).clone();
        let id = self.try_alloc(P::agg_unit())?;
        *self.node_mut(id) = copy;
        Ok(id)
    }

    fn pull(&mut self, x: NodeId) {
        let [l, r] = self.node(x).ch;
        let agg = {
            let unit = P::agg_unit();
            P::agg_merge(self.agg_or(l, &unit), self.agg_or(r, &unit))
        };
        self.node_mut(x).agg = agg;
    }

    fn apply(&mut self, x: NodeId, act: &P::Act, lo: usize, hi: usize) {
        let node = self.node_mut(x);
        node.agg = P::act_apply_agg(&node.agg, act, hi - lo + 1);
        if lo < hi {
            node.lazy = P::act_compose(act, &node.lazy);
            node.lazy_pending = true;
        }
    }

    fn push(&mut self, x: NodeId, lo: usize, hi: usize) -> Result<(), SegtreeError> {
        self.push_impl(x, lo, hi, false)
    }

    /// Push-down that copies existing children instead of mutating them, for
    /// nodes that may be shared between persistent versions.
    fn push_copying(&mut self, x: NodeId, lo: usize, hi: usize) -> Result<(), SegtreeError> {
        self.push_impl(x, lo, hi, true)
    }

    fn push_impl(
        &mut self,
        x: NodeId,
        lo: usize,
        hi: usize,
        copy: bool,
    ) -> Result<(), SegtreeError> {
        if !self.node(x).lazy_pending {
            return Ok(());
        }
        let m = mid(lo, hi);
        let spans = [(lo, m), (m + 1, hi)];
        // Allocate both children before touching anything so that a failed
        // allocation leaves the tag pending and the tree intact.
        let mut ch = self.node(x).ch;
        for (child, &(clo, chi)) in ch.iter_mut().zip(&spans) {
            if child.is_empty() {
                *child = self.alloc_fresh(clo, chi)?;
            } else if copy {
                *child = self.clone_node(*child)?;
            }
        }

        let act = self.node(x).lazy.clone();
        for (&child, &(clo, chi)) in ch.iter().zip(&spans) {
            self.apply(child, &act, clo, chi);
        }
        let node = self.node_mut(x);
        node.ch = ch;
        node.lazy = P::act_unit();
        node.lazy_pending = false;
        Ok(())
    }

    fn normalize_range<R: RangeBounds<usize>>(&self, range: R) -> Option<(usize, usize)> {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.checked_add(1)?,
            Bound::Unbounded => self.domain.lo(),
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end,
            Bound::Excluded(&end) => end.checked_sub(1)?,
            Bound::Unbounded => self.domain.hi(),
        };
        let start = start.max(self.domain.lo());
        let end = end.min(self.domain.hi());
        (start <= end).then_some((start, end))
    }

    /// Accumulates `value` at `position` and returns the (possibly new) root.
    ///
    /// Panics if `position` is outside the domain or the arena is full.
    pub fn insert(&mut self, root: NodeId, position: usize, value: P::Value) -> NodeId {
        self.try_insert(root, position, value)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`insert`](Self::insert), but reports domain and capacity errors.
    /// On error the tree under `root` is left unchanged.
    pub fn try_insert(
        &mut self,
        root: NodeId,
        position: usize,
        value: P::Value,
    ) -> Result<NodeId, SegtreeError> {
        self.domain.check(position)?;
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        self.insert_rec(root, lo, hi, position, &value)
    }

    fn insert_rec(
        &mut self,
        x: NodeId,
        lo: usize,
        hi: usize,
        position: usize,
        value: &P::Value,
    ) -> Result<NodeId, SegtreeError> {
        let x = if x.is_empty() {
            self.alloc_fresh(lo, hi)?
        } else {
            x
        };
        if lo == hi {
            P::agg_add(&mut self.node_mut(x).agg, value);
            return Ok(x);
        }

        self.push(x, lo, hi)?;
        let m = mid(lo, hi);
        let side = usize::from(position > m);
        let (clo, chi) = if side == 0 { (lo, m) } else { (m + 1, hi) };
        let child = self.insert_rec(self.node(x).ch[side], clo, chi, position, value)?;
        self.node_mut(x).ch[side] = child;
        self.pull(x);
        Ok(x)
    }

    /// Destructively unions `a` and `b`. Leaves at the same position are
    /// combined with `leaf_merge`. Both handles are consumed.
    pub fn merge(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.try_merge(a, b).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Merge only allocates when pending range updates force a push-down.
    /// On error both handles are consumed all the same.
    pub fn try_merge(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, SegtreeError> {
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        self.merge_rec(a, b, lo, hi, &mut None)
    }

    /// [`merge`](Self::merge) that calls `on_overlap` at every internal
    /// position where both trees have a node, before descending into it.
    pub fn merge_with<F>(&mut self, a: NodeId, b: NodeId, mut on_overlap: F) -> NodeId
    where
        F: for<'o> FnMut(Overlap<'o, P::Agg>),
    {
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        let mut hook: Hook<'_, P::Agg> = Some(&mut on_overlap);
        self.merge_rec(a, b, lo, hi, &mut hook)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    fn merge_rec(
        &mut self,
        a: NodeId,
        b: NodeId,
        lo: usize,
        hi: usize,
        hook: &mut Hook<'_, P::Agg>,
    ) -> Result<NodeId, SegtreeError> {
        if a.is_empty() {
            return Ok(b);
        }
        if b.is_empty() {
            return Ok(a);
        }
        debug_assert_ne!(a, b, "merging a tree with itself");
        if lo == hi {
            let merged = P::leaf_merge(&self.node(a).agg, &self.node(b).agg);
            self.node_mut(a).agg = merged;
            return Ok(a);
        }

        self.push(a, lo, hi)?;
        self.push(b, lo, hi)?;
        let [al, ar] = self.node(a).ch;
        let [bl, br] = self.node(b).ch;
        if let Some(on_overlap) = hook.as_deref_mut() {
            let unit = P::agg_unit();
            on_overlap(Overlap {
                left_a: self.agg_or(al, &unit),
                right_a: self.agg_or(ar, &unit),
                left_b: self.agg_or(bl, &unit),
                right_b: self.agg_or(br, &unit),
            });
        }

        let m = mid(lo, hi);
        let l = self.merge_rec(al, bl, lo, m, hook)?;
        let r = self.merge_rec(ar, br, m + 1, hi, hook)?;
        self.node_mut(a).ch = [l, r];
        self.pull(a);
        Ok(a)
    }

    /// Non-destructive union: overlapping nodes are copied, so `a` and `b`
    /// stay readable. The result shares untouched subtrees with both inputs;
    /// mutate none of the three with destructive operations afterwards.
    pub fn merge_persistent(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.try_merge_persistent(a, b)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_merge_persistent(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, SegtreeError> {
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        self.merge_persistent_rec(a, b, lo, hi)
    }

    fn merge_persistent_rec(
        &mut self,
        a: NodeId,
        b: NodeId,
        lo: usize,
        hi: usize,
    ) -> Result<NodeId, SegtreeError> {
        if a.is_empty() {
            return Ok(b);
        }
        if b.is_empty() {
            return Ok(a);
        }
        if lo == hi {
            let merged = P::leaf_merge(&self.node(a).agg, &self.node(b).agg);
            return self.try_alloc(merged);
        }

        self.push_copying(a, lo, hi)?;
        self.push_copying(b, lo, hi)?;
        let [al, ar] = self.node(a).ch;
        let [bl, br] = self.node(b).ch;
        let m = mid(lo, hi);
        let l = self.merge_persistent_rec(al, bl, lo, m)?;
        let r = self.merge_persistent_rec(ar, br, m + 1, hi)?;
        let c = self.try_alloc(P::agg_unit())?;
        self.node_mut(c).ch = [l, r];
        self.pull(c);
        Ok(c)
    }

    /// Lazily applies `act` to every position in `range`.
    pub fn range_update<R: RangeBounds<usize>>(
        &mut self,
        root: NodeId,
        range: R,
        act: P::Act,
    ) -> NodeId {
        self.try_range_update(root, range, act)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`range_update`](Self::range_update), but reports capacity
    /// errors. The nodes the update needs are counted up front, so on error
    /// the tree under `root` is left unchanged.
    pub fn try_range_update<R: RangeBounds<usize>>(
        &mut self,
        root: NodeId,
        range: R,
        act: P::Act,
    ) -> Result<NodeId, SegtreeError> {
        let Some((ql, qr)) = self.normalize_range(range) else {
            return Ok(root);
        };
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        let pending = !root.is_empty() && self.node(root).lazy_pending;
        let needed = self.update_cost(root, !root.is_empty(), pending, lo, hi, ql, qr);
        if self.len() + needed > self.limit {
            return Err(SegtreeError::CapacityExhausted { limit: self.limit });
        }
        self.update_rec(root, lo, hi, ql, qr, &act)
    }

    /// Number of nodes `update_rec` allocates below `x`. `allocated` is false
    /// for a node the update itself creates, and true for a real node or one
    /// an earlier push-down on the path creates (`x` is then `EMPTY`).
    /// `pending` is whether `x` holds a tag at the time it is reached.
    #[allow(clippy::too_many_arguments)]
    fn update_cost(
        &self,
        x: NodeId,
        allocated: bool,
        pending: bool,
        lo: usize,
        hi: usize,
        ql: usize,
        qr: usize,
    ) -> usize {
        let mut cost = usize::from(!allocated);
        if ql <= lo && hi <= qr {
            return cost;
        }

        let ch = if x.is_empty() {
            [NodeId::EMPTY; 2]
        } else {
            self.node(x).ch
        };
        let m = mid(lo, hi);
        for (child, (clo, chi)) in ch.into_iter().zip([(lo, m), (m + 1, hi)]) {
            let (allocated, pending) = if pending {
                cost += usize::from(child.is_empty());
                (true, clo < chi)
            } else {
                (
                    !child.is_empty(),
                    !child.is_empty() && self.node(child).lazy_pending,
                )
            };
            if ql <= chi && clo <= qr {
                cost += self.update_cost(child, allocated, pending, clo, chi, ql, qr);
            }
        }
        cost
    }

    fn update_rec(
        &mut self,
        x: NodeId,
        lo: usize,
        hi: usize,
        ql: usize,
        qr: usize,
        act: &P::Act,
    ) -> Result<NodeId, SegtreeError> {
        let x = if x.is_empty() {
            self.alloc_fresh(lo, hi)?
        } else {
            x
        };
        if ql <= lo && hi <= qr {
            self.apply(x, act, lo, hi);
            return Ok(x);
        }

        self.push(x, lo, hi)?;
        let m = mid(lo, hi);
        if ql <= m {
            let l = self.update_rec(self.node(x).ch[0], lo, m, ql, qr, act)?;
            self.node_mut(x).ch[0] = l;
        }
        if qr > m {
            let r = self.update_rec(self.node(x).ch[1], m + 1, hi, ql, qr, act)?;
            self.node_mut(x).ch[1] = r;
        }
        self.pull(x);
        Ok(x)
    }

    /// Aggregate over `range` (clamped to the domain). Never mutates the
    /// arena: pending tags are carried down instead of pushed.
    pub fn query<R: RangeBounds<usize>>(&self, root: NodeId, range: R) -> P::Agg {
        let Some((ql, qr)) = self.normalize_range(range) else {
            return P::agg_unit();
        };
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        self.query_rec(root, lo, hi, ql, qr, None)
    }

    /// Aggregate at one position.
    ///
    /// Panics if `position` is outside the domain.
    #[inline]
    pub fn get(&self, root: NodeId, position: usize) -> P::Agg {
        self.try_get(root, position)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_get(&self, root: NodeId, position: usize) -> Result<P::Agg, SegtreeError> {
        self.domain.check(position)?;
        Ok(self.query(root, position..=position))
    }

    /// Aggregate over the whole domain.
    #[inline]
    pub fn total(&self, root: NodeId) -> P::Agg {
        self.agg(root)
    }

    fn effective(&self, x: NodeId, carried: Option<&P::Act>, len: usize) -> P::Agg {
        let unit = P::agg_unit();
        let agg = self.agg_or(x, &unit);
        match carried {
            None => agg.clone(),
            Some(act) => P::act_apply_agg(agg, act, len),
        }
    }

    fn carried_for_children(&self, x: NodeId, carried: Option<&P::Act>) -> Option<P::Act> {
        let node = self.node(x);
        match (node.lazy_pending, carried) {
            (false, None) => None,
            (false, Some(act)) => Some(act.clone()),
            (true, None) => Some(node.lazy.clone()),
            (true, Some(act)) => Some(P::act_compose(act, &node.lazy)),
        }
    }

    fn query_rec(
        &self,
        x: NodeId,
        lo: usize,
        hi: usize,
        ql: usize,
        qr: usize,
        carried: Option<&P::Act>,
    ) -> P::Agg {
        if x.is_empty() {
            let len = hi.min(qr) - lo.max(ql) + 1;
            return self.effective(x, carried, len);
        }
        if ql <= lo && hi <= qr {
            return self.effective(x, carried, hi - lo + 1);
        }

        let below = self.carried_for_children(x, carried);
        let [l, r] = self.node(x).ch;
        let m = mid(lo, hi);
        let mut acc = P::agg_unit();
        if ql <= m {
            acc = self.query_rec(l, lo, m, ql, qr, below.as_ref());
        }
        if qr > m {
            let right = self.query_rec(r, m + 1, hi, ql, qr, below.as_ref());
            acc = P::agg_merge(&acc, &right);
        }
        acc
    }

    /// Splits into positions `< position` and positions `>= position`.
    pub fn split(&mut self, root: NodeId, position: usize) -> (NodeId, NodeId) {
        self.try_split(root, position)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_split(
        &mut self,
        root: NodeId,
        position: usize,
    ) -> Result<(NodeId, NodeId), SegtreeError> {
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        self.split_rec(root, lo, hi, position)
    }

    fn split_rec(
        &mut self,
        x: NodeId,
        lo: usize,
        hi: usize,
        position: usize,
    ) -> Result<(NodeId, NodeId), SegtreeError> {
        if x.is_empty() {
            return Ok((NodeId::EMPTY, NodeId::EMPTY));
        }
        if hi < position {
            return Ok((x, NodeId::EMPTY));
        }
        if lo >= position {
            return Ok((NodeId::EMPTY, x));
        }

        // lo < position <= hi, so `x` is internal.
        self.push(x, lo, hi)?;
        let [l, r] = self.node(x).ch;
        let m = mid(lo, hi);
        let y = self.try_alloc(P::agg_unit())?;
        if position <= m {
            let (ll, lr) = self.split_rec(l, lo, m, position)?;
            self.node_mut(x).ch = [ll, NodeId::EMPTY];
            self.node_mut(y).ch = [lr, r];
        } else {
            let (rl, rr) = self.split_rec(r, m + 1, hi, position)?;
            self.node_mut(x).ch = [l, rl];
            self.node_mut(y).ch = [NodeId::EMPTY, rr];
        }
        self.pull(x);
        self.pull(y);
        Ok((self.prune(x), self.prune(y)))
    }

    fn prune(&self, x: NodeId) -> NodeId {
        if self.node(x).ch == [NodeId::EMPTY; 2] {
            NodeId::EMPTY
        } else {
            x
        }
    }
}

impl<P: MergePolicy<Agg = i64>> MergeArena<P> {
    /// Position of the `k`-th (0-based) element when each position is
    /// repeated as many times as its count. Counts must be non-negative.
    pub fn kth(&self, root: NodeId, k: usize) -> Option<usize> {
        let (mut lo, mut hi) = (self.domain.lo(), self.domain.hi());
        let mut k = i64::try_from(k).ok()?;
        if self.total(root) <= k {
            return None;
        }

        let mut x = root;
        let mut carried: Option<P::Act> = None;
        while lo < hi {
            if x.is_empty() {
                // Only a carried tag covers this span, so every position
                // holds the same count.
                let per = self.effective(x, carried.as_ref(), 1);
                debug_assert!(per > 0);
                return Some(lo + (k / per) as usize);
            }
            let below = self.carried_for_children(x, carried.as_ref());
            let [l, r] = self.node(x).ch;
            let m = mid(lo, hi);
            let left = self.effective(l, below.as_ref(), m - lo + 1);
            if k < left {
                x = l;
                hi = m;
            } else {
                k -= left;
                x = r;
                lo = m + 1;
            }
            carried = below;
        }
        Some(lo)
    }
}
