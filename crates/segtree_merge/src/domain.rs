use crate::error::SegtreeError;

/// Inclusive range of positions `[lo, hi]` covered by every tree of an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Domain {
    lo: usize,
    hi: usize,
}

impl Domain {
    pub fn new(lo: usize, hi: usize) -> Result<Self, SegtreeError> {
        if lo > hi {
            return Err(SegtreeError::EmptyDomain { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// `[1, len]`, the usual shape after discretization.
    pub fn with_len(len: usize) -> Result<Self, SegtreeError> {
        Self::new(1, len)
    }

    #[inline]
    pub fn lo(&self) -> usize {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> usize {
        self.hi
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hi - self.lo + 1
    }

    #[inline]
    pub fn contains(&self, position: usize) -> bool {
        self.lo <= position && position <= self.hi
    }

    pub fn check(&self, position: usize) -> Result<(), SegtreeError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(SegtreeError::OutOfDomain {
                position,
                lo: self.lo,
                hi: self.hi,
            })
        }
    }

    /// Number of levels below the root, `ceil(log2(len))`.
    pub fn depth(&self) -> u32 {
        let len = self.len();
        usize::BITS - (len - 1).leading_zeros()
    }

    /// Upper bound on the nodes allocated by `insertions` point inserts.
    pub fn node_bound(&self, insertions: usize) -> usize {
        insertions.saturating_mul(self.depth() as usize + 1)
    }
}

/// Coordinate compression: maps distinct values to ranks `1..=len`.
#[derive(Clone, Debug, Default)]
pub struct Discretizer<T> {
    sorted: Vec<T>,
}

impl<T: Ord + Copy> Discretizer<T> {
    pub fn new(values: &[T]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// 1-based rank of `value`, `None` if it was not part of the input.
    pub fn rank(&self, value: T) -> Option<usize> {
        self.sorted.binary_search(&value).ok().map(|i| i + 1)
    }

    pub fn value(&self, rank: usize) -> Option<T> {
        rank.checked_sub(1).and_then(|i| self.sorted.get(i)).copied()
    }

    pub fn domain(&self) -> Result<Domain, SegtreeError> {
        Domain::with_len(self.sorted.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{Discretizer, Domain};
    use crate::error::SegtreeError;

    #[test]
    fn reversed_bounds_are_rejected() {
        assert_eq!(
            Domain::new(5, 4),
            Err(SegtreeError::EmptyDomain { lo: 5, hi: 4 })
        );
        assert!(Domain::with_len(0).is_err());
        assert_eq!(Domain::new(3, 3).map(|d| d.len()), Ok(1));
    }

    #[test]
    fn depth_and_bounds() {
        let cases = [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4)];
        for (len, depth) in cases {
            let domain = Domain::with_len(len).unwrap();
            assert_eq!(domain.depth(), depth, "len={len}");
        }
        let domain = Domain::with_len(8).unwrap();
        assert_eq!(domain.node_bound(10), 40);
        assert_eq!(
            domain.check(9),
            Err(SegtreeError::OutOfDomain {
                position: 9,
                lo: 1,
                hi: 8
            })
        );
        assert!(domain.check(0).is_err());
        assert_eq!(domain.check(1), Ok(()));
    }

    #[test]
    fn ranks_are_dense_and_ordered() {
        let d = Discretizer::new(&[1_000_000_007_i64, -5, 42, -5, 42, 0]);
        assert_eq!(d.len(), 4);
        assert_eq!(d.rank(-5), Some(1));
        assert_eq!(d.rank(0), Some(2));
        assert_eq!(d.rank(42), Some(3));
        assert_eq!(d.rank(1_000_000_007), Some(4));
        assert_eq!(d.rank(7), None);
        assert_eq!(d.value(3), Some(42));
        assert_eq!(d.value(0), None);
        assert_eq!(d.value(5), None);
        assert_eq!(d.domain().unwrap().len(), 4);

        let empty = Discretizer::<i64>::new(&[]);
        assert!(empty.domain().is_err());
    }
}
