//! Aggregate + lazy tag policies for [`MergeArena`](crate::MergeArena).
//!
//! Same shape as a lazy map monoid, with two extra hooks that only make sense
//! for trees indexed by position: `agg_leaf` builds an empty leaf that knows
//! where it lives, and `leaf_merge` combines two leaves at the same position
//! when whole trees are merged.

pub trait MergePolicy {
    type Value;
    type Agg: Clone;
    type Act: Clone;

    /// Identity of `agg_merge`. Absent nodes contribute this.
    fn agg_unit() -> Self::Agg;

    /// Aggregate of a freshly allocated leaf at `position`, before any value.
    fn agg_leaf(position: usize) -> Self::Agg;

    /// Accumulate `value` into a leaf.
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value);

    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg;

    /// Combine two leaves covering the same position.
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg;

    fn act_unit() -> Self::Act;

    /// Compose `new` after `old`.
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act;

    /// Apply `act` to an aggregate spanning `len` positions.
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg;
}

/// Per-position sums (or counts), no lazy action.
#[derive(Clone, Copy, Debug)]
pub enum Sum {}

impl MergePolicy for Sum {
    type Value = i64;
    type Agg = i64;
    type Act = ();

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_leaf(_position: usize) -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        *agg += value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        left + right
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        a + b
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}

/// Per-position maxima. Leaves of both trees are combined with `max`.
#[derive(Clone, Copy, Debug)]
pub enum Max {}

impl MergePolicy for Max {
    type Value = i64;
    type Agg = i64;
    type Act = ();

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        i64::MIN
    }

    #[inline(always)]
    fn agg_leaf(_position: usize) -> Self::Agg {
        i64::MIN
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        *agg = (*agg).max(*value);
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        *left.max(right)
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        *a.max(b)
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}

/// Xor of bit masks, e.g. letter parities.
#[derive(Clone, Copy, Debug)]
pub enum XorMask {}

impl MergePolicy for XorMask {
    type Value = u32;
    type Agg = u32;
    type Act = ();

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_leaf(_position: usize) -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        *agg ^= value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        left ^ right
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        a ^ b
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeAgg {
    pub count: i64,
    pub position: usize,
}

/// Most frequent position; ties go to the smaller position.
#[derive(Clone, Copy, Debug)]
pub enum Mode {}

impl MergePolicy for Mode {
    type Value = i64;
    type Agg = ModeAgg;
    type Act = ();

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        ModeAgg {
            count: i64::MIN,
            position: usize::MAX,
        }
    }

    #[inline(always)]
    fn agg_leaf(position: usize) -> Self::Agg {
        ModeAgg { count: 0, position }
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        agg.count += value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        if right.count > left.count
            || (right.count == left.count && right.position < left.position)
        {
            *right
        } else {
            *left
        }
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        debug_assert_eq!(a.position, b.position);
        ModeAgg {
            count: a.count + b.count,
            position: a.position,
        }
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}

/// Maximum count together with the sum of every position attaining it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeSumAgg {
    pub count: i64,
    pub sum: u64,
}

#[derive(Clone, Copy, Debug)]
pub enum ModeSum {}

impl MergePolicy for ModeSum {
    type Value = i64;
    type Agg = ModeSumAgg;
    type Act = ();

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        ModeSumAgg {
            count: i64::MIN,
            sum: 0,
        }
    }

    #[inline(always)]
    fn agg_leaf(position: usize) -> Self::Agg {
        ModeSumAgg {
            count: 0,
            sum: position as u64,
        }
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        agg.count += value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        match left.count.cmp(&right.count) {
            std::cmp::Ordering::Greater => *left,
            std::cmp::Ordering::Less => *right,
            std::cmp::Ordering::Equal => ModeSumAgg {
                count: left.count,
                sum: left.sum + right.sum,
            },
        }
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        debug_assert_eq!(a.sum, b.sum);
        ModeSumAgg {
            count: a.count + b.count,
            sum: a.sum,
        }
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}

/// Range add over a zero-initialised domain, range sum.
#[derive(Clone, Copy, Debug)]
pub enum RangeAdd {}

impl MergePolicy for RangeAdd {
    type Value = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_leaf(_position: usize) -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        *agg += value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        left + right
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        a + b
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new + old
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg {
        agg + act * len as i64
    }
}

/// Pending "assign, then add" tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssignAdd {
    pub assign: Option<i64>,
    pub add: i64,
}

impl AssignAdd {
    pub fn assign(value: i64) -> Self {
        Self {
            assign: Some(value),
            add: 0,
        }
    }

    pub fn add(delta: i64) -> Self {
        Self {
            assign: None,
            add: delta,
        }
    }
}

/// Range assign and range add over a zero-initialised domain, range sum.
#[derive(Clone, Copy, Debug)]
pub enum RangeAssignAdd {}

impl MergePolicy for RangeAssignAdd {
    type Value = i64;
    type Agg = i64;
    type Act = AssignAdd;

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_leaf(_position: usize) -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_add(agg: &mut Self::Agg, value: &Self::Value) {
        *agg += value;
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        left + right
    }

    #[inline(always)]
    fn leaf_merge(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        a + b
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        AssignAdd::default()
    }

    // An assignment wipes everything older, including older adds.
    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        if new.assign.is_some() {
            *new
        } else {
            AssignAdd {
                assign: old.assign,
                add: old.add + new.add,
            }
        }
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg {
        let len = len as i64;
        act.assign.map_or(*agg, |value| value * len) + act.add * len
    }
}

#[cfg(test)]
mod tests {
    use super::{AssignAdd, MergePolicy, Mode, ModeAgg, ModeSum, ModeSumAgg, RangeAssignAdd};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn apply_naive(xs: &mut [i64], act: &AssignAdd) {
        for x in xs {
            if let Some(value) = act.assign {
                *x = value;
            }
            *x += act.add;
        }
    }

    fn random_act(rng: &mut StdRng) -> AssignAdd {
        if rng.random_bool(0.3) {
            AssignAdd {
                assign: Some(rng.random_range(-20_i64..=20)),
                add: rng.random_range(-5_i64..=5),
            }
        } else {
            AssignAdd::add(rng.random_range(-20_i64..=20))
        }
    }

    #[test]
    fn assign_add_compose_matches_sequential_application() {
        let mut rng = StdRng::seed_from_u64(0xA551_6AADD);
        for len in 1..=8 {
            for _ in 0..200 {
                let base = (0..len)
                    .map(|_| rng.random_range(-50_i64..=50))
                    .collect::<Vec<_>>();
                let old = random_act(&mut rng);
                let new = random_act(&mut rng);

                let mut expected = base.clone();
                apply_naive(&mut expected, &old);
                apply_naive(&mut expected, &new);

                let composed = RangeAssignAdd::act_compose(&new, &old);
                let mut got = base.clone();
                apply_naive(&mut got, &composed);
                assert_eq!(got, expected);

                let sum = base.iter().sum::<i64>();
                let agg = RangeAssignAdd::act_apply_agg(&sum, &composed, len);
                assert_eq!(agg, expected.iter().sum::<i64>());
            }
        }
    }

    #[test]
    fn mode_prefers_smaller_position_on_ties() {
        let a = ModeAgg {
            count: 3,
            position: 7,
        };
        let b = ModeAgg {
            count: 3,
            position: 2,
        };
        assert_eq!(Mode::agg_merge(&a, &b), b);
        assert_eq!(Mode::agg_merge(&b, &a), b);
        assert_eq!(Mode::agg_merge(&Mode::agg_unit(), &a), a);
    }

    #[test]
    fn mode_sum_adds_tied_positions() {
        let a = ModeSumAgg { count: 2, sum: 4 };
        let b = ModeSumAgg { count: 2, sum: 9 };
        let c = ModeSumAgg { count: 1, sum: 100 };
        assert_eq!(ModeSum::agg_merge(&a, &b), ModeSumAgg { count: 2, sum: 13 });
        assert_eq!(ModeSum::agg_merge(&c, &a), a);
        assert_eq!(ModeSum::agg_merge(&ModeSum::agg_unit(), &c), c);
    }
}
