use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SMALL_RUNTIME_SAMPLE_SIZE: usize = 15;
const SMALL_RUNTIME_WARM_UP_MS: u64 = 100;
const SMALL_RUNTIME_MEASURE_MS: u64 = 200;
const MEDIUM_RUNTIME_SAMPLE_SIZE: usize = 15;
const MEDIUM_RUNTIME_WARM_UP_MS: u64 = 500;
const MEDIUM_RUNTIME_MEASURE_MS: u64 = 1000;
const LARGE_RUNTIME_SAMPLE_SIZE: usize = 10;
const LARGE_RUNTIME_WARM_UP_MS: u64 = 800;
const LARGE_RUNTIME_MEASURE_MS: u64 = 1500;
const SMALL_INPUT_LIMIT: usize = 1 << 12;
const MEDIUM_INPUT_LIMIT: usize = 1 << 16;
const RNG_SEED: u64 = 0x5EED_2026;

pub fn apply_small_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(SMALL_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(SMALL_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(SMALL_RUNTIME_MEASURE_MS));
}

pub fn apply_medium_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(MEDIUM_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(MEDIUM_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(MEDIUM_RUNTIME_MEASURE_MS));
}

pub fn apply_large_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(LARGE_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(LARGE_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(LARGE_RUNTIME_MEASURE_MS));
}

/// Picks the small, medium or large preset from the input size.
pub fn apply_runtime_config_for_size<M: Measurement>(
    size: usize,
    group: &mut BenchmarkGroup<'_, M>,
) {
    if size <= SMALL_INPUT_LIMIT {
        apply_small_runtime_config(group);
    } else if size <= MEDIUM_INPUT_LIMIT {
        apply_medium_runtime_config(group);
    } else {
        apply_large_runtime_config(group);
    }
}

pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeShape {
    /// Every vertex hangs off a uniformly random earlier vertex.
    Random,
    Chain,
    Star,
    /// A path through the first half with the rest attached to random
    /// path vertices.
    Caterpillar,
    /// Complete binary tree in heap order.
    Binary,
}

pub const TREE_SHAPES: [TreeShape; 5] = [
    TreeShape::Random,
    TreeShape::Chain,
    TreeShape::Star,
    TreeShape::Caterpillar,
    TreeShape::Binary,
];

/// Parent links of an `n`-vertex tree rooted at 0; every parent precedes its
/// child.
pub fn random_parents<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    shape: TreeShape,
) -> Vec<Option<usize>> {
    let spine = n.div_ceil(2);
    (0..n)
        .map(|v| {
            if v == 0 {
                return None;
            }
            Some(match shape {
                TreeShape::Random => rng.random_range(0..v),
                TreeShape::Chain => v - 1,
                TreeShape::Star => 0,
                TreeShape::Caterpillar if v < spine => v - 1,
                TreeShape::Caterpillar => rng.random_range(0..spine),
                TreeShape::Binary => (v - 1) / 2,
            })
        })
        .collect()
}

/// The same shapes as [`random_parents`], relabelled at random and returned
/// as a shuffled undirected edge list together with the root.
pub fn random_edges<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    shape: TreeShape,
) -> (Vec<(usize, usize)>, usize) {
    let parents = random_parents(rng, n, shape);
    let mut label = (0..n).collect::<Vec<_>>();
    label.shuffle(rng);
    let mut edges = parents
        .iter()
        .enumerate()
        .filter_map(|(v, &p)| {
            let (a, b) = (label[p?], label[v]);
            Some(if rng.random_bool(0.5) { (a, b) } else { (b, a) })
        })
        .collect::<Vec<_>>();
    edges.shuffle(rng);
    (edges, label.first().copied().unwrap_or(0))
}
