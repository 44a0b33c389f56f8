use mbr_tree::{BoundingBox, MbrTree, TreeConfig, TreeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Runs a test body, logging how long it took and failing on any tree error.
pub fn run_test<T>(name: &str, test: T)
where
    T: FnOnce() -> TreeResult<()>,
{
    let start_time = Instant::now();
    let result = test();
    let elapsed = start_time.elapsed();

    match result {
        Ok(()) => log::info!("Test {} passed in {:?}", name, elapsed),
        Err(e) => {
            log::error!("Test {} failed after {:?}: {}", name, elapsed, e);
            panic!("Test {} failed: {:?}", name, e);
        }
    }
}

/// The fan-out used by most scenarios: small enough that a handful of
/// entries already produces splits and condensing.
pub fn small_config() -> TreeConfig {
    TreeConfig::new(4).with_min_entries(2)
}

/// An empty tree with [`small_config`].
pub fn small_tree<V>() -> TreeResult<MbrTree<V>> {
    MbrTree::new(small_config())
}

/// Deterministic random boxes with sides up to `max_side`, placed inside
/// `0..extent` on both axes, each paired with its index.
pub fn random_boxes(seed: u64, count: usize, extent: f64, max_side: f64) -> Vec<(usize, BoundingBox)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let x = rng.gen_range(0.0..extent);
            let y = rng.gen_range(0.0..extent);
            let w = rng.gen_range(0.0..=max_side);
            let h = rng.gen_range(0.0..=max_side);
            (i, BoundingBox::new(x, y, x + w, y + h))
        })
        .collect()
}

/// Deterministic random points, each paired with its index.
pub fn random_points(seed: u64, count: usize, extent: f64) -> Vec<(usize, BoundingBox)> {
    random_boxes(seed, count, extent, 0.0)
}

/// Values from a query result, sorted.
pub fn sorted_values<'a, V, I>(results: I) -> Vec<V>
where
    V: Clone + Ord + 'a,
    I: Iterator<Item = (&'a V, &'a BoundingBox)>,
{
    let mut values: Vec<V> = results.map(|(value, _)| value.clone()).collect();
    values.sort();
    values
}
