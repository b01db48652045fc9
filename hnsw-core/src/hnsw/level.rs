//! Deterministic per-vertex level assignment.
//!
//! Level assignment is the one part of construction that stays strictly
//! sequential: it runs against a single seeded RNG stream before the
//! parallel insertion phase starts, so a build's level assignment depends
//! only on `(seed, n)`, never on thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Floor applied to the uniform sample before taking its log, so a draw
/// arbitrarily close to zero cannot produce an unbounded level.
const MIN_R: f64 = 1e-9;

/// Samples a level for every vertex `0..n` using the standard HNSW
/// exponential-decay distribution `floor(-ln(r) / ln(2))`.
///
/// Returns the per-vertex levels and the maximum level observed.
pub(crate) fn sample_levels(n: usize, seed: u64) -> (Vec<u32>, u32) {
    let mut rng = StdRng::seed_from_u64(seed);
    let inv_ln2 = 1.0 / std::f64::consts::LN_2;

    let mut levels = Vec::with_capacity(n);
    let mut max_level = 0u32;

    for _ in 0..n {
        // `random::<f64>()` draws from [0, 1); invert so the sample lies in
        // (0, 1], then clamp away from zero before taking its log.
        let r = (1.0 - rng.random::<f64>()).max(MIN_R);
        let level = (-r.ln() * inv_ln2).floor() as u32;
        levels.push(level);
        max_level = max_level.max(level);
    }

    (levels, max_level)
}
