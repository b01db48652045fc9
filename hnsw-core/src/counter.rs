//! Cumulative distance-computation counter.
//!
//! Every call to the distance kernel made on behalf of a build or a query
//! increments a single shared counter, so `get_distance_computations()`
//! reflects the true cost of whatever operations ran since the last reset,
//! across every worker thread used during a parallel build.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::distance::squared_euclidean;

/// Thread-safe counter of distance-kernel invocations, shared by all build
/// workers and query callers of a single index.
#[derive(Debug, Default)]
pub(crate) struct DistanceCounter(AtomicU64);

impl DistanceCounter {
    pub(crate) fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Computes the squared distance between `a` and `b`, counting the call.
    #[inline]
    pub(crate) fn dist(&self, a: &[f32], b: &[f32]) -> f32 {
        self.0.fetch_add(1, Ordering::Relaxed);
        squared_euclidean(a, b)
    }

    pub(crate) fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
