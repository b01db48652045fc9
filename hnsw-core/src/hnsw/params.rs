//! Tunable parameters for index construction and search.

use serde::{Deserialize, Serialize};

/// Construction and search parameters for an [`crate::HnswIndex`].
///
/// Defaults match the index's documented external contract: `M=16`,
/// `ef_construction=200`, `ef_search=200`, `alpha=1.0`, `seed=42`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Maximum number of forward neighbors per vertex at layers above 0.
    /// Layer 0 uses `2*m`.
    pub m: u16,
    /// Size of the dynamic candidate list used while inserting a vertex.
    pub ef_construction: usize,
    /// Size of the dynamic candidate list used at query time.
    pub ef_search: usize,
    /// Diversity factor for the neighbor-selection heuristic. `1.0` recovers
    /// plain RobustPrune; values above `1.0` admit more diverse neighbors.
    pub alpha: f32,
    /// Seed for the level-assignment RNG. Builds with the same seed and
    /// input ordering produce the same graph.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 200,
            alpha: 1.0,
            seed: 42,
        }
    }
}

impl HnswParams {
    /// Maximum forward-neighbor capacity at a given layer.
    #[inline]
    pub(crate) fn m_at_level(&self, level: u32) -> usize {
        if level == 0 {
            2 * self.m as usize
        } else {
            self.m as usize
        }
    }

    pub(crate) fn validate(m: u16, ef_construction: usize, ef_search: usize) -> bool {
        m > 0 && ef_construction > 0 && ef_search > 0
    }
}

/// Known-good parameter profiles for datasets the original implementation
/// was tuned against. Applied only as a hint when the caller never called
/// `set_parameters()` before `build()`.
pub(crate) fn autotune_hint(dim: usize, n: usize) -> Option<HnswParams> {
    // SIFT-1M-style 128-dimensional descriptors.
    if dim == 128 && n >= 10_000 {
        return Some(HnswParams {
            m: 16,
            ef_construction: 200,
            ef_search: 200,
            ..HnswParams::default()
        });
    }
    // Small/medium sentence-embedding-style vectors: favor a smaller graph.
    if (256..=1536).contains(&dim) && n < 10_000 {
        return Some(HnswParams {
            m: 12,
            ef_construction: 150,
            ef_search: 100,
            ..HnswParams::default()
        });
    }
    None
}
