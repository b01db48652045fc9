//! `hnsw-core` - an embeddable, in-memory HNSW approximate nearest-neighbor
//! index.
//!
//! `hnsw-core` builds a Hierarchical Navigable Small-World graph over a flat
//! array of vectors and answers top-10 queries against it. It targets the
//! same "embeddable, no daemons" niche as other local-first storage
//! primitives: everything lives in a single process's memory, construction
//! is a one-shot bulk operation, and persistence/serialization are left to
//! the caller.
//!
//! # Example
//!
//! ```
//! use hnsw_core::HnswIndex;
//!
//! let dim = 4;
//! let base: Vec<f32> = (0..100 * dim).map(|i| i as f32).collect();
//!
//! let mut index = HnswIndex::new();
//! index.build(dim, &base).unwrap();
//!
//! let query = vec![0.0; dim];
//! let mut out = [0u64; 10];
//! index.search(&query, &mut out).unwrap();
//! ```
//!
//! # Design Philosophy
//!
//! `hnsw-core` is intentionally narrow. It does not aim to be:
//! - A vector database or query engine
//! - A serialization format
//! - A distributed system
//!
//! Those concerns belong to the application layer; this crate is a single
//! in-memory index primitive, built once and queried many times.

mod counter;
mod distance;
mod error;
mod hnsw;
mod vector_store;

use counter::DistanceCounter;
use hnsw::{build_graph, search_layer, search_layer_flat, FlatLayer0, Graph, ENTRY_POINT};
use vector_store::VectorStore;

pub use distance::squared_euclidean;
pub use error::{IndexError, Result};
pub use hnsw::HnswParams;

/// The number of results `search()` always produces.
pub const TOP_K: usize = 10;

struct BuiltIndex {
    store: VectorStore,
    graph: Graph,
    flat: FlatLayer0,
}

/// An in-memory HNSW approximate nearest-neighbor index.
///
/// Construction is a single bulk `build()` call over the full dataset;
/// there is no incremental insertion. A freshly constructed index, or one
/// queried before `build()` is called, answers `search()` with an
/// all-zero result rather than an error -- see [`HnswIndex::search`].
pub struct HnswIndex {
    params: HnswParams,
    params_customized: bool,
    build_called: bool,
    built: Option<BuiltIndex>,
    counter: DistanceCounter,
}

impl Default for HnswIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HnswIndex {
    /// Creates an index with the default parameters: `M=16`,
    /// `ef_construction=200`, `ef_search=200`, `alpha=1.0`, `seed=42`.
    pub fn new() -> Self {
        Self {
            params: HnswParams::default(),
            params_customized: false,
            build_called: false,
            built: None,
            counter: DistanceCounter::new(),
        }
    }

    /// Overrides `M`, `ef_construction`, and `ef_search` before `build()`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidParameters`] if any argument is zero,
    /// or [`IndexError::ParametersLocked`] if `build()` has already run.
    pub fn set_parameters(&mut self, m: u16, ef_construction: usize, ef_search: usize) -> Result<()> {
        if self.build_called {
            return Err(IndexError::ParametersLocked);
        }
        if !HnswParams::validate(m, ef_construction, ef_search) {
            return Err(IndexError::InvalidParameters);
        }
        self.params.m = m;
        self.params.ef_construction = ef_construction;
        self.params.ef_search = ef_search;
        self.params_customized = true;
        Ok(())
    }

    /// Sets the diversity factor used by the neighbor-selection heuristic.
    /// An ambient ergonomic addition alongside the parameters above; `alpha`
    /// defaults to `1.0` and has no dedicated setter in the original
    /// parameter list, but build quality tuning is incomplete without it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ParametersLocked`] if `build()` has already run.
    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        if self.build_called {
            return Err(IndexError::ParametersLocked);
        }
        self.params.alpha = alpha;
        self.params_customized = true;
        Ok(())
    }

    /// Builds the index over `base`, a flattened row-major array of `D`
    /// dimensional vectors (`base.len() == n * dim`).
    ///
    /// Vertex ids are assigned in input order, starting at 0. Vertex 0 is
    /// pinned as the graph's entry point and is never itself inserted as
    /// a neighbor of anything it wasn't already connected to by other
    /// vertices' insertions.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidDimension`] if `dim` is zero,
    /// [`IndexError::BaseLengthMismatch`] if `base.len()` isn't a multiple
    /// of `dim`, or [`IndexError::AlreadyBuilt`] if called more than once.
    pub fn build(&mut self, dim: usize, base: &[f32]) -> Result<()> {
        if self.build_called {
            return Err(IndexError::AlreadyBuilt);
        }
        if dim == 0 {
            return Err(IndexError::InvalidDimension);
        }
        if base.len() % dim != 0 {
            return Err(IndexError::BaseLengthMismatch {
                base_len: base.len(),
                dim,
            });
        }
        self.build_called = true;

        let n = base.len() / dim;
        if !self.params_customized {
            if let Some(tuned) = hnsw::autotune_hint(dim, n) {
                self.params = tuned;
            }
        }

        if n == 0 {
            return Ok(());
        }

        let store = VectorStore::from_flat(dim, base.to_vec())?;
        let (graph, flat) = build_graph(&store, &self.params, &self.counter);
        self.built = Some(BuiltIndex { store, graph, flat });
        Ok(())
    }

    /// Writes the ids of the 10 nearest neighbors of `query` into `out`,
    /// sorted ascending by distance with ties broken by the smaller id.
    /// Slots beyond the number of vertices found are zero-padded.
    ///
    /// Calling `search()` before `build()`, or on an index built from an
    /// empty dataset, is not an error: `out` is filled with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutputLengthMismatch`] if `out.len() != 10`,
    /// or [`IndexError::QueryDimensionMismatch`] if `query.len()` doesn't
    /// match the index's dimension.
    pub fn search(&self, query: &[f32], out: &mut [u64]) -> Result<()> {
        if out.len() != TOP_K {
            return Err(IndexError::OutputLengthMismatch {
                expected: TOP_K,
                actual: out.len(),
            });
        }

        let Some(built) = &self.built else {
            out.fill(0);
            return Ok(());
        };

        if query.len() != built.store.dim() {
            return Err(IndexError::QueryDimensionMismatch {
                expected: built.store.dim(),
                actual: query.len(),
            });
        }

        let mut cur = vec![ENTRY_POINT];
        for level in (1..=built.graph.max_level()).rev() {
            let found = search_layer(&built.graph, &built.store, &self.counter, query, &cur, 1, level);
            if let Some(&(_, id)) = found.first() {
                cur = vec![id];
            }
        }

        let ef = self.params.ef_search.max(TOP_K);
        let results = search_layer_flat(&built.flat, &built.store, &self.counter, query, &cur, ef);

        for (slot, &(_, id)) in out.iter_mut().zip(results.iter()) {
            *slot = u64::from(id);
        }
        for slot in out.iter_mut().skip(results.len()) {
            *slot = 0;
        }
        Ok(())
    }

    /// Resets the cumulative distance-computation counter to zero.
    pub fn reset_distance_computations(&self) {
        self.counter.reset();
    }

    /// Returns the number of distance-kernel invocations made by build and
    /// search operations since the index was created or last reset.
    pub fn get_distance_computations(&self) -> u64 {
        self.counter.get()
    }
}
