//! Parallel bulk-build orchestration.
//!
//! Construction runs in two phases. First, every vertex's level is sampled
//! sequentially against a single seeded RNG (see [`crate::hnsw::level`]) so
//! the result is independent of thread scheduling. Second, vertices
//! `1..n` are inserted in parallel (vertex `0` is the pinned entry point
//! and is never reinserted): each worker owns exactly one vertex, performs
//! the upper-layer greedy descent and the per-layer candidate search plus
//! RobustPrune selection entirely with read-only or single-writer
//! operations, and only takes another vertex's lock to add a reverse edge.
//! A final single-threaded pass flattens layer 0 for query time.

use rayon::prelude::*;
use tracing::debug;

use crate::counter::DistanceCounter;
use crate::hnsw::graph::{FlatLayer0, Graph};
use crate::hnsw::level::sample_levels;
use crate::hnsw::search::search_layer;
use crate::hnsw::{neighbor_select::select_neighbors, params::HnswParams};
use crate::vector_store::VectorStore;

/// Vertex id of the permanently pinned entry point.
pub(crate) const ENTRY_POINT: u32 = 0;

/// Builds the graph for `store` in parallel, returning the graph and its
/// flattened layer-0 arena.
pub(crate) fn build_graph(
    store: &VectorStore,
    params: &HnswParams,
    counter: &DistanceCounter,
) -> (Graph, FlatLayer0) {
    let n = store.len();
    let (levels, max_level) = sample_levels(n, params.seed);
    let graph = Graph::new(levels, max_level, params.m);

    debug!(n, max_level, "starting parallel HNSW build");

    (1..n as u32)
        .into_par_iter()
        .with_min_len(64)
        .for_each(|i| insert_vertex(&graph, store, counter, i, params));

    let flat = graph.flatten_layer0(store, params.alpha, counter);
    (graph, flat)
}

fn insert_vertex(graph: &Graph, store: &VectorStore, counter: &DistanceCounter, i: u32, params: &HnswParams) {
    let vi = store.get(i);
    let li = graph.level_of(i);
    let top = graph.max_level();

    let mut cur = vec![ENTRY_POINT];

    // Greedy descent with ef=1 through every layer strictly above `li`.
    for level in (li + 1..=top).rev() {
        let found = search_layer(graph, store, counter, vi, &cur, 1, level);
        if let Some(&(_, id)) = found.first() {
            cur = vec![id];
        }
    }

    // Layered insertion from min(li, top) down to 0.
    let start = li.min(top);
    for level in (0..=start).rev() {
        let candidates = search_layer(graph, store, counter, vi, &cur, params.ef_construction, level);
        let candidate_ids: Vec<u32> = candidates.iter().map(|&(_, id)| id).collect();

        let cap = params.m_at_level(level);
        let selected = select_neighbors(store, i, &candidate_ids, cap, params.alpha, counter);

        graph.set_forward(level, i, &selected);
        for &s in &selected {
            graph.add_reverse_edge(level, s, i, store, params.alpha, counter);
        }

        cur = if selected.is_empty() { candidate_ids } else { selected };
    }
}
