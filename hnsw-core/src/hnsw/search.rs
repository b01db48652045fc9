//! Layered best-first search (`search_layer`) and its query-time layer-0
//! variant over the flattened arena.
//!
//! Both variants share one generic core: a min-heap of unexplored
//! candidates and a bounded max-heap of the best results seen so far,
//! expanding through whichever neighbor source is supplied. Ties in the
//! returned set always break on the smaller vertex id, so repeated queries
//! against an unchanged index are reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::counter::DistanceCounter;
use crate::hnsw::graph::{FlatLayer0, Graph};
use crate::hnsw::visited::with_visited;
use crate::vector_store::VectorStore;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scored(f32, u32);

impl Eq for Scored {}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(Ordering::Equal)
            .then(self.1.cmp(&other.1))
    }
}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs layered best-first search starting from `entry`, returning up to
/// `ef` closest vertices sorted ascending by distance (ties broken by id).
///
/// `neighbors_of` supplies the outgoing neighbor ids of a given vertex at
/// whatever layer the caller is searching; this keeps the search core
/// agnostic to whether it's reading live `RwLock`-guarded layers during
/// build or the flattened layer-0 arena at query time.
fn search_layer_generic(
    store: &VectorStore,
    counter: &DistanceCounter,
    query: &[f32],
    entry: &[u32],
    ef: usize,
    neighbors_of: impl Fn(u32) -> Vec<u32>,
) -> Vec<(f32, u32)> {
    with_visited(store.len(), |visit| {
        let mut candidates: BinaryHeap<std::cmp::Reverse<Scored>> = BinaryHeap::new();
        let mut result: BinaryHeap<Scored> = BinaryHeap::new();

        for &e in entry {
            if visit(e) {
                let d = counter.dist(query, store.get(e));
                candidates.push(std::cmp::Reverse(Scored(d, e)));
                result.push(Scored(d, e));
            }
        }

        while let Some(std::cmp::Reverse(Scored(d, c))) = candidates.pop() {
            let worst = result.peek().map(|s| s.0).unwrap_or(f32::INFINITY);
            if result.len() >= ef && d > worst {
                break;
            }

            for n in neighbors_of(c) {
                if !visit(n) {
                    continue;
                }
                let dn = counter.dist(query, store.get(n));
                let worst = result.peek().map(|s| s.0).unwrap_or(f32::INFINITY);
                if result.len() < ef || dn < worst {
                    candidates.push(std::cmp::Reverse(Scored(dn, n)));
                    result.push(Scored(dn, n));
                    if result.len() > ef {
                        result.pop();
                    }
                }
            }
        }

        let mut out: Vec<(f32, u32)> = result.into_iter().map(|Scored(d, id)| (d, id)).collect();
        out.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        out
    })
}

/// `search_layer` over a live graph layer (used during build, and for the
/// greedy `ef=1` descent through upper layers at query time).
pub(crate) fn search_layer(
    graph: &Graph,
    store: &VectorStore,
    counter: &DistanceCounter,
    query: &[f32],
    entry: &[u32],
    ef: usize,
    level: u32,
) -> Vec<(f32, u32)> {
    search_layer_generic(store, counter, query, entry, ef, |c| graph.neighbors(level, c))
}

/// `search_layer` over the flattened layer-0 arena, used for the
/// full-`ef_search` pass at query time.
pub(crate) fn search_layer_flat(
    flat: &FlatLayer0,
    store: &VectorStore,
    counter: &DistanceCounter,
    query: &[f32],
    entry: &[u32],
    ef: usize,
) -> Vec<(f32, u32)> {
    search_layer_generic(store, counter, query, entry, ef, |c| flat.neighbors(c))
}
