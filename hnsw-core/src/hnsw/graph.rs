//! In-memory multi-layer proximity graph.
//!
//! Upper layers are sparse and rarely contended, so each vertex's adjacency
//! list at a given layer lives behind its own `parking_lot::RwLock`: forward
//! writes (a vertex publishing its own neighbor list) and reverse writes
//! (another vertex linking back) both take the lock for the owning vertex,
//! while reads during concurrent build traversal take a short read lock.
//! Layer 0 is additionally flattened into a single packed `i32` arena once
//! the parallel build finishes, for cache-friendly query-time traversal.

use parking_lot::RwLock;

use crate::counter::DistanceCounter;
use crate::hnsw::neighbor_select::select_neighbors;
use crate::vector_store::VectorStore;

/// Reverse-edge lists are allowed to grow up to this multiple of a layer's
/// capacity before being pruned in place; the final flatten pass trims any
/// layer-0 list still over capacity down to exactly `2*M`.
const SLACK_FACTOR: f32 = 2.5;

struct Layer {
    slots: Vec<RwLock<Vec<u32>>>,
}

impl Layer {
    fn new(n: usize) -> Self {
        Self {
            slots: (0..n).map(|_| RwLock::new(Vec::new())).collect(),
        }
    }
}

/// The multi-layer graph: per-vertex levels plus one [`Layer`] per level
/// from 0 to the build's maximum observed level.
pub(crate) struct Graph {
    levels: Vec<u32>,
    max_level: u32,
    layers: Vec<Layer>,
    m: u16,
}

impl Graph {
    pub(crate) fn new(levels: Vec<u32>, max_level: u32, m: u16) -> Self {
        let n = levels.len();
        let layers = (0..=max_level).map(|_| Layer::new(n)).collect();
        Self {
            levels,
            max_level,
            layers,
            m,
        }
    }

    pub(crate) fn max_level(&self) -> u32 {
        self.max_level
    }

    pub(crate) fn level_of(&self, id: u32) -> u32 {
        self.levels[id as usize]
    }

    fn m_at(&self, level: u32) -> usize {
        if level == 0 {
            2 * self.m as usize
        } else {
            self.m as usize
        }
    }

    /// Snapshot of `id`'s neighbor list at `level` (a short read lock, then
    /// an owned copy -- lists are at most a few dozen entries).
    pub(crate) fn neighbors(&self, level: u32, id: u32) -> Vec<u32> {
        self.layers[level as usize].slots[id as usize].read().clone()
    }

    /// Publishes `id`'s own forward list at `level`. Called only by the
    /// worker thread that owns `id`'s insertion, so no other writer can be
    /// racing on this slot -- the lock still guards against a concurrent
    /// reverse-edge writer landing on the same slot from
    /// [`Graph::add_reverse_edge`].
    pub(crate) fn set_forward(&self, level: u32, id: u32, neighbors: &[u32]) {
        *self.layers[level as usize].slots[id as usize].write() = neighbors.to_vec();
    }

    /// Adds `from` as a reverse neighbor of `to` at `level`, pruning `to`'s
    /// list back down to capacity if it has grown past its slack allowance.
    ///
    /// The base vertex of the prune is `to` (an explicit parameter to
    /// [`select_neighbors`]), since this rebalances `to`'s own adjacency,
    /// not `from`'s.
    pub(crate) fn add_reverse_edge(
        &self,
        level: u32,
        to: u32,
        from: u32,
        store: &VectorStore,
        alpha: f32,
        counter: &DistanceCounter,
    ) {
        let cap = self.m_at(level);
        let slot = &self.layers[level as usize].slots[to as usize];

        let snapshot = {
            let mut list = slot.write();
            if !list.contains(&from) {
                list.push(from);
            }
            if list.len() <= (cap as f32 * SLACK_FACTOR) as usize {
                return;
            }
            list.clone()
        };

        let pruned = select_neighbors(store, to, &snapshot, cap, alpha, counter);
        *slot.write() = pruned;
    }

    /// Flattens layer 0 into a packed arena: `F[i*(2M+1)]` holds the
    /// neighbor count for vertex `i`, followed by up to `2M` neighbor ids.
    /// Any list still over capacity is pruned one last time with `i` itself
    /// as the base vertex.
    pub(crate) fn flatten_layer0(
        &self,
        store: &VectorStore,
        alpha: f32,
        counter: &DistanceCounter,
    ) -> FlatLayer0 {
        let n = self.levels.len();
        let cap = self.m_at(0);
        let stride = 1 + cap;
        let mut flat = vec![-1_i32; n * stride];

        for i in 0..n {
            let slot = &self.layers[0].slots[i];
            let mut list = slot.write();
            if list.len() > cap {
                *list = select_neighbors(store, i as u32, &list, cap, alpha, counter);
            }
            let base = i * stride;
            flat[base] = list.len() as i32;
            for (k, &nb) in list.iter().enumerate() {
                flat[base + 1 + k] = nb as i32;
            }
        }

        FlatLayer0 { data: flat, stride }
    }
}

/// Cache-friendly layer-0 representation used for query-time traversal.
pub(crate) struct FlatLayer0 {
    data: Vec<i32>,
    stride: usize,
}

impl FlatLayer0 {
    pub(crate) fn neighbors(&self, id: u32) -> Vec<u32> {
        let base = id as usize * self.stride;
        let count = self.data[base] as usize;
        self.data[base + 1..base + 1 + count]
            .iter()
            .map(|&x| x as u32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_1d(values: &[f32]) -> VectorStore {
        VectorStore::from_flat(1, values.to_vec()).unwrap()
    }

    #[test]
    fn forward_and_reverse_round_trip() {
        let graph = Graph::new(vec![0, 0, 0], 0, 4);
        graph.set_forward(0, 0, &[1, 2]);
        assert_eq!(graph.neighbors(0, 0), vec![1, 2]);

        let store = store_1d(&[0.0, 1.0, 2.0]);
        let counter = DistanceCounter::new();
        graph.add_reverse_edge(0, 1, 0, &store, 1.0, &counter);
        assert!(graph.neighbors(0, 1).contains(&0));
    }

    #[test]
    fn reverse_edge_dedup() {
        let graph = Graph::new(vec![0, 0], 0, 4);
        let store = store_1d(&[0.0, 1.0]);
        let counter = DistanceCounter::new();
        graph.add_reverse_edge(0, 1, 0, &store, 1.0, &counter);
        graph.add_reverse_edge(0, 1, 0, &store, 1.0, &counter);
        assert_eq!(graph.neighbors(0, 1), vec![0]);
    }

    #[test]
    fn reverse_edge_prunes_past_slack() {
        // m=1 -> layer-0 cap is 2, slack allows up to floor(2*2.5)=5 entries
        // before a prune kicks in.
        let n = 8;
        let graph = Graph::new(vec![0; n], 0, 1);
        let values: Vec<f32> = (0..n as i32).map(|i| i as f32).collect();
        let store = store_1d(&values);
        let counter = DistanceCounter::new();

        for from in 1..n as u32 {
            graph.add_reverse_edge(0, 0, from, &store, 1.0, &counter);
        }
        assert!(graph.neighbors(0, 0).len() <= 5);
    }

    #[test]
    fn flatten_produces_count_prefixed_layout() {
        let graph = Graph::new(vec![0, 0, 0], 0, 4);
        graph.set_forward(0, 0, &[1, 2]);
        graph.set_forward(0, 1, &[0]);
        graph.set_forward(0, 2, &[]);

        let store = store_1d(&[0.0, 1.0, 2.0]);
        let counter = DistanceCounter::new();
        let flat = graph.flatten_layer0(&store, 1.0, &counter);

        assert_eq!(flat.neighbors(0), vec![1, 2]);
        assert_eq!(flat.neighbors(1), vec![0]);
        assert!(flat.neighbors(2).is_empty());
    }

    #[test]
    fn flatten_prunes_oversized_list_to_capacity() {
        let n = 6;
        let graph = Graph::new(vec![0; n], 0, 1); // cap = 2
        let all_others: Vec<u32> = (1..n as u32).collect();
        graph.set_forward(0, 0, &all_others);

        let values: Vec<f32> = (0..n as i32).map(|i| i as f32).collect();
        let store = store_1d(&values);
        let counter = DistanceCounter::new();
        let flat = graph.flatten_layer0(&store, 1.0, &counter);

        assert_eq!(flat.neighbors(0).len(), 2);
    }
}
