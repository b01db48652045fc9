//! RobustPrune-style diversity-aware neighbor selection.
//!
//! Candidates are sorted by distance to an explicit base vertex and greedily
//! admitted: a candidate is accepted only if it is not "shadowed" by an
//! already-selected neighbor that is closer to it than it is to the base,
//! scaled by `alpha`. This keeps the graph's edges spatially diverse instead
//! of collapsing onto a single direction, matching the original heuristic's
//! greedy-diversity admission loop while making the base vertex an explicit
//! parameter rather than always "self" -- callers use this both to finalize
//! a vertex's own forward list and to re-prune a neighbor's reverse list.

use std::cmp::Ordering;

use crate::counter::DistanceCounter;
use crate::vector_store::VectorStore;

/// Selects up to `cap` neighbors for `base` out of `candidates`, applying
/// the alpha-diversity heuristic described in the module docs.
///
/// `base` is excluded from the result even if present in `candidates`.
/// If diversity filtering leaves fewer than `cap` neighbors, the closest
/// remaining candidates are used to fill the list (starvation fallback).
pub(crate) fn select_neighbors(
    store: &VectorStore,
    base: u32,
    candidates: &[u32],
    cap: usize,
    alpha: f32,
    counter: &DistanceCounter,
) -> Vec<u32> {
    if cap == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let base_vec = store.get(base);
    let mut scored: Vec<(u32, f32)> = candidates
        .iter()
        .copied()
        .filter(|&c| c != base)
        .map(|c| (c, counter.dist(base_vec, store.get(c))))
        .collect();
    scored.sort_by(|a, b| cmp_dist_then_id(a, b));
    scored.dedup_by_key(|&mut (id, _)| id);

    let mut selected: Vec<(u32, f32)> = Vec::with_capacity(cap.min(scored.len()));

    'candidates: for &(c, d_vc) in &scored {
        if selected.len() >= cap {
            break;
        }
        let c_vec = store.get(c);
        for &(s, _) in &selected {
            let d_cs = counter.dist(c_vec, store.get(s));
            if d_cs < d_vc * alpha {
                continue 'candidates;
            }
        }
        selected.push((c, d_vc));
    }

    if selected.len() < cap {
        for &(c, d) in &scored {
            if selected.len() >= cap {
                break;
            }
            if !selected.iter().any(|&(s, _)| s == c) {
                selected.push((c, d));
            }
        }
    }

    selected.into_iter().map(|(id, _)| id).collect()
}

fn cmp_dist_then_id(a: &(u32, f32), b: &(u32, f32)) -> Ordering {
    a.1.partial_cmp(&b.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_1d(values: &[f32]) -> VectorStore {
        VectorStore::from_flat(1, values.to_vec()).unwrap()
    }

    #[test]
    fn excludes_self_from_result() {
        let store = store_1d(&[0.0, 1.0, 2.0]);
        let counter = DistanceCounter::new();
        let result = select_neighbors(&store, 0, &[0, 1, 2], 5, 1.0, &counter);
        assert!(!result.contains(&0));
    }

    #[test]
    fn respects_cap() {
        let store = store_1d(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let counter = DistanceCounter::new();
        let result = select_neighbors(&store, 0, &[1, 2, 3, 4], 2, 1.0, &counter);
        assert_eq!(result.len(), 2);
        // Closest two candidates to vertex 0 are 1 and 2.
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn prunes_colinear_duplicate_direction() {
        // Three colinear points: 10 is close to both 0 and 5, but 5 already
        // covers that direction, so alpha=1.0 should reject 10 in favor of
        // anything else available within cap.
        let store = store_1d(&[0.0, 5.0, 10.0]);
        let counter = DistanceCounter::new();
        let result = select_neighbors(&store, 0, &[1, 2], 1, 1.0, &counter);
        assert_eq!(result, vec![1]);
    }

    #[test]
    fn starvation_fallback_fills_cap() {
        // With alpha very small, almost nothing passes the diversity test,
        // but the fallback must still fill up to `cap` from the sorted list.
        let store = store_1d(&[0.0, 1.0, 1.1, 1.2]);
        let counter = DistanceCounter::new();
        let result = select_neighbors(&store, 0, &[1, 2, 3], 3, 0.01, &counter);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn empty_candidates_returns_empty() {
        let store = store_1d(&[0.0, 1.0]);
        let counter = DistanceCounter::new();
        assert!(select_neighbors(&store, 0, &[], 4, 1.0, &counter).is_empty());
    }
}
