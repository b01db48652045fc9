//! Tag-stamped, thread-local visited scratch for `search_layer`.
//!
//! Allocating and clearing a fresh visited set on every call is wasteful at
//! HNSW's call volume. Instead each thread keeps one scratch buffer of tags
//! alive for its lifetime; a call "clears" it by bumping a monotonic
//! generation counter, and a vertex is considered visited only if its slot
//! carries the current generation. Wraparound triggers one real clear.

use std::cell::RefCell;

thread_local! {
    static SCRATCH: RefCell<VisitedScratch> = RefCell::new(VisitedScratch::new());
}

struct VisitedScratch {
    tags: Vec<u32>,
    current: u32,
}

impl VisitedScratch {
    fn new() -> Self {
        Self {
            tags: Vec::new(),
            current: 0,
        }
    }

    fn begin(&mut self, n: usize) -> u32 {
        if self.tags.len() < n {
            self.tags.resize(n, 0);
        }
        self.current = self.current.wrapping_add(1);
        if self.current == 0 {
            self.tags.iter_mut().for_each(|t| *t = 0);
            self.current = 1;
        }
        self.current
    }

    /// Marks `id` visited for the current generation, returning `true` if it
    /// had not already been visited this call.
    fn visit(&mut self, id: u32, tag: u32) -> bool {
        let slot = &mut self.tags[id as usize];
        if *slot == tag {
            false
        } else {
            *slot = tag;
            true
        }
    }
}

/// Runs `f` with a fresh visited-set generation sized for `capacity`
/// vertices, backed by this thread's scratch buffer.
pub(crate) fn with_visited<R>(capacity: usize, f: impl FnOnce(&mut dyn FnMut(u32) -> bool) -> R) -> R {
    SCRATCH.with(|cell| {
        let mut scratch = cell.borrow_mut();
        let tag = scratch.begin(capacity);
        let mut visit = move |id: u32| scratch.visit(id, tag);
        f(&mut visit)
    })
}
