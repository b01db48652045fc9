//! In-memory, row-major vector storage.
//!
//! Grounded on the zero-copy access pattern of the original mmap-backed
//! storage layer, minus the file/mmap machinery: vectors live in a single
//! contiguous `Vec<f32>` and are handed out as borrowed slices so callers
//! never pay a copy on the hot path.

use crate::error::{IndexError, Result};

/// A flat, append-only collection of equal-length `f32` vectors.
///
/// Built once from a caller-supplied flat array (see [`VectorStore::from_flat`])
/// and immutable afterwards, matching the index's one-shot bulk-build model.
#[derive(Debug)]
pub(crate) struct VectorStore {
    dim: usize,
    data: Vec<f32>,
}

impl VectorStore {
    /// Wraps `data` as `data.len() / dim` vectors of `dim` dimensions each.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidDimension`] if `dim` is zero, or
    /// [`IndexError::BaseLengthMismatch`] if `data.len()` is not a multiple
    /// of `dim`.
    pub(crate) fn from_flat(dim: usize, data: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            return Err(IndexError::InvalidDimension);
        }
        if data.len() % dim != 0 {
            return Err(IndexError::BaseLengthMismatch {
                base_len: data.len(),
                dim,
            });
        }
        Ok(Self { dim, data })
    }

    /// Number of vectors stored.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Dimensionality of every stored vector.
    #[inline]
    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    /// Returns a zero-copy borrow of vector `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range; callers are expected to only pass
    /// ids that were produced by this store (vertex ids from the graph).
    #[inline]
    pub(crate) fn get(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dim;
        &self.data[start..start + self.dim]
    }
}
