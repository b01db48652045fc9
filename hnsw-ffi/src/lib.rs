//! FFI bindings for the HNSW vector index
//!
//! This module provides a C-compatible interface to the `hnsw-core` index
//! engine. All functions are panic-safe and use thread-local error
//! reporting.
//!
//! # Safety Guarantees
//!
//! - No panic may cross the FFI boundary (enforced by `ffi_guard`)
//! - Null pointer checks on all pointer arguments
//! - ABI stability via `#[repr(C)]` and `extern "C"`
//!
//! # Error Handling
//!
//! Errors are reported through:
//! - Return values: nonzero `c_int` for setup calls, `0` for `hnsw_search`
//! - Thread-local error message: `hnsw_last_error_message()`
//!
//! # Thread Safety
//!
//! - Single-writer: `hnsw_set_parameters`, `hnsw_set_alpha`, `hnsw_build`
//!   require exclusive access and must run before any reader observes the
//!   handle
//! - Multi-reader: `hnsw_search` allows concurrent readers once `build` has
//!   returned
//! - Each thread has its own error message storage

use hnsw_core::HnswIndex;
use libc::{c_char, c_float, c_int, size_t};
use std::cell::RefCell;
use std::ffi::CString;
use std::ptr;
use std::slice;

/// Internal state holder (not exposed to C)
struct HnswIndexState {
    inner: HnswIndex,
}

/// Opaque handle to an HNSW index (C-compatible)
///
/// This is a zero-sized type that serves as an opaque handle for C.
/// C code only sees pointers to this type, never the actual struct.
/// The real data is stored in `HnswIndexState`.
#[repr(C)]
pub struct HnswIndexHandle {
    _private: [u8; 0],
}

thread_local! {
    /// Thread-local storage for error messages
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

/// Set the last error message for the current thread
fn set_last_error(err: impl std::fmt::Display) {
    LAST_ERROR.with(|cell| {
        let safe_msg = err.to_string().replace('\0', "\\0");
        let c_str = CString::new(safe_msg).unwrap_or_default();
        *cell.borrow_mut() = Some(c_str);
    });
}

/// Clear the last error message for the current thread
fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Panic barrier that catches all panics at the FFI boundary
///
/// No Rust panic may ever unwind across the FFI boundary. `AssertUnwindSafe`
/// is permitted because we abort the operation on panic and report the
/// failure through thread-local storage rather than resume broken state.
fn ffi_guard<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(e) => {
            let msg = if let Some(s) = e.downcast_ref::<&str>() {
                format!("Panic: {}", s)
            } else if let Some(s) = e.downcast_ref::<String>() {
                format!("Panic: {}", s)
            } else {
                "Unknown panic".to_string()
            };
            set_last_error(msg);
            None
        }
    }
}

//
// === LIFECYCLE MANAGEMENT ===
//

/// Create a new HNSW index with default parameters
/// (`M=16`, `ef_construction=200`, `ef_search=200`, `alpha=1.0`, `seed=42`).
///
/// # Returns
///
/// Non-NULL pointer. This function never fails.
///
/// # Safety
///
/// Caller must free the returned pointer with `hnsw_free()`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_new() -> *mut HnswIndexHandle {
    ffi_guard(|| {
        clear_last_error();
        let state = Box::new(HnswIndexState { inner: HnswIndex::new() });
        Box::into_raw(state) as *mut HnswIndexHandle
    })
    .unwrap_or(ptr::null_mut())
}

/// Free an HNSW index and release all resources
///
/// # Safety
///
/// - `ptr` must be NULL or a valid pointer from `hnsw_new()`
/// - After this call, `ptr` is invalid and must not be used
/// - Safe to call with NULL (no-op)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_free(ptr: *mut HnswIndexHandle) {
    if !ptr.is_null() {
        ffi_guard(|| {
            // SAFETY: Caller guarantees ptr is valid (from hnsw_new)
            let _ = unsafe { Box::from_raw(ptr as *mut HnswIndexState) };
        });
    }
}

//
// === PARAMETER CONFIGURATION ===
//

/// Override `M`, `ef_construction`, and `ef_search` before `hnsw_build()`.
///
/// # Returns
///
/// - `0` on success
/// - `-1` on failure (check `hnsw_last_error_message()`), including a NULL
///   `ptr` or a call made after `hnsw_build()` has already run
///
/// # Safety
///
/// `ptr` must be non-NULL and valid, with exclusive access.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_set_parameters(
    ptr: *mut HnswIndexHandle,
    m: u16,
    ef_construction: size_t,
    ef_search: size_t,
) -> c_int {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is valid and has exclusive access
        let state = unsafe { (ptr as *mut HnswIndexState).as_mut() };
        let index = match state {
            Some(s) => &mut s.inner,
            None => {
                set_last_error("Null index pointer");
                return -1;
            }
        };

        match index.set_parameters(m, ef_construction, ef_search) {
            Ok(()) => {
                clear_last_error();
                0
            }
            Err(e) => {
                set_last_error(e);
                -1
            }
        }
    })
    .unwrap_or(-1)
}

/// Override the neighbor-selection diversity factor `alpha` before
/// `hnsw_build()`.
///
/// # Returns
///
/// - `0` on success
/// - `-1` on failure (check `hnsw_last_error_message()`)
///
/// # Safety
///
/// `ptr` must be non-NULL and valid, with exclusive access.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_set_alpha(ptr: *mut HnswIndexHandle, alpha: c_float) -> c_int {
    ffi_guard(|| {
        let state = unsafe { (ptr as *mut HnswIndexState).as_mut() };
        let index = match state {
            Some(s) => &mut s.inner,
            None => {
                set_last_error("Null index pointer");
                return -1;
            }
        };

        match index.set_alpha(alpha) {
            Ok(()) => {
                clear_last_error();
                0
            }
            Err(e) => {
                set_last_error(e);
                -1
            }
        }
    })
    .unwrap_or(-1)
}

//
// === BUILD ===
//

/// Build the index over `base`, a flattened row-major array of `dim`
/// dimensional vectors (`len == n * dim`). Vertex ids are assigned in input
/// order starting at 0.
///
/// # Returns
///
/// - `0` on success
/// - `-1` on failure (check `hnsw_last_error_message()`)
///
/// # Thread Safety
///
/// **SINGLE-WRITER**: Must complete before any other thread calls
/// `hnsw_search()` on this handle.
///
/// # Safety
///
/// - `ptr` must be non-NULL and valid, with exclusive access
/// - `base` must point to `len` valid f32 values, or be NULL if `len == 0`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_build(
    ptr: *mut HnswIndexHandle,
    dim: size_t,
    base: *const c_float,
    len: size_t,
) -> c_int {
    ffi_guard(|| {
        let state = unsafe { (ptr as *mut HnswIndexState).as_mut() };
        let index = match state {
            Some(s) => &mut s.inner,
            None => {
                set_last_error("Null index pointer");
                return -1;
            }
        };

        if base.is_null() && len != 0 {
            set_last_error("Null base pointer with nonzero length");
            return -1;
        }

        // SAFETY: Caller guarantees base points to len valid f32 values,
        // or len is zero.
        let base_slice = if len == 0 { &[][..] } else { unsafe { slice::from_raw_parts(base, len) } };

        match index.build(dim, base_slice) {
            Ok(()) => {
                clear_last_error();
                0
            }
            Err(e) => {
                set_last_error(e);
                -1
            }
        }
    })
    .unwrap_or(-1)
}

//
// === SEARCH ===
//

/// Write the ids of the 10 nearest neighbors of `query` into `out_ids`,
/// sorted ascending by distance. Slots beyond the number of vertices found
/// are zero-padded. `out_ids` must have space for exactly 10 elements.
///
/// # Returns
///
/// - `1` on success
/// - `0` on failure (check `hnsw_last_error_message()`)
///
/// # Thread Safety
///
/// **MULTI-READER**: Multiple threads may call this function concurrently
/// on the same handle once `hnsw_build()` has returned.
///
/// # Safety
///
/// - `ptr` must be non-NULL and valid (shared access)
/// - `query` must point to `query_len` valid f32 values
/// - `out_ids` must have space for at least 10 u64 values
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_search(
    ptr: *const HnswIndexHandle,
    query: *const c_float,
    query_len: size_t,
    out_ids: *mut u64,
) -> c_int {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is valid (shared access)
        let state = unsafe { (ptr as *const HnswIndexState).as_ref() };
        let index = match state {
            Some(s) => &s.inner,
            None => {
                set_last_error("Null index pointer");
                return 0;
            }
        };

        if query.is_null() || out_ids.is_null() {
            set_last_error("Null buffer pointers");
            return 0;
        }

        // SAFETY: Caller guarantees query points to query_len valid f32 values
        let query_slice = unsafe { slice::from_raw_parts(query, query_len) };
        // SAFETY: Caller guarantees out_ids has space for TOP_K elements
        let out_slice = unsafe { slice::from_raw_parts_mut(out_ids, hnsw_core::TOP_K) };

        match index.search(query_slice, out_slice) {
            Ok(()) => {
                clear_last_error();
                1
            }
            Err(e) => {
                set_last_error(e);
                0
            }
        }
    })
    .unwrap_or(0)
}

//
// === INTROSPECTION ===
//

/// Reset the cumulative distance-computation counter to zero.
///
/// # Safety
///
/// `ptr` must be non-NULL and valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_reset_distance_computations(ptr: *const HnswIndexHandle) {
    ffi_guard(|| {
        let state = unsafe { (ptr as *const HnswIndexState).as_ref() };
        if let Some(s) = state {
            s.inner.reset_distance_computations();
        }
    });
}

/// Get the number of distance-kernel invocations made by build and search
/// operations since the index was created or last reset.
///
/// # Returns
///
/// The distance computation count, or 0 if `ptr` is NULL.
///
/// # Safety
///
/// `ptr` must be non-NULL and valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hnsw_get_distance_computations(ptr: *const HnswIndexHandle) -> u64 {
    ffi_guard(|| {
        let state = unsafe { (ptr as *const HnswIndexState).as_ref() };
        match state {
            Some(s) => s.inner.get_distance_computations(),
            None => 0,
        }
    })
    .unwrap_or(0)
}

//
// === ERROR HANDLING ===
//

/// Get the last error message for the current thread
///
/// # Returns
///
/// - Pointer to NULL-terminated error string
/// - NULL if no error occurred
///
/// # Lifetime
///
/// The returned pointer is valid until the next FFI call on this thread, or
/// until the thread exits. Do NOT free the returned pointer.
#[unsafe(no_mangle)]
pub extern "C" fn hnsw_last_error_message() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ref().map(|s| s.as_ptr()).unwrap_or(ptr::null()))
}

//
// === VERSIONING ===
//

/// Get the hnsw-core library version
///
/// # Returns
///
/// Pointer to NULL-terminated version string (e.g., "0.1.0"), valid for the
/// lifetime of the program. Do NOT free the returned pointer.
#[unsafe(no_mangle)]
pub extern "C" fn hnsw_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

//
// === TESTS ===
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn dataset(n: usize, dim: usize) -> Vec<f32> {
        (0..n * dim).map(|i| (i % 97) as f32).collect()
    }

    #[test]
    fn test_ffi_lifecycle() {
        let ptr = unsafe { hnsw_new() };
        assert!(!ptr.is_null());

        let base = dataset(50, 4);
        let build_result = unsafe { hnsw_build(ptr, 4, base.as_ptr(), base.len()) };
        assert_eq!(build_result, 0);

        let query = vec![1.0f32; 4];
        let mut out_ids = [u64::MAX; 10];
        let search_result = unsafe { hnsw_search(ptr, query.as_ptr(), 4, out_ids.as_mut_ptr()) };
        assert_eq!(search_result, 1);
        assert!(out_ids.iter().any(|&id| id != u64::MAX));

        unsafe { hnsw_free(ptr) };
    }

    #[test]
    fn test_ffi_null_safety() {
        let build_result = unsafe { hnsw_build(ptr::null_mut(), 4, ptr::null(), 0) };
        assert_eq!(build_result, -1);

        let mut out_ids = [0u64; 10];
        let query = [0.0f32; 4];
        let search_result =
            unsafe { hnsw_search(ptr::null(), query.as_ptr(), 4, out_ids.as_mut_ptr()) };
        assert_eq!(search_result, 0);

        // Double free should be safe (no-op second time)
        unsafe { hnsw_free(ptr::null_mut()) };
    }

    #[test]
    fn test_ffi_dimension_mismatch() {
        let ptr = unsafe { hnsw_new() };
        let base = dataset(10, 4);
        assert_eq!(unsafe { hnsw_build(ptr, 4, base.as_ptr(), base.len()) }, 0);

        let bad_query = [0.0f32; 3];
        let mut out_ids = [0u64; 10];
        let search_result =
            unsafe { hnsw_search(ptr, bad_query.as_ptr(), 3, out_ids.as_mut_ptr()) };
        assert_eq!(search_result, 0, "Should fail with dimension mismatch");

        let error = unsafe { CStr::from_ptr(hnsw_last_error_message()) };
        let error_str = error.to_string_lossy();
        assert!(error_str.contains("dimension"), "Error should mention dimensions");

        unsafe { hnsw_free(ptr) };
    }

    #[test]
    fn test_ffi_parameters_locked_after_build() {
        let ptr = unsafe { hnsw_new() };
        let base = dataset(10, 4);
        assert_eq!(unsafe { hnsw_build(ptr, 4, base.as_ptr(), base.len()) }, 0);

        let set_result = unsafe { hnsw_set_parameters(ptr, 8, 100, 100) };
        assert_eq!(set_result, -1);

        let error = unsafe { CStr::from_ptr(hnsw_last_error_message()) };
        assert!(!error.to_string_lossy().is_empty());

        unsafe { hnsw_free(ptr) };
    }

    #[test]
    fn test_ffi_introspection() {
        let ptr = unsafe { hnsw_new() };
        assert_eq!(unsafe { hnsw_get_distance_computations(ptr) }, 0);

        let base = dataset(50, 4);
        unsafe { hnsw_build(ptr, 4, base.as_ptr(), base.len()) };
        assert!(unsafe { hnsw_get_distance_computations(ptr) } > 0);

        unsafe { hnsw_reset_distance_computations(ptr) };
        assert_eq!(unsafe { hnsw_get_distance_computations(ptr) }, 0);

        unsafe { hnsw_free(ptr) };
    }

    #[test]
    fn test_ffi_version() {
        let version = unsafe { CStr::from_ptr(hnsw_version()) };
        let version_str = version.to_string_lossy();
        let expected = env!("CARGO_PKG_VERSION");
        assert_eq!(version_str, expected);
    }

    #[test]
    fn test_ffi_with_custom_options() {
        let ptr = unsafe { hnsw_new() };
        assert_eq!(unsafe { hnsw_set_parameters(ptr, 32, 100, 75) }, 0);
        assert_eq!(unsafe { hnsw_set_alpha(ptr, 1.2) }, 0);

        let base = dataset(30, 8);
        assert_eq!(unsafe { hnsw_build(ptr, 8, base.as_ptr(), base.len()) }, 0);

        let query = vec![0.3f32; 8];
        let mut out_ids = [0u64; 10];
        let search_result = unsafe { hnsw_search(ptr, query.as_ptr(), 8, out_ids.as_mut_ptr()) };
        assert_eq!(search_result, 1);

        unsafe { hnsw_free(ptr) };
    }

    #[test]
    fn test_ffi_error_thread_local() {
        use std::thread;

        set_last_error("Main thread error");
        let main_error = unsafe { CStr::from_ptr(hnsw_last_error_message()) };
        assert_eq!(main_error.to_string_lossy(), "Main thread error");

        let handle = thread::spawn(|| {
            let error_ptr = hnsw_last_error_message();
            assert!(error_ptr.is_null(), "New thread should have no error");

            set_last_error("Spawned thread error");
            let spawned_error = unsafe { CStr::from_ptr(hnsw_last_error_message()) };
            assert_eq!(spawned_error.to_string_lossy(), "Spawned thread error");
        });

        handle.join().unwrap();

        let main_error_again = unsafe { CStr::from_ptr(hnsw_last_error_message()) };
        assert_eq!(main_error_again.to_string_lossy(), "Main thread error");
    }
}
