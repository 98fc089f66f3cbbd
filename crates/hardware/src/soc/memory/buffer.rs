//! DRAM Buffer Implementation.
//!
//! This module provides a safe wrapper around raw memory allocation for the system RAM.
//! It uses an anonymous `mmap` on Unix systems so pages are only committed by the host
//! when the guest touches them, and falls back to a zeroed `Vec` elsewhere.

use std::io;
use std::slice;

use thiserror::Error;
#[cfg(unix)]
use tracing::warn;

/// Failure to allocate guest RAM.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The host refused the anonymous mapping.
    #[error("failed to map {size} bytes of guest RAM: {source}")]
    Map {
        /// Requested size in bytes.
        size: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A zero-sized RAM was requested.
    #[error("guest RAM size must be non-zero")]
    Empty,
}

/// A contiguous, zero-initialized byte buffer backing guest RAM.
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
}

impl std::fmt::Debug for DramBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DramBuffer").field("size", &self.size).finish_non_exhaustive()
    }
}

// SAFETY: the buffer exclusively owns its allocation; all access goes through
// `&self`/`&mut self` methods with bounds checks.
unsafe impl Send for DramBuffer {}

impl DramBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the buffer in bytes.
    ///
    /// # Returns
    ///
    /// The buffer, or `MemoryError` if the host cannot provide it.
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        if size == 0 {
            return Err(MemoryError::Empty);
        }

        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no address hint.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(MemoryError::Map {
                    size,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(Self {
                ptr: ptr.cast::<u8>(),
                size,
            })
        }

        #[cfg(not(unix))]
        {
            let boxed = vec![0u8; size].into_boxed_slice();
            Ok(Self {
                ptr: Box::into_raw(boxed).cast::<u8>(),
                size,
            })
        }
    }

    /// Returns the size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the buffer is empty (never, once constructed).
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `len` bytes starting at `offset`, or `None` if out of bounds.
    pub fn get(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: range checked against the allocation above.
        Some(unsafe { slice::from_raw_parts(self.ptr.add(offset), len) })
    }

    /// Returns a mutable view of `len` bytes at `offset`, or `None` if out of bounds.
    pub fn get_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: range checked and `&mut self` guarantees exclusivity.
        Some(unsafe { slice::from_raw_parts_mut(self.ptr.add(offset), len) })
    }

    /// Zeroes the whole buffer.
    pub fn clear(&mut self) {
        #[cfg(target_os = "linux")]
        {
            // SAFETY: MADV_DONTNEED on a private anonymous mapping drops the pages;
            // the next touch observes zero-filled memory.
            let rc = unsafe { libc::madvise(self.ptr.cast(), self.size, libc::MADV_DONTNEED) };
            if rc == 0 {
                return;
            }
        }
        // SAFETY: writes exactly the owned allocation.
        unsafe { std::ptr::write_bytes(self.ptr, 0, self.size) };
    }
}

impl Drop for DramBuffer {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            // SAFETY: `ptr`/`size` describe the mapping created in `new`.
            let rc = unsafe { libc::munmap(self.ptr.cast(), self.size) };
            if rc != 0 {
                warn!(
                    size = self.size,
                    error = %io::Error::last_os_error(),
                    "memory: munmap failed"
                );
            }
        }

        #[cfg(not(unix))]
        // SAFETY: reconstitutes the boxed slice leaked in `new`.
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.ptr, self.size)));
        }
    }
}
