//! Common types shared by every part of the emulator.
//!
//! This module provides the small vocabulary the rest of the crate is written in:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Page geometry, instruction field masks, and cause bits.
//! 3. **Memory Access:** The Fetch/Read/Write classification used to pick fault variants.
//! 4. **Error Handling:** Architectural traps and host-side bus errors.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the emulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Trap definitions and bus errors.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{BusError, Trap};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a shared device, recovering the guard if another thread panicked while holding it.
///
/// Device state is only ever touched between instruction boundaries, so a poisoned lock
/// still protects a consistent register block.
#[inline]
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
