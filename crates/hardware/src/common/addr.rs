//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Address Manipulation:** Helpers for page offsets, page bases and Sv39 VPN slices.
//! 3. **MMU Integration:** Acts as the primary interface for memory translation operations.

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT, VPN_BITS, VPN_SLICE_MASK};

/// A virtual address in the RISC-V address space.
///
/// Virtual addresses are used by software and must be translated to physical addresses
/// through the MMU before reaching the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the RISC-V address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the byte offset within the 4 KiB page.
    pub const fn page_offset(&self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }

    /// Returns the full virtual page number (address without the page offset).
    pub const fn page_number(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Extracts the 9-bit VPN slice used to index the page table at `level`.
    ///
    /// # Arguments
    ///
    /// * `level` - Page-table level (2 is the root for Sv39, 0 the last level).
    ///
    /// # Returns
    ///
    /// The index (0-511) into the table at that level.
    pub const fn vpn(&self, level: u32) -> u64 {
        (self.0 >> (PAGE_SHIFT as u32 + VPN_BITS * level)) & VPN_SLICE_MASK
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }
}
