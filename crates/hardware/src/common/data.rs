//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the emulator.
//! These types are used for the following:
//! 1. **Permission Validation:** Checking Read/Write/Execute (RWX) permissions in the MMU.
//! 2. **Fault Generation:** Determining the correct page fault or access fault trap type.

use super::error::Trap;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch access. Requires Execute (X) permission.
    Fetch,

    /// Data read access. Requires Read (R) permission.
    Read,

    /// Data write access, including AMOs and store-conditional.
    /// Requires Write (W) permission.
    Write,
}

impl AccessType {
    /// Builds the page-fault trap matching this access kind.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - The faulting virtual address.
    pub const fn page_fault(self, vaddr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionPageFault(vaddr),
            Self::Read => Trap::LoadPageFault(vaddr),
            Self::Write => Trap::StorePageFault(vaddr),
        }
    }

    /// Builds the access-fault trap matching this access kind.
    ///
    /// # Arguments
    ///
    /// * `addr` - The faulting address.
    pub const fn access_fault(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionAccessFault(addr),
            Self::Read => Trap::LoadAccessFault(addr),
            Self::Write => Trap::StoreAccessFault(addr),
        }
    }
}
