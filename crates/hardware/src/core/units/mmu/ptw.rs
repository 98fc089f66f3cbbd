//! Hardware Page Table Walker (PTW) for RISC-V Sv39.
//!
//! Traverses the three-level page table rooted at `satp.PPN`, consuming 9 bits of
//! the virtual page number per level. Every entry on the path must be valid; the
//! leaf must grant the permission the access needs. Superpage leaves must be
//! aligned. The accessed bit, and the dirty bit for stores, are written back to
//! the in-memory PTE.

use crate::common::{AccessType, PAGE_SHIFT, PhysAddr, Trap, VirtAddr};
use crate::core::arch::csr::{CsrFile, MSTATUS, MSTATUS_MXR, MSTATUS_SUM, SATP_PPN_MASK};
use crate::core::arch::mode::PrivilegeMode;

use super::PhysMemory;
use super::tlb::PtePerms;

/// Page Table Entry valid bit (bit 0).
pub const PTE_V: u64 = 1;
/// Page Table Entry read permission bit (bit 1).
pub const PTE_R: u64 = 1 << 1;
/// Page Table Entry write permission bit (bit 2).
pub const PTE_W: u64 = 1 << 2;
/// Page Table Entry execute permission bit (bit 3).
pub const PTE_X: u64 = 1 << 3;
/// Page Table Entry user mode access bit (bit 4).
pub const PTE_U: u64 = 1 << 4;
/// Page Table Entry global mapping bit (bit 5).
pub const PTE_G: u64 = 1 << 5;
/// Page Table Entry accessed bit (bit 6).
pub const PTE_A: u64 = 1 << 6;
/// Page Table Entry dirty bit (bit 7).
pub const PTE_D: u64 = 1 << 7;
/// Bit shift of the Physical Page Number in a PTE.
pub const PTE_PPN_SHIFT: u64 = 10;

/// Number of page table levels in Sv39.
const SV39_LEVELS: u32 = 3;
/// Size of a page table entry in bytes.
const PTE_SIZE: u64 = 8;

/// A strongly-typed wrapper around a raw 64-bit Sv39 Page Table Entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTableEntry(pub u64);

impl PageTableEntry {
    /// Returns true if the Valid (V) bit is set.
    pub const fn is_valid(self) -> bool {
        self.0 & PTE_V != 0
    }

    /// Returns true if the Read (R) bit is set.
    pub const fn can_read(self) -> bool {
        self.0 & PTE_R != 0
    }

    /// Returns true if the Write (W) bit is set.
    pub const fn can_write(self) -> bool {
        self.0 & PTE_W != 0
    }

    /// Returns true if the Execute (X) bit is set.
    pub const fn can_exec(self) -> bool {
        self.0 & PTE_X != 0
    }

    /// Returns true if the User (U) bit is set.
    pub const fn is_user(self) -> bool {
        self.0 & PTE_U != 0
    }

    /// Extracts the Physical Page Number.
    pub const fn ppn(self) -> u64 {
        (self.0 >> PTE_PPN_SHIFT) & SATP_PPN_MASK
    }

    /// An entry with R=W=X=0 points at the next level.
    pub const fn is_pointer(self) -> bool {
        self.0 & (PTE_R | PTE_W | PTE_X) == 0
    }

    /// W without R is a reserved combination.
    pub const fn is_reserved(self) -> bool {
        self.can_write() && !self.can_read()
    }

    /// Returns the cached form of the leaf permissions.
    pub const fn perms(self) -> PtePerms {
        PtePerms {
            r: self.can_read(),
            w: self.can_write(),
            x: self.can_exec(),
            u: self.is_user(),
            d: self.0 & PTE_D != 0,
            g: self.0 & PTE_G != 0,
        }
    }
}

/// Outcome of a successful walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Walk {
    /// Translated physical address.
    pub paddr: PhysAddr,
    /// Leaf permissions after any accessed/dirty update.
    pub perms: PtePerms,
}

/// Performs an Sv39 page table walk.
///
/// # Arguments
///
/// * `vaddr` - The virtual address to translate.
/// * `access` - The type of memory access.
/// * `privilege` - The effective privilege of the access.
/// * `csrs` - CSR file (for `satp`, `SUM` and `MXR`).
/// * `mem` - Physical memory holding the page tables.
///
/// # Returns
///
/// The translation, a page fault when a check fails, or an access fault when a PTE
/// cannot be read.
pub fn page_table_walk<M: PhysMemory + ?Sized>(
    vaddr: VirtAddr,
    access: AccessType,
    privilege: PrivilegeMode,
    csrs: &CsrFile,
    mem: &mut M,
) -> Result<Walk, Trap> {
    let fault = || access.page_fault(vaddr.val());
    let mut table = csrs.satp_ppn() << PAGE_SHIFT;

    for level in (0..SV39_LEVELS).rev() {
        let pte_addr = table + vaddr.vpn(level) * PTE_SIZE;
        let pte = PageTableEntry(
            mem.read_u64(pte_addr)
                .map_err(|e| access.access_fault(e.addr()))?,
        );

        if !pte.is_valid() || pte.is_reserved() {
            return Err(fault());
        }

        if pte.is_pointer() {
            table = pte.ppn() << PAGE_SHIFT;
            continue;
        }

        let span_bits = 9 * u64::from(level);
        if pte.ppn() & ((1 << span_bits) - 1) != 0 {
            return Err(fault());
        }

        if !permitted(pte, access, privilege, csrs) {
            return Err(fault());
        }

        let mut updated = pte.0 | PTE_A;
        if access == AccessType::Write {
            updated |= PTE_D;
        }
        if updated != pte.0 {
            mem.write_u64(pte_addr, updated)
                .map_err(|e| access.access_fault(e.addr()))?;
        }

        let offset_mask = (1u64 << (PAGE_SHIFT + span_bits)) - 1;
        let paddr = (pte.ppn() << PAGE_SHIFT) | (vaddr.val() & offset_mask);
        return Ok(Walk {
            paddr: PhysAddr::new(paddr),
            perms: PageTableEntry(updated).perms(),
        });
    }

    Err(fault())
}

/// Checks a leaf's permissions for an access.
///
/// Used for both fresh walks and TLB hits.
pub fn permitted(
    leaf: PageTableEntry,
    access: AccessType,
    privilege: PrivilegeMode,
    csrs: &CsrFile,
) -> bool {
    perms_allow(leaf.perms(), access, privilege, csrs)
}

/// Checks cached permissions for an access.
pub fn perms_allow(
    perms: PtePerms,
    access: AccessType,
    privilege: PrivilegeMode,
    csrs: &CsrFile,
) -> bool {
    let mstatus = csrs.get(MSTATUS);
    let allowed = match access {
        AccessType::Fetch => perms.x,
        AccessType::Read => perms.r || (perms.x && mstatus & MSTATUS_MXR != 0),
        AccessType::Write => perms.w,
    };
    if !allowed {
        return false;
    }
    match privilege {
        PrivilegeMode::User => perms.u,
        PrivilegeMode::Supervisor if perms.u => {
            access != AccessType::Fetch && mstatus & MSTATUS_SUM != 0
        }
        _ => true,
    }
}
