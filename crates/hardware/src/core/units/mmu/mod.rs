//! Memory Management Unit (MMU).
//!
//! Virtual-to-physical translation for the hart. It provides:
//! 1. **Mode Selection:** Machine mode and `satp` Bare run untranslated; Sv39 applies
//!    in supervisor and user mode.
//! 2. **TLB:** A direct-mapped cache checked before every walk, tagged by ASID.
//! 3. **Page Table Walker:** The three-level Sv39 walk in [`ptw`].
//! 4. **Flushes:** Whole-TLB and single-page/ASID invalidation for `SFENCE.VMA`.

/// Page table walker implementation for Sv39 virtual memory.
pub mod ptw;

/// Translation Lookaside Buffer (TLB).
pub mod tlb;

use tracing::debug;

use crate::common::{AccessType, BusError, PhysAddr, Trap, VirtAddr};
use crate::core::arch::csr::{CsrFile, SATP_MODE_SV39};
use crate::core::arch::mode::PrivilegeMode;

use self::tlb::Tlb;

/// Physical memory as seen by the page table walker.
pub trait PhysMemory {
    /// Reads a 64-bit PTE.
    fn read_u64(&mut self, paddr: u64) -> Result<u64, BusError>;

    /// Writes back a 64-bit PTE.
    fn write_u64(&mut self, paddr: u64, val: u64) -> Result<(), BusError>;
}

/// Hit/miss counters of the TLB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbStats {
    /// Lookups served from the TLB.
    pub hits: u64,
    /// Lookups that required a page table walk.
    pub misses: u64,
}

/// Memory Management Unit.
#[derive(Clone, Debug)]
pub struct Mmu {
    /// The translation cache.
    pub tlb: Tlb,
    /// Lookup counters.
    pub stats: TlbStats,
}

impl Mmu {
    /// Creates a new MMU with a TLB of `tlb_size` entries.
    pub fn new(tlb_size: usize) -> Self {
        Self {
            tlb: Tlb::new(tlb_size),
            stats: TlbStats::default(),
        }
    }

    /// Returns true if accesses at `privilege` are translated under the current `satp`.
    pub fn translation_enabled(privilege: PrivilegeMode, csrs: &CsrFile) -> bool {
        privilege != PrivilegeMode::Machine && csrs.satp_mode() == SATP_MODE_SV39
    }

    /// Translates a virtual address to a physical address.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Virtual address to translate.
    /// * `access` - Type of access (Fetch, Read, Write).
    /// * `privilege` - Current privilege mode.
    /// * `csrs` - CSR file (for `satp` and `mstatus`).
    /// * `mem` - Physical memory for page table walks.
    ///
    /// # Returns
    ///
    /// The physical address, or the page/access fault the access raises.
    pub fn translate<M: PhysMemory + ?Sized>(
        &mut self,
        vaddr: VirtAddr,
        access: AccessType,
        privilege: PrivilegeMode,
        csrs: &CsrFile,
        mem: &mut M,
    ) -> Result<PhysAddr, Trap> {
        if !Self::translation_enabled(privilege, csrs) {
            return Ok(PhysAddr::new(vaddr.val()));
        }

        let va = vaddr.val();
        if ((va as i64) << 25 >> 25) as u64 != va {
            return Err(access.page_fault(va));
        }

        let asid = csrs.satp_asid();
        if let Some(entry) = self.tlb.lookup(va, asid) {
            let needs_dirty = access == AccessType::Write && !entry.perms.d;
            if !needs_dirty {
                if !ptw::perms_allow(entry.perms, access, privilege, csrs) {
                    return Err(access.page_fault(va));
                }
                self.stats.hits += 1;
                return Ok(PhysAddr::new(entry.physical_address | vaddr.page_offset()));
            }
        }

        self.stats.misses += 1;
        let walk = ptw::page_table_walk(vaddr, access, privilege, csrs, mem)?;
        self.tlb.insert(va, walk.paddr.val(), asid, walk.perms);
        Ok(walk.paddr)
    }

    /// Translates for inspection only.
    ///
    /// Neither the TLB contents nor the counters change. A miss walks `mem`, so the
    /// caller passes a view that discards the accessed/dirty write-back.
    ///
    /// # Returns
    ///
    /// The physical address, or `None` when the access would fault.
    pub fn peek<M: PhysMemory + ?Sized>(
        &self,
        vaddr: VirtAddr,
        access: AccessType,
        privilege: PrivilegeMode,
        csrs: &CsrFile,
        mem: &mut M,
    ) -> Option<PhysAddr> {
        if !Self::translation_enabled(privilege, csrs) {
            return Some(PhysAddr::new(vaddr.val()));
        }

        let va = vaddr.val();
        if ((va as i64) << 25 >> 25) as u64 != va {
            return None;
        }

        if let Some(entry) = self.tlb.lookup(va, csrs.satp_asid()) {
            return ptw::perms_allow(entry.perms, access, privilege, csrs)
                .then(|| PhysAddr::new(entry.physical_address | vaddr.page_offset()));
        }

        ptw::page_table_walk(vaddr, access, privilege, csrs, mem)
            .ok()
            .map(|walk| walk.paddr)
    }

    /// Invalidates every cached translation.
    pub fn flush_tlb(&mut self) {
        debug!("tlb: flush all");
        self.tlb.flush();
    }

    /// Invalidates cached translations matching both `vaddr`'s page and `asid`.
    pub fn flush_tlb_entry(&mut self, vaddr: u64, asid: u16) {
        let flushed = self.tlb.flush_entry(vaddr, asid);
        debug!(vaddr = format_args!("{vaddr:#x}"), asid, flushed, "tlb: flush entry");
    }

    /// Applies `SFENCE.VMA` semantics for the given operands.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Page to flush, or `None` for every page.
    /// * `asid` - Address space to flush, or `None` for every address space.
    pub fn sfence_vma(&mut self, vaddr: Option<u64>, asid: Option<u16>) {
        match (vaddr, asid) {
            (None, None) => self.flush_tlb(),
            (None, Some(asid)) => self.tlb.flush_asid(asid),
            (Some(va), Some(asid)) => self.flush_tlb_entry(va, asid),
            (Some(va), None) => {
                let flushed = self.tlb.flush_page(va);
                debug!(vaddr = format_args!("{va:#x}"), flushed, "tlb: flush page");
            }
        }
    }
}
