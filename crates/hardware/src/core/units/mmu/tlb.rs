//! Translation Lookaside Buffer (TLB).
//!
//! A direct-mapped cache of leaf translations. Each entry caches one 4 KiB page
//! (superpage leaves are split into the 4 KiB page actually touched) tagged with the
//! page-aligned virtual address and the address-space identifier it was walked under.
//! The slot is chosen by the virtual page number modulo the capacity, so a new
//! mapping evicts whatever occupied its slot. Entries walked from a leaf with the
//! G bit set match every ASID and survive ASID-scoped flushes.

use crate::common::constants::PAGE_SHIFT;

/// Default number of entries.
pub const DEFAULT_TLB_SIZE: usize = 16;

/// Leaf permissions cached alongside a translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PtePerms {
    /// Readable.
    pub r: bool,
    /// Writable.
    pub w: bool,
    /// Executable.
    pub x: bool,
    /// Accessible from user mode.
    pub u: bool,
    /// Dirty bit already set in the in-memory PTE.
    pub d: bool,
    /// Global mapping, visible under every ASID.
    pub g: bool,
}

/// A single TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbEntry {
    /// Page-aligned virtual address (tag).
    pub virtual_address: u64,
    /// Page-aligned physical address.
    pub physical_address: u64,
    /// Address-space identifier from `satp` at walk time.
    pub asid: u16,
    /// Entry validity flag.
    pub valid: bool,
    /// Cached leaf permissions.
    pub perms: PtePerms,
}

/// Direct-mapped Translation Lookaside Buffer.
#[derive(Clone, Debug)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
}

impl Tlb {
    /// Creates a TLB with `size` entries (at least one).
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries.
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![TlbEntry::default(); size.max(1)],
        }
    }

    /// Returns the number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the slot a virtual address maps to.
    pub fn index_of(&self, vaddr: u64) -> usize {
        ((vaddr >> PAGE_SHIFT) % self.entries.len() as u64) as usize
    }

    /// Looks up the page containing `vaddr` under `asid`.
    ///
    /// # Returns
    ///
    /// The entry if its slot holds a valid translation for exactly this page, either
    /// tagged with `asid` or global.
    #[inline]
    pub fn lookup(&self, vaddr: u64, asid: u16) -> Option<TlbEntry> {
        let page = page_base(vaddr);
        self.entries
            .get(self.index_of(vaddr))
            .filter(|e| e.valid && e.virtual_address == page && (e.perms.g || e.asid == asid))
            .copied()
    }

    /// Inserts a translation, evicting the current occupant of its slot.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Any address within the virtual page.
    /// * `paddr` - Any address within the physical page.
    /// * `asid` - Address-space identifier.
    /// * `perms` - Leaf permissions.
    pub fn insert(&mut self, vaddr: u64, paddr: u64, asid: u16, perms: PtePerms) {
        let idx = self.index_of(vaddr);
        if let Some(slot) = self.entries.get_mut(idx) {
            *slot = TlbEntry {
                virtual_address: page_base(vaddr),
                physical_address: page_base(paddr),
                asid,
                valid: true,
                perms,
            };
        }
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }

    /// Invalidates non-global entries caching the page of `vaddr` under `asid`.
    ///
    /// # Returns
    ///
    /// The number of entries invalidated.
    pub fn flush_entry(&mut self, vaddr: u64, asid: u16) -> usize {
        let page = page_base(vaddr);
        self.invalidate(|e| e.virtual_address == page && !e.perms.g && e.asid == asid)
    }

    /// Invalidates every entry caching the page of `vaddr`, global ones included.
    ///
    /// # Returns
    ///
    /// The number of entries invalidated.
    pub fn flush_page(&mut self, vaddr: u64) -> usize {
        let page = page_base(vaddr);
        self.invalidate(|e| e.virtual_address == page)
    }

    /// Invalidates every non-global entry tagged with `asid`.
    pub fn flush_asid(&mut self, asid: u16) {
        let _ = self.invalidate(|e| !e.perms.g && e.asid == asid);
    }

    fn invalidate(&mut self, matches: impl Fn(&TlbEntry) -> bool) -> usize {
        let mut flushed = 0;
        for e in self.entries.iter_mut().filter(|e| e.valid && matches(e)) {
            e.valid = false;
            flushed += 1;
        }
        flushed
    }

    /// Returns the valid entries, for inspection.
    pub fn valid_entries(&self) -> impl Iterator<Item = &TlbEntry> {
        self.entries.iter().filter(|e| e.valid)
    }
}

const fn page_base(addr: u64) -> u64 {
    addr & !((1 << PAGE_SHIFT) - 1)
}
