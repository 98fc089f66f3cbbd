//! Memory Access Helpers.
//!
//! This module provides the interface between the hart and the memory subsystem.
//! It performs the following:
//! 1. **Address Translation:** Interfaces with the MMU to convert virtual to physical
//!    addresses, honouring `mstatus.MPRV` for data accesses.
//! 2. **Bus Access:** Routes every load, store and fetch through the bus so device
//!    registers aliasing the address space are never bypassed.
//! 3. **Fault Mapping:** Bus errors become access faults carrying the virtual address.
//! 4. **Reservation Tracking:** Stores by this hart that overlap the LR reservation
//!    invalidate it.
//! 5. **Inspection:** [`Cpu::peek_instruction`] reads RAM without touching the TLB,
//!    the page tables or any device.

use super::Cpu;
use crate::common::{AccessType, BusError, Trap, VirtAddr};
use crate::core::arch::csr::{MSTATUS, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::units::mmu::PhysMemory;
use crate::soc::memory::Memory;

/// Size of the reservation granule in bytes.
const RESERVATION_GRANULE: u64 = 8;

impl Cpu {
    /// Privilege used to translate an access.
    ///
    /// With `MPRV` set in machine mode, loads and stores use the `MPP` privilege.
    fn effective_privilege(&self, access: AccessType) -> PrivilegeMode {
        let status = self.csrs.get(MSTATUS);
        if access != AccessType::Fetch
            && self.privilege == PrivilegeMode::Machine
            && status & MSTATUS_MPRV != 0
        {
            PrivilegeMode::from_bits((status & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT)
        } else {
            self.privilege
        }
    }

    /// Translates a virtual address to a physical address using the MMU.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - The virtual address to translate.
    /// * `access` - The type of memory access (Fetch/Read/Write).
    ///
    /// # Returns
    ///
    /// The physical address, or the page fault raised by the walk.
    pub fn translate(&mut self, vaddr: u64, access: AccessType) -> Result<u64, Trap> {
        let privilege = self.effective_privilege(access);
        self.mmu
            .translate(
                VirtAddr::new(vaddr),
                access,
                privilege,
                &self.csrs,
                &mut self.bus,
            )
            .map(|p| p.val())
    }

    /// Fetches the instruction word at `pc` through the fast path.
    pub fn fetch(&mut self, pc: u64) -> Result<u32, Trap> {
        let paddr = self.translate(pc, AccessType::Fetch)?;
        self.bus
            .fetch_u32(paddr)
            .map_err(|_| Trap::InstructionAccessFault(pc))
    }

    /// Returns the word at `pc` without raising a trap, for halt checks and tracing.
    ///
    /// Only RAM is read. The TLB, its counters and the accessed bits of the page
    /// tables are left as they were, and a pc in a device window yields `None`.
    pub fn peek_instruction(&self, pc: u64) -> Option<u32> {
        let ram = self.bus.ram();
        let paddr = self.mmu.peek(
            VirtAddr::new(pc),
            AccessType::Fetch,
            self.effective_privilege(AccessType::Fetch),
            &self.csrs,
            &mut RamView(ram),
        )?;
        ram.read_u32(paddr.val())
    }

    /// Loads `size` bytes from a virtual address, zero-extended.
    pub fn load(&mut self, vaddr: u64, size: usize) -> Result<u64, Trap> {
        let paddr = self.translate(vaddr, AccessType::Read)?;
        self.load_phys(vaddr, paddr, size)
    }

    /// Stores the low `size` bytes of `val` at a virtual address.
    pub fn store(&mut self, vaddr: u64, val: u64, size: usize) -> Result<(), Trap> {
        let paddr = self.translate(vaddr, AccessType::Write)?;
        self.store_phys(vaddr, paddr, val, size)
    }

    /// Loads from an already translated address; `vaddr` is reported on faults.
    pub(crate) fn load_phys(&mut self, vaddr: u64, paddr: u64, size: usize) -> Result<u64, Trap> {
        self.bus
            .read(paddr, size)
            .map_err(|_| Trap::LoadAccessFault(vaddr))
    }

    /// Stores to an already translated address and drops an overlapping reservation.
    pub(crate) fn store_phys(
        &mut self,
        vaddr: u64,
        paddr: u64,
        val: u64,
        size: usize,
    ) -> Result<(), Trap> {
        self.bus
            .write(paddr, val, size)
            .map_err(|_| Trap::StoreAccessFault(vaddr))?;
        if let Some(reserved) = self.reservation {
            let end = paddr.wrapping_add(size as u64);
            if paddr < reserved + RESERVATION_GRANULE && reserved < end {
                self.reservation = None;
            }
        }
        Ok(())
    }
}

/// Page-table reads from RAM alone, with write-back discarded.
struct RamView<'a>(&'a Memory);

impl PhysMemory for RamView<'_> {
    fn read_u64(&mut self, paddr: u64) -> Result<u64, BusError> {
        self.0.read(paddr, 8).ok_or(BusError::Unmapped { addr: paddr })
    }

    fn write_u64(&mut self, _paddr: u64, _val: u64) -> Result<(), BusError> {
        Ok(())
    }
}
