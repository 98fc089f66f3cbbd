//! Control and Status Register (CSR) file.
//!
//! This module implements the CSR namespace of the hart. It provides:
//! 1. **Address Definitions:** Constants for the user, supervisor and machine CSRs.
//! 2. **Field Masks:** Bitmasks and shifts for status, interrupt, ISA and translation fields.
//! 3. **Register Storage:** A flat 4096-slot array indexed by the 12-bit CSR address.
//! 4. **Access Logic:** Reads and writes that apply read-only rules, WARL legalization and
//!    the restricted supervisor/user views of the machine registers.
//!
//! Addresses that are not implemented read as 0 and ignore writes.

use serde::Serialize;

/// Number of addressable CSRs (12-bit address space).
pub const CSR_COUNT: usize = 4096;

/// User status register (view of `mstatus`).
pub const USTATUS: u16 = 0x000;
/// Floating-point accrued exceptions (view of `fcsr`).
pub const FFLAGS: u16 = 0x001;
/// Floating-point dynamic rounding mode (view of `fcsr`).
pub const FRM: u16 = 0x002;
/// Floating-point control and status register.
pub const FCSR: u16 = 0x003;
/// User interrupt enable register (view of `mie`).
pub const UIE: u16 = 0x004;
/// User trap vector base address.
pub const UTVEC: u16 = 0x005;
/// User scratch register.
pub const USCRATCH: u16 = 0x040;
/// User exception program counter.
pub const UEPC: u16 = 0x041;
/// User trap cause.
pub const UCAUSE: u16 = 0x042;
/// User trap value.
pub const UTVAL: u16 = 0x043;
/// User interrupt pending register (view of `mip`).
pub const UIP: u16 = 0x044;

/// Supervisor status register (view of `mstatus`).
pub const SSTATUS: u16 = 0x100;
/// Supervisor interrupt enable register (view of `mie`).
pub const SIE: u16 = 0x104;
/// Supervisor trap vector base address.
pub const STVEC: u16 = 0x105;
/// Supervisor counter enable.
pub const SCOUNTEREN: u16 = 0x106;
/// Supervisor scratch register.
pub const SSCRATCH: u16 = 0x140;
/// Supervisor exception program counter.
pub const SEPC: u16 = 0x141;
/// Supervisor trap cause.
pub const SCAUSE: u16 = 0x142;
/// Supervisor trap value.
pub const STVAL: u16 = 0x143;
/// Supervisor interrupt pending register (view of `mip`).
pub const SIP: u16 = 0x144;
/// Supervisor address translation and protection.
pub const SATP: u16 = 0x180;

/// Machine status register.
pub const MSTATUS: u16 = 0x300;
/// Machine ISA register.
pub const MISA: u16 = 0x301;
/// Machine exception delegation register.
pub const MEDELEG: u16 = 0x302;
/// Machine interrupt delegation register.
pub const MIDELEG: u16 = 0x303;
/// Machine interrupt enable register.
pub const MIE: u16 = 0x304;
/// Machine trap vector base address.
pub const MTVEC: u16 = 0x305;
/// Machine counter enable.
pub const MCOUNTEREN: u16 = 0x306;
/// Machine scratch register.
pub const MSCRATCH: u16 = 0x340;
/// Machine exception program counter.
pub const MEPC: u16 = 0x341;
/// Machine trap cause.
pub const MCAUSE: u16 = 0x342;
/// Machine trap value.
pub const MTVAL: u16 = 0x343;
/// Machine interrupt pending register.
pub const MIP: u16 = 0x344;

/// Machine cycle counter.
pub const MCYCLE: u16 = 0xB00;
/// Machine instructions-retired counter.
pub const MINSTRET: u16 = 0xB02;
/// Cycle counter (read-only shadow of `mcycle`).
pub const CYCLE: u16 = 0xC00;
/// Real-time counter (read-only, backed by the CLINT `mtime`).
pub const TIME: u16 = 0xC01;
/// Instructions-retired counter (read-only shadow of `minstret`).
pub const INSTRET: u16 = 0xC02;

/// Machine vendor ID.
pub const MVENDORID: u16 = 0xF11;
/// Machine architecture ID.
pub const MARCHID: u16 = 0xF12;
/// Machine implementation ID.
pub const MIMPID: u16 = 0xF13;
/// Machine hardware thread ID.
pub const MHARTID: u16 = 0xF14;

/// User interrupt enable bit in `mstatus`.
pub const MSTATUS_UIE: u64 = 1 << 0;
/// Supervisor interrupt enable bit in `mstatus`.
pub const MSTATUS_SIE: u64 = 1 << 1;
/// Machine interrupt enable bit in `mstatus`.
pub const MSTATUS_MIE: u64 = 1 << 3;
/// User previous interrupt enable bit in `mstatus`.
pub const MSTATUS_UPIE: u64 = 1 << 4;
/// Supervisor previous interrupt enable bit in `mstatus`.
pub const MSTATUS_SPIE: u64 = 1 << 5;
/// Machine previous interrupt enable bit in `mstatus`.
pub const MSTATUS_MPIE: u64 = 1 << 7;
/// Supervisor previous privilege bit in `mstatus`.
pub const MSTATUS_SPP: u64 = 1 << 8;
/// Machine previous privilege field mask in `mstatus`.
pub const MSTATUS_MPP: u64 = 3 << 11;
/// Bit shift of the machine previous privilege field.
pub const MSTATUS_MPP_SHIFT: u64 = 11;
/// Floating-point state field mask in `mstatus`.
pub const MSTATUS_FS: u64 = 3 << 13;
/// Floating-point state: initial.
pub const MSTATUS_FS_INIT: u64 = 1 << 13;
/// Floating-point state: dirty.
pub const MSTATUS_FS_DIRTY: u64 = 3 << 13;
/// Modify privilege bit in `mstatus`.
pub const MSTATUS_MPRV: u64 = 1 << 17;
/// Supervisor user memory access bit in `mstatus`.
pub const MSTATUS_SUM: u64 = 1 << 18;
/// Make executable readable bit in `mstatus`.
pub const MSTATUS_MXR: u64 = 1 << 19;
/// State dirty summary bit in `mstatus`.
pub const MSTATUS_SD: u64 = 1 << 63;
/// Reset value of `mstatus` for RV64 (UXL = SXL = 64-bit).
pub const MSTATUS_DEFAULT_RV64: u64 = 0xA_0000_0000;

/// Software-writable bits of `mstatus`.
const MSTATUS_WRITE_MASK: u64 = MSTATUS_UIE
    | MSTATUS_SIE
    | MSTATUS_MIE
    | MSTATUS_UPIE
    | MSTATUS_SPIE
    | MSTATUS_MPIE
    | MSTATUS_SPP
    | MSTATUS_MPP
    | MSTATUS_FS
    | MSTATUS_MPRV
    | MSTATUS_SUM
    | MSTATUS_MXR;

/// Bits of `mstatus` visible through `sstatus`.
pub const SSTATUS_MASK: u64 = MSTATUS_UIE
    | MSTATUS_SIE
    | MSTATUS_UPIE
    | MSTATUS_SPIE
    | MSTATUS_SPP
    | MSTATUS_FS
    | MSTATUS_SUM
    | MSTATUS_MXR
    | MSTATUS_SD
    | (3 << 32);

/// Bits of `mstatus` visible through `ustatus`.
pub const USTATUS_MASK: u64 = MSTATUS_UIE | MSTATUS_UPIE;

/// Supervisor software interrupt bit in `mip`/`mie`.
pub const MIP_SSIP: u64 = 1 << 1;
/// Machine software interrupt bit in `mip`/`mie`.
pub const MIP_MSIP: u64 = 1 << 3;
/// Supervisor timer interrupt bit in `mip`/`mie`.
pub const MIP_STIP: u64 = 1 << 5;
/// Machine timer interrupt bit in `mip`/`mie`.
pub const MIP_MTIP: u64 = 1 << 7;
/// Supervisor external interrupt bit in `mip`/`mie`.
pub const MIP_SEIP: u64 = 1 << 9;
/// Machine external interrupt bit in `mip`/`mie`.
pub const MIP_MEIP: u64 = 1 << 11;

/// Machine software interrupt enable bit in `mie`.
pub const MIE_MSIE: u64 = MIP_MSIP;
/// Machine timer interrupt enable bit in `mie`.
pub const MIE_MTIE: u64 = MIP_MTIP;
/// Machine external interrupt enable bit in `mie`.
pub const MIE_MEIE: u64 = MIP_MEIP;

/// Interrupt bits implemented in `mie`.
const MIE_WRITE_MASK: u64 = MIP_SSIP | MIP_MSIP | MIP_STIP | MIP_MTIP | MIP_SEIP | MIP_MEIP;
/// Bits of `mip` software may write; the machine-level bits mirror the devices.
const MIP_WRITE_MASK: u64 = MIP_SSIP | MIP_STIP | MIP_SEIP;
/// Bits of `mie`/`mip` visible through `sie`/`sip`.
pub const SIP_MASK: u64 = MIP_SSIP | MIP_STIP | MIP_SEIP;

/// Bit shift of the translation mode field in `satp`.
pub const SATP_MODE_SHIFT: u64 = 60;
/// Bare (no translation) mode value of `satp`.
pub const SATP_MODE_BARE: u64 = 0;
/// Sv39 mode value of `satp`.
pub const SATP_MODE_SV39: u64 = 8;
/// Bit mask of the translation mode field (after shifting).
pub const SATP_MODE_MASK: u64 = 0xF;
/// Bit shift of the address-space identifier in `satp`.
pub const SATP_ASID_SHIFT: u64 = 44;
/// Bit mask of the address-space identifier (after shifting).
pub const SATP_ASID_MASK: u64 = 0xFFFF;
/// Physical page number mask in `satp`.
pub const SATP_PPN_MASK: u64 = 0xFFF_FFFF_FFFF;

/// Vectored trap mode in the low bits of `mtvec`/`stvec`/`utvec`.
pub const TVEC_MODE_VECTORED: u64 = 1;
/// Mask of the mode bits in a trap-vector register.
pub const TVEC_MODE_MASK: u64 = 0b11;

/// Accrued exception flag: inexact.
pub const FFLAGS_NX: u64 = 1 << 0;
/// Accrued exception flag: underflow.
pub const FFLAGS_UF: u64 = 1 << 1;
/// Accrued exception flag: overflow.
pub const FFLAGS_OF: u64 = 1 << 2;
/// Accrued exception flag: divide by zero.
pub const FFLAGS_DZ: u64 = 1 << 3;
/// Accrued exception flag: invalid operation.
pub const FFLAGS_NV: u64 = 1 << 4;
/// Mask of the accrued-exception field in `fcsr`.
pub const FFLAGS_MASK: u64 = 0x1F;
/// Bit shift of the rounding-mode field in `fcsr`.
pub const FRM_SHIFT: u64 = 5;
/// Mask of the rounding-mode field (after shifting).
pub const FRM_MASK: u64 = 0x7;

/// MISA extension bit: atomics.
pub const MISA_EXT_A: u64 = 1 << 0;
/// MISA extension bit: single-precision float.
pub const MISA_EXT_F: u64 = 1 << 5;
/// MISA extension bit: base integer.
pub const MISA_EXT_I: u64 = 1 << 8;
/// MISA extension bit: multiply/divide.
pub const MISA_EXT_M: u64 = 1 << 12;
/// MISA extension bit: supervisor mode.
pub const MISA_EXT_S: u64 = 1 << 18;
/// MISA extension bit: user mode.
pub const MISA_EXT_U: u64 = 1 << 20;
/// MISA MXL field value for a 64-bit hart.
pub const MISA_XLEN_64: u64 = 2 << 62;
/// Value of `misa` for this hart (RV64IMAFSU).
pub const MISA_RV64IMAFSU: u64 =
    MISA_XLEN_64 | MISA_EXT_A | MISA_EXT_F | MISA_EXT_I | MISA_EXT_M | MISA_EXT_S | MISA_EXT_U;

/// The CSRs backed by storage in this hart.
const IMPLEMENTED: &[u16] = &[
    USTATUS, FFLAGS, FRM, FCSR, UIE, UTVEC, USCRATCH, UEPC, UCAUSE, UTVAL, UIP, SSTATUS, SIE,
    STVEC, SCOUNTEREN, SSCRATCH, SEPC, SCAUSE, STVAL, SIP, SATP, MSTATUS, MISA, MEDELEG, MIDELEG,
    MIE, MTVEC, MCOUNTEREN, MSCRATCH, MEPC, MCAUSE, MTVAL, MIP, MCYCLE, MINSTRET, CYCLE, TIME,
    INSTRET, MVENDORID, MARCHID, MIMPID, MHARTID,
];

/// Control and Status Register file.
///
/// A flat array of 4096 slots. The supervisor and user status, enable and pending
/// registers have no storage of their own: they read and write masked bits of the
/// machine registers.
#[derive(Clone, Debug)]
pub struct CsrFile {
    regs: Box<[u64]>,
}

impl CsrFile {
    /// Creates a CSR file in its reset state for the given hart.
    ///
    /// # Arguments
    ///
    /// * `hart_id` - Value reported by `mhartid`.
    pub fn new(hart_id: u64) -> Self {
        let mut csrs = Self {
            regs: vec![0; CSR_COUNT].into_boxed_slice(),
        };
        csrs.set(MSTATUS, MSTATUS_DEFAULT_RV64 | MSTATUS_FS_INIT);
        csrs.set(MISA, MISA_RV64IMAFSU);
        csrs.set(MHARTID, hart_id);
        csrs
    }

    /// Returns true if `addr` is backed by storage.
    pub fn is_implemented(addr: u16) -> bool {
        IMPLEMENTED.contains(&addr)
    }

    /// Returns true if `addr` lies in the read-only region (top two bits set).
    pub const fn is_read_only(addr: u16) -> bool {
        (addr >> 10) & 0b11 == 0b11
    }

    /// Returns the lowest privilege level (2-bit encoding) allowed to access `addr`.
    pub const fn min_privilege(addr: u16) -> u64 {
        ((addr >> 8) & 0b11) as u64
    }

    /// Reads a slot directly, bypassing views and masks.
    #[inline(always)]
    pub fn get(&self, addr: u16) -> u64 {
        self.regs.get(addr as usize).copied().unwrap_or(0)
    }

    /// Writes a slot directly, bypassing views and masks.
    ///
    /// Used by the hart for hardware-owned state such as `mcause` on trap entry or
    /// the machine-level `mip` bits.
    #[inline(always)]
    pub fn set(&mut self, addr: u16, val: u64) {
        if let Some(slot) = self.regs.get_mut(addr as usize) {
            *slot = val;
        }
    }

    /// Sets or clears `mask` in a slot.
    pub fn set_bits(&mut self, addr: u16, mask: u64, on: bool) {
        let val = self.get(addr);
        self.set(addr, if on { val | mask } else { val & !mask });
    }

    /// Reads a CSR as software observes it.
    ///
    /// `time` is not handled here since it is backed by the CLINT counter.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 12-bit CSR address.
    ///
    /// # Returns
    ///
    /// The CSR value, or 0 for unimplemented addresses.
    pub fn read(&self, addr: u16) -> u64 {
        if !Self::is_implemented(addr) {
            return 0;
        }
        match addr {
            SSTATUS => self.status_with_sd() & SSTATUS_MASK,
            USTATUS => self.get(MSTATUS) & USTATUS_MASK,
            MSTATUS => self.status_with_sd(),
            SIE => self.get(MIE) & SIP_MASK,
            SIP => self.get(MIP) & SIP_MASK,
            UIE | UIP => 0,
            FFLAGS => self.get(FCSR) & FFLAGS_MASK,
            FRM => (self.get(FCSR) >> FRM_SHIFT) & FRM_MASK,
            CYCLE => self.get(MCYCLE),
            INSTRET => self.get(MINSTRET),
            _ => self.get(addr),
        }
    }

    /// Writes a CSR as software would, applying masks and WARL legalization.
    ///
    /// Writes to unimplemented or read-only addresses are ignored; privilege and
    /// read-only checks that raise traps are done by the caller.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 12-bit CSR address.
    /// * `val` - The 64-bit value to write.
    pub fn write(&mut self, addr: u16, val: u64) {
        if !Self::is_implemented(addr) || Self::is_read_only(addr) {
            return;
        }
        match addr {
            MSTATUS => self.write_masked(MSTATUS, legalize_mpp(val), MSTATUS_WRITE_MASK),
            SSTATUS => self.write_masked(MSTATUS, val, SSTATUS_MASK & MSTATUS_WRITE_MASK),
            USTATUS => self.write_masked(MSTATUS, val, USTATUS_MASK),
            MIE => self.write_masked(MIE, val, MIE_WRITE_MASK),
            SIE => self.write_masked(MIE, val, SIP_MASK),
            MIP => self.write_masked(MIP, val, MIP_WRITE_MASK),
            SIP => self.write_masked(MIP, val, MIP_SSIP),
            UIE | UIP => {}
            MISA => {}
            MTVEC | STVEC | UTVEC => self.set(addr, val & !0b10),
            MEPC | SEPC | UEPC => self.set(addr, val & !0b11),
            SATP => {
                let mode = (val >> SATP_MODE_SHIFT) & SATP_MODE_MASK;
                if mode == SATP_MODE_BARE || mode == SATP_MODE_SV39 {
                    self.set(SATP, val);
                }
            }
            FFLAGS => self.write_masked(FCSR, val, FFLAGS_MASK),
            FRM => self.write_masked(FCSR, (val & FRM_MASK) << FRM_SHIFT, FRM_MASK << FRM_SHIFT),
            FCSR => self.set(FCSR, val & ((FRM_MASK << FRM_SHIFT) | FFLAGS_MASK)),
            _ => self.set(addr, val),
        }
    }

    fn write_masked(&mut self, addr: u16, val: u64, mask: u64) {
        let old = self.get(addr);
        self.set(addr, (old & !mask) | (val & mask));
    }

    fn status_with_sd(&self) -> u64 {
        let status = self.get(MSTATUS);
        if status & MSTATUS_FS == MSTATUS_FS_DIRTY {
            status | MSTATUS_SD
        } else {
            status & !MSTATUS_SD
        }
    }

    /// Returns the translation mode field of `satp`.
    pub fn satp_mode(&self) -> u64 {
        (self.get(SATP) >> SATP_MODE_SHIFT) & SATP_MODE_MASK
    }

    /// Returns the address-space identifier of `satp`.
    pub fn satp_asid(&self) -> u16 {
        ((self.get(SATP) >> SATP_ASID_SHIFT) & SATP_ASID_MASK) as u16
    }

    /// Returns the root page-table physical page number of `satp`.
    pub fn satp_ppn(&self) -> u64 {
        self.get(SATP) & SATP_PPN_MASK
    }

    /// ORs `flags` into the accrued floating-point exceptions and marks FS dirty.
    pub fn accrue_fflags(&mut self, flags: u64) {
        let fcsr = self.get(FCSR);
        self.set(FCSR, fcsr | (flags & FFLAGS_MASK));
        self.set_bits(MSTATUS, MSTATUS_FS_DIRTY, true);
    }

    /// Returns the current values of the CSRs shown in snapshots.
    pub fn summary(&self) -> CsrSummary {
        CsrSummary {
            mstatus: self.read(MSTATUS),
            misa: self.get(MISA),
            mie: self.get(MIE),
            mip: self.get(MIP),
            mtvec: self.get(MTVEC),
            mscratch: self.get(MSCRATCH),
            mepc: self.get(MEPC),
            mcause: self.get(MCAUSE),
            mtval: self.get(MTVAL),
            sepc: self.get(SEPC),
            scause: self.get(SCAUSE),
            satp: self.get(SATP),
            mcycle: self.get(MCYCLE),
            minstret: self.get(MINSTRET),
        }
    }
}

/// Replaces the reserved `MPP` encoding 2 with User.
const fn legalize_mpp(val: u64) -> u64 {
    if (val & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT == 2 {
        val & !MSTATUS_MPP
    } else {
        val
    }
}

/// The subset of CSRs exposed in a hart snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CsrSummary {
    /// Machine status.
    pub mstatus: u64,
    /// Machine ISA.
    pub misa: u64,
    /// Machine interrupt enable.
    pub mie: u64,
    /// Machine interrupt pending.
    pub mip: u64,
    /// Machine trap vector.
    pub mtvec: u64,
    /// Machine scratch.
    pub mscratch: u64,
    /// Machine exception pc.
    pub mepc: u64,
    /// Machine trap cause.
    pub mcause: u64,
    /// Machine trap value.
    pub mtval: u64,
    /// Supervisor exception pc.
    pub sepc: u64,
    /// Supervisor trap cause.
    pub scause: u64,
    /// Address translation and protection.
    pub satp: u64,
    /// Cycle counter.
    pub mcycle: u64,
    /// Instructions retired.
    pub minstret: u64,
}
