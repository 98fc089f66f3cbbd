//! Trap and bus error definitions.
//!
//! This module defines the two kinds of failure the emulator distinguishes. It provides:
//! 1. **Trap Representation:** Every synchronous exception and asynchronous interrupt,
//!    each with a distinct `mcause` value (interrupts carry bit 63).
//! 2. **Bus Errors:** Host-side reporting for physical addresses nothing answers to,
//!    which the hart converts into access-fault traps.

use thiserror::Error;

use crate::isa::privileged::cause::{exception, interrupt};

/// RISC-V trap types representing exceptions and interrupts.
///
/// Traps transfer control to the handler in `mtvec`. Every variant maps to a unique
/// cause code, so a breakpoint (3) and a machine software interrupt (bit 63 | 3) never
/// collide, nor do a machine ECALL (11) and a machine external interrupt (bit 63 | 11).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Trap {
    /// Jump or branch target not aligned to 4 bytes. Holds the target address.
    #[error("instruction address misaligned ({0:#x})")]
    InstructionAddressMisaligned(u64),

    /// Fetch from an address nothing answers to. Holds the address.
    #[error("instruction access fault ({0:#x})")]
    InstructionAccessFault(u64),

    /// Unrecognized or unimplemented encoding. Holds the instruction bits.
    #[error("illegal instruction ({0:#010x})")]
    IllegalInstruction(u32),

    /// EBREAK. Holds the program counter.
    #[error("breakpoint ({0:#x})")]
    Breakpoint(u64),

    /// Misaligned load-reserved. Holds the address.
    #[error("load address misaligned ({0:#x})")]
    LoadAddressMisaligned(u64),

    /// Load from an unmapped address. Holds the address.
    #[error("load access fault ({0:#x})")]
    LoadAccessFault(u64),

    /// Misaligned store-conditional or AMO. Holds the address.
    #[error("store address misaligned ({0:#x})")]
    StoreAddressMisaligned(u64),

    /// Store to an unmapped address. Holds the address.
    #[error("store access fault ({0:#x})")]
    StoreAccessFault(u64),

    /// ECALL executed in user mode.
    #[error("environment call from U-mode")]
    EnvironmentCallFromUMode,

    /// ECALL executed in supervisor mode.
    #[error("environment call from S-mode")]
    EnvironmentCallFromSMode,

    /// ECALL executed in machine mode.
    #[error("environment call from M-mode")]
    EnvironmentCallFromMMode,

    /// Fetch translation failed. Holds the virtual address.
    #[error("instruction page fault ({0:#x})")]
    InstructionPageFault(u64),

    /// Load translation failed. Holds the virtual address.
    #[error("load page fault ({0:#x})")]
    LoadPageFault(u64),

    /// Store translation failed. Holds the virtual address.
    #[error("store page fault ({0:#x})")]
    StorePageFault(u64),

    /// Supervisor software interrupt.
    #[error("supervisor software interrupt")]
    SupervisorSoftwareInterrupt,

    /// Machine software interrupt (CLINT `msip`).
    #[error("machine software interrupt")]
    MachineSoftwareInterrupt,

    /// Supervisor timer interrupt.
    #[error("supervisor timer interrupt")]
    SupervisorTimerInterrupt,

    /// Machine timer interrupt (`mtime >= mtimecmp`).
    #[error("machine timer interrupt")]
    MachineTimerInterrupt,

    /// Supervisor external interrupt.
    #[error("supervisor external interrupt")]
    SupervisorExternalInterrupt,

    /// Machine external interrupt (PLIC claim).
    #[error("machine external interrupt")]
    MachineExternalInterrupt,
}

impl Trap {
    /// Returns the full value written to `mcause` for this trap.
    ///
    /// # Returns
    ///
    /// The exception code, with bit 63 set for interrupts.
    pub const fn cause(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(_) => exception::INSTRUCTION_ADDRESS_MISALIGNED,
            Self::InstructionAccessFault(_) => exception::INSTRUCTION_ACCESS_FAULT,
            Self::IllegalInstruction(_) => exception::ILLEGAL_INSTRUCTION,
            Self::Breakpoint(_) => exception::BREAKPOINT,
            Self::LoadAddressMisaligned(_) => exception::LOAD_ADDRESS_MISALIGNED,
            Self::LoadAccessFault(_) => exception::LOAD_ACCESS_FAULT,
            Self::StoreAddressMisaligned(_) => exception::STORE_ADDRESS_MISALIGNED,
            Self::StoreAccessFault(_) => exception::STORE_ACCESS_FAULT,
            Self::EnvironmentCallFromUMode => exception::ENVIRONMENT_CALL_FROM_U_MODE,
            Self::EnvironmentCallFromSMode => exception::ENVIRONMENT_CALL_FROM_S_MODE,
            Self::EnvironmentCallFromMMode => exception::ENVIRONMENT_CALL_FROM_M_MODE,
            Self::InstructionPageFault(_) => exception::INSTRUCTION_PAGE_FAULT,
            Self::LoadPageFault(_) => exception::LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => exception::STORE_PAGE_FAULT,
            Self::SupervisorSoftwareInterrupt => interrupt::SUPERVISOR_SOFTWARE,
            Self::MachineSoftwareInterrupt => interrupt::MACHINE_SOFTWARE,
            Self::SupervisorTimerInterrupt => interrupt::SUPERVISOR_TIMER,
            Self::MachineTimerInterrupt => interrupt::MACHINE_TIMER,
            Self::SupervisorExternalInterrupt => interrupt::SUPERVISOR_EXTERNAL,
            Self::MachineExternalInterrupt => interrupt::MACHINE_EXTERNAL,
        }
    }

    /// Returns the exception code with the interrupt bit stripped.
    pub const fn code(&self) -> u64 {
        self.cause() & !crate::common::constants::CAUSE_INTERRUPT_BIT
    }

    /// Returns true if this trap is an asynchronous interrupt.
    pub const fn is_interrupt(&self) -> bool {
        self.cause() & crate::common::constants::CAUSE_INTERRUPT_BIT != 0
    }

    /// Returns the value written to `mtval` for this trap.
    ///
    /// Faulting addresses for memory traps, the instruction bits for illegal
    /// instructions, the pc for breakpoints and zero otherwise.
    pub const fn tval(&self) -> u64 {
        match *self {
            Self::InstructionAddressMisaligned(addr)
            | Self::InstructionAccessFault(addr)
            | Self::Breakpoint(addr)
            | Self::LoadAddressMisaligned(addr)
            | Self::LoadAccessFault(addr)
            | Self::StoreAddressMisaligned(addr)
            | Self::StoreAccessFault(addr)
            | Self::InstructionPageFault(addr)
            | Self::LoadPageFault(addr)
            | Self::StorePageFault(addr) => addr,
            Self::IllegalInstruction(inst) => inst as u64,
            _ => 0,
        }
    }
}

/// Failure reported by the bus for a physical access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// No MMIO region claims the address and it lies outside RAM.
    #[error("no device or RAM at physical address {addr:#x}")]
    Unmapped {
        /// The physical address of the access.
        addr: u64,
    },
}

impl BusError {
    /// Returns the physical address that faulted.
    pub const fn addr(&self) -> u64 {
        match *self {
            Self::Unmapped { addr } => addr,
        }
    }
}
