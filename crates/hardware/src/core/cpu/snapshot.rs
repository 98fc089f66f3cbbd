//! Read-only hart snapshots.
//!
//! A snapshot copies everything a presentation layer renders: registers, pc,
//! privilege, the nesting guard, a CSR subset and the device register blocks.
//! It is plain data and serializes with serde.

use serde::Serialize;

use super::Cpu;
use crate::core::arch::csr::CsrSummary;
use crate::core::arch::mode::PrivilegeMode;
use crate::soc::DeviceSnapshot;

/// Serializable copy of one hart's visible state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HartSnapshot {
    /// Hart index.
    pub hart_id: usize,
    /// Program counter.
    pub pc: u64,
    /// Current privilege mode.
    pub privilege: PrivilegeMode,
    /// Priority of the interrupt being serviced (0 = none).
    pub priority_guard: u8,
    /// True while suspended in `WFI`.
    pub waiting: bool,
    /// Physical address held by LR, if any.
    pub reservation: Option<u64>,
    /// Integer registers.
    pub gpr: [u64; 32],
    /// Floating-point registers, raw storage.
    pub fpr: [u64; 32],
    /// Selected CSRs.
    pub csrs: CsrSummary,
    /// Device register blocks.
    pub devices: DeviceSnapshot,
}

impl Cpu {
    /// Captures the hart and device state.
    pub fn snapshot(&self) -> HartSnapshot {
        HartSnapshot {
            hart_id: self.hart_id,
            pc: self.pc,
            privilege: self.privilege,
            priority_guard: self.priority_guard,
            waiting: self.waiting,
            reservation: self.reservation,
            gpr: self.regs.snapshot(),
            fpr: self.fregs.snapshot(),
            csrs: self.csrs.summary(),
            devices: self.devices.snapshot(),
        }
    }
}
