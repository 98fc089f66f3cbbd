//! Interrupt Arbitration.
//!
//! This module decides, at each instruction boundary, whether an interrupt is taken.
//! It performs the following:
//! 1. **Pending Mirroring:** Copies the CLINT software/timer lines and the PLIC
//!    claimable state into the machine-level `mip` bits.
//! 2. **Arbitration:** Checks External, then Timer, then Software. A class fires only
//!    if interrupts are globally enabled, the `mie` bit is set, the source is pending
//!    and the nesting guard is below the class priority.
//! 3. **Nesting Guard:** Taking an interrupt raises the guard to its priority; a trap
//!    return resets it to 0.
//! 4. **Wake Check:** `WFI` resumes once any enabled source is pending, regardless
//!    of the global enable.

use tracing::trace;

use super::Cpu;
use crate::common::{Trap, lock};
use crate::core::arch::csr::{
    MIE, MIP, MIP_MEIP, MIP_MSIP, MIP_MTIP, MIP_SEIP, MIP_SSIP, MIP_STIP, MSTATUS, MSTATUS_MIE,
};
use crate::core::arch::mode::PrivilegeMode;

/// Interrupt classes in arbitration order, with their nesting priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum InterruptPriority {
    /// Software interrupts (CLINT `msip`, `mip.SSIP`).
    Software = 1,
    /// Timer interrupts (CLINT compare, `mip.STIP`).
    Timer = 2,
    /// External interrupts (PLIC, `mip.SEIP`).
    External = 3,
}

impl InterruptPriority {
    /// Returns the class an interrupt trap belongs to.
    pub const fn of(trap: Trap) -> Option<Self> {
        match trap {
            Trap::MachineExternalInterrupt | Trap::SupervisorExternalInterrupt => {
                Some(Self::External)
            }
            Trap::MachineTimerInterrupt | Trap::SupervisorTimerInterrupt => Some(Self::Timer),
            Trap::MachineSoftwareInterrupt | Trap::SupervisorSoftwareInterrupt => {
                Some(Self::Software)
            }
            _ => None,
        }
    }
}

impl Cpu {
    /// Mirrors the device interrupt lines into `mip`.
    pub fn sync_interrupt_pending(&mut self) {
        let (msip, mtip) = {
            let clint = lock(&self.devices.clint);
            (
                clint.software_pending(self.hart_id),
                clint.timer_pending(self.hart_id),
            )
        };
        let meip = lock(&self.devices.plic).has_pending(self.hart_id);

        self.csrs.set_bits(MIP, MIP_MSIP, msip);
        self.csrs.set_bits(MIP, MIP_MTIP, mtip);
        self.csrs.set_bits(MIP, MIP_MEIP, meip);
    }

    /// Returns true if an enabled interrupt is pending, ignoring `mstatus.MIE`.
    pub fn wake_pending(&self) -> bool {
        self.csrs.get(MIP) & self.csrs.get(MIE) != 0
    }

    /// Returns true if interrupts can be taken at the current privilege.
    pub fn interrupts_enabled(&self) -> bool {
        self.privilege < PrivilegeMode::Machine || self.csrs.get(MSTATUS) & MSTATUS_MIE != 0
    }

    /// Selects the interrupt to take at this boundary, if any.
    ///
    /// Claims the PLIC source for external interrupts and clears the CLINT
    /// software-pending bit for software interrupts.
    pub fn arbitrate(&mut self) -> Option<Trap> {
        if !self.interrupts_enabled() {
            return None;
        }

        let enabled = self.csrs.get(MIE);
        let pending = self.csrs.get(MIP);
        let ready = |bit: u64| enabled & pending & bit != 0;
        let guard = self.priority_guard;
        let below = |class: InterruptPriority| guard < class as u8;

        let mut trap = None;
        if below(InterruptPriority::External) {
            if ready(MIP_MEIP) && lock(&self.devices.plic).claim(self.hart_id).is_some() {
                self.csrs.set_bits(MIP, MIP_MEIP, false);
                trap = Some(Trap::MachineExternalInterrupt);
            } else if ready(MIP_SEIP) {
                trap = Some(Trap::SupervisorExternalInterrupt);
            }
        }
        if trap.is_none() && below(InterruptPriority::Timer) {
            if ready(MIP_MTIP) {
                trap = Some(Trap::MachineTimerInterrupt);
            } else if ready(MIP_STIP) {
                trap = Some(Trap::SupervisorTimerInterrupt);
            }
        }
        if trap.is_none() && below(InterruptPriority::Software) {
            if ready(MIP_MSIP) {
                lock(&self.devices.clint).set_msip(self.hart_id, false);
                self.csrs.set_bits(MIP, MIP_MSIP, false);
                trap = Some(Trap::MachineSoftwareInterrupt);
            } else if ready(MIP_SSIP) {
                trap = Some(Trap::SupervisorSoftwareInterrupt);
            }
        }

        let trap = trap?;
        if let Some(class) = InterruptPriority::of(trap) {
            self.priority_guard = class as u8;
        }
        trace!(hart = self.hart_id, ?trap, guard = self.priority_guard, "interrupt: taken");
        Some(trap)
    }
}
