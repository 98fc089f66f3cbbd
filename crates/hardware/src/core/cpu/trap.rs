//! Trap Handling Logic.
//!
//! This module implements trap entry and the three trap-return instructions. It
//! performs the following:
//! 1. **Trap Entry:** Saves `mepc`, `mcause` and `mtval`, stacks the privilege and
//!    interrupt-enable into `MPP`/`MPIE`, enters machine mode and jumps to `mtvec`
//!    (direct, or vectored for interrupts). Every trap is taken in machine mode.
//! 2. **Return Handling:** `MRET`, `SRET` and `URET` restore the pc, privilege and
//!    enable bit from the corresponding status fields and reset the nesting guard.

use tracing::debug;

use super::Cpu;
use super::execution::Control;
use crate::common::Trap;
use crate::core::arch::csr::{
    MCAUSE, MEPC, MSTATUS, MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP, MSTATUS_MPP_SHIFT,
    MSTATUS_SIE, MSTATUS_SPIE, MSTATUS_SPP, MSTATUS_UIE, MSTATUS_UPIE, MTVAL, MTVEC, SEPC,
    TVEC_MODE_MASK, TVEC_MODE_VECTORED, UEPC,
};
use crate::core::arch::mode::PrivilegeMode;

impl Cpu {
    /// Takes a trap (exception or interrupt) into machine mode.
    ///
    /// # Arguments
    ///
    /// * `trap` - The trap being taken.
    /// * `epc` - The pc saved into `mepc`: the faulting instruction, or the
    ///   instruction about to run for interrupts.
    pub fn take_trap(&mut self, trap: Trap, epc: u64) {
        self.reservation = None;
        self.waiting = false;

        let cause = trap.cause();
        self.csrs.set(MEPC, epc);
        self.csrs.set(MCAUSE, cause);
        self.csrs.set(MTVAL, trap.tval());

        let mut status = self.csrs.get(MSTATUS);
        let mie = status & MSTATUS_MIE != 0;
        status = if mie { status | MSTATUS_MPIE } else { status & !MSTATUS_MPIE };
        status &= !(MSTATUS_MIE | MSTATUS_MPP);
        status |= self.privilege.to_bits() << MSTATUS_MPP_SHIFT;
        self.csrs.set(MSTATUS, status);

        let from = self.privilege;
        self.privilege = PrivilegeMode::Machine;

        let tvec = self.csrs.get(MTVEC);
        let base = tvec & !TVEC_MODE_MASK;
        self.pc = if trap.is_interrupt() && tvec & TVEC_MODE_MASK == TVEC_MODE_VECTORED {
            base.wrapping_add(4 * trap.code())
        } else {
            base
        };

        debug!(
            hart = self.hart_id,
            %trap,
            cause = format_args!("{cause:#x}"),
            epc = format_args!("{epc:#x}"),
            %from,
            handler = format_args!("{:#x}", self.pc),
            "trap: enter"
        );
    }

    /// Executes `MRET`.
    pub(crate) fn do_mret(&mut self) -> Control {
        let status = self.csrs.get(MSTATUS);
        let mpp = PrivilegeMode::from_bits((status & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT);
        let mpie = status & MSTATUS_MPIE != 0;

        let mut next = status & !(MSTATUS_MIE | MSTATUS_MPP);
        if mpie {
            next |= MSTATUS_MIE;
        }
        next |= MSTATUS_MPIE;
        self.csrs.set(MSTATUS, next);

        self.finish_return(mpp, self.csrs.get(MEPC), "mret")
    }

    /// Executes `SRET`.
    pub(crate) fn do_sret(&mut self) -> Control {
        let status = self.csrs.get(MSTATUS);
        let spp = if status & MSTATUS_SPP != 0 {
            PrivilegeMode::Supervisor
        } else {
            PrivilegeMode::User
        };
        let spie = status & MSTATUS_SPIE != 0;

        let mut next = status & !(MSTATUS_SIE | MSTATUS_SPP);
        if spie {
            next |= MSTATUS_SIE;
        }
        next |= MSTATUS_SPIE;
        self.csrs.set(MSTATUS, next);

        self.finish_return(spp, self.csrs.get(SEPC), "sret")
    }

    /// Executes `URET`.
    pub(crate) fn do_uret(&mut self) -> Control {
        let status = self.csrs.get(MSTATUS);
        let upie = status & MSTATUS_UPIE != 0;

        let mut next = status & !MSTATUS_UIE;
        if upie {
            next |= MSTATUS_UIE;
        }
        next |= MSTATUS_UPIE;
        self.csrs.set(MSTATUS, next);

        self.finish_return(PrivilegeMode::User, self.csrs.get(UEPC), "uret")
    }

    fn finish_return(&mut self, to: PrivilegeMode, epc: u64, kind: &'static str) -> Control {
        self.privilege = to;
        self.priority_guard = 0;
        self.reservation = None;
        debug!(hart = self.hart_id, kind, %to, epc = format_args!("{epc:#x}"), "trap: return");
        Control::Redirect(epc)
    }
}
