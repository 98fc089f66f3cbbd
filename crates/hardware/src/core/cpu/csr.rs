//! Control and Status Register (CSR) Instructions.
//!
//! This module implements the six Zicsr instructions on top of the CSR file. It
//! performs the following:
//! 1. **Access Control:** Raises illegal-instruction when the current privilege is
//!    below the CSR's encoded minimum, or when a read-only CSR would be written.
//! 2. **Read-Modify-Write:** Performs the swap/set/clear forms, with the write
//!    suppressed for set/clear when the source register (or immediate) is zero.
//! 3. **Live Counters:** `time` reads the CLINT `mtime` counter.

use std::sync::atomic::Ordering;

use tracing::trace;

use super::Cpu;
use super::execution::Control;
use crate::common::Trap;
use crate::core::arch::csr::{CsrFile, TIME};
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::privileged::opcodes as sys;

impl Cpu {
    /// Reads a CSR as software observes it.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 12-bit CSR address.
    ///
    /// # Returns
    ///
    /// The CSR value, or 0 for unimplemented addresses.
    pub fn csr_read(&self, addr: u16) -> u64 {
        match addr {
            TIME => self.devices.mtime.load(Ordering::Relaxed),
            _ => self.csrs.read(addr),
        }
    }

    /// Writes a CSR as software would, applying masks and WARL legalization.
    pub fn csr_write(&mut self, addr: u16, val: u64) {
        self.csrs.write(addr, val);
    }

    /// Executes CSRRW, CSRRS, CSRRC and their immediate forms.
    pub(crate) fn exec_csr(&mut self, d: &Decoded) -> Result<Control, Trap> {
        let addr = d.raw.csr();
        let illegal = Trap::IllegalInstruction(d.raw);

        let operand = match d.funct3 {
            sys::CSRRW | sys::CSRRS | sys::CSRRC => self.regs.read(d.rs1),
            sys::CSRRWI | sys::CSRRSI | sys::CSRRCI => d.rs1 as u64,
            _ => return Err(illegal),
        };
        let writes = match d.funct3 {
            sys::CSRRW | sys::CSRRWI => true,
            _ => d.rs1 != 0,
        };

        if CsrFile::is_implemented(addr) {
            if self.privilege.to_bits() < CsrFile::min_privilege(addr) {
                return Err(illegal);
            }
            if writes && CsrFile::is_read_only(addr) {
                return Err(illegal);
            }
        }

        let old = self.csr_read(addr);
        if writes {
            let new = match d.funct3 {
                sys::CSRRW | sys::CSRRWI => operand,
                sys::CSRRS | sys::CSRRSI => old | operand,
                _ => old & !operand,
            };
            self.csr_write(addr, new);
            trace!(
                hart = self.hart_id,
                csr = format_args!("{addr:#x}"),
                old = format_args!("{old:#x}"),
                new = format_args!("{new:#x}"),
                "csr: write"
            );
        }
        self.regs.write(d.rd, old);
        Ok(Control::Advance)
    }
}
