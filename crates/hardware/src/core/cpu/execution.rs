//! Instruction Execution.
//!
//! This module dispatches a decoded instruction to the functional units and applies
//! its architectural effects. It performs the following:
//! 1. **Dispatch:** Selects the handler by major opcode, then by funct3/funct7 where
//!    encodings overlap (ADD/SUB, SRL/SRA, the M-extension overlay).
//! 2. **Control Flow:** Reports an explicit [`Control`] result, so the caller advances
//!    the pc only when the instruction did not redirect it.
//! 3. **Validation:** Every encoding outside the implemented set raises an
//!    illegal-instruction trap carrying the instruction bits.

use super::Cpu;
use crate::common::{AccessType, Trap};
use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::arch::csr::{FRM, MSTATUS, MSTATUS_FS, MSTATUS_FS_DIRTY};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::units::alu::{Alu, AluOp};
use crate::core::units::fpu::{FpOp, Fpu};
use crate::core::units::lsu::atomic::{AmoOp, atomic_alu};
use crate::core::units::lsu::{extend, load_kind, store_width};
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::privileged::opcodes as sys;
use crate::isa::rv64a;
use crate::isa::rv64f;
use crate::isa::rv64i::{funct3, funct7, opcodes as op};

/// Upper 32 bits written into a floating-point register by FLW.
const NAN_BOX: u64 = 0xFFFF_FFFF_0000_0000;

/// Rounding modes 5 and 6 are reserved; 7 selects `frm`.
const RM_DYNAMIC: u32 = 0b111;

/// How the pc moves after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Fall through to `pc + 4`.
    Advance,
    /// Continue at the given address (taken branch, jump, trap return).
    Redirect(u64),
}

impl Cpu {
    /// Executes one decoded instruction.
    ///
    /// # Arguments
    ///
    /// * `d` - The decoded instruction.
    /// * `pc` - Address of the instruction.
    ///
    /// # Returns
    ///
    /// How the pc moves on, or the trap the instruction raised. A trapping
    /// instruction leaves no architectural side effect on `rd`.
    pub fn execute(&mut self, d: &Decoded, pc: u64) -> Result<Control, Trap> {
        match d.opcode {
            op::OP_LUI => {
                self.regs.write(d.rd, d.imm as u64);
                Ok(Control::Advance)
            }
            op::OP_AUIPC => {
                self.regs.write(d.rd, pc.wrapping_add(d.imm as u64));
                Ok(Control::Advance)
            }
            op::OP_JAL => {
                let target = pc.wrapping_add(d.imm as u64);
                self.jump(d.rd, pc, target)
            }
            op::OP_JALR => {
                if d.funct3 != 0 {
                    return Err(Trap::IllegalInstruction(d.raw));
                }
                let target = self.regs.read(d.rs1).wrapping_add(d.imm as u64) & !1;
                self.jump(d.rd, pc, target)
            }
            op::OP_BRANCH => self.exec_branch(d, pc),
            op::OP_LOAD => self.exec_load(d),
            op::OP_STORE => self.exec_store(d),
            op::OP_IMM => self.exec_imm(d, false),
            op::OP_IMM_32 => self.exec_imm(d, true),
            op::OP_REG => self.exec_reg(d, false),
            op::OP_REG_32 => self.exec_reg(d, true),
            op::OP_MISC_MEM => match d.funct3 {
                funct3::FENCE | funct3::FENCE_I => Ok(Control::Advance),
                _ => Err(Trap::IllegalInstruction(d.raw)),
            },
            rv64a::OP_AMO => self.exec_amo(d),
            rv64f::OP_LOAD_FP => self.exec_load_fp(d),
            rv64f::OP_STORE_FP => self.exec_store_fp(d),
            rv64f::OP_FP => self.exec_fp(d),
            sys::OP_SYSTEM => self.exec_system(d, pc),
            _ => Err(Trap::IllegalInstruction(d.raw)),
        }
    }

    /// Links `pc + 4` into `rd` and redirects, unless the target is misaligned.
    fn jump(&mut self, rd: usize, pc: u64, target: u64) -> Result<Control, Trap> {
        if target % INSTRUCTION_SIZE != 0 {
            return Err(Trap::InstructionAddressMisaligned(target));
        }
        self.regs.write(rd, pc.wrapping_add(INSTRUCTION_SIZE));
        Ok(Control::Redirect(target))
    }

    fn exec_branch(&mut self, d: &Decoded, pc: u64) -> Result<Control, Trap> {
        let (a, b) = (self.regs.read(d.rs1), self.regs.read(d.rs2));
        let taken = match d.funct3 {
            funct3::BEQ => a == b,
            funct3::BNE => a != b,
            funct3::BLT => (a as i64) < (b as i64),
            funct3::BGE => (a as i64) >= (b as i64),
            funct3::BLTU => a < b,
            funct3::BGEU => a >= b,
            _ => return Err(Trap::IllegalInstruction(d.raw)),
        };
        if !taken {
            return Ok(Control::Advance);
        }
        let target = pc.wrapping_add(d.imm as u64);
        if target % INSTRUCTION_SIZE != 0 {
            return Err(Trap::InstructionAddressMisaligned(target));
        }
        Ok(Control::Redirect(target))
    }

    fn exec_load(&mut self, d: &Decoded) -> Result<Control, Trap> {
        let (width, signed) = load_kind(d.funct3).ok_or(Trap::IllegalInstruction(d.raw))?;
        let vaddr = self.regs.read(d.rs1).wrapping_add(d.imm as u64);
        let raw = self.load(vaddr, width.bytes())?;
        self.regs.write(d.rd, extend(raw, width, signed));
        Ok(Control::Advance)
    }

    fn exec_store(&mut self, d: &Decoded) -> Result<Control, Trap> {
        let width = store_width(d.funct3).ok_or(Trap::IllegalInstruction(d.raw))?;
        let vaddr = self.regs.read(d.rs1).wrapping_add(d.imm as u64);
        self.store(vaddr, self.regs.read(d.rs2), width.bytes())?;
        Ok(Control::Advance)
    }

    /// OP-IMM and OP-IMM-32.
    ///
    /// Shift immediates carry the shift type in the upper bits: six bits for the
    /// 64-bit forms, the full funct7 for the W forms.
    fn exec_imm(&mut self, d: &Decoded, word: bool) -> Result<Control, Trap> {
        let illegal = Trap::IllegalInstruction(d.raw);
        let hi6 = d.raw >> 26;
        let alu_op = match (d.funct3, word) {
            (funct3::ADD_SUB, _) => AluOp::Add,
            (funct3::SLT, false) => AluOp::Slt,
            (funct3::SLTU, false) => AluOp::Sltu,
            (funct3::XOR, false) => AluOp::Xor,
            (funct3::OR, false) => AluOp::Or,
            (funct3::AND, false) => AluOp::And,
            (funct3::SLL, false) if hi6 == 0 => AluOp::Sll,
            (funct3::SRL_SRA, false) if hi6 == 0 => AluOp::Srl,
            (funct3::SRL_SRA, false) if hi6 == funct7::SRAI_HI6 => AluOp::Sra,
            (funct3::SLL, true) if d.funct7 == funct7::DEFAULT => AluOp::Sll,
            (funct3::SRL_SRA, true) if d.funct7 == funct7::DEFAULT => AluOp::Srl,
            (funct3::SRL_SRA, true) if d.funct7 == funct7::ALT => AluOp::Sra,
            _ => return Err(illegal),
        };
        let operand = match alu_op {
            AluOp::Sll | AluOp::Srl | AluOp::Sra => u64::from(d.raw.shamt()),
            _ => d.imm as u64,
        };
        let result = Alu::execute(alu_op, self.regs.read(d.rs1), operand, word);
        self.regs.write(d.rd, result);
        Ok(Control::Advance)
    }

    /// OP and OP-32, including the M extension.
    fn exec_reg(&mut self, d: &Decoded, word: bool) -> Result<Control, Trap> {
        let alu_op =
            AluOp::from_reg(d.funct3, d.funct7, word).ok_or(Trap::IllegalInstruction(d.raw))?;
        let result = Alu::execute(alu_op, self.regs.read(d.rs1), self.regs.read(d.rs2), word);
        self.regs.write(d.rd, result);
        Ok(Control::Advance)
    }

    /// LR, SC and the read-modify-write AMOs.
    ///
    /// All three require natural alignment. The reservation holds a physical address.
    fn exec_amo(&mut self, d: &Decoded) -> Result<Control, Trap> {
        let word = match d.funct3 {
            rv64a::WIDTH_W => true,
            rv64a::WIDTH_D => false,
            _ => return Err(Trap::IllegalInstruction(d.raw)),
        };
        let size: usize = if word { 4 } else { 8 };
        let vaddr = self.regs.read(d.rs1);
        let aligned = vaddr % size as u64 == 0;
        let sext = |v: u64| if word { v as i32 as i64 as u64 } else { v };

        match d.raw.funct5() {
            rv64a::LR => {
                if d.rs2 != 0 {
                    return Err(Trap::IllegalInstruction(d.raw));
                }
                if !aligned {
                    return Err(Trap::LoadAddressMisaligned(vaddr));
                }
                let paddr = self.translate(vaddr, AccessType::Read)?;
                let val = self.load_phys(vaddr, paddr, size)?;
                self.reservation = Some(paddr);
                self.regs.write(d.rd, sext(val));
            }
            rv64a::SC => {
                if !aligned {
                    return Err(Trap::StoreAddressMisaligned(vaddr));
                }
                let paddr = self.translate(vaddr, AccessType::Write)?;
                let held = self.reservation.take() == Some(paddr);
                if held {
                    self.store_phys(vaddr, paddr, self.regs.read(d.rs2), size)?;
                }
                self.regs.write(d.rd, u64::from(!held));
            }
            f5 => {
                let amo = AmoOp::from_funct5(f5).ok_or(Trap::IllegalInstruction(d.raw))?;
                if !aligned {
                    return Err(Trap::StoreAddressMisaligned(vaddr));
                }
                let paddr = self.translate(vaddr, AccessType::Write)?;
                let old = self
                    .bus
                    .read(paddr, size)
                    .map_err(|_| Trap::StoreAccessFault(vaddr))?;
                let new = atomic_alu(amo, old, self.regs.read(d.rs2), word);
                self.store_phys(vaddr, paddr, new, size)?;
                self.regs.write(d.rd, sext(old));
            }
        }
        Ok(Control::Advance)
    }

    /// Returns true unless `mstatus.FS` is Off.
    fn fp_enabled(&self) -> bool {
        self.csrs.get(MSTATUS) & MSTATUS_FS != 0
    }

    fn mark_fp_dirty(&mut self) {
        self.csrs.set_bits(MSTATUS, MSTATUS_FS_DIRTY, true);
    }

    fn exec_load_fp(&mut self, d: &Decoded) -> Result<Control, Trap> {
        if d.funct3 != rv64f::WIDTH_S || !self.fp_enabled() {
            return Err(Trap::IllegalInstruction(d.raw));
        }
        let vaddr = self.regs.read(d.rs1).wrapping_add(d.imm as u64);
        let raw = self.load(vaddr, 4)?;
        self.fregs.write(d.rd, raw | NAN_BOX);
        self.mark_fp_dirty();
        Ok(Control::Advance)
    }

    fn exec_store_fp(&mut self, d: &Decoded) -> Result<Control, Trap> {
        if d.funct3 != rv64f::WIDTH_S || !self.fp_enabled() {
            return Err(Trap::IllegalInstruction(d.raw));
        }
        let vaddr = self.regs.read(d.rs1).wrapping_add(d.imm as u64);
        let bits = self.fregs.read(d.rs2) & 0xFFFF_FFFF;
        self.store(vaddr, bits, 4)?;
        Ok(Control::Advance)
    }

    fn exec_fp(&mut self, d: &Decoded) -> Result<Control, Trap> {
        let illegal = Trap::IllegalInstruction(d.raw);
        if !self.fp_enabled() {
            return Err(illegal);
        }
        let fp_op = FpOp::decode(d.funct7, d.funct3, d.rs2).ok_or(illegal)?;
        if fp_op.uses_rounding_mode() {
            let rm = if d.funct3 == RM_DYNAMIC {
                self.csrs.read(FRM) as u32
            } else {
                d.funct3
            };
            if rm > 4 {
                return Err(illegal);
            }
        }

        let result = Fpu::execute(fp_op, self.fregs.read(d.rs1), self.fregs.read(d.rs2));
        self.fregs.write(d.rd, result.bits);
        if result.flags != 0 {
            self.csrs.accrue_fflags(result.flags);
        }
        self.mark_fp_dirty();
        Ok(Control::Advance)
    }

    fn exec_system(&mut self, d: &Decoded, pc: u64) -> Result<Control, Trap> {
        let illegal = Trap::IllegalInstruction(d.raw);
        if d.funct3 != sys::PRIV {
            return self.exec_csr(d);
        }

        match d.raw {
            sys::ECALL => Err(match self.privilege {
                PrivilegeMode::User => Trap::EnvironmentCallFromUMode,
                PrivilegeMode::Supervisor => Trap::EnvironmentCallFromSMode,
                PrivilegeMode::Machine => Trap::EnvironmentCallFromMMode,
            }),
            sys::EBREAK => Err(Trap::Breakpoint(pc)),
            sys::MRET if self.privilege == PrivilegeMode::Machine => Ok(self.do_mret()),
            sys::SRET if self.privilege >= PrivilegeMode::Supervisor => Ok(self.do_sret()),
            sys::URET => Ok(self.do_uret()),
            sys::WFI => {
                if !self.wake_pending() {
                    self.waiting = true;
                }
                Ok(Control::Advance)
            }
            _ if d.funct7 == sys::SFENCE_VMA_FUNCT7 && d.rd == 0 => {
                if self.privilege < PrivilegeMode::Supervisor {
                    return Err(illegal);
                }
                let vaddr = (d.rs1 != 0).then(|| self.regs.read(d.rs1));
                let asid = (d.rs2 != 0).then(|| self.regs.read(d.rs2) as u16);
                self.mmu.sfence_vma(vaddr, asid);
                Ok(Control::Advance)
            }
            _ => Err(illegal),
        }
    }
}
