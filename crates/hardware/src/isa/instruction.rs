//! Instruction field extraction.
//!
//! Provides the `InstructionBits` accessors over a raw 32-bit encoding and the
//! `Decoded` record the execution units consume.

use crate::common::constants::{OPCODE_MASK, RD_SHIFT, REG_MASK, RS1_SHIFT, RS2_SHIFT, RS3_SHIFT};

/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for extracting the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;
/// Bit mask for an RV64 shift amount (6 bits).
pub const SHAMT_MASK: u32 = 0x3F;

/// Field accessors for a raw RISC-V instruction word.
pub trait InstructionBits {
    /// Extracts the opcode field (bits 0-6).
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    fn rd(&self) -> usize;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> usize;

    /// Extracts the second source register field (bits 20-24).
    fn rs2(&self) -> usize;

    /// Extracts the third source register field (bits 27-31).
    fn rs3(&self) -> usize;

    /// Extracts the funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// Extracts the funct7 field (bits 25-31).
    fn funct7(&self) -> u32;

    /// Extracts the atomic operation selector (bits 27-31).
    fn funct5(&self) -> u32;

    /// Extracts the 12-bit CSR address (bits 20-31).
    fn csr(&self) -> u16;

    /// Extracts the 6-bit RV64 shift amount (bits 20-25).
    fn shamt(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> RD_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> RS1_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> RS2_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs3(&self) -> usize {
        ((self >> RS3_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn funct5(&self) -> u32 {
        self >> 27
    }

    #[inline(always)]
    fn csr(&self) -> u16 {
        ((self >> 20) & CSR_MASK) as u16
    }

    #[inline(always)]
    fn shamt(&self) -> u32 {
        (self >> 20) & SHAMT_MASK
    }
}

/// Immediate encoding carried by an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImmFormat {
    /// No immediate (R-type, SYSTEM, AMO).
    #[default]
    None,
    /// 12-bit signed: loads, OP-IMM, JALR.
    I,
    /// 12-bit signed split across two fields: stores.
    S,
    /// 13-bit signed, even: branches.
    B,
    /// Upper 20 bits: LUI, AUIPC.
    U,
    /// 21-bit signed, even: JAL.
    J,
}

/// Decoded instruction with all fields extracted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Extracted opcode field.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Function code field 3.
    pub funct3: u32,
    /// Function code field 7.
    pub funct7: u32,
    /// Which immediate layout `imm` was extracted with.
    pub format: ImmFormat,
    /// Sign-extended immediate value.
    pub imm: i64,
}
