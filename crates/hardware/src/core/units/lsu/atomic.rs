//! Atomic memory operation ALU.
//!
//! Computes the value an AMO writes back from the current memory value and the
//! register operand. Word operations compare and combine the low 32 bits and
//! sign-extend the result.

use crate::isa::rv64a;

/// AMO read-modify-write operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmoOp {
    /// Store the register value.
    Swap,
    /// Wrapping addition.
    Add,
    /// Bitwise XOR.
    Xor,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Signed minimum.
    Min,
    /// Signed maximum.
    Max,
    /// Unsigned minimum.
    Minu,
    /// Unsigned maximum.
    Maxu,
}

impl AmoOp {
    /// Decodes the funct5 field of an AMO (LR and SC excluded).
    pub const fn from_funct5(f5: u32) -> Option<Self> {
        match f5 {
            rv64a::AMOSWAP => Some(Self::Swap),
            rv64a::AMOADD => Some(Self::Add),
            rv64a::AMOXOR => Some(Self::Xor),
            rv64a::AMOAND => Some(Self::And),
            rv64a::AMOOR => Some(Self::Or),
            rv64a::AMOMIN => Some(Self::Min),
            rv64a::AMOMAX => Some(Self::Max),
            rv64a::AMOMINU => Some(Self::Minu),
            rv64a::AMOMAXU => Some(Self::Maxu),
            _ => None,
        }
    }
}

/// Performs the arithmetic of an AMO.
///
/// # Arguments
///
/// * `op`      - The atomic operation.
/// * `mem_val` - The current value read from memory.
/// * `reg_val` - The value of `rs2`.
/// * `word`    - True for the 32-bit (`.W`) form.
///
/// # Returns
///
/// The value to write back. Word results are sign-extended to 64 bits.
pub fn atomic_alu(op: AmoOp, mem_val: u64, reg_val: u64, word: bool) -> u64 {
    if word {
        let (a, b) = (mem_val as i32, reg_val as i32);
        let res = match op {
            AmoOp::Swap => b,
            AmoOp::Add => a.wrapping_add(b),
            AmoOp::Xor => a ^ b,
            AmoOp::And => a & b,
            AmoOp::Or => a | b,
            AmoOp::Min => a.min(b),
            AmoOp::Max => a.max(b),
            AmoOp::Minu => (a as u32).min(b as u32) as i32,
            AmoOp::Maxu => (a as u32).max(b as u32) as i32,
        };
        res as i64 as u64
    } else {
        let (a, b) = (mem_val as i64, reg_val as i64);
        match op {
            AmoOp::Swap => reg_val,
            AmoOp::Add => mem_val.wrapping_add(reg_val),
            AmoOp::Xor => mem_val ^ reg_val,
            AmoOp::And => mem_val & reg_val,
            AmoOp::Or => mem_val | reg_val,
            AmoOp::Min => a.min(b) as u64,
            AmoOp::Max => a.max(b) as u64,
            AmoOp::Minu => mem_val.min(reg_val),
            AmoOp::Maxu => mem_val.max(reg_val),
        }
    }
}
