//! Arithmetic Logic Unit (ALU).
//!
//! Integer arithmetic, logical operations and shifts for both 64-bit operands and
//! the 32-bit "W" forms, plus the multiply/divide (M) extension.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul, Mulh, Mulhsu, Mulhu, Div, Divu, Rem, Remu
//! - [`logic`]:      Or, And, Xor, Slt, Sltu
//! - [`shifts`]:     Sll, Srl, Sra

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// Bitwise logical and comparison operations (or, and, xor, slt).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::isa::rv64i::{funct3, funct7};
use crate::isa::rv64m;

/// Integer ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set less than (signed).
    Slt,
    /// Set less than unsigned.
    Sltu,
    /// Bitwise XOR.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
    /// Multiply, low 64 bits.
    Mul,
    /// Multiply, high bits (signed × signed).
    Mulh,
    /// Multiply, high bits (signed × unsigned).
    Mulhsu,
    /// Multiply, high bits (unsigned × unsigned).
    Mulhu,
    /// Divide (signed).
    Div,
    /// Divide (unsigned).
    Divu,
    /// Remainder (signed).
    Rem,
    /// Remainder (unsigned).
    Remu,
}

impl AluOp {
    /// Every operation, in encoding order.
    pub const ALL: [Self; 18] = [
        Self::Add,
        Self::Sub,
        Self::Sll,
        Self::Slt,
        Self::Sltu,
        Self::Xor,
        Self::Srl,
        Self::Sra,
        Self::Or,
        Self::And,
        Self::Mul,
        Self::Mulh,
        Self::Mulhsu,
        Self::Mulhu,
        Self::Div,
        Self::Divu,
        Self::Rem,
        Self::Remu,
    ];

    /// Selects the operation of an R-type (OP or OP-32) instruction.
    ///
    /// # Arguments
    ///
    /// * `f3` - The funct3 field.
    /// * `f7` - The funct7 field.
    /// * `word` - True for the OP-32 (W) opcode.
    ///
    /// # Returns
    ///
    /// The operation, or `None` if the combination is not a legal encoding.
    pub const fn from_reg(f3: u32, f7: u32, word: bool) -> Option<Self> {
        let op = match (f7, f3) {
            (funct7::DEFAULT, funct3::ADD_SUB) => Self::Add,
            (funct7::ALT, funct3::ADD_SUB) => Self::Sub,
            (funct7::DEFAULT, funct3::SLL) => Self::Sll,
            (funct7::DEFAULT, funct3::SLT) => Self::Slt,
            (funct7::DEFAULT, funct3::SLTU) => Self::Sltu,
            (funct7::DEFAULT, funct3::XOR) => Self::Xor,
            (funct7::DEFAULT, funct3::SRL_SRA) => Self::Srl,
            (funct7::ALT, funct3::SRL_SRA) => Self::Sra,
            (funct7::DEFAULT, funct3::OR) => Self::Or,
            (funct7::DEFAULT, funct3::AND) => Self::And,
            (rv64m::M_EXTENSION, rv64m::MUL) => Self::Mul,
            (rv64m::M_EXTENSION, rv64m::MULH) => Self::Mulh,
            (rv64m::M_EXTENSION, rv64m::MULHSU) => Self::Mulhsu,
            (rv64m::M_EXTENSION, rv64m::MULHU) => Self::Mulhu,
            (rv64m::M_EXTENSION, rv64m::DIV) => Self::Div,
            (rv64m::M_EXTENSION, rv64m::DIVU) => Self::Divu,
            (rv64m::M_EXTENSION, rv64m::REM) => Self::Rem,
            (rv64m::M_EXTENSION, rv64m::REMU) => Self::Remu,
            _ => return None,
        };
        if word && !op.has_word_form() {
            return None;
        }
        Some(op)
    }

    /// Returns true if the operation exists in the OP-32 (W) opcode space.
    pub const fn has_word_form(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Sll
                | Self::Srl
                | Self::Sra
                | Self::Mul
                | Self::Div
                | Self::Divu
                | Self::Rem
                | Self::Remu
        )
    }
}

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op`   - The ALU operation to perform.
    /// * `a`    - First operand.
    /// * `b`    - Second operand (also the shift amount).
    /// * `is32` - If true, perform the W form on the low 32 bits.
    ///
    /// # Returns
    ///
    /// The 64-bit result. W-form results are sign-extended from bit 31.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvhart_core::core::units::alu::{Alu, AluOp};
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8, false), 50);
    /// assert_eq!(Alu::execute(AluOp::Add, 0x7FFF_FFFF, 1, true), 0xFFFF_FFFF_8000_0000);
    /// assert_eq!(Alu::execute(AluOp::Div, 7, 0, false), u64::MAX);
    /// ```
    pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
        match op {
            AluOp::Add
            | AluOp::Sub
            | AluOp::Mul
            | AluOp::Mulh
            | AluOp::Mulhsu
            | AluOp::Mulhu
            | AluOp::Div
            | AluOp::Divu
            | AluOp::Rem
            | AluOp::Remu => arithmetic::execute(op, a, b, is32),

            AluOp::Or | AluOp::And | AluOp::Xor | AluOp::Slt | AluOp::Sltu => {
                logic::execute(op, a, b)
            }

            AluOp::Sll | AluOp::Srl | AluOp::Sra => shifts::execute(op, a, b, is32),
        }
    }
}
