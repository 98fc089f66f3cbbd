//! RISC-V Single-Precision Floating-Point Extension (F), arithmetic subset.
//!
//! Only loads, stores and the add/sub/mul/div/sqrt/sign-injection/min/max group are
//! implemented. Conversions, comparisons, moves and fused multiply-add decode to
//! illegal instructions.

/// Floating-point Load (FLW).
pub const OP_LOAD_FP: u32 = 0b0000111;
/// Floating-point Store (FSW).
pub const OP_STORE_FP: u32 = 0b0100111;
/// Floating-point Arithmetic.
pub const OP_FP: u32 = 0b1010011;

/// funct3 width selector for FLW/FSW.
pub const WIDTH_S: u32 = 0b010;

/// funct7: Add (Single).
pub const FADD: u32 = 0b0000000;
/// funct7: Subtract (Single).
pub const FSUB: u32 = 0b0000100;
/// funct7: Multiply (Single).
pub const FMUL: u32 = 0b0001000;
/// funct7: Divide (Single).
pub const FDIV: u32 = 0b0001100;
/// funct7: Square Root (Single); rs2 must be zero.
pub const FSQRT: u32 = 0b0101100;
/// funct7: Sign Injection group (Single).
pub const FSGNJ: u32 = 0b0010000;
/// funct7: Min/Max group (Single).
pub const FMIN_MAX: u32 = 0b0010100;

/// funct3 within the sign-injection group: copy sign.
pub const SGNJ: u32 = 0b000;
/// funct3 within the sign-injection group: negated sign.
pub const SGNJN: u32 = 0b001;
/// funct3 within the sign-injection group: XOR of signs.
pub const SGNJX: u32 = 0b010;

/// funct3 within the min/max group: minimum.
pub const MIN: u32 = 0b000;
/// funct3 within the min/max group: maximum.
pub const MAX: u32 = 0b001;
