//! RISC-V Multiply/Divide Extension (M).
//!
//! The M instructions share the `OP_REG` and `OP_REG_32` opcodes with base integer
//! arithmetic and are selected by `funct7 == M_EXTENSION`. The `funct3` values below
//! pick the operation; the W forms reuse MUL, DIV, DIVU, REM and REMU.

/// M-Extension selector in the funct7 field.
pub const M_EXTENSION: u32 = 0b0000001;

/// Multiply, low 64 bits of the product.
pub const MUL: u32 = 0b000;
/// Multiply High (signed * signed).
pub const MULH: u32 = 0b001;
/// Multiply High (signed * unsigned).
pub const MULHSU: u32 = 0b010;
/// Multiply High (unsigned * unsigned).
pub const MULHU: u32 = 0b011;
/// Divide (signed).
pub const DIV: u32 = 0b100;
/// Divide Unsigned.
pub const DIVU: u32 = 0b101;
/// Remainder (signed).
pub const REM: u32 = 0b110;
/// Remainder Unsigned.
pub const REMU: u32 = 0b111;
