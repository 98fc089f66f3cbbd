//! RISC-V Atomic Extension (A).
//!
//! All atomics share one major opcode. `funct3` carries the access width and the
//! top five bits (`funct5`) select the operation; the aq/rl ordering bits are
//! accepted and ignored because the hart retires accesses strictly in order.

/// Atomic Memory Operation opcode (0b0101111).
pub const OP_AMO: u32 = 0b0101111;

/// Access width: 32-bit word.
pub const WIDTH_W: u32 = 0b010;
/// Access width: 64-bit doubleword.
pub const WIDTH_D: u32 = 0b011;

/// Load-Reserved.
pub const LR: u32 = 0b00010;
/// Store-Conditional.
pub const SC: u32 = 0b00011;
/// Atomic Swap.
pub const AMOSWAP: u32 = 0b00001;
/// Atomic Add.
pub const AMOADD: u32 = 0b00000;
/// Atomic XOR.
pub const AMOXOR: u32 = 0b00100;
/// Atomic AND.
pub const AMOAND: u32 = 0b01100;
/// Atomic OR.
pub const AMOOR: u32 = 0b01000;
/// Atomic Minimum (signed).
pub const AMOMIN: u32 = 0b10000;
/// Atomic Maximum (signed).
pub const AMOMAX: u32 = 0b10100;
/// Atomic Minimum (unsigned).
pub const AMOMINU: u32 = 0b11000;
/// Atomic Maximum (unsigned).
pub const AMOMAXU: u32 = 0b11100;
