//! RISC-V Base Integer (I) Function Codes (funct7).
//!
//! Bits 31-25 of R-type instructions. Only two values are legal for base
//! arithmetic; the M extension overlays a third (see `rv64m`).

/// Default operation (ADD, SRL, etc.).
pub const DEFAULT: u32 = 0b0000000;

/// Alternate operation selecting SUB over ADD and SRA over SRL.
pub const ALT: u32 = 0b0100000;

/// Upper six bits of an RV64 shift immediate selecting SRAI over SRLI.
pub const SRAI_HI6: u32 = 0b010000;
