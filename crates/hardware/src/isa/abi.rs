//! RISC-V ABI register names.
//!
//! Used by the disassembler and by snapshots rendered for humans.

/// ABI names of the integer registers, indexed by register number.
pub const GPR_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// ABI names of the floating-point registers, indexed by register number.
pub const FPR_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// Register x0 (hard-wired zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer).
pub const REG_SP: usize = 2;
/// Register x10 (first argument / return value).
pub const REG_A0: usize = 10;

/// Returns the ABI name of integer register `idx`.
pub fn gpr_name(idx: usize) -> &'static str {
    GPR_NAMES.get(idx).copied().unwrap_or("?")
}

/// Returns the ABI name of floating-point register `idx`.
pub fn fpr_name(idx: usize) -> &'static str {
    FPR_NAMES.get(idx).copied().unwrap_or("?")
}
