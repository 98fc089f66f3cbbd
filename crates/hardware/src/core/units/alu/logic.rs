//! ALU logical and comparison operations.
//!
//! Bitwise OR, AND, XOR, and set-less-than (signed and unsigned). None of these has
//! a W form, so they always operate on the full 64 bits and comparisons yield 0 or 1.

use super::AluOp;

/// Executes a logical or comparison operation.
///
/// # Arguments
///
/// * `op` - The logic/comparison operation.
/// * `a`  - First operand.
/// * `b`  - Second operand.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-logic operations.
pub fn execute(op: AluOp, a: u64, b: u64) -> u64 {
    match op {
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => u64::from((a as i64) < (b as i64)),
        AluOp::Sltu => u64::from(a < b),
        _ => 0,
    }
}
