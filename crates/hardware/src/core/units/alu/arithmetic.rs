//! ALU arithmetic operations.
//!
//! Addition, subtraction and the M-extension multiply/divide family. W forms use the
//! low 32 bits of each operand and sign-extend the 32-bit result.
//!
//! Division never traps: a zero divisor yields all ones for the quotient and the
//! dividend for the remainder, and the signed overflow `MIN / -1` yields `MIN` with
//! a remainder of zero.

use super::AluOp;

/// Sign-extends the low 32 bits of `v` to 64 bits.
#[inline(always)]
const fn sext32(v: u32) -> u64 {
    v as i32 as i64 as u64
}

/// Executes an integer arithmetic operation.
///
/// # Arguments
///
/// * `op`   - The arithmetic operation.
/// * `a`    - First operand.
/// * `b`    - Second operand.
/// * `is32` - If true, perform the W variant.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-arithmetic operations.
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    if is32 {
        word(op, a as u32, b as u32)
    } else {
        double(op, a, b)
    }
}

fn double(op: AluOp, a: u64, b: u64) -> u64 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i128::from(a as i64) * i128::from(b as i64)) >> 64) as u64,
        AluOp::Mulhsu => ((i128::from(a as i64) * (u128::from(b) as i128)) >> 64) as u64,
        AluOp::Mulhu => ((u128::from(a) * u128::from(b)) >> 64) as u64,
        AluOp::Div if b == 0 => u64::MAX,
        AluOp::Div => (a as i64).wrapping_div(b as i64) as u64,
        AluOp::Divu => a.checked_div(b).unwrap_or(u64::MAX),
        AluOp::Rem if b == 0 => a,
        AluOp::Rem => (a as i64).wrapping_rem(b as i64) as u64,
        AluOp::Remu => a.checked_rem(b).unwrap_or(a),
        _ => 0,
    }
}

fn word(op: AluOp, a: u32, b: u32) -> u64 {
    match op {
        AluOp::Add => sext32(a.wrapping_add(b)),
        AluOp::Sub => sext32(a.wrapping_sub(b)),
        AluOp::Mul => sext32(a.wrapping_mul(b)),
        AluOp::Div if b == 0 => u64::MAX,
        AluOp::Div => sext32((a as i32).wrapping_div(b as i32) as u32),
        AluOp::Divu => a.checked_div(b).map_or(u64::MAX, sext32),
        AluOp::Rem if b == 0 => sext32(a),
        AluOp::Rem => sext32((a as i32).wrapping_rem(b as i32) as u32),
        AluOp::Remu => sext32(a.checked_rem(b).unwrap_or(a)),
        _ => 0,
    }
}
