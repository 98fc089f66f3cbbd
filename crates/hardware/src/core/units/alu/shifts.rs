//! ALU shift operations.
//!
//! SLL, SRL and SRA. Shift amounts are masked to 6 bits for 64-bit shifts and
//! 5 bits for the W forms, whose results are sign-extended from bit 31.

use super::AluOp;

/// Bit mask for a 64-bit shift amount.
const SHAMT_MASK_64: u64 = 0x3F;

/// Bit mask for a W-form shift amount.
const SHAMT_MASK_32: u64 = 0x1F;

/// Executes a shift operation.
///
/// # Arguments
///
/// * `op`   - The shift operation.
/// * `a`    - The value to be shifted.
/// * `b`    - The shift amount (upper bits ignored).
/// * `is32` - If true, perform the W variant.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-shift operations.
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    if is32 {
        let sh = (b & SHAMT_MASK_32) as u32;
        let v = a as u32;
        let r = match op {
            AluOp::Sll => v << sh,
            AluOp::Srl => v >> sh,
            AluOp::Sra => ((v as i32) >> sh) as u32,
            _ => return 0,
        };
        r as i32 as i64 as u64
    } else {
        let sh = (b & SHAMT_MASK_64) as u32;
        match op {
            AluOp::Sll => a << sh,
            AluOp::Srl => a >> sh,
            AluOp::Sra => ((a as i64) >> sh) as u64,
            _ => 0,
        }
    }
}
