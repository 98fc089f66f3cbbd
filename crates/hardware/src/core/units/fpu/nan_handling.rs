//! NaN boxing, unboxing, and canonical NaN propagation for single precision.
//!
//! - **Boxing** ([`box_f32`]): Sets the upper 32 bits to ones when an f32 is written
//!   into a 64-bit register.
//! - **Unboxing** ([`unbox_f32`]): A value whose upper 32 bits are not all ones
//!   reads as the canonical NaN.
//! - **Canonicalization** ([`canonicalize_f32`]): Any NaN produced by arithmetic is
//!   replaced with the canonical quiet NaN, discarding payload bits.

/// Canonical quiet NaN for single precision.
pub const CANONICAL_NAN_F32: u32 = 0x7fc0_0000;

/// Upper-32-bit mask used for NaN boxing.
const NAN_BOX_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// Quiet bit of a single-precision NaN.
const QUIET_BIT: u32 = 1 << 22;

/// Boxes an f32 into a 64-bit NaN-boxed register value.
#[inline]
pub fn box_f32(f: f32) -> u64 {
    u64::from(f.to_bits()) | NAN_BOX_MASK
}

/// Unboxes a 64-bit register value to obtain an f32.
///
/// # Returns
///
/// The low 32 bits as f32, or the canonical NaN if the value was not properly boxed.
#[inline]
pub fn unbox_f32(val: u64) -> f32 {
    if (val & NAN_BOX_MASK) == NAN_BOX_MASK {
        f32::from_bits(val as u32)
    } else {
        f32::from_bits(CANONICAL_NAN_F32)
    }
}

/// Replaces any NaN with the canonical quiet NaN.
#[inline]
pub fn canonicalize_f32(f: f32) -> f32 {
    if f.is_nan() {
        f32::from_bits(CANONICAL_NAN_F32)
    } else {
        f
    }
}

/// Returns true if `f` is a signaling NaN.
#[inline]
pub fn is_signaling_f32(f: f32) -> bool {
    f.is_nan() && f.to_bits() & QUIET_BIT == 0
}

/// IEEE 754-2008 `minNum` (FMIN.S).
///
/// If exactly one operand is NaN the other is returned; if both are NaN the result
/// is the canonical NaN. `-0.0` is considered smaller than `+0.0`.
#[inline]
pub fn fmin_f32(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f32::from_bits(CANONICAL_NAN_F32),
        (true, false) => b,
        (false, true) => a,
        (false, false) if a == b => {
            if a.is_sign_negative() { a } else { b }
        }
        (false, false) => a.min(b),
    }
}

/// IEEE 754-2008 `maxNum` (FMAX.S).
///
/// Mirror image of [`fmin_f32`]: `+0.0` is considered larger than `-0.0`.
#[inline]
pub fn fmax_f32(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f32::from_bits(CANONICAL_NAN_F32),
        (true, false) => b,
        (false, true) => a,
        (false, false) if a == b => {
            if a.is_sign_positive() { a } else { b }
        }
        (false, false) => a.max(b),
    }
}
