//! FPU tests.
//!
//! Floats are compared through their bit patterns so that signed zeros and NaN
//! payloads are checked exactly.

use rstest::rstest;
use rvhart_core::core::arch::csr::{FFLAGS_DZ, FFLAGS_NV};
use rvhart_core::core::units::fpu::nan_handling::{
    CANONICAL_NAN_F32, box_f32, fmax_f32, fmin_f32, is_signaling_f32, unbox_f32,
};
use rvhart_core::core::units::fpu::{FpOp, Fpu};

const SNAN: u32 = 0x7F80_0001;

fn run(op: FpOp, a: f32, b: f32) -> (u32, u64) {
    let r = Fpu::execute(op, box_f32(a), box_f32(b));
    assert_eq!(r.bits >> 32, 0xFFFF_FFFF, "result must be NaN-boxed");
    (r.bits as u32, r.flags)
}

#[rstest]
#[case(FpOp::Add, 1.5, 2.25, 3.75)]
#[case(FpOp::Sub, 1.0, 3.0, -2.0)]
#[case(FpOp::Mul, -1.5, 4.0, -6.0)]
#[case(FpOp::Div, 9.0, 4.0, 2.25)]
#[case(FpOp::Sqrt, 16.0, 0.0, 4.0)]
#[case(FpOp::SgnJ, 2.0, -1.0, -2.0)]
#[case(FpOp::SgnJN, 2.0, -1.0, 2.0)]
#[case(FpOp::SgnJX, -2.0, -1.0, 2.0)]
#[case(FpOp::Min, 1.0, -1.0, -1.0)]
#[case(FpOp::Max, 1.0, -1.0, 1.0)]
fn exact_results_raise_no_flags(
    #[case] op: FpOp,
    #[case] a: f32,
    #[case] b: f32,
    #[case] expected: f32,
) {
    let (bits, flags) = run(op, a, b);
    assert_eq!(bits, expected.to_bits());
    assert_eq!(flags, 0);
}

#[test]
fn divide_by_zero_sets_dz() {
    let (bits, flags) = run(FpOp::Div, 1.0, 0.0);
    assert_eq!(bits, f32::INFINITY.to_bits());
    assert_eq!(flags, FFLAGS_DZ);
}

#[test]
fn zero_over_zero_is_invalid_not_dz() {
    let (bits, flags) = run(FpOp::Div, 0.0, 0.0);
    assert_eq!(bits, CANONICAL_NAN_F32);
    assert_eq!(flags, FFLAGS_NV);
}

#[test]
fn sqrt_of_negative_is_invalid() {
    let (bits, flags) = run(FpOp::Sqrt, -4.0, 0.0);
    assert_eq!(bits, CANONICAL_NAN_F32);
    assert_eq!(flags, FFLAGS_NV);
}

#[test]
fn signaling_nan_operand_sets_nv_and_canonicalizes() {
    let snan = f32::from_bits(SNAN);
    assert!(is_signaling_f32(snan));
    let (bits, flags) = run(FpOp::Add, snan, 1.0);
    assert_eq!(bits, CANONICAL_NAN_F32);
    assert_eq!(flags, FFLAGS_NV);
}

#[test]
fn quiet_nan_operand_propagates_quietly() {
    let (bits, flags) = run(FpOp::Mul, f32::NAN, 2.0);
    assert_eq!(bits, CANONICAL_NAN_F32);
    assert_eq!(flags, 0);
}

#[test]
fn sign_injection_keeps_nan_payload() {
    let (bits, flags) = run(FpOp::SgnJN, f32::from_bits(SNAN), 1.0);
    assert_eq!(bits, SNAN | 0x8000_0000);
    assert_eq!(flags, 0);
}

#[test]
fn min_max_order_signed_zeros() {
    assert_eq!(fmin_f32(0.0, -0.0).to_bits(), (-0.0f32).to_bits());
    assert_eq!(fmin_f32(-0.0, 0.0).to_bits(), (-0.0f32).to_bits());
    assert_eq!(fmax_f32(-0.0, 0.0).to_bits(), 0.0f32.to_bits());
    assert_eq!(fmax_f32(0.0, -0.0).to_bits(), 0.0f32.to_bits());
}

#[test]
fn min_max_prefer_the_number_over_nan() {
    assert_eq!(fmin_f32(f32::NAN, 3.0).to_bits(), 3.0f32.to_bits());
    assert_eq!(fmax_f32(3.0, f32::NAN).to_bits(), 3.0f32.to_bits());
    assert_eq!(fmin_f32(f32::NAN, f32::NAN).to_bits(), CANONICAL_NAN_F32);
}

#[test]
fn unboxed_operand_reads_as_canonical_nan() {
    assert_eq!(unbox_f32(0x0000_0000_3F80_0000).to_bits(), CANONICAL_NAN_F32);
    assert_eq!(unbox_f32(box_f32(1.0)).to_bits(), 1.0f32.to_bits());

    let r = Fpu::execute(FpOp::Add, 0x3F80_0000, box_f32(1.0));
    assert_eq!(r.bits as u32, CANONICAL_NAN_F32);
    assert_eq!(r.flags, 0);
}

#[test]
fn decode_covers_subset_only() {
    assert_eq!(FpOp::decode(0b0101100, 0, 0), Some(FpOp::Sqrt));
    assert_eq!(FpOp::decode(0b0101100, 0, 1), None);
    assert_eq!(FpOp::decode(0b0010000, 0b011, 0), None);
    assert_eq!(FpOp::decode(0b1100000, 0, 0), None, "conversions are not implemented");
    assert!(FpOp::Div.uses_rounding_mode());
    assert!(!FpOp::Min.uses_rounding_mode());
}
