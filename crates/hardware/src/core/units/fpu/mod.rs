//! Floating-Point Unit (FPU), single-precision arithmetic subset.
//!
//! Implements add, subtract, multiply, divide, square root, the three sign
//! injections, and min/max. Results are computed with the host's IEEE-754 binary32
//! arithmetic (round to nearest, ties to even), NaN results are canonicalized and
//! written NaN-boxed.
//!
//! Only the invalid-operation and divide-by-zero exception flags are accrued.
//!
//! - [`nan_handling`]: NaN boxing/unboxing and canonical NaN propagation.

/// NaN boxing, unboxing, and canonical NaN propagation.
pub mod nan_handling;

use crate::core::arch::csr::{FFLAGS_DZ, FFLAGS_NV};
use crate::isa::rv64f;

use self::nan_handling::{
    box_f32, canonicalize_f32, fmax_f32, fmin_f32, is_signaling_f32, unbox_f32,
};

/// Bit mask for the sign bit of a binary32 value.
const F32_SIGN_BIT: u32 = 0x8000_0000;

/// Single-precision operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FpOp {
    /// FADD.S
    Add,
    /// FSUB.S
    Sub,
    /// FMUL.S
    Mul,
    /// FDIV.S
    Div,
    /// FSQRT.S (unary)
    Sqrt,
    /// FSGNJ.S
    SgnJ,
    /// FSGNJN.S
    SgnJN,
    /// FSGNJX.S
    SgnJX,
    /// FMIN.S
    Min,
    /// FMAX.S
    Max,
}

impl FpOp {
    /// Decodes an OP-FP instruction into an operation.
    ///
    /// # Arguments
    ///
    /// * `f7` - The funct7 field.
    /// * `f3` - The funct3 field (rounding mode or group selector).
    /// * `rs2` - The rs2 field, which must be zero for FSQRT.S.
    ///
    /// # Returns
    ///
    /// The operation, or `None` for encodings outside the implemented subset.
    pub const fn decode(f7: u32, f3: u32, rs2: usize) -> Option<Self> {
        match (f7, f3) {
            (rv64f::FADD, _) => Some(Self::Add),
            (rv64f::FSUB, _) => Some(Self::Sub),
            (rv64f::FMUL, _) => Some(Self::Mul),
            (rv64f::FDIV, _) => Some(Self::Div),
            (rv64f::FSQRT, _) if rs2 == 0 => Some(Self::Sqrt),
            (rv64f::FSGNJ, rv64f::SGNJ) => Some(Self::SgnJ),
            (rv64f::FSGNJ, rv64f::SGNJN) => Some(Self::SgnJN),
            (rv64f::FSGNJ, rv64f::SGNJX) => Some(Self::SgnJX),
            (rv64f::FMIN_MAX, rv64f::MIN) => Some(Self::Min),
            (rv64f::FMIN_MAX, rv64f::MAX) => Some(Self::Max),
            _ => None,
        }
    }

    /// Returns true if funct3 of this operation is a rounding mode.
    pub const fn uses_rounding_mode(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Sqrt
        )
    }
}

/// Result of an FPU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FpResult {
    /// NaN-boxed 64-bit register value.
    pub bits: u64,
    /// Accrued exception flags (`fflags` bit layout).
    pub flags: u64,
}

/// Floating-Point Unit.
#[derive(Debug)]
pub struct Fpu;

impl Fpu {
    /// Executes a single-precision operation on two register values.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation.
    /// * `a`  - Raw 64-bit value of `rs1`.
    /// * `b`  - Raw 64-bit value of `rs2` (ignored by FSQRT.S).
    ///
    /// # Returns
    ///
    /// The boxed result and the exception flags raised.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvhart_core::core::units::fpu::{Fpu, FpOp};
    /// use rvhart_core::core::units::fpu::nan_handling::{box_f32, unbox_f32};
    ///
    /// let r = Fpu::execute(FpOp::Add, box_f32(1.5), box_f32(2.25));
    /// assert_eq!(unbox_f32(r.bits), 3.75);
    /// assert_eq!(r.flags, 0);
    /// ```
    pub fn execute(op: FpOp, a: u64, b: u64) -> FpResult {
        let (x, y) = (unbox_f32(a), unbox_f32(b));
        let mut flags = 0;

        let signaling = match op {
            FpOp::Sqrt => is_signaling_f32(x),
            FpOp::SgnJ | FpOp::SgnJN | FpOp::SgnJX => false,
            _ => is_signaling_f32(x) || is_signaling_f32(y),
        };
        if signaling {
            flags |= FFLAGS_NV;
        }

        let value = match op {
            FpOp::Add => x + y,
            FpOp::Sub => x - y,
            FpOp::Mul => x * y,
            FpOp::Div => {
                if y == 0.0 && x.is_finite() && x != 0.0 {
                    flags |= FFLAGS_DZ;
                }
                x / y
            }
            FpOp::Sqrt => x.sqrt(),
            FpOp::SgnJ => with_sign(x, y.to_bits() & F32_SIGN_BIT),
            FpOp::SgnJN => with_sign(x, !y.to_bits() & F32_SIGN_BIT),
            FpOp::SgnJX => with_sign(x, (x.to_bits() ^ y.to_bits()) & F32_SIGN_BIT),
            FpOp::Min => fmin_f32(x, y),
            FpOp::Max => fmax_f32(x, y),
        };

        let arithmetic = op.uses_rounding_mode();
        if arithmetic && value.is_nan() && !x.is_nan() && !(op != FpOp::Sqrt && y.is_nan()) {
            flags |= FFLAGS_NV;
        }

        let value = if arithmetic || matches!(op, FpOp::Min | FpOp::Max) {
            canonicalize_f32(value)
        } else {
            value
        };

        FpResult {
            bits: box_f32(value),
            flags,
        }
    }
}

/// Returns `x` with its sign bit replaced by `sign` (0 or the sign-bit mask).
fn with_sign(x: f32, sign: u32) -> f32 {
    f32::from_bits((x.to_bits() & !F32_SIGN_BIT) | sign)
}
