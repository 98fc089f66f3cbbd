//! RISC-V Floating-Point Register File.
//!
//! This module implements the floating-point register file. It performs the following:
//! 1. **Storage:** Maintains 32 registers (`f0`-`f31`) as 64-bit raw bit patterns.
//! 2. **NaN Boxing:** Single-precision values live in the low 32 bits with the upper
//!    32 bits all ones; reading an improperly boxed value yields the canonical NaN.

use crate::core::units::fpu::nan_handling::{box_f32, unbox_f32};

/// Floating-Point Register file.
#[derive(Clone, Debug, Default)]
pub struct Fpr {
    regs: [u64; 32],
}

impl Fpr {
    /// Creates a new floating-point register file with all bits zero.
    pub const fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a register as raw 64-bit storage.
    pub fn read(&self, idx: usize) -> u64 {
        self.regs[idx & 0x1F]
    }

    /// Writes raw 64-bit storage.
    pub fn write(&mut self, idx: usize, val: u64) {
        self.regs[idx & 0x1F] = val;
    }

    /// Reads a register as a single-precision value, unboxing it.
    pub fn read_f32(&self, idx: usize) -> f32 {
        unbox_f32(self.read(idx))
    }

    /// Writes a single-precision value, NaN-boxing it.
    pub fn write_f32(&mut self, idx: usize, val: f32) {
        self.write(idx, box_f32(val));
    }

    /// Returns a copy of all 32 registers as raw storage.
    pub const fn snapshot(&self) -> [u64; 32] {
        self.regs
    }
}
