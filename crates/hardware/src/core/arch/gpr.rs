//! RISC-V General-Purpose Register File.
//!
//! This module implements the integer register file. It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** Register `x0` reads as zero regardless of writes.

/// General-Purpose Register file.
#[derive(Clone, Debug, Default)]
pub struct Gpr {
    regs: [u64; 32],
}

impl Gpr {
    /// Creates a new register file with all registers set to 0.
    pub const fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The 64-bit value stored in the register. Register `x0` always returns 0.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == 0 { 0 } else { self.regs[idx & 0x1F] }
    }

    /// Writes a value to a general-purpose register. Writes to `x0` are discarded.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 64-bit value to write.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != 0 {
            self.regs[idx & 0x1F] = val;
        }
    }

    /// Returns a copy of all 32 registers, with `x0` as zero.
    pub fn snapshot(&self) -> [u64; 32] {
        let mut regs = self.regs;
        regs[0] = 0;
        regs
    }
}
