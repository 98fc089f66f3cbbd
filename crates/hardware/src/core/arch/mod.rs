//! RISC-V architectural state.
//!
//! This module contains the state a hart owns exclusively. It includes:
//! 1. **CSRs:** The 4096-slot control and status register file and its field masks.
//! 2. **FPRs:** Floating-point registers holding NaN-boxed singles.
//! 3. **GPRs:** Integer registers with `x0` hard-wired to zero.
//! 4. **Modes:** Privilege level definitions.

/// Control and Status Register (CSR) definitions and access logic.
pub mod csr;

/// Floating-Point Register file implementation.
pub mod fpr;

/// General-Purpose Register file implementation.
pub mod gpr;

/// Privilege mode definitions.
pub mod mode;
