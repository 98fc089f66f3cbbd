//! Core processor implementation.
//!
//! This module contains the hart: its architectural state, the execution units it
//! calls into, and the step loop that ties them to the bus and devices.

/// Architecture-specific components (CSRs, register files, privilege modes).
pub mod arch;

/// Hart state, stepping, execution, traps and interrupts.
pub mod cpu;

/// Execution units (ALU, FPU, LSU, MMU).
pub mod units;

pub use self::cpu::{Cpu, StepOutcome};
