//! Execution units.
//!
//! The functional blocks the hart's execute step calls into: the integer ALU, the
//! single-precision FPU, the load/store helpers including AMO arithmetic, and the
//! MMU with its TLB and page table walker.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Floating-Point Unit (single-precision subset).
pub mod fpu;

/// Load/Store Unit helpers and AMO arithmetic.
pub mod lsu;

/// Memory Management Unit with TLB and page table walker.
pub mod mmu;
