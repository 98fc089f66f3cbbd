//! RISC-V RV64 hart emulator library.
//!
//! This crate implements one RISC-V hardware thread and the machine around it:
//! 1. **Core:** Fetch/decode/execute for RV64I, M, A and an F subset, the CSR file,
//!    U/S/M privilege, trap entry/return and priority-ordered interrupt nesting.
//! 2. **Memory:** An Sv39 MMU with a direct-mapped TLB over a physical bus.
//! 3. **ISA:** Decoding tables and a disassembler.
//! 4. **SoC:** RAM and the CLINT, PLIC and UART devices, plus the timer thread.
//! 5. **Simulation:** Boot image loading, halt controls and the stimulus surface.

/// Common types and constants (addresses, access types, traps).
pub mod common;
/// Machine configuration (defaults, JSON loading, validation).
pub mod config;
/// Hart state, execution units and the step loop.
pub mod core;
/// Instruction set tables, decoding and disassembly.
pub mod isa;
/// Boot image loading and the simulator driver.
pub mod sim;
/// System-on-chip (builder, bus, devices, memory, timer).
pub mod soc;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// The hart.
pub use crate::core::Cpu;
/// The simulator driver.
pub use crate::sim::Simulator;
/// Bus plus shared devices; construct with `SystemBuilder`.
pub use crate::soc::System;
