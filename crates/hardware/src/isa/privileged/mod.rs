//! Privileged Architecture Definitions.
//!
//! Defines constants for the RISC-V Privileged Specification: trap cause codes and
//! the SYSTEM-opcode encodings.
//!
//! # Modules
//!
//! - `cause`: Exception and Interrupt cause codes.
//! - `opcodes`: System instruction opcodes (ECALL, EBREAK, xRET, WFI).

/// Exception and interrupt cause code definitions.
pub mod cause;

/// System instruction opcodes (ECALL, EBREAK, xRET, WFI).
pub mod opcodes;
