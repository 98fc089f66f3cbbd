//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains opcode tables, field extraction and decoding, organized by RISC-V
//! extension.
//!
//! # Extensions
//!
//! * `rv64i`: Base Integer Instruction Set (64-bit).
//! * `rv64m`: Integer Multiplication and Division.
//! * `rv64a`: Atomic Instructions.
//! * `rv64f`: Single-Precision Floating-Point (arithmetic subset).
//! * `privileged`: Trap causes and SYSTEM encodings.

/// Application Binary Interface (ABI) register names.
pub mod abi;

/// Instruction decoding and immediate extraction.
pub mod decode;

/// Instruction disassembler for tracing and the CLI.
pub mod disasm;

/// Instruction field accessors and the decoded record.
pub mod instruction;

/// Privileged architecture definitions (trap causes, system instructions).
pub mod privileged;

/// Atomic memory operations extension.
pub mod rv64a;

/// Single-precision floating-point extension (subset).
pub mod rv64f;

/// Base integer instruction set.
pub mod rv64i;

/// Integer multiply/divide extension.
pub mod rv64m;
