//! Instruction builders.


pub use instruction::{EBREAK, ECALL, InstructionBuilder, MRET, NOP, SRET, WFI};
