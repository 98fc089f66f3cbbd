//! Boot and debug control.
//!
//! Halting is a property of the run, not of the ISA, so it lives here rather
//! than in the fetch path. Three conditions are checked before each step:
//! the pc reaching an end address, the next word being all zeroes, and an
//! instruction budget running out.

use serde::Serialize;

use crate::config::GeneralConfig;
use crate::core::Cpu;

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HaltReason {
    /// The pc reached the configured end address.
    EndAddress {
        /// The pc at halt.
        pc: u64,
    },
    /// The next instruction word is all zeroes.
    ZeroWord {
        /// The pc at halt.
        pc: u64,
    },
    /// The instruction budget was used up.
    InstructionLimit {
        /// Number of instruction boundaries executed.
        executed: u64,
    },
    /// The hart is in `WFI` with every interrupt source disabled in `mie`.
    WaitForever {
        /// The pc at halt.
        pc: u64,
    },
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndAddress { pc } => write!(f, "reached end address {pc:#x}"),
            Self::ZeroWord { pc } => write!(f, "all-zero instruction word at {pc:#x}"),
            Self::InstructionLimit { executed } => {
                write!(f, "instruction limit reached after {executed} steps")
            }
            Self::WaitForever { pc } => write!(f, "WFI at {pc:#x} with no interrupt enabled"),
        }
    }
}

/// Halt conditions for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugControl {
    /// Halt when the pc equals this address.
    pub end_address: Option<u64>,
    /// Halt when the word at the pc is zero.
    pub halt_on_zero_word: bool,
    /// Halt after this many instruction boundaries.
    pub max_instructions: Option<u64>,
}

impl DebugControl {
    /// Takes the halt settings from the general configuration.
    pub const fn from_config(general: &GeneralConfig) -> Self {
        Self {
            end_address: general.end_address,
            halt_on_zero_word: general.halt_on_zero_word,
            max_instructions: general.max_instructions,
        }
    }

    /// Checks whether the run should stop before the next step.
    ///
    /// # Arguments
    ///
    /// * `cpu` - The hart about to step.
    /// * `executed` - Instruction boundaries executed so far.
    ///
    /// # Returns
    ///
    /// The halt reason, or `None` to keep going.
    pub fn check(&self, cpu: &Cpu, executed: u64) -> Option<HaltReason> {
        let pc = cpu.pc;
        if self.end_address == Some(pc) {
            return Some(HaltReason::EndAddress { pc });
        }
        if self.max_instructions.is_some_and(|max| executed >= max) {
            return Some(HaltReason::InstructionLimit { executed });
        }
        if self.halt_on_zero_word && !cpu.waiting && cpu.peek_instruction(pc) == Some(0) {
            return Some(HaltReason::ZeroWord { pc });
        }
        None
    }
}
