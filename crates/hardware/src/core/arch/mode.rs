//! RISC-V Privilege Modes.
//!
//! This module defines the privilege levels supported by the hart. It implements:
//! 1. **Mode Classification:** User (U), Supervisor (S), and Machine (M) modes.
//! 2. **Encoding:** Conversion to and from the 2-bit `MPP`/`SPP` field values.
//! 3. **Observability:** Human-readable names for snapshots and logs.

use serde::Serialize;

/// RISC-V privilege mode levels, ordered from least to most privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PrivilegeMode {
    /// User mode (U-mode), the lowest privilege level.
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode), the highest privilege level.
    Machine = 3,
}

impl PrivilegeMode {
    /// Converts a 2-bit privilege field to a privilege mode.
    ///
    /// The reserved encoding 2 is legalized to `User`, the least-privileged level.
    ///
    /// # Arguments
    ///
    /// * `val` - The numeric privilege mode value.
    pub const fn from_bits(val: u64) -> Self {
        match val & 0b11 {
            1 => Self::Supervisor,
            3 => Self::Machine,
            _ => Self::User,
        }
    }

    /// Converts a privilege mode to its 2-bit encoding.
    pub const fn to_bits(self) -> u64 {
        self as u64
    }

    /// Returns the human-readable name of the privilege mode.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl std::fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
