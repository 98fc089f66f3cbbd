//! Simulation driver and program loading.
//!
//! Provides the boot image loader, the halt controls, and the [`Simulator`] that
//! owns a hart and accepts external stimuli.

/// Halt conditions (end address, all-zero word, instruction budget).
pub mod debug;

/// Flat binary and ELF loading.
pub mod loader;

/// The simulator driver.
pub mod simulator;

pub use debug::{DebugControl, HaltReason};
pub use loader::{BootImage, LoadError, Segment};
pub use simulator::{InterruptKind, SerialInput, SimError, SimStep, Simulator};
