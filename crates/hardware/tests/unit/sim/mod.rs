//! Simulation driver tests.


/// Flat and ELF image loading.
pub mod loader;

/// Stepping, reset and external stimuli.
pub mod simulator;
