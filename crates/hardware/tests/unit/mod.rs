//! # Unit Components
//!
//! Tests for every layer of the emulator, from shared types up to the simulator
//! driver and its stimuli.



/// Hart state, execution units and the step loop.
pub mod core;


/// Boot image loading, halt controls and the simulator driver.
pub mod sim;
