//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components that make up the simulated machine:
//! the physical bus, RAM, the three MMIO devices (CLINT, PLIC, UART), the
//! background timer ticker, and the builder that wires one device set for
//! every hart context.

/// System builder and the shared device set.
pub mod builder;

/// Memory-mapped I/O device implementations.
pub mod devices;

/// System bus interconnect and routing.
pub mod interconnect;

/// Main memory (RAM) backing storage.
pub mod memory;

/// Background timer ticker and wakeup signal.
pub mod ticker;

/// Device trait definitions for MMIO access.
pub mod traits;

pub use builder::{DeviceSet, DeviceSnapshot, System, SystemBuilder};
pub use interconnect::Bus;
pub use ticker::{TimerTicker, Wakeup};
