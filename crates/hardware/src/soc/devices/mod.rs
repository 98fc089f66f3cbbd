//! Memory-Mapped IO Devices.
//!
//! This module contains the devices found in the machine: the core-local
//! interruptor (CLINT) for timer and software interrupts, the platform-level
//! interrupt controller (PLIC), and a 16550-style serial port (UART).

/// Core Local Interruptor (timer and software interrupt controller).
pub mod clint;

/// Platform-Level Interrupt Controller (PLIC).
pub mod plic;

/// UART 16550-compatible serial port.
pub mod uart;

pub use clint::{Clint, ClintSnapshot};
pub use plic::{Plic, PlicSnapshot};
pub use uart::{Uart, UartOutput, UartSnapshot};

pub use crate::soc::traits::Device;
