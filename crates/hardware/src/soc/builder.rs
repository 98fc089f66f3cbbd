//! System construction and the shared device set.
//!
//! This module builds the machine from configuration. It performs:
//! 1. **Device creation:** One CLINT, PLIC and UART plus the shared `mtime` counter,
//!    held as `Arc<Mutex<_>>` so every hart context and stimulus source shares them.
//! 2. **Bus setup:** Allocates RAM and registers the three MMIO windows.
//! 3. **Interrupt wiring:** Samples device interrupt lines into the PLIC gateway.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::common::lock;
use crate::config::Config;
use crate::soc::devices::{
    Clint, ClintSnapshot, Device, Plic, PlicSnapshot, Uart, UartSnapshot, uart::UART_IRQ,
};
use crate::soc::interconnect::Bus;
use crate::soc::memory::{Memory, MemoryError};
use crate::soc::ticker::Wakeup;

/// Register blocks of every device, for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    /// CLINT registers.
    pub clint: ClintSnapshot,
    /// PLIC registers.
    pub plic: PlicSnapshot,
    /// UART registers.
    pub uart: UartSnapshot,
}

/// One machine's devices, shared by every hart context.
#[derive(Clone)]
pub struct DeviceSet {
    /// Timer and software interrupt unit.
    pub clint: Arc<Mutex<Clint>>,
    /// External interrupt controller.
    pub plic: Arc<Mutex<Plic>>,
    /// Serial port.
    pub uart: Arc<Mutex<Uart>>,
    /// Shared time counter, also owned by the CLINT.
    pub mtime: Arc<AtomicU64>,
    /// Signal for harts suspended in `WFI`.
    pub wakeup: Arc<Wakeup>,
}

impl DeviceSet {
    /// Creates the devices described by `config`.
    pub fn new(config: &Config) -> Self {
        let sys = &config.system;
        let mtime = Arc::new(AtomicU64::new(0));
        Self {
            clint: Arc::new(Mutex::new(Clint::new(
                sys.clint_base,
                sys.num_harts,
                Arc::clone(&mtime),
            ))),
            plic: Arc::new(Mutex::new(Plic::new(sys.plic_base, sys.num_harts))),
            uart: Arc::new(Mutex::new(Uart::new(sys.uart_base, sys.uart_output))),
            mtime,
            wakeup: Arc::new(Wakeup::new()),
        }
    }

    /// Registers the three MMIO windows on a bus.
    pub fn attach(&self, bus: &mut Bus) {
        let clint: Arc<Mutex<dyn Device>> = self.clint.clone();
        let plic: Arc<Mutex<dyn Device>> = self.plic.clone();
        let uart: Arc<Mutex<dyn Device>> = self.uart.clone();
        bus.add_device(clint);
        bus.add_device(plic);
        bus.add_device(uart);
    }

    /// Advances the UART and samples its interrupt line into the PLIC.
    pub fn tick(&self) {
        let uart_irq = {
            let mut uart = lock(&self.uart);
            uart.tick();
            uart.irq_asserted()
        };
        lock(&self.plic).set_level(UART_IRQ, uart_irq);
    }

    /// Pushes a received byte into the UART and wakes suspended harts.
    ///
    /// # Returns
    ///
    /// `false` if the byte was dropped because the receive ring was full.
    pub fn inject_serial_byte(&self, byte: u8) -> bool {
        let accepted = lock(&self.uart).inject_byte(byte);
        self.tick();
        self.wakeup.notify();
        accepted
    }

    /// Captures every device's register block.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            clint: lock(&self.clint).snapshot(),
            plic: lock(&self.plic).snapshot(),
            uart: lock(&self.uart).snapshot(),
        }
    }
}

/// A bus with RAM and devices attached, plus the device handles.
pub struct System {
    /// Physical bus.
    pub bus: Bus,
    /// Shared device handles.
    pub devices: DeviceSet,
}

/// Builds a [`System`] from configuration.
pub struct SystemBuilder<'a> {
    config: &'a Config,
}

impl<'a> SystemBuilder<'a> {
    /// Starts a builder for `config`.
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Allocates RAM, creates the devices and wires them onto the bus.
    ///
    /// # Returns
    ///
    /// The system, or `MemoryError` if RAM cannot be allocated.
    pub fn build(self) -> Result<System, MemoryError> {
        let ram = Memory::new(self.config.system.ram_base, self.config.memory.ram_size)?;
        let mut bus = Bus::new(ram);
        let devices = DeviceSet::new(self.config);
        devices.attach(&mut bus);
        Ok(System { bus, devices })
    }
}
