//! Simulator: owns one hart, its devices, the timer thread and the boot image.
//!
//! This is the stimulus surface a presentation layer drives. It provides:
//! 1. **Stepping:** `step` runs one instruction boundary after the halt checks;
//!    `run` continues until a halt and sleeps on the wakeup signal while in `WFI`.
//! 2. **Reset:** Zeroes RAM, resets the devices, reloads the image and the hart.
//! 3. **Stimuli:** Serial input and forced interrupts, from any thread.
//! 4. **Observation:** Serializable snapshots of the hart and devices.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::common::lock;
use crate::config::{Config, ConfigError};
use crate::core::arch::csr::MIE;
use crate::core::cpu::{Cpu, HartSnapshot, StepOutcome};
use crate::sim::debug::{DebugControl, HaltReason};
use crate::sim::loader::{BootImage, LoadError};
use crate::soc::memory::MemoryError;
use crate::soc::{DeviceSet, SystemBuilder, TimerTicker};

/// Longest sleep in `WFI` before the hart re-samples its interrupt lines.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Failure to build or reset a simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// RAM could not be allocated.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// The boot image could not be placed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The timer thread could not be started.
    #[error("cannot start timer thread: {0}")]
    Ticker(#[from] std::io::Error),
}

/// An interrupt forced by an external stimulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptKind {
    /// Sets the hart's CLINT `msip` bit.
    Software,
    /// Moves the hart's `mtimecmp` to the current `mtime`.
    Timer,
    /// Raises a PLIC source.
    External(u32),
}

/// Result of one [`Simulator::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimStep {
    /// The hart stepped.
    Executed(StepOutcome),
    /// A halt condition holds; the hart did not step.
    Halted(HaltReason),
}

/// Cloneable handle for feeding serial input from another thread.
#[derive(Clone)]
pub struct SerialInput {
    devices: DeviceSet,
}

impl SerialInput {
    /// Pushes one received byte; returns `false` if the receive ring was full.
    pub fn send(&self, byte: u8) -> bool {
        self.devices.inject_serial_byte(byte)
    }
}

/// One hart plus everything needed to run it.
pub struct Simulator {
    /// The hart.
    pub cpu: Cpu,
    devices: DeviceSet,
    debug: DebugControl,
    image: BootImage,
    ticker: Option<TimerTicker>,
    executed: u64,
}

impl Simulator {
    /// Builds the machine, loads the image and starts the timer thread.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine configuration; validated here.
    /// * `image` - Program to load; its entry point becomes the reset pc.
    pub fn new(config: &Config, image: BootImage) -> Result<Self, SimError> {
        config.validate()?;
        let system = SystemBuilder::new(config).build()?;
        let devices = system.devices.clone();
        let mut cpu = Cpu::new(system, 0, config);
        image.load_into(&mut cpu.bus)?;
        cpu.reset(image.entry());

        let ticker = TimerTicker::spawn(
            Arc::clone(&devices.mtime),
            Duration::from_millis(config.system.timer_interval_ms),
            config.system.timer_increment,
            Arc::clone(&devices.wakeup),
        )?;

        info!(
            entry = format_args!("{:#x}", image.entry()),
            bytes = image.len(),
            ram_base = format_args!("{:#x}", config.system.ram_base),
            ram_size = config.memory.ram_size,
            "sim: boot"
        );

        Ok(Self {
            cpu,
            devices,
            debug: DebugControl::from_config(&config.general),
            image,
            ticker: Some(ticker),
            executed: 0,
        })
    }

    /// Stops the background timer; `mtime` then only moves when written.
    pub fn stop_timer(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// Returns the halt settings.
    pub const fn debug_control(&self) -> &DebugControl {
        &self.debug
    }

    /// Replaces the halt settings.
    pub const fn set_debug_control(&mut self, debug: DebugControl) {
        self.debug = debug;
    }

    /// Instruction boundaries executed since boot or the last reset.
    pub const fn executed(&self) -> u64 {
        self.executed
    }

    /// Returns the shared device handles.
    pub const fn devices(&self) -> &DeviceSet {
        &self.devices
    }

    /// Checks the halt conditions, then steps the hart once.
    pub fn step(&mut self) -> SimStep {
        if let Some(reason) = self.debug.check(&self.cpu, self.executed) {
            return SimStep::Halted(reason);
        }
        let outcome = self.cpu.step();
        if outcome != StepOutcome::Waiting {
            self.executed += 1;
        }
        SimStep::Executed(outcome)
    }

    /// Runs until a halt condition holds.
    ///
    /// While the hart waits in `WFI`, the thread sleeps on the wakeup signal that
    /// the timer thread and serial input notify.
    pub fn run(&mut self) -> HaltReason {
        loop {
            match self.step() {
                SimStep::Halted(reason) => {
                    info!(%reason, executed = self.executed, "sim: halt");
                    return reason;
                }
                SimStep::Executed(StepOutcome::Waiting) => {
                    if self.cpu.csrs.get(MIE) == 0 {
                        let reason = HaltReason::WaitForever { pc: self.cpu.pc };
                        info!(%reason, executed = self.executed, "sim: halt");
                        return reason;
                    }
                    self.sleep_until_woken();
                }
                SimStep::Executed(_) => {}
            }
        }
    }

    fn sleep_until_woken(&mut self) {
        let seen = self.devices.wakeup.generation();
        self.devices.tick();
        self.cpu.sync_interrupt_pending();
        if !self.cpu.wake_pending() {
            let _ = self.devices.wakeup.wait(seen, WAIT_SLICE);
        }
    }

    /// Returns the machine to its boot state and reloads the image.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.cpu.bus.reset();
        self.image.load_into(&mut self.cpu.bus)?;
        self.cpu.reset(self.image.entry());
        self.executed = 0;
        info!(entry = format_args!("{:#x}", self.image.entry()), "sim: reset");
        Ok(())
    }

    /// Pushes a byte into the UART receive ring.
    ///
    /// # Returns
    ///
    /// `false` if the byte was dropped because the ring was full.
    pub fn inject_serial_byte(&self, byte: u8) -> bool {
        self.devices.inject_serial_byte(byte)
    }

    /// Returns a handle other threads use to feed serial input.
    pub fn serial_input(&self) -> SerialInput {
        SerialInput {
            devices: self.devices.clone(),
        }
    }

    /// Forces an interrupt source to pend.
    pub fn trigger_interrupt(&self, kind: InterruptKind) {
        let hart = self.cpu.hart_id;
        match kind {
            InterruptKind::Software => lock(&self.devices.clint).set_msip(hart, true),
            InterruptKind::Timer => {
                let now = self.devices.mtime.load(Ordering::Acquire);
                lock(&self.devices.clint).set_mtimecmp(hart, now);
            }
            InterruptKind::External(id) => lock(&self.devices.plic).raise(id),
        }
        debug!(?kind, hart, "sim: interrupt triggered");
        self.devices.wakeup.notify();
    }

    /// Drains bytes the UART transmitted in buffer mode.
    pub fn take_serial_output(&self) -> Vec<u8> {
        lock(&self.devices.uart).take_output()
    }

    /// Captures the hart and device state.
    pub fn snapshot(&self) -> HartSnapshot {
        self.cpu.snapshot()
    }
}
