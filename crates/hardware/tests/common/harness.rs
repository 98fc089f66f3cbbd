//! Simulator-backed test context.
//!
//! Every context owns a full machine (RAM, CLINT, PLIC, UART) with a small RAM
//! window, buffered serial output and the background timer stopped, so `mtime`
//! only moves when a test writes it.

use rvhart_core::Simulator;
use rvhart_core::config::{Config, UartOutput};
use rvhart_core::core::{Cpu, StepOutcome};
use rvhart_core::sim::{BootImage, HaltReason};

/// Where test programs are loaded.
pub const RAM_BASE: u64 = 0x8000_0000;

/// RAM size of test machines.
pub const RAM_SIZE: usize = 1024 * 1024;

/// Upper bound on steps before `run_to_halt` gives up.
const STEP_LIMIT: u64 = 100_000;

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Configuration used by test machines.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.memory.ram_size = RAM_SIZE;
    config.system.uart_output = UartOutput::Buffer;
    config.general.max_instructions = Some(STEP_LIMIT);
    config
}

/// A machine with a program loaded at [`RAM_BASE`].
pub struct TestContext {
    /// The simulator under test.
    pub sim: Simulator,
}

impl TestContext {
    /// Builds a machine running `program` from [`RAM_BASE`].
    pub fn with_program(program: &[u32]) -> Self {
        Self::with_config(&test_config(), program)
    }

    /// Builds a machine from `config` running `program` from [`RAM_BASE`].
    pub fn with_config(config: &Config, program: &[u32]) -> Self {
        init_tracing();
        let image = BootImage::from_words(program, RAM_BASE);
        let Ok(mut sim) = Simulator::new(config, image) else {
            panic!("test machine failed to build");
        };
        sim.stop_timer();
        Self { sim }
    }

    /// Convenience accessor for the CPU.
    pub const fn cpu(&self) -> &Cpu {
        &self.sim.cpu
    }

    /// Mutable convenience accessor for the CPU.
    pub const fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.sim.cpu
    }

    /// Sets a general-purpose register.
    pub fn set_reg(&mut self, reg: usize, val: u64) {
        self.sim.cpu.regs.write(reg, val);
    }

    /// Reads a general-purpose register.
    pub fn get_reg(&self, reg: usize) -> u64 {
        self.sim.cpu.regs.read(reg)
    }

    /// Steps the hart once, bypassing the halt checks.
    pub fn step(&mut self) -> StepOutcome {
        self.sim.cpu.step()
    }

    /// Steps the hart `n` times and returns the last outcome.
    pub fn step_n(&mut self, n: usize) -> StepOutcome {
        let mut last = StepOutcome::Waiting;
        for _ in 0..n {
            last = self.step();
        }
        last
    }

    /// Runs through the simulator until a halt condition holds.
    pub fn run_to_halt(&mut self) -> HaltReason {
        self.sim.run()
    }
}
