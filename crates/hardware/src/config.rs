//! Configuration system for the hart emulator.
//!
//! This module defines all configuration structures used to parameterize the
//! machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (RAM, MMIO windows, timer, TLB).
//! 2. **Structures:** Hierarchical config for general, system and memory settings.
//! 3. **Loading and Validation:** JSON parsing from strings or files and range checks.
//!
//! Configuration is supplied as JSON (`--config` on the CLI) or taken from `Config::default()`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::soc::devices::UartOutput;

/// Default configuration constants for the machine.
mod defaults {
    /// Base address of main system RAM (2 GiB).
    ///
    /// Boot images are loaded here unless another address is given.
    pub const RAM_BASE: u64 = 0x8000_0000;

    /// Total size of main system RAM (128 MiB).
    ///
    /// Accesses beyond `RAM_BASE + RAM_SIZE` that no device claims are bus errors.
    pub const RAM_SIZE: usize = 128 * 1024 * 1024;

    /// Base address of the CLINT (timer and software interrupt) MMIO region.
    pub const CLINT_BASE: u64 = 0x0200_0000;

    /// Base address of the PLIC (external interrupt controller) MMIO region.
    pub const PLIC_BASE: u64 = 0x0C00_0000;

    /// Base address of the UART 16550-compatible serial port MMIO region.
    pub const UART_BASE: u64 = 0x1000_0000;

    /// Number of hart contexts the devices are sized for.
    pub const NUM_HARTS: usize = 1;

    /// Wall-clock period of the timer ticker in milliseconds.
    pub const TIMER_INTERVAL_MS: u64 = 10;

    /// Amount `mtime` advances per ticker period.
    pub const TIMER_INCREMENT: u64 = 10;

    /// Translation Lookaside Buffer entry count.
    pub const TLB_SIZE: usize = 16;
}

/// Failure to load or validate a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON was malformed or had wrongly-typed fields.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field held a value the machine cannot be built with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use rvhart_core::config::Config;
///
/// let config = Config::from_json_str(r#"{ "memory": { "tlb_size": 32 } }"#).unwrap();
/// assert_eq!(config.memory.tlb_size, 32);
/// assert_eq!(config.system.ram_base, 0x8000_0000);
/// assert!(config.general.halt_on_zero_word);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// General run settings
    pub general: GeneralConfig,
    /// System memory map, devices and timer
    pub system: SystemConfig,
    /// Main memory and TLB
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks that the machine described can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };

        if self.system.num_harts == 0 {
            return invalid("system.num_harts", "must be at least 1");
        }
        if self.system.timer_interval_ms == 0 {
            return invalid("system.timer_interval_ms", "must be non-zero");
        }
        if self.memory.ram_size == 0 {
            return invalid("memory.ram_size", "must be non-zero");
        }
        if !self.memory.tlb_size.is_power_of_two() {
            return invalid("memory.tlb_size", "must be a power of two");
        }

        let ram_end = self
            .system
            .ram_base
            .checked_add(self.memory.ram_size as u64);
        let Some(ram_end) = ram_end else {
            return invalid("memory.ram_size", "RAM window wraps the address space");
        };
        let windows = [
            ("system.clint_base", self.system.clint_base, 0x1_0000),
            ("system.plic_base", self.system.plic_base, 0x40_0000),
            ("system.uart_base", self.system.uart_base, 0x100),
        ];
        for (field, base, size) in windows {
            let Some(end) = base.checked_add(size) else {
                return invalid(field, "device window wraps the address space");
            };
            if base < ram_end && self.system.ram_base < end {
                return invalid(field, "device window overlaps RAM");
            }
        }
        Ok(())
    }
}

/// General run settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit a trace event with disassembly for every retired instruction
    pub trace_instructions: bool,

    /// Halt when an all-zero instruction word is about to be fetched
    pub halt_on_zero_word: bool,

    /// Halt when the pc reaches this address
    pub end_address: Option<u64>,

    /// Halt after this many retired instructions
    pub max_instructions: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            halt_on_zero_word: true,
            end_address: None,
            max_instructions: None,
        }
    }
}

/// System memory map, devices and timer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of hart contexts the devices are sized for
    pub num_harts: usize,

    /// Main RAM base address
    pub ram_base: u64,

    /// CLINT (timer) MMIO base address
    pub clint_base: u64,

    /// PLIC MMIO base address
    pub plic_base: u64,

    /// UART MMIO base address
    pub uart_base: u64,

    /// Wall-clock milliseconds between `mtime` increments
    pub timer_interval_ms: u64,

    /// Amount added to `mtime` per interval
    pub timer_increment: u64,

    /// Destination of UART output
    pub uart_output: UartOutput,
}

impl Default for SystemConfig {
    /// Creates a default system configuration.
    ///
    /// All MMIO base addresses and timer parameters are set to their default
    /// values from the `defaults` module.
    fn default() -> Self {
        Self {
            num_harts: defaults::NUM_HARTS,
            ram_base: defaults::RAM_BASE,
            clint_base: defaults::CLINT_BASE,
            plic_base: defaults::PLIC_BASE,
            uart_base: defaults::UART_BASE,
            timer_interval_ms: defaults::TIMER_INTERVAL_MS,
            timer_increment: defaults::TIMER_INCREMENT,
            uart_output: UartOutput::default(),
        }
    }
}

/// Main memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// RAM size in bytes
    pub ram_size: usize,

    /// TLB entry count (power of two)
    pub tlb_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_size: defaults::RAM_SIZE,
            tlb_size: defaults::TLB_SIZE,
        }
    }
}
