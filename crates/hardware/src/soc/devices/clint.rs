//! Core Local Interruptor (CLINT).
//!
//! The CLINT block holds memory-mapped control and status registers associated
//! with software and timer interrupts.
//!
//! # Memory Map
//!
//! * `0x0000 + 8 * hart`: MSIP (Machine Software Interrupt Pending)
//! * `0x4000 + 8 * hart`: MTIMECMP (Machine Time Compare)
//! * `0xBFF8`: MTIME (Machine Time, shared by every hart)
//!
//! `mtime` lives in an `AtomicU64` shared with the background ticker, so the
//! hart observes fresh time at every instruction boundary without taking this
//! device's lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::soc::devices::Device;

/// Offset for the Machine Software Interrupt Pending registers.
const MSIP_OFFSET: u64 = 0x0000;
/// Offset for the Machine Time Compare registers.
const MTIMECMP_OFFSET: u64 = 0x4000;
/// Offset for the Machine Time register.
const MTIME_OFFSET: u64 = 0xBFF8;
/// Stride between per-hart registers.
const HART_STRIDE: u64 = 8;
/// Size of the CLINT MMIO window.
pub const CLINT_SIZE: u64 = 0x10000;

/// Register block exposed for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClintSnapshot {
    /// Shared time counter.
    pub mtime: u64,
    /// Per-hart software-interrupt-pending bits.
    pub msip: Vec<bool>,
    /// Per-hart compare values.
    pub mtimecmp: Vec<u64>,
}

/// CLINT device structure.
pub struct Clint {
    base_addr: u64,
    mtime: Arc<AtomicU64>,
    mtimecmp: Vec<u64>,
    msip: Vec<bool>,
}

impl Clint {
    /// Creates a new CLINT device.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - The base physical address.
    /// * `num_harts` - Number of per-hart register pairs.
    /// * `mtime` - The shared counter advanced by the timer ticker.
    pub fn new(base_addr: u64, num_harts: usize, mtime: Arc<AtomicU64>) -> Self {
        let harts = num_harts.max(1);
        Self {
            base_addr,
            mtime,
            mtimecmp: vec![u64::MAX; harts],
            msip: vec![false; harts],
        }
    }

    /// Returns the current value of the shared counter.
    #[inline]
    pub fn mtime(&self) -> u64 {
        self.mtime.load(Ordering::Acquire)
    }

    /// Returns the shared counter handle.
    pub fn mtime_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.mtime)
    }

    /// Returns true if `mtime >= mtimecmp[hart]`.
    #[inline]
    pub fn timer_pending(&self, hart: usize) -> bool {
        self.mtimecmp
            .get(hart)
            .is_some_and(|&cmp| self.mtime() >= cmp)
    }

    /// Returns this hart's software-interrupt-pending bit.
    #[inline]
    pub fn software_pending(&self, hart: usize) -> bool {
        self.msip.get(hart).copied().unwrap_or(false)
    }

    /// Sets or clears this hart's software-interrupt-pending bit.
    pub fn set_msip(&mut self, hart: usize, pending: bool) {
        if let Some(bit) = self.msip.get_mut(hart) {
            *bit = pending;
        }
    }

    /// Returns this hart's compare value.
    pub fn mtimecmp(&self, hart: usize) -> u64 {
        self.mtimecmp.get(hart).copied().unwrap_or(u64::MAX)
    }

    /// Sets this hart's compare value.
    pub fn set_mtimecmp(&mut self, hart: usize, val: u64) {
        if let Some(cmp) = self.mtimecmp.get_mut(hart) {
            *cmp = val;
        }
    }

    /// Captures the register block.
    pub fn snapshot(&self) -> ClintSnapshot {
        ClintSnapshot {
            mtime: self.mtime(),
            msip: self.msip.clone(),
            mtimecmp: self.mtimecmp.clone(),
        }
    }

    /// Splits an offset into (register, hart, byte shift within the 64-bit register).
    fn decode(&self, offset: u64) -> Option<(Reg, usize, u64)> {
        let shift = (offset & 7) * 8;
        let aligned = offset & !7;
        let harts = self.msip.len() as u64;
        if aligned == MTIME_OFFSET {
            return Some((Reg::Mtime, 0, shift));
        }
        if (MSIP_OFFSET..MSIP_OFFSET + harts * HART_STRIDE).contains(&aligned) {
            return Some((Reg::Msip, ((aligned - MSIP_OFFSET) / HART_STRIDE) as usize, shift));
        }
        if (MTIMECMP_OFFSET..MTIMECMP_OFFSET + harts * HART_STRIDE).contains(&aligned) {
            return Some((
                Reg::Mtimecmp,
                ((aligned - MTIMECMP_OFFSET) / HART_STRIDE) as usize,
                shift,
            ));
        }
        None
    }

    fn read_reg(&self, reg: Reg, hart: usize) -> u64 {
        match reg {
            Reg::Msip => u64::from(self.software_pending(hart)),
            Reg::Mtimecmp => self.mtimecmp(hart),
            Reg::Mtime => self.mtime(),
        }
    }

    fn write_reg(&mut self, reg: Reg, hart: usize, val: u64) {
        match reg {
            Reg::Msip => self.set_msip(hart, val & 1 != 0),
            Reg::Mtimecmp => self.set_mtimecmp(hart, val),
            Reg::Mtime => self.mtime.store(val, Ordering::Release),
        }
    }

    /// Reads `bytes` bytes at `offset` out of the containing 64-bit register.
    fn read_part(&self, offset: u64, bytes: u32) -> u64 {
        let Some((reg, hart, shift)) = self.decode(offset) else {
            warn!(offset = format_args!("{offset:#x}"), "clint: read of unmapped offset");
            return 0;
        };
        let val = self.read_reg(reg, hart) >> shift;
        if bytes >= 8 { val } else { val & ((1u64 << (bytes * 8)) - 1) }
    }

    /// Merges `bytes` bytes of `val` into the containing 64-bit register.
    fn write_part(&mut self, offset: u64, val: u64, bytes: u32) {
        let Some((reg, hart, shift)) = self.decode(offset) else {
            warn!(offset = format_args!("{offset:#x}"), "clint: write to unmapped offset");
            return;
        };
        let merged = if bytes >= 8 {
            val
        } else {
            let mask = ((1u64 << (bytes * 8)) - 1) << shift;
            (self.read_reg(reg, hart) & !mask) | ((val << shift) & mask)
        };
        self.write_reg(reg, hart, merged);
    }
}

#[derive(Clone, Copy)]
enum Reg {
    Msip,
    Mtimecmp,
    Mtime,
}

impl Device for Clint {
    fn name(&self) -> &str {
        "CLINT"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, CLINT_SIZE)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        self.read_part(offset, 1) as u8
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        self.read_part(offset, 2) as u16
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        self.read_part(offset, 4) as u32
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        self.read_part(offset, 8)
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        self.write_part(offset, u64::from(val), 1);
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        self.write_part(offset, u64::from(val), 2);
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        self.write_part(offset, u64::from(val), 4);
    }

    fn write_u64(&mut self, offset: u64, val: u64) {
        self.write_part(offset, val, 8);
    }

    /// Clears software interrupts, disarms every compare register and rewinds time.
    fn reset(&mut self) {
        self.mtime.store(0, Ordering::Release);
        self.mtimecmp.fill(u64::MAX);
        self.msip.fill(false);
    }
}
