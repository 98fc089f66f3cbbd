//! Platform-Level Interrupt Controller (PLIC).
//!
//! The PLIC arbitrates global external interrupts and distributes them to
//! harts. Each hart is one interrupt context.
//!
//! # Memory Map
//!
//! * `0x000000 + 4 * id`: Interrupt source priorities (0-7)
//! * `0x001000`: Interrupt pending bitmap
//! * `0x002000 + 0x80 * hart`: Per-hart interrupt enable bitmap
//! * `0x200000 + 0x1000 * hart`: Priority threshold
//! * `0x200004 + 0x1000 * hart`: Claim/complete
//!
//! A source is claimable by a hart iff it is pending, enabled for that hart and its
//! priority exceeds the hart's threshold. Claiming clears the pending bit and marks
//! the source in flight until the hart completes it; the level-style gateway used by
//! devices does not re-pend an in-flight source.
//!
//! Each hart holds at most one claim. While it is outstanding nothing else is claimed
//! for that hart. A claim taken when the hart accepts an external interrupt is handed
//! to the first read of the claim register; any further read returns 0 until the hart
//! writes the completion.

use serde::Serialize;
use tracing::{trace, warn};

use crate::soc::devices::Device;

/// Base offset for PLIC priority registers (one per interrupt source).
const PLIC_PRIORITY_BASE: u64 = 0x000000;
/// Base offset for PLIC pending interrupt bitmap.
const PLIC_PENDING_BASE: u64 = 0x001000;
/// Base offset for PLIC interrupt enable registers (per hart).
const PLIC_ENABLE_BASE: u64 = 0x002000;
/// Stride between per-hart enable bitmaps.
const PLIC_ENABLE_STRIDE: u64 = 0x80;
/// Base offset for PLIC context registers (threshold, claim/complete).
const PLIC_CONTEXT_BASE: u64 = 0x200000;
/// Stride between per-hart context blocks.
const PLIC_CONTEXT_STRIDE: u64 = 0x1000;
/// Size of the PLIC MMIO window.
pub const PLIC_SIZE: u64 = 0x40_0000;

/// Number of interrupt sources, including the reserved source 0.
pub const NUM_SOURCES: usize = 1024;
/// Number of 32-bit words in a source bitmap.
const BITMAP_WORDS: usize = NUM_SOURCES / 32;
/// Highest implemented priority.
pub const MAX_PRIORITY: u32 = 7;

/// Register block exposed for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlicSnapshot {
    /// Sources with their pending bit set.
    pub pending: Vec<u32>,
    /// Sources claimed and not yet completed.
    pub in_flight: Vec<u32>,
    /// Per-hart thresholds.
    pub thresholds: Vec<u32>,
    /// Per-hart outstanding claim (0 = none).
    pub claimed: Vec<u32>,
}

/// PLIC device structure.
pub struct Plic {
    base_addr: u64,
    priorities: Vec<u32>,
    pending: Vec<u32>,
    in_flight: Vec<u32>,
    enables: Vec<Vec<u32>>,
    thresholds: Vec<u32>,
    claimed: Vec<u32>,
    delivered: Vec<bool>,
}

const fn bit(id: u32) -> (usize, u32) {
    ((id / 32) as usize, 1 << (id % 32))
}

fn test_bit(map: &[u32], id: u32) -> bool {
    let (word, mask) = bit(id);
    map.get(word).is_some_and(|w| w & mask != 0)
}

fn set_bit(map: &mut [u32], id: u32, on: bool) {
    let (word, mask) = bit(id);
    if let Some(w) = map.get_mut(word) {
        if on {
            *w |= mask;
        } else {
            *w &= !mask;
        }
    }
}

impl Plic {
    /// Creates a new PLIC device.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - The base physical address.
    /// * `num_harts` - Number of interrupt contexts.
    pub fn new(base_addr: u64, num_harts: usize) -> Self {
        let harts = num_harts.max(1);
        Self {
            base_addr,
            priorities: vec![0; NUM_SOURCES],
            pending: vec![0; BITMAP_WORDS],
            in_flight: vec![0; BITMAP_WORDS],
            enables: vec![vec![0; BITMAP_WORDS]; harts],
            thresholds: vec![0; harts],
            claimed: vec![0; harts],
            delivered: vec![false; harts],
        }
    }

    fn valid_source(id: u32) -> bool {
        id != 0 && (id as usize) < NUM_SOURCES
    }

    /// Sets a source's priority (clamped to 0-7).
    pub fn set_priority(&mut self, id: u32, priority: u32) {
        if let Some(p) = self.priorities.get_mut(id as usize) {
            *p = priority.min(MAX_PRIORITY);
        }
    }

    /// Enables or disables a source for a hart.
    pub fn set_enabled(&mut self, hart: usize, id: u32, on: bool) {
        if let Some(map) = self.enables.get_mut(hart) {
            set_bit(map, id, on);
        }
    }

    /// Returns true if `id` is enabled for `hart`.
    pub fn is_enabled(&self, hart: usize, id: u32) -> bool {
        self.enables.get(hart).is_some_and(|map| test_bit(map, id))
    }

    /// Sets a hart's priority threshold.
    pub fn set_threshold(&mut self, hart: usize, threshold: u32) {
        if let Some(t) = self.thresholds.get_mut(hart) {
            *t = threshold.min(MAX_PRIORITY);
        }
    }

    /// Returns true if the source's pending bit is set.
    pub fn is_pending(&self, id: u32) -> bool {
        test_bit(&self.pending, id)
    }

    /// Returns true if the source has been claimed and not completed.
    pub fn is_in_flight(&self, id: u32) -> bool {
        test_bit(&self.in_flight, id)
    }

    /// Marks a source pending. An explicit stimulus; always latches.
    pub fn raise(&mut self, id: u32) {
        if Self::valid_source(id) {
            set_bit(&mut self.pending, id, true);
        }
    }

    /// Clears a source's pending bit.
    pub fn lower(&mut self, id: u32) {
        set_bit(&mut self.pending, id, false);
    }

    /// Level-style gateway used by devices: a high line pends the source unless it
    /// is in flight; a low line withdraws it.
    pub fn set_level(&mut self, id: u32, high: bool) {
        if !high {
            self.lower(id);
        } else if !self.is_in_flight(id) {
            self.raise(id);
        }
    }

    /// Returns the best claimable source for a hart without claiming it.
    ///
    /// The highest priority wins; ties go to the lowest source id.
    pub fn pending_for(&self, hart: usize) -> Option<u32> {
        let enables = self.enables.get(hart)?;
        let threshold = self.thresholds.get(hart).copied().unwrap_or(0);
        let mut best: Option<(u32, u32)> = None;
        for (word, (&p, &e)) in self.pending.iter().zip(enables).enumerate() {
            let mut active = p & e;
            while active != 0 {
                let id = (word * 32) as u32 + active.trailing_zeros();
                active &= active - 1;
                if id == 0 {
                    continue;
                }
                let prio = self.priorities.get(id as usize).copied().unwrap_or(0);
                if prio > threshold && best.is_none_or(|(_, bp)| prio > bp) {
                    best = Some((id, prio));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Returns true if the hart has a claimable source.
    pub fn has_pending(&self, hart: usize) -> bool {
        self.pending_for(hart).is_some()
    }

    /// Claims the best source for a hart: clears its pending bit, marks it in flight
    /// and records it in the hart's claim slot.
    ///
    /// # Returns
    ///
    /// The claimed source id, or `None` if nothing is claimable or the hart's
    /// previous claim has not been completed.
    pub fn claim(&mut self, hart: usize) -> Option<u32> {
        let slot = self.claimed.get(hart)?;
        if *slot != 0 {
            trace!(hart, outstanding = *slot, "plic: claim refused");
            return None;
        }
        let id = self.pending_for(hart)?;
        set_bit(&mut self.pending, id, false);
        set_bit(&mut self.in_flight, id, true);
        if let Some(slot) = self.claimed.get_mut(hart) {
            *slot = id;
        }
        if let Some(delivered) = self.delivered.get_mut(hart) {
            *delivered = false;
        }
        trace!(hart, id, "plic: claim");
        Some(id)
    }

    /// Claim register read: hands over an undelivered claim once, otherwise claims
    /// afresh. Returns 0 while a delivered claim is outstanding.
    fn read_claim(&mut self, hart: usize) -> u32 {
        let delivered = self.delivered.get(hart).copied().unwrap_or(false);
        let id = match self.claimed(hart) {
            Some(_) if delivered => return 0,
            Some(id) => id,
            None => match self.claim(hart) {
                Some(id) => id,
                None => return 0,
            },
        };
        if let Some(d) = self.delivered.get_mut(hart) {
            *d = true;
        }
        id
    }

    /// Signals completion of a source. No-op unless the source is enabled for the hart.
    pub fn complete(&mut self, hart: usize, id: u32) {
        if !self.is_enabled(hart, id) {
            return;
        }
        set_bit(&mut self.in_flight, id, false);
        if let Some(slot) = self.claimed.get_mut(hart)
            && *slot == id
        {
            *slot = 0;
        }
        trace!(hart, id, "plic: complete");
    }

    /// Returns the hart's outstanding claim, if any.
    pub fn claimed(&self, hart: usize) -> Option<u32> {
        self.claimed.get(hart).copied().filter(|&id| id != 0)
    }

    /// Captures the register block.
    pub fn snapshot(&self) -> PlicSnapshot {
        let collect = |map: &[u32]| {
            (1..NUM_SOURCES as u32)
                .filter(|&id| test_bit(map, id))
                .collect()
        };
        PlicSnapshot {
            pending: collect(&self.pending),
            in_flight: collect(&self.in_flight),
            thresholds: self.thresholds.clone(),
            claimed: self.claimed.clone(),
        }
    }

    fn context(offset: u64) -> (usize, u64) {
        let rel = offset - PLIC_CONTEXT_BASE;
        ((rel / PLIC_CONTEXT_STRIDE) as usize, rel % PLIC_CONTEXT_STRIDE)
    }

    fn enable_slot(offset: u64) -> (usize, usize) {
        let rel = offset - PLIC_ENABLE_BASE;
        (
            (rel / PLIC_ENABLE_STRIDE) as usize,
            ((rel % PLIC_ENABLE_STRIDE) / 4) as usize,
        )
    }

    fn read_reg(&mut self, offset: u64) -> u32 {
        match offset {
            o if o < PLIC_PENDING_BASE => {
                let idx = ((o - PLIC_PRIORITY_BASE) / 4) as usize;
                self.priorities.get(idx).copied().unwrap_or(0)
            }
            o if o < PLIC_ENABLE_BASE => {
                let idx = ((o - PLIC_PENDING_BASE) / 4) as usize;
                self.pending.get(idx).copied().unwrap_or(0)
            }
            o if o < PLIC_CONTEXT_BASE => {
                let (hart, word) = Self::enable_slot(o);
                self.enables
                    .get(hart)
                    .and_then(|m| m.get(word))
                    .copied()
                    .unwrap_or(0)
            }
            o => match Self::context(o) {
                (hart, 0) => self.thresholds.get(hart).copied().unwrap_or(0),
                (hart, 4) if hart < self.claimed.len() => self.read_claim(hart),
                _ => {
                    warn!(offset = format_args!("{o:#x}"), "plic: read of unmapped offset");
                    0
                }
            },
        }
    }

    fn write_reg(&mut self, offset: u64, val: u32) {
        match offset {
            o if o < PLIC_PENDING_BASE => {
                self.set_priority(((o - PLIC_PRIORITY_BASE) / 4) as u32, val);
            }
            o if o < PLIC_ENABLE_BASE => {}
            o if o < PLIC_CONTEXT_BASE => {
                let (hart, word) = Self::enable_slot(o);
                if let Some(w) = self.enables.get_mut(hart).and_then(|m| m.get_mut(word)) {
                    *w = if word == 0 { val & !1 } else { val };
                }
            }
            o => match Self::context(o) {
                (hart, 0) => self.set_threshold(hart, val),
                (hart, 4) => self.complete(hart, val),
                _ => warn!(offset = format_args!("{o:#x}"), "plic: write to unmapped offset"),
            },
        }
    }
}

impl Device for Plic {
    fn name(&self) -> &str {
        "PLIC"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, PLIC_SIZE)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        (self.read_reg(offset & !3) >> ((offset & 3) * 8)) as u8
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        (self.read_reg(offset & !3) >> ((offset & 3) * 8)) as u16
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        self.read_reg(offset & !3)
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        u64::from(self.read_reg(offset & !3))
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        self.write_reg(offset & !3, u32::from(val));
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        self.write_reg(offset & !3, u32::from(val));
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        self.write_reg(offset & !3, val);
    }

    fn write_u64(&mut self, offset: u64, val: u64) {
        self.write_reg(offset & !3, val as u32);
    }

    fn reset(&mut self) {
        self.priorities.fill(0);
        self.pending.fill(0);
        self.in_flight.fill(0);
        for map in &mut self.enables {
            map.fill(0);
        }
        self.thresholds.fill(0);
        self.claimed.fill(0);
        self.delivered.fill(false);
    }
}
