//! System interconnect (bus) for memory and MMIO access.
//!
//! This module implements the bus that routes physical address accesses. It provides:
//! 1. **Device registration:** MMIO regions are kept sorted by base address.
//! 2. **Access routing:** An ordered-range lookup over the MMIO windows first, then the
//!    RAM window; anything else is a `BusError`.
//! 3. **Fetch fast path:** Word reads for instruction fetch go straight to RAM.
//! 4. **Page table access:** The MMU reads and updates PTEs through [`PhysMemory`].

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::common::{BusError, lock};
use crate::core::units::mmu::PhysMemory;
use crate::soc::memory::Memory;
use crate::soc::traits::Device;

/// A device window registered on the bus.
struct Region {
    base: u64,
    size: u64,
    name: String,
    device: Arc<Mutex<dyn Device>>,
}

impl Region {
    #[inline]
    const fn contains(&self, paddr: u64) -> bool {
        paddr >= self.base && paddr - self.base < self.size
    }
}

/// System bus connecting the hart to RAM and the MMIO devices.
pub struct Bus {
    regions: Vec<Region>,
    ram: Memory,
}

impl Bus {
    /// Creates a bus with the given RAM and no devices.
    ///
    /// # Arguments
    ///
    /// * `ram` - The flat RAM window used for every address no device claims.
    pub fn new(ram: Memory) -> Self {
        Self {
            regions: Vec::new(),
            ram,
        }
    }

    /// Registers a device; regions are kept sorted by base address for lookup.
    ///
    /// # Arguments
    ///
    /// * `device` - The shared device handle.
    pub fn add_device(&mut self, device: Arc<Mutex<dyn Device>>) {
        let (base, size, name) = {
            let dev = lock(&device);
            let (base, size) = dev.address_range();
            (base, size, dev.name().to_owned())
        };
        debug!(device = %name, base = format_args!("{base:#x}"), size = format_args!("{size:#x}"), "bus: region added");
        let at = self.regions.partition_point(|r| r.base < base);
        self.regions.insert(
            at,
            Region {
                base,
                size,
                name,
                device,
            },
        );
    }

    /// Returns the RAM window.
    pub const fn ram(&self) -> &Memory {
        &self.ram
    }

    /// Returns the RAM window mutably.
    pub fn ram_mut(&mut self) -> &mut Memory {
        &mut self.ram
    }

    /// Returns the names and ranges of the registered MMIO regions, in address order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, u64, u64)> {
        self.regions.iter().map(|r| (r.name.as_str(), r.base, r.size))
    }

    #[inline]
    fn find_region(&self, paddr: u64) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.base <= paddr);
        let region = self.regions.get(idx.checked_sub(1)?)?;
        region.contains(paddr).then_some(region)
    }

    /// Returns true if any device or RAM answers at `paddr`.
    pub fn is_mapped(&self, paddr: u64) -> bool {
        self.find_region(paddr).is_some() || self.ram.offset_of(paddr, 1).is_some()
    }

    /// Reads `size` bytes (1, 2, 4 or 8) at a physical address.
    ///
    /// # Returns
    ///
    /// The zero-extended value or `BusError::Unmapped`.
    pub fn read(&mut self, paddr: u64, size: usize) -> Result<u64, BusError> {
        if let Some(region) = self.find_region(paddr) {
            let offset = paddr - region.base;
            return Ok(lock(&region.device).read(offset, size));
        }
        self.ram
            .read(paddr, size)
            .ok_or(BusError::Unmapped { addr: paddr })
    }

    /// Writes the low `size` bytes of `val` at a physical address.
    pub fn write(&mut self, paddr: u64, val: u64, size: usize) -> Result<(), BusError> {
        if let Some(region) = self.find_region(paddr) {
            let offset = paddr - region.base;
            lock(&region.device).write(offset, val, size);
            return Ok(());
        }
        self.ram
            .write(paddr, val, size)
            .ok_or(BusError::Unmapped { addr: paddr })
    }

    /// Instruction fetch fast path: reads a word from RAM without the MMIO lookup.
    ///
    /// Falls back to the full routing path for addresses outside RAM.
    #[inline]
    pub fn fetch_u32(&mut self, paddr: u64) -> Result<u32, BusError> {
        match self.ram.read_u32(paddr) {
            Some(word) => Ok(word),
            None => self.read(paddr, 4).map(|v| v as u32),
        }
    }

    /// Copies a binary blob into RAM at a physical address.
    pub fn load(&mut self, paddr: u64, data: &[u8]) -> Result<(), BusError> {
        self.ram
            .load(paddr, data)
            .ok_or(BusError::Unmapped { addr: paddr })
    }

    /// Zeroes RAM and resets every registered device.
    pub fn reset(&mut self) {
        self.ram.clear();
        for region in &self.regions {
            lock(&region.device).reset();
        }
    }
}

impl PhysMemory for Bus {
    fn read_u64(&mut self, paddr: u64) -> Result<u64, BusError> {
        self.read(paddr, 8)
    }

    fn write_u64(&mut self, paddr: u64, val: u64) -> Result<(), BusError> {
        self.write(paddr, val, 8)
    }
}
