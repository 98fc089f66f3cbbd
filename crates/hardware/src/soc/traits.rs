//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by all bus-attached components. It provides:
//! 1. **Identification:** `name`, `address_range` and `contains` for bus routing.
//! 2. **Access:** Byte, half, word, and doubleword read/write at device-relative offsets,
//!    plus size-generic `read`/`write` used by the bus.
//! 3. **Lifecycle:** `tick` for devices with background work and `reset` for reboot.
//!
//! Implementors must be `Send`; devices are shared between the hart and stimulus
//! sources as `Arc<Mutex<_>>`.

/// Trait for memory-mapped I/O devices attached to the system bus.
pub trait Device: Send {
    /// Returns a short name for this device (e.g., `"UART0"`, `"CLINT"`).
    fn name(&self) -> &str;
    /// Returns (base_address, size_in_bytes) for this device's MMIO window.
    fn address_range(&self) -> (u64, u64);
    /// Reads one byte at the given device-relative offset.
    fn read_u8(&mut self, offset: u64) -> u8;
    /// Reads two bytes (little-endian) at the given offset.
    fn read_u16(&mut self, offset: u64) -> u16;
    /// Reads four bytes (little-endian) at the given offset.
    fn read_u32(&mut self, offset: u64) -> u32;
    /// Reads eight bytes (little-endian) at the given offset.
    fn read_u64(&mut self, offset: u64) -> u64;
    /// Writes one byte at the given offset.
    fn write_u8(&mut self, offset: u64, val: u8);
    /// Writes two bytes (little-endian) at the given offset.
    fn write_u16(&mut self, offset: u64, val: u16);
    /// Writes four bytes (little-endian) at the given offset.
    fn write_u32(&mut self, offset: u64, val: u32);
    /// Writes eight bytes (little-endian) at the given offset.
    fn write_u64(&mut self, offset: u64, val: u64);

    /// Reads `size` bytes (1, 2, 4 or 8) at the given offset, zero-extended.
    fn read(&mut self, offset: u64, size: usize) -> u64 {
        match size {
            1 => u64::from(self.read_u8(offset)),
            2 => u64::from(self.read_u16(offset)),
            4 => u64::from(self.read_u32(offset)),
            _ => self.read_u64(offset),
        }
    }

    /// Writes the low `size` bytes (1, 2, 4 or 8) of `val` at the given offset.
    fn write(&mut self, offset: u64, val: u64, size: usize) {
        match size {
            1 => self.write_u8(offset, val as u8),
            2 => self.write_u16(offset, val as u16),
            4 => self.write_u32(offset, val as u32),
            _ => self.write_u64(offset, val),
        }
    }

    /// Returns true if the physical address falls inside this device's window.
    fn contains(&self, paddr: u64) -> bool {
        let (base, size) = self.address_range();
        paddr >= base && paddr - base < size
    }

    /// Advances device state between instruction boundaries.
    fn tick(&mut self) {}

    /// Restores power-on register state.
    fn reset(&mut self) {}
}
