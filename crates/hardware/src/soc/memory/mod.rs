//! Physical System Memory (RAM).
//!
//! This module implements the flat RAM window. It provides:
//! 1. **Buffer:** Backing storage (`DramBuffer`) for RAM contents.
//! 2. **Memory:** Little-endian sized access relative to a physical base address,
//!    used by the bus as the fallback behind the MMIO windows.
//! 3. **Loading:** Bulk copies for boot images and zeroing on reset.

/// DRAM buffer implementation backed by an anonymous mapping.
pub mod buffer;

pub use self::buffer::MemoryError;
use self::buffer::DramBuffer;

/// System RAM mapped at a physical base address.
#[derive(Debug)]
pub struct Memory {
    buffer: DramBuffer,
    base_addr: u64,
}

impl Memory {
    /// Allocates `size` bytes of RAM at `base_addr`.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - Starting physical address.
    /// * `size` - Size in bytes.
    pub fn new(base_addr: u64, size: usize) -> Result<Self, MemoryError> {
        Ok(Self {
            buffer: DramBuffer::new(size)?,
            base_addr,
        })
    }

    /// Returns the base physical address.
    pub const fn base(&self) -> u64 {
        self.base_addr
    }

    /// Returns the size in bytes.
    pub const fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Returns the RAM-relative offset if `[paddr, paddr + len)` lies inside RAM.
    #[inline]
    pub fn offset_of(&self, paddr: u64, len: usize) -> Option<usize> {
        let offset = paddr.checked_sub(self.base_addr)?;
        let end = offset.checked_add(len as u64)?;
        (end <= self.size()).then_some(offset as usize)
    }

    /// Reads `size` bytes (1, 2, 4 or 8) little-endian at a physical address.
    ///
    /// # Returns
    ///
    /// The zero-extended value, or `None` if the access leaves RAM.
    #[inline]
    pub fn read(&self, paddr: u64, size: usize) -> Option<u64> {
        let offset = self.offset_of(paddr, size)?;
        let bytes = self.buffer.get(offset, size)?;
        let mut raw = [0u8; 8];
        raw[..size].copy_from_slice(bytes);
        Some(u64::from_le_bytes(raw))
    }

    /// Writes the low `size` bytes of `val` little-endian at a physical address.
    ///
    /// # Returns
    ///
    /// `None` if the access leaves RAM.
    #[inline]
    pub fn write(&mut self, paddr: u64, val: u64, size: usize) -> Option<()> {
        let offset = self.offset_of(paddr, size)?;
        let dst = self.buffer.get_mut(offset, size)?;
        dst.copy_from_slice(&val.to_le_bytes()[..size]);
        Some(())
    }

    /// Reads a 32-bit word; the instruction fetch fast path.
    #[inline]
    pub fn read_u32(&self, paddr: u64) -> Option<u32> {
        let offset = self.offset_of(paddr, 4)?;
        let bytes = self.buffer.get(offset, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Some(u32::from_le_bytes(raw))
    }

    /// Copies a byte slice into RAM at a physical address.
    ///
    /// Used for loading boot images during system setup.
    pub fn load(&mut self, paddr: u64, data: &[u8]) -> Option<()> {
        let offset = self.offset_of(paddr, data.len())?;
        self.buffer.get_mut(offset, data.len())?.copy_from_slice(data);
        Some(())
    }

    /// Returns `len` bytes of RAM at a physical address.
    pub fn slice(&self, paddr: u64, len: usize) -> Option<&[u8]> {
        let offset = self.offset_of(paddr, len)?;
        self.buffer.get(offset, len)
    }

    /// Zeroes all of RAM.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
