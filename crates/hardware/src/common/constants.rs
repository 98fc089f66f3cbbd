//! Global Constants.
//!
//! This module defines constants used across the emulator. It includes:
//! 1. **Memory Constants:** Page sizes, masks, and shifts for address translation.
//! 2. **Instruction Constants:** Opcode masks, field shifts and instruction width.
//! 3. **Trap Constants:** The interrupt bit of the cause register.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u64 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Width of one Sv39 VPN slice.
pub const VPN_BITS: u32 = 9;

/// Mask for one Sv39 VPN slice.
pub const VPN_SLICE_MASK: u64 = (1 << VPN_BITS) - 1;

/// Bit mask for extracting the opcode field from a RISC-V instruction.
pub const OPCODE_MASK: u32 = 0x7F;

/// Size of a standard (32-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_SIZE: u64 = 4;

/// Bit mask for extracting a register specifier field.
pub const REG_MASK: u32 = 0x1F;

/// Bit position shift for the destination register (rd) field.
pub const RD_SHIFT: u32 = 7;

/// Bit position shift for the first source register (rs1) field.
pub const RS1_SHIFT: u32 = 15;

/// Bit position shift for the second source register (rs2) field.
pub const RS2_SHIFT: u32 = 20;

/// Bit position shift for the third source register (rs3) field.
pub const RS3_SHIFT: u32 = 27;

/// Bit mask indicating that a trap cause represents an interrupt.
pub const CAUSE_INTERRUPT_BIT: u64 = 1 << 63;

/// Encoding of the Wait For Interrupt (WFI) instruction.
pub const WFI_INSTRUCTION: u32 = 0x1050_0073;
