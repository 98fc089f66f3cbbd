//! Load/Store Unit (LSU).
//!
//! Width and extension rules for loads and stores, and the read-modify-write ALU
//! of the atomic (A) extension in [`atomic`].

/// Atomic memory operation ALU (RISC-V A extension).
pub mod atomic;

use crate::isa::rv64i::funct3;

/// A load or store access width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemWidth {
    /// 1 byte.
    Byte,
    /// 2 bytes.
    Half,
    /// 4 bytes.
    Word,
    /// 8 bytes.
    Double,
}

impl MemWidth {
    /// Returns the access size in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }
}

/// Width and signedness of a load, decoded from funct3.
///
/// # Returns
///
/// `(width, sign_extend)`, or `None` for the reserved encoding.
pub const fn load_kind(f3: u32) -> Option<(MemWidth, bool)> {
    match f3 {
        funct3::LB => Some((MemWidth::Byte, true)),
        funct3::LH => Some((MemWidth::Half, true)),
        funct3::LW => Some((MemWidth::Word, true)),
        funct3::LD => Some((MemWidth::Double, false)),
        funct3::LBU => Some((MemWidth::Byte, false)),
        funct3::LHU => Some((MemWidth::Half, false)),
        funct3::LWU => Some((MemWidth::Word, false)),
        _ => None,
    }
}

/// Width of a store, decoded from funct3.
pub const fn store_width(f3: u32) -> Option<MemWidth> {
    match f3 {
        funct3::SB => Some(MemWidth::Byte),
        funct3::SH => Some(MemWidth::Half),
        funct3::SW => Some(MemWidth::Word),
        funct3::SD => Some(MemWidth::Double),
        _ => None,
    }
}

/// Extends a raw loaded value to 64 bits.
///
/// # Arguments
///
/// * `raw` - The value read from the bus, zero-extended.
/// * `width` - The access width.
/// * `signed` - Whether to sign-extend from the top bit of `width`.
pub const fn extend(raw: u64, width: MemWidth, signed: bool) -> u64 {
    match (width, signed) {
        (MemWidth::Byte, true) => raw as i8 as i64 as u64,
        (MemWidth::Half, true) => raw as i16 as i64 as u64,
        (MemWidth::Word, true) => raw as i32 as i64 as u64,
        (MemWidth::Byte, false) => raw & 0xFF,
        (MemWidth::Half, false) => raw & 0xFFFF,
        (MemWidth::Word, false) => raw & 0xFFFF_FFFF,
        (MemWidth::Double, _) => raw,
    }
}
