//! RISC-V Instruction Decoder.
//!
//! Turns a 32-bit encoding into a `Decoded` record. Opcode selects the immediate
//! format; every immediate is sign-extended to 64 bits exactly as the standard
//! bit layouts prescribe. Unknown opcodes still decode (with no immediate) so the
//! dispatcher can raise the illegal-instruction trap itself.

use crate::isa::instruction::{Decoded, ImmFormat, InstructionBits};
use crate::isa::rv64f;
use crate::isa::rv64i::opcodes;

/// Decodes a RISC-V instruction into its component fields.
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding to decode.
///
/// # Returns
///
/// A `Decoded` structure containing all extracted instruction fields.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();
    let format = format_of(opcode);

    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        format,
        imm: immediate(inst, format),
    }
}

/// Returns the immediate layout used by `opcode`.
pub const fn format_of(opcode: u32) -> ImmFormat {
    match opcode {
        opcodes::OP_IMM
        | opcodes::OP_IMM_32
        | opcodes::OP_LOAD
        | opcodes::OP_JALR
        | rv64f::OP_LOAD_FP => ImmFormat::I,
        opcodes::OP_STORE | rv64f::OP_STORE_FP => ImmFormat::S,
        opcodes::OP_BRANCH => ImmFormat::B,
        opcodes::OP_LUI | opcodes::OP_AUIPC => ImmFormat::U,
        opcodes::OP_JAL => ImmFormat::J,
        _ => ImmFormat::None,
    }
}

/// Extracts the immediate of `inst` using `format`.
pub const fn immediate(inst: u32, format: ImmFormat) -> i64 {
    match format {
        ImmFormat::None => 0,
        ImmFormat::I => imm_i(inst),
        ImmFormat::S => imm_s(inst),
        ImmFormat::B => imm_b(inst),
        ImmFormat::U => imm_u(inst),
        ImmFormat::J => imm_j(inst),
    }
}

/// I-type: `imm[11:0] | rs1 | funct3 | rd | opcode`.
pub const fn imm_i(inst: u32) -> i64 {
    ((inst as i32) >> 20) as i64
}

/// S-type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
pub const fn imm_s(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// B-type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
pub const fn imm_b(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 1;
    sign_extend(
        (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1),
        13,
    )
}

/// U-type: `imm[31:12] | rd | opcode`, already shifted into place.
pub const fn imm_u(inst: u32) -> i64 {
    ((inst & 0xFFFF_F000) as i32) as i64
}

/// J-type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
pub const fn imm_j(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 1;
    sign_extend(
        (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1),
        21,
    )
}

/// Sign extends the low `bits` of `val` to 64 bits.
const fn sign_extend(val: u32, bits: u32) -> i64 {
    let shift = 32 - bits;
    (((val << shift) as i32) >> shift) as i64
}
