//! Instruction disassembler.
//!
//! Renders the instructions the hart implements in assembler syntax with ABI register
//! names. Used by the per-instruction trace, the CLI `disasm` command and snapshots.
//! Anything the hart would reject renders as `unknown`.
//!
//! ```
//! use rvhart_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x00a0_0513), "addi a0, zero, 10");
//! ```

use crate::isa::abi::{fpr_name as freg, gpr_name as xreg};
use crate::isa::decode::{imm_b, imm_i, imm_j, imm_s, imm_u};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys;
use crate::isa::rv64i::{funct3 as f3, funct7 as f7, opcodes as op};
use crate::isa::{rv64a, rv64f, rv64m};

/// Disassembles a 32-bit instruction word.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction encoding.
///
/// # Returns
///
/// A mnemonic like `"add a0, a1, a2"`, or `"unknown 0x........"`.
pub fn disassemble(inst: u32) -> String {
    render(inst).unwrap_or_else(|| format!("unknown {inst:#010x}"))
}

fn render(inst: u32) -> Option<String> {
    let (rd, rs1, rs2) = (inst.rd(), inst.rs1(), inst.rs2());
    let funct3 = inst.funct3();

    let text = match inst.opcode() {
        op::OP_REG => format!("{} {}, {}, {}", reg_mnemonic(inst, false)?, xreg(rd), xreg(rs1), xreg(rs2)),
        op::OP_REG_32 => format!("{} {}, {}, {}", reg_mnemonic(inst, true)?, xreg(rd), xreg(rs1), xreg(rs2)),
        op::OP_IMM => imm_text(inst, false)?,
        op::OP_IMM_32 => imm_text(inst, true)?,
        op::OP_LOAD => {
            let mn = match funct3 {
                f3::LB => "lb",
                f3::LH => "lh",
                f3::LW => "lw",
                f3::LD => "ld",
                f3::LBU => "lbu",
                f3::LHU => "lhu",
                f3::LWU => "lwu",
                _ => return None,
            };
            format!("{mn} {}, {}({})", xreg(rd), imm_i(inst), xreg(rs1))
        }
        op::OP_STORE => {
            let mn = match funct3 {
                f3::SB => "sb",
                f3::SH => "sh",
                f3::SW => "sw",
                f3::SD => "sd",
                _ => return None,
            };
            format!("{mn} {}, {}({})", xreg(rs2), imm_s(inst), xreg(rs1))
        }
        op::OP_BRANCH => {
            let mn = match funct3 {
                f3::BEQ => "beq",
                f3::BNE => "bne",
                f3::BLT => "blt",
                f3::BGE => "bge",
                f3::BLTU => "bltu",
                f3::BGEU => "bgeu",
                _ => return None,
            };
            format!("{mn} {}, {}, {}", xreg(rs1), xreg(rs2), imm_b(inst))
        }
        op::OP_LUI => format!("lui {}, {:#x}", xreg(rd), (imm_u(inst) >> 12) & 0xF_FFFF),
        op::OP_AUIPC => format!("auipc {}, {:#x}", xreg(rd), (imm_u(inst) >> 12) & 0xF_FFFF),
        op::OP_JAL => format!("jal {}, {}", xreg(rd), imm_j(inst)),
        op::OP_JALR if funct3 == 0 => format!("jalr {}, {}({})", xreg(rd), imm_i(inst), xreg(rs1)),
        op::OP_MISC_MEM => match funct3 {
            f3::FENCE => "fence".to_string(),
            f3::FENCE_I => "fence.i".to_string(),
            _ => return None,
        },
        rv64a::OP_AMO => amo_text(inst)?,
        rv64f::OP_LOAD_FP if funct3 == rv64f::WIDTH_S => {
            format!("flw {}, {}({})", freg(rd), imm_i(inst), xreg(rs1))
        }
        rv64f::OP_STORE_FP if funct3 == rv64f::WIDTH_S => {
            format!("fsw {}, {}({})", freg(rs2), imm_s(inst), xreg(rs1))
        }
        rv64f::OP_FP => fp_text(inst)?,
        sys::OP_SYSTEM => system_text(inst)?,
        _ => return None,
    };
    Some(text)
}

fn reg_mnemonic(inst: u32, word: bool) -> Option<&'static str> {
    let funct7 = inst.funct7();
    if funct7 == rv64m::M_EXTENSION {
        return match (inst.funct3(), word) {
            (rv64m::MUL, false) => Some("mul"),
            (rv64m::MULH, false) => Some("mulh"),
            (rv64m::MULHSU, false) => Some("mulhsu"),
            (rv64m::MULHU, false) => Some("mulhu"),
            (rv64m::DIV, false) => Some("div"),
            (rv64m::DIVU, false) => Some("divu"),
            (rv64m::REM, false) => Some("rem"),
            (rv64m::REMU, false) => Some("remu"),
            (rv64m::MUL, true) => Some("mulw"),
            (rv64m::DIV, true) => Some("divw"),
            (rv64m::DIVU, true) => Some("divuw"),
            (rv64m::REM, true) => Some("remw"),
            (rv64m::REMU, true) => Some("remuw"),
            _ => None,
        };
    }
    match (inst.funct3(), funct7, word) {
        (f3::ADD_SUB, f7::DEFAULT, false) => Some("add"),
        (f3::ADD_SUB, f7::ALT, false) => Some("sub"),
        (f3::SLL, f7::DEFAULT, false) => Some("sll"),
        (f3::SLT, f7::DEFAULT, false) => Some("slt"),
        (f3::SLTU, f7::DEFAULT, false) => Some("sltu"),
        (f3::XOR, f7::DEFAULT, false) => Some("xor"),
        (f3::SRL_SRA, f7::DEFAULT, false) => Some("srl"),
        (f3::SRL_SRA, f7::ALT, false) => Some("sra"),
        (f3::OR, f7::DEFAULT, false) => Some("or"),
        (f3::AND, f7::DEFAULT, false) => Some("and"),
        (f3::ADD_SUB, f7::DEFAULT, true) => Some("addw"),
        (f3::ADD_SUB, f7::ALT, true) => Some("subw"),
        (f3::SLL, f7::DEFAULT, true) => Some("sllw"),
        (f3::SRL_SRA, f7::DEFAULT, true) => Some("srlw"),
        (f3::SRL_SRA, f7::ALT, true) => Some("sraw"),
        _ => None,
    }
}

fn imm_text(inst: u32, word: bool) -> Option<String> {
    let (rd, rs1, imm) = (xreg(inst.rd()), xreg(inst.rs1()), imm_i(inst));
    let shamt = if word { inst.shamt() & 0x1F } else { inst.shamt() };
    let hi6 = inst >> 26;
    let text = match (inst.funct3(), word) {
        (f3::ADD_SUB, false) => format!("addi {rd}, {rs1}, {imm}"),
        (f3::ADD_SUB, true) => format!("addiw {rd}, {rs1}, {imm}"),
        (f3::SLT, false) => format!("slti {rd}, {rs1}, {imm}"),
        (f3::SLTU, false) => format!("sltiu {rd}, {rs1}, {imm}"),
        (f3::XOR, false) => format!("xori {rd}, {rs1}, {imm}"),
        (f3::OR, false) => format!("ori {rd}, {rs1}, {imm}"),
        (f3::AND, false) => format!("andi {rd}, {rs1}, {imm}"),
        (f3::SLL, _) if hi6 == 0 => format!("slli{} {rd}, {rs1}, {shamt}", if word { "w" } else { "" }),
        (f3::SRL_SRA, _) if hi6 == 0 => {
            format!("srli{} {rd}, {rs1}, {shamt}", if word { "w" } else { "" })
        }
        (f3::SRL_SRA, _) if hi6 == f7::SRAI_HI6 => {
            format!("srai{} {rd}, {rs1}, {shamt}", if word { "w" } else { "" })
        }
        _ => return None,
    };
    Some(text)
}

fn amo_text(inst: u32) -> Option<String> {
    let width = match inst.funct3() {
        rv64a::WIDTH_W => "w",
        rv64a::WIDTH_D => "d",
        _ => return None,
    };
    let (rd, rs1, rs2) = (xreg(inst.rd()), xreg(inst.rs1()), xreg(inst.rs2()));
    let name = match inst.funct5() {
        rv64a::LR => return Some(format!("lr.{width} {rd}, ({rs1})")),
        rv64a::SC => "sc",
        rv64a::AMOSWAP => "amoswap",
        rv64a::AMOADD => "amoadd",
        rv64a::AMOXOR => "amoxor",
        rv64a::AMOAND => "amoand",
        rv64a::AMOOR => "amoor",
        rv64a::AMOMIN => "amomin",
        rv64a::AMOMAX => "amomax",
        rv64a::AMOMINU => "amominu",
        rv64a::AMOMAXU => "amomaxu",
        _ => return None,
    };
    Some(format!("{name}.{width} {rd}, {rs2}, ({rs1})"))
}

fn fp_text(inst: u32) -> Option<String> {
    let (rd, rs1, rs2) = (freg(inst.rd()), freg(inst.rs1()), freg(inst.rs2()));
    let name = match (inst.funct7(), inst.funct3()) {
        (rv64f::FADD, _) => "fadd.s",
        (rv64f::FSUB, _) => "fsub.s",
        (rv64f::FMUL, _) => "fmul.s",
        (rv64f::FDIV, _) => "fdiv.s",
        (rv64f::FSQRT, _) if inst.rs2() == 0 => return Some(format!("fsqrt.s {rd}, {rs1}")),
        (rv64f::FSGNJ, rv64f::SGNJ) => "fsgnj.s",
        (rv64f::FSGNJ, rv64f::SGNJN) => "fsgnjn.s",
        (rv64f::FSGNJ, rv64f::SGNJX) => "fsgnjx.s",
        (rv64f::FMIN_MAX, rv64f::MIN) => "fmin.s",
        (rv64f::FMIN_MAX, rv64f::MAX) => "fmax.s",
        _ => return None,
    };
    Some(format!("{name} {rd}, {rs1}, {rs2}"))
}

fn system_text(inst: u32) -> Option<String> {
    let csr = inst.csr();
    let (rd, rs1) = (xreg(inst.rd()), inst.rs1());
    let text = match inst.funct3() {
        sys::PRIV => match inst {
            sys::ECALL => "ecall".to_string(),
            sys::EBREAK => "ebreak".to_string(),
            sys::URET => "uret".to_string(),
            sys::SRET => "sret".to_string(),
            sys::MRET => "mret".to_string(),
            sys::WFI => "wfi".to_string(),
            _ if inst.funct7() == sys::SFENCE_VMA_FUNCT7 && inst.rd() == 0 => {
                format!("sfence.vma {}, {}", xreg(rs1), xreg(inst.rs2()))
            }
            _ => return None,
        },
        sys::CSRRW => format!("csrrw {rd}, {csr:#x}, {}", xreg(rs1)),
        sys::CSRRS => format!("csrrs {rd}, {csr:#x}, {}", xreg(rs1)),
        sys::CSRRC => format!("csrrc {rd}, {csr:#x}, {}", xreg(rs1)),
        sys::CSRRWI => format!("csrrwi {rd}, {csr:#x}, {rs1}"),
        sys::CSRRSI => format!("csrrsi {rd}, {csr:#x}, {rs1}"),
        sys::CSRRCI => format!("csrrci {rd}, {csr:#x}, {rs1}"),
        _ => return None,
    };
    Some(text)
}
