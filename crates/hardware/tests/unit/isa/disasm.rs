//! Disassembler output tests.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvhart_core::isa::disasm::disassemble;

use crate::common::builder::{EBREAK, ECALL, InstructionBuilder, MRET, WFI};

fn b() -> InstructionBuilder {
    InstructionBuilder::new()
}

#[rstest]
#[case(b().addi(10, 0, 10).build(), "addi a0, zero, 10")]
#[case(b().add(3, 1, 2).build(), "add gp, ra, sp")]
#[case(b().sub(5, 6, 7).build(), "sub t0, t1, t2")]
#[case(b().mul(10, 11, 12).build(), "mul a0, a1, a2")]
#[case(b().addiw(10, 10, -1).build(), "addiw a0, a0, -1")]
#[case(b().slli(5, 5, 3).build(), "slli t0, t0, 3")]
#[case(b().srai(5, 5, 63).build(), "srai t0, t0, 63")]
#[case(b().ld(10, 2, 16).build(), "ld a0, 16(sp)")]
#[case(b().sw(2, 11, -4).build(), "sw a1, -4(sp)")]
#[case(b().beq(10, 0, -8).build(), "beq a0, zero, -8")]
#[case(b().jal(1, 2048).build(), "jal ra, 2048")]
#[case(b().jalr(0, 1, 0).build(), "jalr zero, 0(ra)")]
#[case(b().lui(5, 0x10000).build(), "lui t0, 0x10000")]
#[case(b().lr_d(10, 11).build(), "lr.d a0, (a1)")]
#[case(b().sc_d(12, 11, 13).build(), "sc.d a2, a3, (a1)")]
#[case(b().amoadd_w(10, 11, 12).build(), "amoadd.w a0, a2, (a1)")]
#[case(b().flw(1, 10, 0).build(), "flw ft1, 0(a0)")]
#[case(b().fadd_s(0, 1, 2).build(), "fadd.s ft0, ft1, ft2")]
#[case(b().csrrw(0, 0x305, 5).build(), "csrrw zero, 0x305, t0")]
#[case(b().csrrwi(10, 0x340, 7).build(), "csrrwi a0, 0x340, 7")]
#[case(b().sfence_vma(0, 0).build(), "sfence.vma zero, zero")]
#[case(b().fence().build(), "fence")]
#[case(ECALL, "ecall")]
#[case(EBREAK, "ebreak")]
#[case(MRET, "mret")]
#[case(WFI, "wfi")]
fn renders_assembler_syntax(#[case] inst: u32, #[case] text: &str) {
    assert_eq!(disassemble(inst), text);
}

#[test]
fn unknown_words_render_as_unknown() {
    assert_eq!(disassemble(0x0000_0000), "unknown 0x00000000");
    assert_eq!(disassemble(0xFFFF_FFFF), "unknown 0xffffffff");
}
