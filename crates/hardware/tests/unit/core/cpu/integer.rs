//! RV64IM instruction tests.

use pretty_assertions::assert_eq;
use rvhart_core::common::Trap;
use rvhart_core::core::StepOutcome;
use rvhart_core::core::arch::csr::{MCAUSE, MEPC, MTVAL, MTVEC};
use rvhart_core::sim::HaltReason;

use crate::common::builder::InstructionBuilder as I;
use crate::common::harness::{RAM_BASE, TestContext};

const HANDLER: u64 = RAM_BASE + 0x100;

fn with_handler(program: &[u32]) -> TestContext {
    let mut ctx = TestContext::with_program(program);
    ctx.cpu_mut().csrs.set(MTVEC, HANDLER);
    ctx
}

#[test]
fn add_program_runs_to_zero_word() {
    let mut ctx = TestContext::with_program(&[
        I::new().addi(1, 0, 5).build(),
        I::new().addi(2, 0, 10).build(),
        I::new().add(3, 1, 2).build(),
    ]);

    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 12 });
    assert_eq!(ctx.get_reg(3), 15);
    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.sim.executed(), 3);
}

#[test]
fn writes_to_x0_are_discarded() {
    let mut ctx = TestContext::with_program(&[I::new().addi(0, 0, 5).build()]);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(0), 0);
}

#[test]
fn countdown_loop_branches_back() {
    let mut ctx = TestContext::with_program(&[
        I::new().addi(1, 0, 3).build(),
        I::new().addi(2, 2, 1).build(),
        I::new().addi(1, 1, -1).build(),
        I::new().bne(1, 0, -8).build(),
    ]);

    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 16 });
    assert_eq!(ctx.get_reg(2), 3);
}

#[test]
fn jal_and_jalr_link_the_next_pc() {
    let mut ctx = TestContext::with_program(&[
        I::new().jal(1, 8).build(),
        I::new().addi(5, 0, 1).build(),
        I::new().jalr(6, 1, 0).build(),
    ]);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 8);
    assert_eq!(ctx.get_reg(1), RAM_BASE + 4);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 4);
    assert_eq!(ctx.get_reg(6), RAM_BASE + 12);
}

#[test]
fn upper_immediates() {
    let mut ctx = TestContext::with_program(&[
        I::new().lui(1, 0x80000).build(),
        I::new().auipc(2, 1).build(),
    ]);
    let _ = ctx.step_n(2);
    assert_eq!(ctx.get_reg(1), 0xFFFF_FFFF_8000_0000);
    assert_eq!(ctx.get_reg(2), RAM_BASE + 4 + 0x1000);
}

#[test]
fn word_ops_sign_extend() {
    let mut ctx = TestContext::with_program(&[
        I::new().lui(1, 0x7FFFF).build(),
        I::new().addiw(2, 1, 0x7FF).build(),
        I::new().addiw(3, 2, 0x7FF).build(),
        I::new().addiw(4, 3, 2).build(),
    ]);
    let _ = ctx.step_n(4);
    assert_eq!(ctx.get_reg(2), 0x7FFF_F7FF);
    assert_eq!(ctx.get_reg(3), 0x7FFF_FFFE);
    assert_eq!(ctx.get_reg(4), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn multiply_and_divide() {
    let mut ctx = TestContext::with_program(&[
        I::new().mul(3, 1, 2).build(),
        I::new().div(4, 1, 0).build(),
        I::new().div(5, 1, 2).build(),
    ]);
    ctx.set_reg(1, (-21i64) as u64);
    ctx.set_reg(2, 4);
    let _ = ctx.step_n(3);

    assert_eq!(ctx.get_reg(3) as i64, -84);
    assert_eq!(ctx.get_reg(4), u64::MAX, "division by zero");
    assert_eq!(ctx.get_reg(5) as i64, -5, "rounds toward zero");
}

#[test]
fn shifts_by_immediate() {
    let mut ctx = TestContext::with_program(&[
        I::new().slli(2, 1, 60).build(),
        I::new().srai(3, 2, 62).build(),
    ]);
    ctx.set_reg(1, 0xF);
    let _ = ctx.step_n(2);
    assert_eq!(ctx.get_reg(2), 0xF000_0000_0000_0000);
    assert_eq!(ctx.get_reg(3), u64::MAX);
}

#[test]
fn loads_extend_by_width() {
    let mut ctx = TestContext::with_program(&[
        I::new().addi(2, 0, -2).build(),
        I::new().sd(1, 2, 0).build(),
        I::new().lw(3, 1, 0).build(),
        I::new().lbu(4, 1, 0).build(),
        I::new().ld(5, 1, 0).build(),
        I::new().sb(1, 0, 1).build(),
        I::new().ld(6, 1, 0).build(),
    ]);
    ctx.set_reg(1, RAM_BASE + 0x200);
    let _ = ctx.step_n(7);

    assert_eq!(ctx.get_reg(3), u64::MAX - 1);
    assert_eq!(ctx.get_reg(4), 0xFE);
    assert_eq!(ctx.get_reg(5), u64::MAX - 1);
    assert_eq!(ctx.get_reg(6), 0xFFFF_FFFF_FFFF_00FE);
}

#[test]
fn misaligned_plain_access_is_permitted() {
    let mut ctx = TestContext::with_program(&[
        I::new().sw(1, 2, 1).build(),
        I::new().lw(3, 1, 1).build(),
    ]);
    ctx.set_reg(1, RAM_BASE + 0x200);
    ctx.set_reg(2, 0x1234_5678);
    assert_eq!(ctx.step_n(2), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(3), 0x1234_5678);
}

#[test]
fn misaligned_jump_target_traps_at_the_jump() {
    let mut ctx = with_handler(&[I::new().jal(1, 6).build()]);

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::InstructionAddressMisaligned(RAM_BASE + 6))
    );
    let csrs = &ctx.cpu().csrs;
    assert_eq!(csrs.get(MEPC), RAM_BASE);
    assert_eq!(csrs.get(MCAUSE), 0);
    assert_eq!(csrs.get(MTVAL), RAM_BASE + 6);
    assert_eq!(ctx.cpu().pc, HANDLER);
    assert_eq!(ctx.get_reg(1), 0, "rd is not written");
}

#[test]
fn misaligned_branch_target_traps_only_when_taken() {
    let mut ctx = with_handler(&[
        I::new().beq(0, 1, 6).build(),
        I::new().beq(0, 0, 6).build(),
    ]);
    ctx.set_reg(1, 1);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::InstructionAddressMisaligned(RAM_BASE + 10))
    );
}

#[test]
fn illegal_word_reports_its_bits() {
    let mut ctx = with_handler(&[0xFFFF_FFFF]);

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(0xFFFF_FFFF)));
    assert_eq!(ctx.cpu().csrs.get(MCAUSE), 2);
    assert_eq!(ctx.cpu().csrs.get(MTVAL), 0xFFFF_FFFF);
}

#[test]
fn unmapped_load_is_access_fault() {
    let mut ctx = with_handler(&[I::new().lw(1, 0, 0x40).build()]);

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::LoadAccessFault(0x40)));
    assert_eq!(ctx.cpu().csrs.get(MCAUSE), 5);
    assert_eq!(ctx.cpu().csrs.get(MTVAL), 0x40);
}

#[test]
fn fetch_outside_ram_is_access_fault() {
    let mut ctx = with_handler(&[I::new().jalr(0, 1, 0).build()]);
    ctx.set_reg(1, 0x4000_0000);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::InstructionAccessFault(0x4000_0000)));
    assert_eq!(ctx.cpu().csrs.get(MEPC), 0x4000_0000);
}

#[test]
fn fence_is_a_no_op() {
    let mut ctx = TestContext::with_program(&[I::new().fence().build()]);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 4);
}
