//! Zicsr instruction tests.

use std::sync::atomic::Ordering;

use rstest::rstest;
use rvhart_core::common::Trap;
use rvhart_core::core::StepOutcome;
use rvhart_core::core::arch::csr::{
    MCAUSE, MHARTID, MINSTRET, MSCRATCH, MSTATUS, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MTVAL, MTVEC, SSCRATCH, TIME,
};
use rvhart_core::core::arch::mode::PrivilegeMode;

use crate::common::builder::InstructionBuilder as I;
use crate::common::harness::{RAM_BASE, TestContext};

/// An address no CSR occupies.
const UNIMPLEMENTED: u16 = 0x7C0;

fn context(program: &[u32]) -> TestContext {
    let mut ctx = TestContext::with_program(program);
    ctx.cpu_mut().csrs.set(MTVEC, RAM_BASE + 0x100);
    ctx
}

#[test]
fn swap_set_and_clear() {
    let mut ctx = context(&[
        I::new().addi(1, 0, 0xF0).build(),
        I::new().csrrw(0, MSCRATCH, 1).build(),
        I::new().addi(2, 0, 0x30).build(),
        I::new().csrrc(3, MSCRATCH, 2).build(),
        I::new().csrrs(4, MSCRATCH, 0).build(),
        I::new().csrrsi(5, MSCRATCH, 0x3).build(),
    ]);
    assert_eq!(ctx.step_n(6), StepOutcome::Retired);

    assert_eq!(ctx.get_reg(3), 0xF0);
    assert_eq!(ctx.get_reg(4), 0xC0);
    assert_eq!(ctx.get_reg(5), 0xC0);
    assert_eq!(ctx.cpu().csrs.read(MSCRATCH), 0xC3);
}

#[test]
fn immediate_write_zero_extends() {
    let mut ctx = context(&[I::new().csrrwi(1, MSCRATCH, 0x1F).build()]);
    ctx.cpu_mut().csrs.set(MSCRATCH, 7);
    let _ = ctx.step();
    assert_eq!(ctx.get_reg(1), 7);
    assert_eq!(ctx.cpu().csrs.read(MSCRATCH), 0x1F);
}

#[rstest]
#[case(PrivilegeMode::User, MSTATUS)]
#[case(PrivilegeMode::User, SSCRATCH)]
#[case(PrivilegeMode::Supervisor, MSCRATCH)]
fn access_below_minimum_privilege_is_illegal(#[case] mode: PrivilegeMode, #[case] csr: u16) {
    let word = I::new().csrrs(1, csr, 0).build();
    let mut ctx = context(&[word]);
    ctx.cpu_mut().privilege = mode;

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(word)));
    let csrs = &ctx.cpu().csrs;
    assert_eq!(csrs.get(MCAUSE), 2);
    assert_eq!(csrs.get(MTVAL), u64::from(word));
    assert_eq!((csrs.get(MSTATUS) & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT, mode.to_bits());
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::Machine);
}

#[test]
fn supervisor_reaches_its_own_csrs() {
    let mut ctx = context(&[I::new().csrrw(0, SSCRATCH, 1).build()]);
    ctx.cpu_mut().privilege = PrivilegeMode::Supervisor;
    ctx.set_reg(1, 0xABC);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().csrs.read(SSCRATCH), 0xABC);
}

#[test]
fn read_only_csr_rejects_writes_but_allows_reads() {
    let write = I::new().csrrw(0, MHARTID, 1).build();
    let mut ctx = context(&[I::new().csrrs(2, MHARTID, 0).build(), write]);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(write)));
}

#[test]
fn unimplemented_csr_reads_zero_without_trapping() {
    let mut ctx = context(&[
        I::new().csrrw(1, UNIMPLEMENTED, 2).build(),
        I::new().csrrs(3, UNIMPLEMENTED, 0).build(),
    ]);
    ctx.set_reg(1, 0xDEAD);
    ctx.set_reg(2, 0x55);

    assert_eq!(ctx.step_n(2), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.get_reg(3), 0);
}

#[test]
fn time_reads_the_clint_counter() {
    let mut ctx = context(&[I::new().csrrs(1, TIME, 0).build()]);
    ctx.sim.devices().mtime.store(1234, Ordering::Release);
    let _ = ctx.step();
    assert_eq!(ctx.get_reg(1), 1234);
}

#[test]
fn instret_counts_retired_instructions() {
    let mut ctx = context(&[
        I::new().addi(1, 0, 1).build(),
        I::new().addi(1, 1, 1).build(),
        I::new().csrrs(2, MINSTRET, 0).build(),
    ]);
    let _ = ctx.step_n(3);
    assert_eq!(ctx.get_reg(2), 2);
    assert_eq!(ctx.cpu().csrs.get(MINSTRET), 3);
}
