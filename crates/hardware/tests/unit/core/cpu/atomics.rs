//! LR/SC and AMO execution.

use rvhart_core::common::Trap;
use rvhart_core::core::StepOutcome;
use rvhart_core::core::arch::csr::MTVEC;

use crate::common::builder::{ECALL, InstructionBuilder as I};
use crate::common::harness::{RAM_BASE, TestContext};

const DATA: u64 = RAM_BASE + 0x400;

fn context(program: &[u32], initial: u64) -> TestContext {
    let mut ctx = TestContext::with_program(program);
    ctx.cpu_mut().csrs.set(MTVEC, RAM_BASE + 0x100);
    let Ok(()) = ctx.cpu_mut().store(DATA, initial, 8) else {
        panic!("data word is in RAM");
    };
    ctx.set_reg(1, DATA);
    ctx
}

fn memory(ctx: &mut TestContext, addr: u64) -> u64 {
    let Ok(val) = ctx.cpu_mut().load(addr, 8) else {
        panic!("{addr:#x} is in RAM");
    };
    val
}

#[test]
fn lr_then_sc_succeeds() {
    let mut ctx = context(
        &[I::new().lr_d(3, 1).build(), I::new().sc_d(4, 1, 2).build()],
        0x1111,
    );
    ctx.set_reg(2, 0x2222);

    let _ = ctx.step();
    assert_eq!(ctx.get_reg(3), 0x1111);
    assert_eq!(ctx.cpu().reservation, Some(DATA));

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(4), 0);
    assert_eq!(memory(&mut ctx, DATA), 0x2222);
    assert_eq!(ctx.cpu().reservation, None);
}

#[test]
fn sc_without_reservation_fails() {
    let mut ctx = context(&[I::new().sc_d(4, 1, 2).build()], 0x1111);
    ctx.set_reg(2, 0x2222);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(4), 1);
    assert_eq!(memory(&mut ctx, DATA), 0x1111);
}

#[test]
fn intervening_store_breaks_the_reservation() {
    let mut ctx = context(
        &[
            I::new().lr_d(3, 1).build(),
            I::new().sw(1, 0, 4).build(),
            I::new().sc_d(4, 1, 2).build(),
        ],
        0x1111,
    );
    let _ = ctx.step_n(3);
    assert_eq!(ctx.get_reg(4), 1);
}

#[test]
fn store_elsewhere_keeps_the_reservation() {
    let mut ctx = context(
        &[
            I::new().lr_d(3, 1).build(),
            I::new().sw(1, 0, 8).build(),
            I::new().sc_d(4, 1, 2).build(),
        ],
        0x1111,
    );
    let _ = ctx.step_n(3);
    assert_eq!(ctx.get_reg(4), 0);
}

#[test]
fn trap_between_lr_and_sc_fails_the_sc() {
    let mut ctx = context(&[I::new().lr_d(3, 1).build(), ECALL], 0);
    let _ = ctx.step_n(2);
    assert_eq!(ctx.cpu().reservation, None);
}

#[test]
fn amoadd_w_returns_old_value_sign_extended() {
    let mut ctx = context(&[I::new().amoadd_w(3, 1, 2).build()], 0x7FFF_FFFF);
    ctx.set_reg(2, 1);

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(3), 0x7FFF_FFFF);
    assert_eq!(memory(&mut ctx, DATA), 0x8000_0000, "upper word untouched");
}

#[test]
fn amoswap_d_exchanges() {
    let mut ctx = context(&[I::new().amoswap_d(3, 1, 2).build()], 0xAAAA);
    ctx.set_reg(2, 0xBBBB);

    let _ = ctx.step();
    assert_eq!(ctx.get_reg(3), 0xAAAA);
    assert_eq!(memory(&mut ctx, DATA), 0xBBBB);
}

#[test]
fn misaligned_atomics_trap() {
    let mut ctx = context(
        &[
            I::new().lr_d(3, 1).build(),
            I::new().sc_d(3, 1, 2).build(),
            I::new().amoadd_w(3, 1, 2).build(),
        ],
        0,
    );
    ctx.set_reg(1, DATA + 4);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::LoadAddressMisaligned(DATA + 4)));

    ctx.cpu_mut().pc = RAM_BASE + 4;
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::StoreAddressMisaligned(DATA + 4)));

    ctx.cpu_mut().pc = RAM_BASE + 8;
    ctx.set_reg(1, DATA + 2);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::StoreAddressMisaligned(DATA + 2)));
}

#[test]
fn amo_on_unmapped_address_is_store_access_fault() {
    let mut ctx = context(&[I::new().amoswap_d(3, 1, 2).build()], 0);
    ctx.set_reg(1, 0x40);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::StoreAccessFault(0x40)));
}
