//! Simulator driver tests: stepping, reset and external stimuli.

use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rvhart_core::core::StepOutcome;
use rvhart_core::core::arch::csr::{MIE, MIE_MEIE};
use rvhart_core::sim::{DebugControl, HaltReason, InterruptKind, SimStep};
use rvhart_core::soc::devices::uart::{IER_RDA, UART_IRQ};

use crate::common::builder::{InstructionBuilder as I, NOP, WFI};
use crate::common::harness::{RAM_BASE, TestContext, test_config};

const T0: u32 = 5;
const T1: u32 = 6;

#[test]
fn step_refuses_to_run_past_a_halt() {
    let mut ctx = TestContext::with_program(&[NOP]);
    assert_eq!(ctx.sim.step(), SimStep::Executed(StepOutcome::Retired));
    assert_eq!(
        ctx.sim.step(),
        SimStep::Halted(HaltReason::ZeroWord { pc: RAM_BASE + 4 })
    );
    assert_eq!(ctx.cpu().pc, RAM_BASE + 4);
    assert_eq!(ctx.sim.executed(), 1);
}

#[test]
fn budget_stops_an_endless_loop() {
    let mut config = test_config();
    config.general.max_instructions = Some(10);
    let mut ctx = TestContext::with_config(&config, &[I::new().jal(0, 0).build()]);

    assert_eq!(
        ctx.run_to_halt(),
        HaltReason::InstructionLimit { executed: 10 }
    );
    assert_eq!(ctx.sim.executed(), 10);
    assert_eq!(ctx.cpu().pc, RAM_BASE);
}

#[test]
fn replaced_debug_control_takes_effect() {
    let mut ctx = TestContext::with_program(&[NOP, NOP, NOP, NOP]);
    let debug = DebugControl {
        end_address: Some(RAM_BASE + 8),
        ..*ctx.sim.debug_control()
    };
    ctx.sim.set_debug_control(debug);

    assert_eq!(
        ctx.run_to_halt(),
        HaltReason::EndAddress { pc: RAM_BASE + 8 }
    );
    assert_eq!(ctx.sim.executed(), 2);
}

#[test]
fn reset_reloads_the_image_and_clears_state() {
    let program = [
        I::new().addi(1, 0, 5).build(),
        I::new().auipc(2, 0).build(),
        I::new().sd(2, 1, 64).build(),
        NOP,
    ];
    let mut ctx = TestContext::with_program(&program);
    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 16 });
    assert_eq!(ctx.sim.cpu.bus.read(RAM_BASE + 68, 8), Ok(5));

    ctx.sim.reset().unwrap();
    assert_eq!(ctx.cpu().pc, RAM_BASE);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.sim.executed(), 0);
    assert_eq!(ctx.sim.cpu.bus.read(RAM_BASE + 68, 8), Ok(0));
    assert_eq!(
        ctx.sim.cpu.bus.read(RAM_BASE, 4),
        Ok(u64::from(program[0]))
    );

    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 16 });
    assert_eq!(ctx.get_reg(1), 5);
}

#[test]
fn triggered_interrupts_reach_the_devices() {
    let ctx = TestContext::with_program(&[NOP]);
    ctx.sim.trigger_interrupt(InterruptKind::Software);
    ctx.sim.trigger_interrupt(InterruptKind::Timer);
    ctx.sim.trigger_interrupt(InterruptKind::External(3));

    let devices = ctx.sim.snapshot().devices;
    assert_eq!(devices.clint.msip, vec![true]);
    assert_eq!(devices.clint.mtimecmp, vec![devices.clint.mtime]);
    assert_eq!(devices.plic.pending, vec![3]);
}

#[test]
fn serial_output_is_buffered() {
    let mut ctx = TestContext::with_program(&[
        I::new().lui(T0, 0x10000).build(),
        I::new().addi(T1, 0, i64::from(b'H')).build(),
        I::new().sb(T0, T1, 0).build(),
        I::new().addi(T1, 0, i64::from(b'i')).build(),
        I::new().sb(T0, T1, 0).build(),
        NOP,
    ]);

    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 24 });
    assert_eq!(ctx.sim.take_serial_output(), b"Hi".to_vec());
    assert!(ctx.sim.take_serial_output().is_empty());
}

#[test]
fn serial_input_from_another_thread_wakes_a_waiting_run() {
    let mut ctx = TestContext::with_program(&[WFI, NOP]);
    let uart_base = test_config().system.uart_base;
    ctx.sim.cpu.bus.write(uart_base + 1, u64::from(IER_RDA), 1).unwrap();
    {
        let mut plic = ctx.sim.devices().plic.lock().unwrap();
        plic.set_priority(UART_IRQ, 1);
        plic.set_enabled(0, UART_IRQ, true);
    }
    ctx.cpu_mut().csrs.set(MIE, MIE_MEIE);

    let input = ctx.sim.serial_input();
    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        input.send(b'Q')
    });

    assert_eq!(ctx.run_to_halt(), HaltReason::ZeroWord { pc: RAM_BASE + 8 });
    assert!(sender.join().unwrap());
    assert_eq!(ctx.sim.executed(), 2);
    assert_eq!(ctx.sim.devices().uart.lock().unwrap().rx_len(), 1);
}

#[test]
fn cpu_debug_output_shows_the_hart_state() {
    let mut ctx = TestContext::with_program(&[I::new().addi(1, 0, 9).build()]);
    let _ = ctx.step();

    let text = format!("{:?}", ctx.cpu());
    assert!(text.starts_with("Cpu { hart_id: 0, pc: 0x80000004, privilege: Machine"), "{text}");
    assert!(text.ends_with(".. }"), "{text}");
}

#[test]
fn snapshot_serializes_to_json() {
    let mut ctx = TestContext::with_program(&[I::new().addi(1, 0, 9).build()]);
    let _ = ctx.step();

    let json = serde_json::to_value(ctx.sim.snapshot()).unwrap();
    assert_eq!(json["pc"], RAM_BASE + 4);
    assert_eq!(json["privilege"], "Machine");
    assert_eq!(json["gpr"][1], 9);
    assert_eq!(json["gpr"].as_array().map(Vec::len), Some(32));
    assert_eq!(json["priority_guard"], 0);
    assert!(json["devices"]["uart"].is_object());
    assert!(json["csrs"]["mstatus"].is_u64());
}
