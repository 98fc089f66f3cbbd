//! Trap cause-code tests.
//!
//! Every trap must own a distinct `mcause`; interrupts carry bit 63.

use std::collections::HashSet;

use rstest::rstest;
use rvhart_core::common::Trap;

const INTERRUPT: u64 = 1 << 63;

#[rstest]
#[case(Trap::InstructionAddressMisaligned(0), 0)]
#[case(Trap::InstructionAccessFault(0), 1)]
#[case(Trap::IllegalInstruction(0), 2)]
#[case(Trap::Breakpoint(0), 3)]
#[case(Trap::LoadAddressMisaligned(0), 4)]
#[case(Trap::LoadAccessFault(0), 5)]
#[case(Trap::StoreAddressMisaligned(0), 6)]
#[case(Trap::StoreAccessFault(0), 7)]
#[case(Trap::EnvironmentCallFromUMode, 8)]
#[case(Trap::EnvironmentCallFromSMode, 9)]
#[case(Trap::EnvironmentCallFromMMode, 11)]
#[case(Trap::InstructionPageFault(0), 12)]
#[case(Trap::LoadPageFault(0), 13)]
#[case(Trap::StorePageFault(0), 15)]
#[case(Trap::SupervisorSoftwareInterrupt, INTERRUPT | 1)]
#[case(Trap::MachineSoftwareInterrupt, INTERRUPT | 3)]
#[case(Trap::SupervisorTimerInterrupt, INTERRUPT | 5)]
#[case(Trap::MachineTimerInterrupt, INTERRUPT | 7)]
#[case(Trap::SupervisorExternalInterrupt, INTERRUPT | 9)]
#[case(Trap::MachineExternalInterrupt, INTERRUPT | 11)]
fn cause_matches_privileged_table(#[case] trap: Trap, #[case] cause: u64) {
    assert_eq!(trap.cause(), cause);
    assert_eq!(trap.is_interrupt(), cause & INTERRUPT != 0);
    assert_eq!(trap.code(), cause & !INTERRUPT);
}

#[test]
fn breakpoint_and_software_interrupt_do_not_collide() {
    assert_ne!(
        Trap::Breakpoint(0).cause(),
        Trap::MachineSoftwareInterrupt.cause()
    );
    assert_ne!(
        Trap::EnvironmentCallFromMMode.cause(),
        Trap::MachineExternalInterrupt.cause()
    );
}

#[test]
fn all_causes_are_distinct() {
    let traps = [
        Trap::InstructionAddressMisaligned(0),
        Trap::InstructionAccessFault(0),
        Trap::IllegalInstruction(0),
        Trap::Breakpoint(0),
        Trap::LoadAddressMisaligned(0),
        Trap::LoadAccessFault(0),
        Trap::StoreAddressMisaligned(0),
        Trap::StoreAccessFault(0),
        Trap::EnvironmentCallFromUMode,
        Trap::EnvironmentCallFromSMode,
        Trap::EnvironmentCallFromMMode,
        Trap::InstructionPageFault(0),
        Trap::LoadPageFault(0),
        Trap::StorePageFault(0),
        Trap::SupervisorSoftwareInterrupt,
        Trap::MachineSoftwareInterrupt,
        Trap::SupervisorTimerInterrupt,
        Trap::MachineTimerInterrupt,
        Trap::SupervisorExternalInterrupt,
        Trap::MachineExternalInterrupt,
    ];
    let causes: HashSet<u64> = traps.iter().map(Trap::cause).collect();
    assert_eq!(causes.len(), traps.len());
}

#[test]
fn tval_carries_address_or_instruction_bits() {
    assert_eq!(Trap::LoadAccessFault(0x1234).tval(), 0x1234);
    assert_eq!(Trap::IllegalInstruction(0xFFFF_FFFF).tval(), 0xFFFF_FFFF);
    assert_eq!(Trap::Breakpoint(0x8000_0010).tval(), 0x8000_0010);
    assert_eq!(Trap::MachineTimerInterrupt.tval(), 0);
    assert_eq!(Trap::EnvironmentCallFromUMode.tval(), 0);
}
