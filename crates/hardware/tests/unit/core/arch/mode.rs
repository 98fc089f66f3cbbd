//! Privilege mode encoding tests.

use rstest::rstest;
use rvhart_core::core::arch::mode::PrivilegeMode;

#[rstest]
#[case(0, PrivilegeMode::User)]
#[case(1, PrivilegeMode::Supervisor)]
#[case(2, PrivilegeMode::User)]
#[case(3, PrivilegeMode::Machine)]
fn from_bits_legalizes_reserved_encoding(#[case] bits: u64, #[case] mode: PrivilegeMode) {
    assert_eq!(PrivilegeMode::from_bits(bits), mode);
}

#[test]
fn modes_order_by_privilege() {
    assert!(PrivilegeMode::User < PrivilegeMode::Supervisor);
    assert!(PrivilegeMode::Supervisor < PrivilegeMode::Machine);
    assert_eq!(PrivilegeMode::Machine.to_bits(), 3);
    assert_eq!(PrivilegeMode::Supervisor.to_string(), "Supervisor");
}
