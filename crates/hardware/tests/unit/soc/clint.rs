//! CLINT tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rstest::rstest;
use rvhart_core::soc::devices::{Clint, Device};

const MSIP: u64 = 0x0;
const MTIMECMP: u64 = 0x4000;
const MTIME: u64 = 0xBFF8;

fn clint(harts: usize) -> (Clint, Arc<AtomicU64>) {
    let mtime = Arc::new(AtomicU64::new(0));
    (Clint::new(0x0200_0000, harts, Arc::clone(&mtime)), mtime)
}

#[test]
fn compare_starts_disarmed() {
    let (c, mtime) = clint(1);
    mtime.store(u64::MAX - 1, Ordering::Release);
    assert_eq!(c.mtimecmp(0), u64::MAX);
    assert!(!c.timer_pending(0));
}

#[rstest]
#[case(99, false)]
#[case(100, true)]
#[case(101, true)]
fn timer_pends_once_mtime_reaches_compare(#[case] now: u64, #[case] pending: bool) {
    let (mut c, mtime) = clint(1);
    c.set_mtimecmp(0, 100);
    mtime.store(now, Ordering::Release);
    assert_eq!(c.timer_pending(0), pending);
}

#[test]
fn mtime_register_shares_the_counter() {
    let (mut c, mtime) = clint(1);
    mtime.store(0x1234, Ordering::Release);
    assert_eq!(c.read_u64(MTIME), 0x1234);

    c.write_u64(MTIME, 7);
    assert_eq!(mtime.load(Ordering::Acquire), 7);
    assert_eq!(c.mtime(), 7);
}

#[test]
fn msip_register_uses_bit_zero() {
    let (mut c, _) = clint(2);
    c.write_u32(MSIP + 8, 0xFFFF_FFFE);
    assert!(!c.software_pending(1));
    c.write_u32(MSIP + 8, 1);
    assert!(c.software_pending(1));
    assert!(!c.software_pending(0));
    assert_eq!(c.read_u32(MSIP + 8), 1);
}

#[test]
fn mtimecmp_halves_merge() {
    let (mut c, _) = clint(1);
    c.write_u64(MTIMECMP, 0);
    c.write_u32(MTIMECMP, 0xDEAD_BEEF);
    c.write_u32(MTIMECMP + 4, 0x0000_0001);
    assert_eq!(c.mtimecmp(0), 0x1_DEAD_BEEF);
    assert_eq!(c.read_u32(MTIMECMP + 4), 1);
}

#[test]
fn per_hart_compare_registers() {
    let (mut c, _) = clint(2);
    c.write_u64(MTIMECMP + 8, 5);
    assert_eq!(c.mtimecmp(1), 5);
    assert_eq!(c.mtimecmp(0), u64::MAX);
}

#[test]
fn unmapped_offsets_read_zero() {
    let (mut c, _) = clint(1);
    assert_eq!(c.read_u64(0x8000), 0);
    c.write_u64(0x8000, 1);
    assert_eq!(c.read_u64(MSIP + 8), 0, "hart 1 does not exist");
}

#[test]
fn reset_rewinds_time_and_disarms() {
    let (mut c, mtime) = clint(1);
    mtime.store(50, Ordering::Release);
    c.set_mtimecmp(0, 10);
    c.set_msip(0, true);
    c.reset();

    assert_eq!(mtime.load(Ordering::Acquire), 0);
    assert_eq!(c.mtimecmp(0), u64::MAX);
    assert!(!c.software_pending(0));
}

#[test]
fn snapshot_reports_registers() {
    let (mut c, mtime) = clint(1);
    mtime.store(3, Ordering::Release);
    c.set_msip(0, true);
    let snap = c.snapshot();
    assert_eq!(snap.mtime, 3);
    assert_eq!(snap.msip, vec![true]);
    assert_eq!(snap.mtimecmp, vec![u64::MAX]);
}
