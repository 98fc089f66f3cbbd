//! CSR file tests: views, masks, WARL fields and the round-trip property.

use proptest::prelude::*;
use rvhart_core::core::arch::csr::{
    CsrFile, FCSR, FFLAGS, FRM, MCYCLE, CYCLE, MEPC, MHARTID, MIE, MIP, MIP_MTIP, MIP_SSIP,
    MIP_STIP, MISA, MISA_RV64IMAFSU, MSCRATCH, MSTATUS, MSTATUS_FS_DIRTY, MSTATUS_MPP,
    MSTATUS_MPP_SHIFT, MSTATUS_SD, MSTATUS_SIE, MTVEC, SATP, SIE, SIP, SSTATUS,
};

#[test]
fn reset_state_reports_isa_and_hart() {
    let csrs = CsrFile::new(5);
    assert_eq!(csrs.read(MISA), MISA_RV64IMAFSU);
    assert_eq!(csrs.read(MHARTID), 5);
    assert_eq!(csrs.read(MIE), 0);
}

#[test]
fn unimplemented_addresses_read_zero_and_ignore_writes() {
    let mut csrs = CsrFile::new(0);
    assert!(!CsrFile::is_implemented(0x7C0));
    csrs.write(0x7C0, 0xFFFF);
    assert_eq!(csrs.read(0x7C0), 0);
}

#[test]
fn read_only_region_ignores_writes() {
    let mut csrs = CsrFile::new(3);
    assert!(CsrFile::is_read_only(MHARTID));
    csrs.write(MHARTID, 9);
    assert_eq!(csrs.read(MHARTID), 3);
}

#[test]
fn min_privilege_comes_from_address_bits() {
    assert_eq!(CsrFile::min_privilege(MSTATUS), 3);
    assert_eq!(CsrFile::min_privilege(SSTATUS), 1);
    assert_eq!(CsrFile::min_privilege(FFLAGS), 0);
}

#[test]
fn sstatus_is_a_masked_view_of_mstatus() {
    let mut csrs = CsrFile::new(0);
    csrs.write(SSTATUS, MSTATUS_SIE | MSTATUS_MPP);
    let mstatus = csrs.read(MSTATUS);
    assert_ne!(mstatus & MSTATUS_SIE, 0);
    assert_eq!(mstatus & MSTATUS_MPP, 0, "MPP is not visible through sstatus");
}

#[test]
fn sie_and_sip_expose_supervisor_bits_only() {
    let mut csrs = CsrFile::new(0);
    csrs.write(SIE, u64::MAX);
    assert_eq!(csrs.read(MIE) & MIP_MTIP, 0);
    assert_ne!(csrs.read(MIE) & MIP_STIP, 0);

    csrs.write(SIP, u64::MAX);
    assert_eq!(csrs.read(MIP), MIP_SSIP, "only SSIP is writable through sip");
}

#[test]
fn reserved_mpp_encoding_is_legalized() {
    let mut csrs = CsrFile::new(0);
    csrs.write(MSTATUS, 2 << MSTATUS_MPP_SHIFT);
    assert_eq!(csrs.read(MSTATUS) & MSTATUS_MPP, 0);
}

#[test]
fn sd_summarizes_dirty_fp_state() {
    let mut csrs = CsrFile::new(0);
    assert_eq!(csrs.read(MSTATUS) & MSTATUS_SD, 0);
    csrs.accrue_fflags(1);
    assert_ne!(csrs.read(MSTATUS) & MSTATUS_SD, 0);
    assert_eq!(csrs.get(MSTATUS) & MSTATUS_FS_DIRTY, MSTATUS_FS_DIRTY);
}

#[test]
fn fflags_and_frm_are_views_of_fcsr() {
    let mut csrs = CsrFile::new(0);
    csrs.write(FRM, 0b011);
    csrs.write(FFLAGS, 0b10101);
    assert_eq!(csrs.read(FCSR), (0b011 << 5) | 0b10101);
    assert_eq!(csrs.read(FRM), 0b011);
    assert_eq!(csrs.read(FFLAGS), 0b10101);
}

#[test]
fn epc_and_tvec_drop_illegal_low_bits() {
    let mut csrs = CsrFile::new(0);
    csrs.write(MEPC, 0x8000_0003);
    csrs.write(MTVEC, 0x8000_0102);
    assert_eq!(csrs.read(MEPC), 0x8000_0000);
    assert_eq!(csrs.read(MTVEC), 0x8000_0100);
}

#[test]
fn satp_rejects_unsupported_modes() {
    let mut csrs = CsrFile::new(0);
    csrs.write(SATP, (9 << 60) | 0x1234);
    assert_eq!(csrs.read(SATP), 0);
    csrs.write(SATP, (8 << 60) | (7 << 44) | 0x1234);
    assert_eq!(csrs.satp_mode(), 8);
    assert_eq!(csrs.satp_asid(), 7);
    assert_eq!(csrs.satp_ppn(), 0x1234);
}

#[test]
fn cycle_mirrors_mcycle() {
    let mut csrs = CsrFile::new(0);
    csrs.set(MCYCLE, 42);
    assert_eq!(csrs.read(CYCLE), 42);
}

proptest! {
    /// Setting then clearing the same mask restores the pre-set value.
    #[test]
    fn set_then_clear_restores_value(orig in any::<u64>(), mask in any::<u64>()) {
        let mut csrs = CsrFile::new(0);
        let orig = orig & !mask;
        csrs.write(MSCRATCH, orig);
        let before = csrs.read(MSCRATCH);
        csrs.write(MSCRATCH, before | mask);
        csrs.write(MSCRATCH, csrs.read(MSCRATCH) & !mask);
        prop_assert_eq!(csrs.read(MSCRATCH), before);
    }

    #[test]
    fn mip_writes_keep_hardware_bits(val in any::<u64>()) {
        let mut csrs = CsrFile::new(0);
        csrs.set(MIP, MIP_MTIP);
        csrs.write(MIP, val);
        prop_assert_ne!(csrs.read(MIP) & MIP_MTIP, 0);
    }
}
