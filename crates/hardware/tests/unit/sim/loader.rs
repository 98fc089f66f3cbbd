//! Boot image loading tests.

use std::io::Write;

use pretty_assertions::assert_eq;
use rvhart_core::config::Config;
use rvhart_core::sim::{BootImage, LoadError, Segment, SimError, Simulator};

use crate::common::harness::{RAM_BASE, test_config};

/// Builds a little-endian ELF64 with one `PT_LOAD` program header.
fn elf_image(entry: u64, vaddr: u64, paddr: u64, body: &[u8], memsz: u64) -> Vec<u8> {
    const EHDR: u64 = 64;
    const PHDR: u64 = 56;
    let mut elf = Vec::new();
    elf.extend_from_slice(b"\x7fELF");
    elf.extend_from_slice(&[2, 1, 1, 0]);
    elf.extend_from_slice(&[0; 8]);
    elf.extend_from_slice(&2u16.to_le_bytes());
    elf.extend_from_slice(&0xF3u16.to_le_bytes());
    elf.extend_from_slice(&1u32.to_le_bytes());
    elf.extend_from_slice(&entry.to_le_bytes());
    elf.extend_from_slice(&EHDR.to_le_bytes());
    elf.extend_from_slice(&0u64.to_le_bytes());
    elf.extend_from_slice(&0u32.to_le_bytes());
    elf.extend_from_slice(&(EHDR as u16).to_le_bytes());
    elf.extend_from_slice(&(PHDR as u16).to_le_bytes());
    elf.extend_from_slice(&1u16.to_le_bytes());
    elf.extend_from_slice(&64u16.to_le_bytes());
    elf.extend_from_slice(&0u16.to_le_bytes());
    elf.extend_from_slice(&0u16.to_le_bytes());
    assert_eq!(elf.len() as u64, EHDR);

    elf.extend_from_slice(&1u32.to_le_bytes());
    elf.extend_from_slice(&5u32.to_le_bytes());
    elf.extend_from_slice(&(EHDR + PHDR).to_le_bytes());
    elf.extend_from_slice(&vaddr.to_le_bytes());
    elf.extend_from_slice(&paddr.to_le_bytes());
    elf.extend_from_slice(&(body.len() as u64).to_le_bytes());
    elf.extend_from_slice(&memsz.to_le_bytes());
    elf.extend_from_slice(&0x1000u64.to_le_bytes());
    assert_eq!(elf.len() as u64, EHDR + PHDR);

    elf.extend_from_slice(body);
    elf
}

#[test]
fn words_are_laid_out_little_endian() {
    let image = BootImage::from_words(&[0x1122_3344, 0x5566_7788], RAM_BASE);
    assert_eq!(image.entry(), RAM_BASE);
    assert_eq!(
        image.segments(),
        &[Segment {
            addr: RAM_BASE,
            data: vec![0x44, 0x33, 0x22, 0x11, 0x88, 0x77, 0x66, 0x55],
            zero_fill: 0,
        }]
    );
    assert!(!image.is_empty());
}

#[test]
fn flat_file_is_placed_at_the_load_address() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0x13, 0, 0, 0, 0x73, 0, 0x10, 0]).unwrap();

    let image = BootImage::from_file(file.path(), RAM_BASE + 0x40).unwrap();
    assert_eq!(image.entry(), RAM_BASE + 0x40);
    assert_eq!(image.len(), 8);
    assert_eq!(image.segments()[0].addr, RAM_BASE + 0x40);
}

#[test]
fn elf_segments_use_physical_addresses_and_zero_fill() {
    let body = [0x93, 0x00, 0x50, 0x00, 0x13, 0x00, 0x00, 0x00];
    let elf = elf_image(RAM_BASE + 4, 0xFFFF_FFFF_8000_0000, RAM_BASE, &body, 16);

    let image = BootImage::from_bytes(elf, 0).unwrap();
    assert_eq!(image.entry(), RAM_BASE + 4);
    assert_eq!(image.segments().len(), 1);
    let seg = &image.segments()[0];
    assert_eq!(seg.addr, RAM_BASE);
    assert_eq!(seg.data, body.to_vec());
    assert_eq!(seg.zero_fill, 8);
    assert_eq!(image.len(), 16);
}

#[test]
fn zero_fill_tail_is_cleared_when_loaded() {
    let body = [0x13, 0, 0, 0];
    let elf = elf_image(RAM_BASE, RAM_BASE, RAM_BASE + 0x100, &body, 0x10);
    let image = BootImage::from_bytes(elf, 0).unwrap();

    let mut sim = Simulator::new(&test_config(), image.clone()).unwrap();
    sim.stop_timer();
    assert_eq!(sim.cpu.bus.write(RAM_BASE + 0x108, u64::MAX, 8), Ok(()));
    image.load_into(&mut sim.cpu.bus).unwrap();

    assert_eq!(sim.cpu.bus.read(RAM_BASE + 0x100, 4), Ok(0x13));
    assert_eq!(sim.cpu.bus.read(RAM_BASE + 0x108, 8), Ok(0));
}

#[test]
fn huge_memory_size_is_rejected_without_allocating() {
    let elf = elf_image(RAM_BASE, RAM_BASE, RAM_BASE, &[0x13, 0, 0, 0], 1 << 62);
    let image = BootImage::from_bytes(elf, 0).unwrap();
    assert_eq!(image.segments()[0].data.len(), 4);

    let result = Simulator::new(&test_config(), image);
    assert!(matches!(
        result,
        Err(SimError::Load(LoadError::OutOfRange { addr: RAM_BASE, .. }))
    ));
}

#[test]
fn segment_wrapping_the_address_space_is_rejected() {
    let elf = elf_image(0, 0, u64::MAX - 0xF, &[0; 4], 0x20);
    assert!(matches!(
        BootImage::from_bytes(elf, 0),
        Err(LoadError::OutOfRange {
            addr: 0xFFFF_FFFF_FFFF_FFF0,
            len: 0x20
        })
    ));
}

#[test]
fn segment_past_the_end_of_ram_leaves_ram_untouched() {
    let config = test_config();
    let last = RAM_BASE + config.memory.ram_size as u64 - 4;
    let elf = elf_image(RAM_BASE, RAM_BASE, last, &[0xFF; 4], 8);
    let image = BootImage::from_bytes(elf, 0).unwrap();

    let mut sim = Simulator::new(&config, BootImage::from_words(&[0x13], RAM_BASE)).unwrap();
    sim.stop_timer();
    assert!(matches!(
        image.load_into(&mut sim.cpu.bus),
        Err(LoadError::OutOfRange { len: 8, .. })
    ));
    assert_eq!(sim.cpu.bus.read(last, 4), Ok(0));
}

#[test]
fn elf_boot_starts_at_the_header_entry() {
    let body = [0x13, 0, 0, 0, 0x93, 0x00, 0x70, 0x00];
    let elf = elf_image(RAM_BASE + 4, RAM_BASE, RAM_BASE, &body, 8);
    let image = BootImage::from_bytes(elf, 0).unwrap();

    let mut sim = Simulator::new(&test_config(), image).unwrap();
    sim.stop_timer();
    assert_eq!(sim.cpu.pc, RAM_BASE + 4);
    let _ = sim.run();
    assert_eq!(sim.cpu.regs.read(1), 7);
    assert_eq!(sim.executed(), 1);
}

#[test]
fn elf_magic_with_a_bad_body_is_rejected() {
    let mut data = b"\x7fELF".to_vec();
    data.extend_from_slice(&[0xAA; 12]);
    assert!(matches!(
        BootImage::from_bytes(data, RAM_BASE),
        Err(LoadError::Elf(_))
    ));
}

#[test]
fn elf_without_load_segments_is_rejected() {
    let mut elf = elf_image(RAM_BASE, RAM_BASE, RAM_BASE, &[], 0);
    // Turn the PT_LOAD into PT_NOTE.
    elf[64..68].copy_from_slice(&4u32.to_le_bytes());
    assert!(matches!(
        BootImage::from_bytes(elf, RAM_BASE),
        Err(LoadError::NoLoadableSegments)
    ));
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.bin");
    match BootImage::from_file(&path, RAM_BASE) {
        Err(LoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn image_outside_ram_fails_to_boot() {
    let image = BootImage::from_words(&[0x13], 0x1000);
    let result = Simulator::new(&Config::default(), image);
    assert!(matches!(
        result,
        Err(SimError::Load(LoadError::OutOfRange {
            addr: 0x1000,
            len: 4
        }))
    ));
}
