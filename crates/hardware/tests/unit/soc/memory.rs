//! Guest RAM tests.

use rvhart_core::soc::memory::{Memory, MemoryError};

const BASE: u64 = 0x8000_0000;

fn ram(size: usize) -> Memory {
    let Ok(mem) = Memory::new(BASE, size) else {
        panic!("cannot map {size} bytes");
    };
    mem
}

#[test]
fn starts_zeroed() {
    let mem = ram(4096);
    assert_eq!(mem.read(BASE, 8), Some(0));
    assert_eq!(mem.read(BASE + 4088, 8), Some(0));
}

#[test]
fn little_endian_sized_access() {
    let mut mem = ram(4096);
    assert_eq!(mem.write(BASE, 0x1122_3344_5566_7788, 8), Some(()));
    assert_eq!(mem.read(BASE, 1), Some(0x88));
    assert_eq!(mem.read(BASE, 2), Some(0x7788));
    assert_eq!(mem.read(BASE + 4, 4), Some(0x1122_3344));
    assert_eq!(mem.read_u32(BASE), Some(0x5566_7788));
}

#[test]
fn accesses_crossing_the_end_fail() {
    let mut mem = ram(4096);
    assert_eq!(mem.read(BASE + 4092, 8), None);
    assert_eq!(mem.write(BASE + 4095, 0, 2), None);
    assert_eq!(mem.read(BASE - 1, 1), None);
    assert!(mem.offset_of(BASE + 4095, 1).is_some());
}

#[test]
fn load_and_clear() {
    let mut mem = ram(4096);
    assert_eq!(mem.load(BASE + 16, &[1, 2, 3]), Some(()));
    assert_eq!(mem.slice(BASE + 16, 3), Some(&[1u8, 2, 3][..]));
    assert_eq!(mem.load(BASE + 4094, &[1, 2, 3]), None);

    mem.clear();
    assert_eq!(mem.slice(BASE + 16, 3), Some(&[0u8, 0, 0][..]));
}

#[test]
fn zero_size_is_rejected() {
    assert!(matches!(Memory::new(BASE, 0), Err(MemoryError::Empty)));
}

#[test]
fn reports_window() {
    let mem = ram(8192);
    assert_eq!(mem.base(), BASE);
    assert_eq!(mem.size(), 8192);
}

#[test]
fn debug_output_names_the_backing_size() {
    let text = format!("{:?}", ram(4096));
    assert!(text.contains("DramBuffer { size: 4096"), "{text}");
}

#[test]
fn mappings_are_released_on_drop() {
    for _ in 0..64 {
        let mut mem = ram(256 * 1024 * 1024);
        assert_eq!(mem.write(BASE, 1, 1), Some(()));
        drop(mem);
    }
}
