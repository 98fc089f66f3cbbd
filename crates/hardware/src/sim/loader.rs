//! Boot Image Loading.
//!
//! This module turns a file on disk into bytes placed in RAM. It performs:
//! 1. **Format Detection:** ELF64 images (by magic) or flat binaries.
//! 2. **ELF Parsing:** Every `PT_LOAD` segment is placed at its physical address and
//!    zero-filled up to its memory size when loaded; the entry point comes from the header.
//! 3. **Flat Images:** Placed verbatim at a caller-supplied address, which is also
//!    the entry point.
//!
//! A [`BootImage`] keeps its segments so the machine can be reset and reloaded.

use std::fs;
use std::path::{Path, PathBuf};

use object::Object;
use object::elf::PT_LOAD;
use object::read::elf::{ElfFile64, ProgramHeader};
use thiserror::Error;
use tracing::{debug, info};

use crate::soc::Bus;

/// ELF identification bytes.
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Failure to read or place a boot image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("cannot read image {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file has an ELF header but could not be parsed.
    #[error("malformed ELF image: {0}")]
    Elf(String),

    /// The ELF image has nothing to load.
    #[error("ELF image has no loadable segments")]
    NoLoadableSegments,

    /// A segment does not fit in RAM.
    #[error("segment at {addr:#x} ({len} bytes) lies outside RAM")]
    OutOfRange {
        /// Physical load address.
        addr: u64,
        /// Segment size in bytes.
        len: usize,
    },
}

/// One contiguous run of bytes to place in RAM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Physical load address.
    pub addr: u64,
    /// File contents.
    pub data: Vec<u8>,
    /// Zeroed bytes following `data` (the ELF `p_memsz - p_filesz` tail).
    pub zero_fill: usize,
}

impl Segment {
    /// Bytes the segment occupies in RAM.
    pub const fn len(&self) -> usize {
        self.data.len().saturating_add(self.zero_fill)
    }

    /// Returns true if the segment occupies no RAM.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded program, retained for reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootImage {
    segments: Vec<Segment>,
    entry: u64,
}

impl BootImage {
    /// Wraps a flat binary placed at `load_address`.
    pub fn flat(data: Vec<u8>, load_address: u64) -> Self {
        Self {
            segments: vec![Segment {
                addr: load_address,
                data,
                zero_fill: 0,
            }],
            entry: load_address,
        }
    }

    /// Builds an image from the 32-bit instruction words of a program.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvhart_core::sim::BootImage;
    ///
    /// let image = BootImage::from_words(&[0x0050_0093], 0x8000_0000);
    /// assert_eq!(image.entry(), 0x8000_0000);
    /// assert_eq!(image.len(), 4);
    /// ```
    pub fn from_words(words: &[u32], load_address: u64) -> Self {
        let data = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Self::flat(data, load_address)
    }

    /// Parses an image, choosing ELF or flat by the leading magic bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - The file contents.
    /// * `load_address` - Placement and entry point for flat binaries.
    pub fn from_bytes(data: Vec<u8>, load_address: u64) -> Result<Self, LoadError> {
        if data.starts_with(ELF_MAGIC) {
            Self::from_elf(&data)
        } else {
            Ok(Self::flat(data, load_address))
        }
    }

    /// Reads and parses an image file.
    pub fn from_file(path: impl AsRef<Path>, load_address: u64) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = Self::from_bytes(data, load_address)?;
        info!(
            path = %path.display(),
            entry = format_args!("{:#x}", image.entry),
            bytes = image.len(),
            "loader: image read"
        );
        Ok(image)
    }

    fn from_elf(data: &[u8]) -> Result<Self, LoadError> {
        let elf = ElfFile64::<object::Endianness>::parse(data)
            .map_err(|e| LoadError::Elf(e.to_string()))?;
        let endian = elf.endian();

        let mut segments = Vec::new();
        for ph in elf.elf_program_headers() {
            if ph.p_type(endian) != PT_LOAD {
                continue;
            }
            let bytes = ph
                .data(endian, data)
                .map_err(|()| LoadError::Elf("segment data out of bounds".to_owned()))?;
            let addr = ph.p_paddr(endian);
            let memsz = ph.p_memsz(endian).max(bytes.len() as u64);
            let out_of_range = LoadError::OutOfRange {
                addr,
                len: usize::try_from(memsz).unwrap_or(usize::MAX),
            };
            if addr.checked_add(memsz).is_none() {
                return Err(out_of_range);
            }
            let Ok(zero_fill) = usize::try_from(memsz - bytes.len() as u64) else {
                return Err(out_of_range);
            };
            if memsz == 0 {
                continue;
            }
            debug!(
                addr = format_args!("{addr:#x}"),
                filesz = bytes.len(),
                memsz,
                "loader: PT_LOAD"
            );
            segments.push(Segment {
                addr,
                data: bytes.to_vec(),
                zero_fill,
            });
        }

        if segments.is_empty() {
            return Err(LoadError::NoLoadableSegments);
        }
        Ok(Self {
            segments,
            entry: elf.entry(),
        })
    }

    /// Returns the address execution starts at.
    pub const fn entry(&self) -> u64 {
        self.entry
    }

    /// Returns the segments in file order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total number of bytes placed in RAM.
    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .fold(0, |total, seg| total.saturating_add(seg.len()))
    }

    /// Returns true if the image places no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every segment into RAM and zeroes its tail.
    ///
    /// The whole in-memory extent is checked against RAM before anything is
    /// written, so an oversized segment never allocates or partially loads.
    pub fn load_into(&self, bus: &mut Bus) -> Result<(), LoadError> {
        for seg in &self.segments {
            let out_of_range = || LoadError::OutOfRange {
                addr: seg.addr,
                len: seg.len(),
            };
            if bus.ram().offset_of(seg.addr, seg.len()).is_none() {
                return Err(out_of_range());
            }
            bus.load(seg.addr, &seg.data).map_err(|_| out_of_range())?;
            if seg.zero_fill > 0 {
                let tail = seg.addr + seg.data.len() as u64;
                bus.load(tail, &vec![0; seg.zero_fill])
                    .map_err(|_| out_of_range())?;
            }
        }
        Ok(())
    }
}
