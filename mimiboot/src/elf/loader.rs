//! ELF Segment Loader
//!
//! Two-pass loading of ELF32 executables into caller-described memory
//! regions:
//!
//! 1. Validation pass: stream every program header and prove the whole
//!    segment table consistent (region containment, no overlaps, caps)
//!    before a single byte of RAM is touched. A malformed image can never
//!    leave memory partially written.
//! 2. Materialization pass: re-stream the table and copy each accepted
//!    segment in 512-byte chunks, zero the BSS tail, and optionally read
//!    the file back to verify the copy.
//!
//! The file is reached through [`ImageSource`] and RAM through
//! [`TargetMemory`], so the loader itself never owns storage or memory.

use super::constants::*;
use super::memory::TargetMemory;
use super::parser::validate_header;
use super::structures::{Elf32Header, Elf32ProgramHeader};
use crate::error::{BootError, BootResult};
use heapless::Vec;

// Memory region flags
pub const MEM_READ: u32 = 0x0001;
pub const MEM_WRITE: u32 = 0x0002;
pub const MEM_EXEC: u32 = 0x0004;
pub const MEM_RAM: u32 = 0x0010;
pub const MEM_FLASH: u32 = 0x0020;

/// Chunk size for streaming segment data.
const LOAD_BUFFER_SIZE: usize = 512;

/// A memory region available for loading. The loader validates that every
/// segment fits inside a region carrying the required flags; it never
/// allocates or discovers memory itself.
#[derive(Debug, Clone, Copy)]
pub struct MemRegion {
    pub base: u32,
    pub size: u32,
    pub flags: u32,
}

impl MemRegion {
    /// Whether `[addr, addr+size)` lies entirely within this region.
    pub fn contains(&self, addr: u32, size: u32) -> bool {
        let end = match addr.checked_add(size) {
            Some(end) => end as u64,
            None => return false,
        };
        let region_end = self.base as u64 + self.size as u64;
        addr >= self.base && end <= region_end
    }
}

/// Byte source for the image file, keyed by offset. The bootloader adapts
/// an open FAT32 file to this; tests feed byte slices.
pub trait ImageSource {
    /// Read up to `buf.len()` bytes starting at `offset`. Returns the count
    /// actually delivered (short at end of file).
    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> BootResult<usize>;

    /// Total file size in bytes.
    fn size(&mut self) -> u32;
}

/// Loader configuration.
#[derive(Clone, Copy)]
pub struct LoaderConfig<'a> {
    /// Memory regions available for loading.
    pub regions: &'a [MemRegion],
    /// Validate segment addresses against `regions`.
    pub validate_addresses: bool,
    /// Zero the `mem_size - file_size` tail of each segment.
    pub zero_bss: bool,
    /// Read the file back after copying and compare (slow).
    pub verify_after_load: bool,
}

/// Information about one loaded segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentInfo {
    pub vaddr: u32,
    pub size: u32,
    pub flags: u32,
    pub loaded: bool,
}

/// Result of a successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    /// Entry point address.
    pub entry: u32,
    /// Lowest load address.
    pub load_base: u32,
    /// Highest load address + 1.
    pub load_end: u32,
    /// Total bytes occupied in memory (sum of segment `mem_size`).
    pub total_size: u32,
    /// Bytes copied from the file.
    pub bytes_copied: u32,
    /// Bytes zeroed (BSS).
    pub bytes_zeroed: u32,
    /// Accepted segments, in file order.
    pub segments: Vec<SegmentInfo, MAX_SEGMENTS>,
}

impl LoadResult {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

fn read_exact<S: ImageSource>(source: &mut S, offset: u32, buf: &mut [u8]) -> BootResult<()> {
    let n = source.read_at(offset, buf)?;
    if n != buf.len() {
        return Err(BootError::Read);
    }
    Ok(())
}

fn ranges_overlap(a_start: u32, a_size: u32, b_start: u32, b_size: u32) -> bool {
    let a_end = a_start as u64 + a_size as u64;
    let b_end = b_start as u64 + b_size as u64;
    (a_start as u64) < b_end && (b_start as u64) < a_end
}

fn addr_valid(addr: u32, size: u32, required_flags: u32, regions: &[MemRegion]) -> bool {
    regions
        .iter()
        .any(|r| r.flags & required_flags == required_flags && r.contains(addr, size))
}

fn phdr_at<S: ImageSource>(
    source: &mut S,
    phoff: u32,
    index: u32,
) -> BootResult<Elf32ProgramHeader> {
    let offset = phoff
        .checked_add(index * PHDR_SIZE as u32)
        .ok_or(BootError::Read)?;
    let mut buf = [0u8; PHDR_SIZE];
    read_exact(source, offset, &mut buf)?;
    Ok(Elf32ProgramHeader::parse(&buf))
}

/// Load an ELF32 executable.
///
/// Validates the file header, runs the two passes described in the module
/// docs, and returns the entry point, load bounds and statistics. On any
/// error before pass 2, memory is untouched.
pub fn load<S: ImageSource, M: TargetMemory>(
    config: &LoaderConfig,
    source: &mut S,
    mem: &mut M,
) -> BootResult<LoadResult> {
    for region in config.regions {
        if region.size == 0 || region.base as u64 + region.size as u64 > 1u64 << 32 {
            return Err(BootError::BadRegion);
        }
    }

    let mut ehdr_buf = [0u8; EHDR_SIZE];
    read_exact(source, 0, &mut ehdr_buf)?;
    let ehdr = Elf32Header::parse(&ehdr_buf);
    validate_header(&ehdr)?;

    let mut result = LoadResult {
        entry: ehdr.e_entry,
        load_base: u32::MAX,
        load_end: 0,
        ..LoadResult::default()
    };

    // Pass 1: prove the whole segment table consistent
    let mut accepted: Vec<(u32, u32), MAX_SEGMENTS> = Vec::new();

    for i in 0..ehdr.e_phnum as u32 {
        let phdr = phdr_at(source, ehdr.e_phoff, i)?;

        if phdr.p_type != PT_LOAD || phdr.p_memsz == 0 {
            continue;
        }

        if phdr.p_filesz > phdr.p_memsz {
            return Err(BootError::Invalid);
        }

        let end = phdr
            .p_vaddr
            .checked_add(phdr.p_memsz)
            .ok_or(BootError::AddrInvalid)?;

        if config.validate_addresses
            && !addr_valid(phdr.p_vaddr, phdr.p_memsz, MEM_WRITE | MEM_RAM, config.regions)
        {
            return Err(BootError::AddrInvalid);
        }

        for &(vaddr, memsz) in &accepted {
            if ranges_overlap(phdr.p_vaddr, phdr.p_memsz, vaddr, memsz) {
                return Err(BootError::AddrOverlap);
            }
        }

        accepted
            .push((phdr.p_vaddr, phdr.p_memsz))
            .map_err(|_| BootError::TooLarge)?;

        result.load_base = result.load_base.min(phdr.p_vaddr);
        result.load_end = result.load_end.max(end);
        result.total_size = result.total_size.wrapping_add(phdr.p_memsz);
    }

    if accepted.is_empty() {
        return Err(BootError::NoLoadable);
    }

    // Pass 2: copy, zero, verify. The table was proven consistent above;
    // the block source contract guarantees identical bytes on re-read.
    for i in 0..ehdr.e_phnum as u32 {
        let phdr = phdr_at(source, ehdr.e_phoff, i)?;

        if phdr.p_type != PT_LOAD || phdr.p_memsz == 0 {
            continue;
        }

        let info = load_segment(config, source, mem, &phdr, &mut result)?;
        result.segments.push(info).map_err(|_| BootError::TooLarge)?;
    }

    Ok(result)
}

/// Copy one segment to its load address.
fn load_segment<S: ImageSource, M: TargetMemory>(
    config: &LoaderConfig,
    source: &mut S,
    mem: &mut M,
    phdr: &Elf32ProgramHeader,
    result: &mut LoadResult,
) -> BootResult<SegmentInfo> {
    let mut buffer = [0u8; LOAD_BUFFER_SIZE];

    // Copy phase: p_filesz bytes come from the file
    let mut file_offset = phdr.p_offset;
    let mut dest_addr = phdr.p_vaddr;
    let mut remaining = phdr.p_filesz;

    while remaining > 0 {
        let chunk = remaining.min(LOAD_BUFFER_SIZE as u32) as usize;
        read_exact(source, file_offset, &mut buffer[..chunk])?;
        mem.write(dest_addr, &buffer[..chunk])?;

        file_offset += chunk as u32;
        dest_addr += chunk as u32;
        remaining -= chunk as u32;
        result.bytes_copied += chunk as u32;
    }

    // Zero phase: the (p_memsz - p_filesz) tail is typically .bss
    if config.zero_bss && phdr.p_memsz > phdr.p_filesz {
        let bss_size = phdr.p_memsz - phdr.p_filesz;
        mem.fill(dest_addr, 0, bss_size)?;
        result.bytes_zeroed += bss_size;
    }

    // Verify phase: re-read the file and compare against memory
    if config.verify_after_load && phdr.p_filesz > 0 {
        let mut file_offset = phdr.p_offset;
        let mut dest_addr = phdr.p_vaddr;
        let mut remaining = phdr.p_filesz;

        while remaining > 0 {
            let chunk = remaining.min(LOAD_BUFFER_SIZE as u32) as usize;
            read_exact(source, file_offset, &mut buffer[..chunk])?;

            if !mem.matches(dest_addr, &buffer[..chunk]) {
                return Err(BootError::LoadFailed);
            }

            file_offset += chunk as u32;
            dest_addr += chunk as u32;
            remaining -= chunk as u32;
        }
    }

    Ok(SegmentInfo {
        vaddr: phdr.p_vaddr,
        size: phdr.p_memsz,
        flags: phdr.p_flags,
        loaded: true,
    })
}

/// Post-load validation: the entry point must land inside the loaded image.
///
/// A missing executable-flagged segment is reported but not fatal; some
/// toolchains leave the permission bits unset.
pub fn validate_loaded(result: &LoadResult) -> BootResult<()> {
    if result.entry < result.load_base || result.entry >= result.load_end {
        return Err(BootError::NoEntry);
    }

    if !result.segments.iter().any(|s| s.flags & PF_X != 0) {
        crate::console_println!("[!] no executable segment in image");
    }

    Ok(())
}
