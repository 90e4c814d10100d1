//! ELF32 Data Structures
//!
//! Decoded with explicit little-endian field reads from the on-disk byte
//! layout; no pointer casting, no alignment concerns.

use super::constants::{EHDR_SIZE, EI_NIDENT, PHDR_SIZE};

/// ELF32 file header.
#[derive(Debug, Clone, Copy)]
pub struct Elf32Header {
    pub e_ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Elf32Header {
    /// Decode the 52-byte header image.
    pub fn parse(buf: &[u8; EHDR_SIZE]) -> Self {
        let mut e_ident = [0u8; EI_NIDENT];
        e_ident.copy_from_slice(&buf[0..EI_NIDENT]);

        Elf32Header {
            e_ident,
            e_type: read_u16(buf, 16),
            e_machine: read_u16(buf, 18),
            e_version: read_u32(buf, 20),
            e_entry: read_u32(buf, 24),
            e_phoff: read_u32(buf, 28),
            e_shoff: read_u32(buf, 32),
            e_flags: read_u32(buf, 36),
            e_ehsize: read_u16(buf, 40),
            e_phentsize: read_u16(buf, 42),
            e_phnum: read_u16(buf, 44),
            e_shentsize: read_u16(buf, 46),
            e_shnum: read_u16(buf, 48),
            e_shstrndx: read_u16(buf, 50),
        }
    }
}

/// ELF32 program header. Describes one segment; the loader iterates these
/// and processes the `PT_LOAD` entries.
#[derive(Debug, Clone, Copy)]
pub struct Elf32ProgramHeader {
    pub p_type: u32,
    pub p_offset: u32,
    pub p_vaddr: u32,
    pub p_paddr: u32,
    pub p_filesz: u32,
    pub p_memsz: u32,
    pub p_flags: u32,
    pub p_align: u32,
}

impl Elf32ProgramHeader {
    /// Decode one 32-byte program-header record.
    pub fn parse(buf: &[u8; PHDR_SIZE]) -> Self {
        Elf32ProgramHeader {
            p_type: read_u32(buf, 0),
            p_offset: read_u32(buf, 4),
            p_vaddr: read_u32(buf, 8),
            p_paddr: read_u32(buf, 12),
            p_filesz: read_u32(buf, 16),
            p_memsz: read_u32(buf, 20),
            p_flags: read_u32(buf, 24),
            p_align: read_u32(buf, 28),
        }
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
