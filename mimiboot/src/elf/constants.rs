//! ELF32 constants for little-endian ARM targets.
//!
//! Reference: Tool Interface Standard (TIS) ELF Specification 1.2.

// e_ident[] indices
pub const EI_MAG0: usize = 0;
pub const EI_MAG1: usize = 1;
pub const EI_MAG2: usize = 2;
pub const EI_MAG3: usize = 3;
pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_VERSION: usize = 6;
pub const EI_NIDENT: usize = 16;

/// Magic number: 0x7f 'E' 'L' 'F'
pub const ELFMAG: [u8; 4] = [0x7f, b'E', b'L', b'F'];

// e_ident[EI_CLASS]
pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;

// e_ident[EI_DATA]
pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

// e_ident[EI_VERSION] and e_version
pub const EV_CURRENT: u32 = 1;

// e_type
pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;

// e_machine
pub const EM_ARM: u16 = 40;

// p_type
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_NOTE: u32 = 4;
pub const PT_ARM_EXIDX: u32 = 0x7000_0001;

// p_flags
pub const PF_X: u32 = 0x1;
pub const PF_W: u32 = 0x2;
pub const PF_R: u32 = 0x4;

/// ELF32 file header size.
pub const EHDR_SIZE: usize = 52;

/// ELF32 program header entry size; anything else is rejected.
pub const PHDR_SIZE: usize = 32;

/// Sanity limit on the program-header count.
pub const MAX_PHDRS: u16 = 64;

/// Maximum accepted LOAD segments.
pub const MAX_SEGMENTS: usize = 16;
