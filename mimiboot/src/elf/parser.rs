//! ELF Header Validation
//!
//! Checks that a file header names a 32-bit little-endian ARM executable
//! the loader can handle. First failure wins; each check maps to its own
//! error code so a boot failure pinpoints the offending field.

use super::constants::*;
use super::structures::Elf32Header;
use crate::error::{BootError, BootResult};

pub fn validate_header(ehdr: &Elf32Header) -> BootResult<()> {
    if ehdr.e_ident[0..4] != ELFMAG {
        return Err(BootError::NotElf);
    }

    if ehdr.e_ident[EI_CLASS] != ELFCLASS32 {
        return Err(BootError::NotElf32);
    }

    if ehdr.e_ident[EI_DATA] != ELFDATA2LSB {
        return Err(BootError::NotLittleEndian);
    }

    if ehdr.e_ident[EI_VERSION] as u32 != EV_CURRENT || ehdr.e_version != EV_CURRENT {
        return Err(BootError::BadVersion);
    }

    if ehdr.e_type != ET_EXEC {
        return Err(BootError::NotExecutable);
    }

    if ehdr.e_machine != EM_ARM {
        return Err(BootError::NotArm);
    }

    if ehdr.e_entry == 0 {
        return Err(BootError::NoEntry);
    }

    if ehdr.e_phoff == 0 || ehdr.e_phnum == 0 {
        return Err(BootError::NoProgramHeaders);
    }

    if ehdr.e_phentsize as usize != PHDR_SIZE {
        return Err(BootError::BadPhdrSize);
    }

    if ehdr.e_phnum > MAX_PHDRS {
        return Err(BootError::TooManyPhdrs);
    }

    Ok(())
}
