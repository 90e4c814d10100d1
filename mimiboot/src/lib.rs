#![cfg_attr(not(test), no_std)]

//! MimiBoot - Minimal Second-Stage Bootloader for ARM Cortex-M
//!
//! Reads an ELF32 executable from a FAT32 volume, copies its LOAD segments
//! into RAM, builds a 256-byte handoff descriptor, and branches to the image
//! with the descriptor pointer in `r0` and the Thumb bit set.
//!
//! This crate is the platform-independent core. A port supplies the reset
//! vector, the panic handler, a [`hal::Platform`] and [`hal::BlockSource`]
//! implementation, a static [`Handoff`] slot, and then calls
//! [`boot::boot_main`]:
//!
//! ```ignore
//! static mut HANDOFF: Handoff = Handoff::new();
//!
//! #[no_mangle]
//! pub extern "C" fn main() -> ! {
//!     let mut platform = Rp2040Platform::init();
//!     let card = platform.open_sd_card();
//!     boot::boot_main(&mut platform, card, unsafe { &mut HANDOFF })
//! }
//! ```
//!
//! [`Handoff`]: mimiboot_common::handoff::Handoff

pub mod arch;
pub mod boot;
pub mod config;
pub mod elf;
pub mod error;
pub mod fs;
pub mod hal;
pub mod handoff;

pub use error::{BootError, BootResult};

// Re-export the console macros from the shared library
pub use mimiboot_common::{console_print, console_println, console_vprintln};
