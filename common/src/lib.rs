#![cfg_attr(not(test), no_std)]

//! MimiBoot Common Library
//!
//! Shared components between the bootloader and loaded payloads: the handoff
//! descriptor ABI, the CRC32 used to seal it, and the console layer.

pub mod console;
pub mod crc;
pub mod handoff;

// Re-export commonly used items
pub use console::{init_console, set_quiet, set_verbose};
pub use crc::crc32;
pub use handoff::{Handoff, HandoffRegion, ImageInfo};
