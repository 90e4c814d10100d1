//! Filesystem layer.
//!
//! Read-only FAT32 over a [`BlockSource`](crate::hal::BlockSource). This is
//! all the bootloader needs: resolve a path, read the bytes.

pub mod fat32;

pub use fat32::{Fat32File, Fat32Volume};
