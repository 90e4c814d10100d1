//! Handoff Construction
//!
//! Populates the 256-byte descriptor from the load result and platform
//! info, then seals the header with its CRC. The descriptor itself lives in
//! a caller-supplied slot (typically a static just below the top of RAM);
//! this module only fills it in.

use crate::elf::LoadResult;
use crate::hal::PlatformInfo;
use mimiboot_common::crc::crc32;
use mimiboot_common::handoff::{
    Handoff, HANDOFF_MAGIC, HANDOFF_SIZE, HANDOFF_VERSION, REGION_FLASH, REGION_LOADER,
    REGION_PAYLOAD, REGION_RAM,
};

/// Build the handoff descriptor.
///
/// `image_path` is the path the image was loaded from; only its basename is
/// recorded, truncated to 31 characters. The timing fields are left zero
/// for the orchestration to fill in just before the jump; they are outside
/// the CRC-sealed header, so that is safe.
pub fn build(
    handoff: &mut Handoff,
    load_result: &LoadResult,
    platform: &PlatformInfo,
    image_path: &str,
) {
    *handoff = Handoff::new();

    // Identification
    handoff.magic = HANDOFF_MAGIC;
    handoff.version = HANDOFF_VERSION;
    handoff.struct_size = HANDOFF_SIZE as u32;

    // Boot context
    handoff.boot_reason = platform.reset_reason;
    handoff.boot_source = platform.boot_source;
    handoff.boot_count = 0;
    handoff.boot_flags = 0;

    // Timing; boot_time_us and loader_time_us are assigned by the caller
    handoff.sys_clock_hz = platform.sys_clock_hz;

    // Memory layout
    handoff.ram_base = platform.ram_base;
    handoff.ram_size = platform.ram_size;
    handoff.loader_base = platform.loader_base;
    handoff.loader_size = platform.loader_size;

    // Image information
    handoff.image.entry = load_result.entry;
    handoff.image.load_base = load_result.load_base;
    handoff.image.load_size = load_result.total_size;
    handoff.image.crc32 = 0;

    let name = basename(image_path).as_bytes();
    let len = name.len().min(handoff.image.name.len() - 1);
    handoff.image.name[..len].copy_from_slice(&name[..len]);

    // Memory regions: the payload RAM and the loader flash
    handoff.regions[0].base = platform.ram_base;
    handoff.regions[0].size = platform.ram_size;
    handoff.regions[0].flags = REGION_RAM | REGION_PAYLOAD;

    handoff.regions[1].base = platform.loader_base;
    handoff.regions[1].size = platform.loader_size;
    handoff.regions[1].flags = REGION_FLASH | REGION_LOADER;

    handoff.region_count = 2;

    seal_header(handoff);
}

/// Compute the header CRC over bytes 0..16 with the CRC field read as zero,
/// and store it.
pub fn seal_header(handoff: &mut Handoff) {
    let mut header = [0u8; 16];
    header[0..4].copy_from_slice(&handoff.magic.to_le_bytes());
    header[4..8].copy_from_slice(&handoff.version.to_le_bytes());
    header[8..12].copy_from_slice(&handoff.struct_size.to_le_bytes());
    // bytes 12..16 stay zero
    handoff.header_crc = crc32(&header);
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
