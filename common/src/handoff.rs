//! Handoff Descriptor ABI
//!
//! The structure passed from MimiBoot to the payload. The bootloader places
//! it at a 256-byte-aligned address outside every loaded segment and hands
//! its address to the payload in `r0`. Payloads depend on this crate to read
//! it back.
//!
//! The layout is fixed at exactly 256 bytes, little-endian, and must never
//! change without bumping `HANDOFF_VERSION`.

/// Handoff magic number: 'MIMI' in little-endian.
pub const HANDOFF_MAGIC: u32 = 0x494D_494D;

/// Handoff structure version.
pub const HANDOFF_VERSION: u32 = 1;

/// Total descriptor size in bytes.
pub const HANDOFF_SIZE: usize = 256;

// Boot reason flags
pub const BOOT_COLD: u32 = 0x0000_0001; // Power-on reset
pub const BOOT_WARM: u32 = 0x0000_0002; // Software-triggered reset
pub const BOOT_WATCHDOG: u32 = 0x0000_0004; // Watchdog timeout reset
pub const BOOT_BROWNOUT: u32 = 0x0000_0008; // Brownout/low voltage reset
pub const BOOT_EXTERNAL: u32 = 0x0000_0010; // External reset pin
pub const BOOT_DEBUG: u32 = 0x0000_0020; // Debug/JTAG reset
pub const BOOT_UNKNOWN: u32 = 0x8000_0000; // Unknown reset cause

// Boot source flags
pub const SOURCE_SD: u32 = 0x0000_0001; // SD card (SPI mode)
pub const SOURCE_SDIO: u32 = 0x0000_0002; // SD card (SDIO mode)
pub const SOURCE_SPI_FLASH: u32 = 0x0000_0004; // SPI NOR flash
pub const SOURCE_QSPI_FLASH: u32 = 0x0000_0008; // QSPI flash
pub const SOURCE_UART: u32 = 0x0000_0010; // UART download
pub const SOURCE_USB: u32 = 0x0000_0020; // USB download
pub const SOURCE_INTERNAL: u32 = 0x0000_0040; // Internal flash (fallback)

// Memory region flags
pub const REGION_RAM: u32 = 0x0000_0001; // General-purpose RAM
pub const REGION_FLASH: u32 = 0x0000_0002; // Flash memory
pub const REGION_PERIPHERAL: u32 = 0x0000_0004; // Memory-mapped peripherals
pub const REGION_LOADER: u32 = 0x0000_0010; // MimiBoot resides here
pub const REGION_PAYLOAD: u32 = 0x0000_0020; // Payload loaded here
pub const REGION_HANDOFF: u32 = 0x0000_0040; // Handoff struct here
pub const REGION_RESERVED: u32 = 0x0000_0080; // Reserved, do not use

/// Maximum number of memory regions in the handoff.
pub const MAX_REGIONS: usize = 8;

/// Memory region descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffRegion {
    pub base: u32,
    pub size: u32,
    pub flags: u32,
    pub reserved: u32,
}

impl HandoffRegion {
    pub const fn empty() -> Self {
        HandoffRegion {
            base: 0,
            size: 0,
            flags: 0,
            reserved: 0,
        }
    }
}

/// Information about the loaded image.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImageInfo {
    /// Entry point address.
    pub entry: u32,
    /// Lowest load address.
    pub load_base: u32,
    /// Total size in memory.
    pub load_size: u32,
    /// CRC32 of loaded data (0 if not computed).
    pub crc32: u32,
    /// Image filename (nul-terminated).
    pub name: [u8; 32],
}

impl ImageInfo {
    pub const fn empty() -> Self {
        ImageInfo {
            entry: 0,
            load_base: 0,
            load_size: 0,
            crc32: 0,
            name: [0; 32],
        }
    }

    /// Image name as a string slice, up to the first nul.
    pub fn name_str(&self) -> &str {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..len]).unwrap_or("")
    }
}

/// MimiBoot handoff descriptor.
///
/// Fixed at 256 bytes for predictable placement; the alignment attribute
/// guarantees any instance satisfies the 256-byte placement requirement.
#[repr(C, align(256))]
#[derive(Debug, Clone, Copy)]
pub struct Handoff {
    // Identification (offset 0x00)
    pub magic: u32,
    pub version: u32,
    pub struct_size: u32,
    /// CRC32 of bytes 0..16 with this field read as zero.
    pub header_crc: u32,

    // Boot context (offset 0x10)
    pub boot_reason: u32,
    pub boot_source: u32,
    pub boot_count: u32,
    pub boot_flags: u32,

    // Timing (offset 0x20)
    pub sys_clock_hz: u32,
    pub boot_time_us: u32,
    pub loader_time_us: u32,
    pub reserved_timing: u32,

    // Memory layout (offset 0x30)
    pub ram_base: u32,
    pub ram_size: u32,
    pub loader_base: u32,
    pub loader_size: u32,

    // Image info (offset 0x40)
    pub image: ImageInfo,

    // Memory regions (offset 0x70)
    pub region_count: u32,
    pub reserved_regions: u32,
    pub regions: [HandoffRegion; MAX_REGIONS],

    // Reserved tail, pads the structure to exactly 256 bytes (offset 0xF8)
    pub reserved: [u32; 2],
}

impl Handoff {
    /// A zeroed descriptor. Ports typically keep one of these in a static
    /// and hand the bootloader a mutable reference.
    pub const fn new() -> Self {
        Handoff {
            magic: 0,
            version: 0,
            struct_size: 0,
            header_crc: 0,
            boot_reason: 0,
            boot_source: 0,
            boot_count: 0,
            boot_flags: 0,
            sys_clock_hz: 0,
            boot_time_us: 0,
            loader_time_us: 0,
            reserved_timing: 0,
            ram_base: 0,
            ram_size: 0,
            loader_base: 0,
            loader_size: 0,
            image: ImageInfo::empty(),
            region_count: 0,
            reserved_regions: 0,
            regions: [HandoffRegion::empty(); MAX_REGIONS],
            reserved: [0; 2],
        }
    }

    /// Check magic and version. Payloads call this before trusting anything
    /// else in the descriptor.
    pub fn is_valid(&self) -> bool {
        self.magic == HANDOFF_MAGIC && self.version == HANDOFF_VERSION
    }

    /// End of primary RAM.
    pub fn ram_end(&self) -> u32 {
        self.ram_base.wrapping_add(self.ram_size)
    }

    /// Raw view of the descriptor. The struct is plain little-endian words
    /// with no padding, so this is the wire image.
    pub fn as_bytes(&self) -> &[u8; HANDOFF_SIZE] {
        unsafe { &*(self as *const Handoff as *const [u8; HANDOFF_SIZE]) }
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Handoff::new()
    }
}

/// Conventional placement: just below the end of RAM, rounded down to a
/// 256-byte boundary.
pub const fn default_location(ram_end: u32) -> u32 {
    (ram_end - HANDOFF_SIZE as u32) & !0xFF
}

const _: () = assert!(core::mem::size_of::<Handoff>() == HANDOFF_SIZE);
const _: () = assert!(core::mem::align_of::<Handoff>() == 256);
