//! Boot Orchestration
//!
//! The boot sequence, start to finish:
//!
//! 1. Console init and banner
//! 2. Storage info and filesystem mount
//! 3. Configuration (`/boot.cfg`, defaults if absent)
//! 4. Optional boot delay
//! 5. Open the image (fallback tried once when the primary is missing)
//! 6. Two-pass ELF load into RAM
//! 7. Handoff construction
//! 8. Jump to the payload
//!
//! Any failure prints the error code and label, then either resets (when
//! configured) or blinks the LED forever with a pattern identifying the
//! failure class, preserving the state for inspection.

use crate::config::{BootConfig, DEFAULT_CONFIG_PATH};
use crate::elf::{
    self, DirectMemory, ImageSource, LoaderConfig, MemRegion, MEM_EXEC, MEM_RAM, MEM_READ,
    MEM_WRITE,
};
use crate::error::{BootError, BootResult};
use crate::fs::{Fat32File, Fat32Volume};
use crate::hal::{BlockSource, Platform};
use crate::handoff;
use crate::{console_println, console_vprintln};
use mimiboot_common::console;
use mimiboot_common::handoff::Handoff;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Error LED patterns: blink count identifies the failure class
pub const BLINK_INIT_FAIL: u32 = 2;
pub const BLINK_STORAGE_FAIL: u32 = 3;
pub const BLINK_FS_FAIL: u32 = 4;
pub const BLINK_FILE_NOT_FOUND: u32 = 5;
pub const BLINK_ELF_INVALID: u32 = 6;
pub const BLINK_LOAD_FAIL: u32 = 7;
pub const BLINK_NO_MEMORY: u32 = 8;

/// Adapter exposing an open FAT32 file to the segment loader as a
/// seekable byte source.
pub struct FileSource<'v, D: BlockSource> {
    volume: &'v mut Fat32Volume<D>,
    file: Fat32File,
}

impl<'v, D: BlockSource> FileSource<'v, D> {
    pub fn new(volume: &'v mut Fat32Volume<D>, file: Fat32File) -> Self {
        FileSource { volume, file }
    }
}

impl<D: BlockSource> ImageSource for FileSource<'_, D> {
    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> BootResult<usize> {
        self.volume.seek(&mut self.file, offset)?;
        self.volume.read(&mut self.file, buf)
    }

    fn size(&mut self) -> u32 {
        self.file.size()
    }
}

/// Map a load error to its LED failure class.
fn load_blink_code(err: BootError) -> u32 {
    match err {
        BootError::NotElf
        | BootError::NotElf32
        | BootError::NotLittleEndian
        | BootError::NotExecutable
        | BootError::NotArm
        | BootError::BadVersion
        | BootError::NoEntry
        | BootError::NoProgramHeaders
        | BootError::BadPhdrSize
        | BootError::TooManyPhdrs => BLINK_ELF_INVALID,
        BootError::AddrInvalid | BootError::TooLarge | BootError::NoMemory | BootError::BadRegion => {
            BLINK_NO_MEMORY
        }
        _ => BLINK_LOAD_FAIL,
    }
}

/// Boot failure: print the diagnostic, then reset or blink forever.
fn boot_fail<P: Platform>(platform: &mut P, reset_on_fail: bool, blink_code: u32, err: BootError) -> ! {
    console_println!();
    console_println!("[x] FAIL: {} (code {})", err, err.code());
    console_println!("[x] blink code: {}", blink_code);

    if reset_on_fail {
        platform.reset();
    }

    loop {
        platform.led_blink(blink_code, 200, 200);
        platform.delay_ms(1000);
    }
}

/// Read and parse `/boot.cfg`. Absence of the file is reported as an error
/// for the caller to log; the config keeps its defaults in that case.
fn load_config<D: BlockSource>(
    volume: &mut Fat32Volume<D>,
    config: &mut BootConfig,
) -> BootResult<()> {
    let mut file = volume.open(DEFAULT_CONFIG_PATH)?;
    if file.is_dir() {
        return Err(BootError::Invalid);
    }

    let mut buffer = [0u8; 2048];
    let limit = (file.size() as usize).min(buffer.len() - 1);
    let n = volume.read(&mut file, &mut buffer[..limit])?;

    let text = core::str::from_utf8(&buffer[..n]).map_err(|_| BootError::Invalid)?;
    config.parse(text);
    Ok(())
}

/// The main boot sequence. Never returns: it ends in the jump to the
/// payload or in the failure indication loop.
///
/// The port hands over the platform, the opened storage device, and a
/// `'static` slot for the handoff descriptor (which the payload goes on
/// reading after the jump).
pub fn boot_main<P: Platform, D: BlockSource>(
    platform: &mut P,
    disk: D,
    handoff: &'static mut Handoff,
) -> ! {
    let boot_start_us = platform.time_us();
    let mut config = BootConfig::default();

    platform.console_init();
    let info = platform.info();

    console_println!();
    console_println!("========================================");
    console_println!("  MimiBoot v{}", VERSION);
    console_println!("  Minimal ELF Bootloader for ARM Cortex-M");
    console_println!("========================================");
    console_println!();

    console_vprintln!("Platform: {}", info.platform_name);
    console_vprintln!(
        "RAM: 0x{:08X} - 0x{:08X} ({} KB)",
        info.ram_base,
        info.ram_base.wrapping_add(info.ram_size),
        info.ram_size / 1024
    );
    console_vprintln!("Clock: {} MHz", info.sys_clock_hz / 1_000_000);
    console_vprintln!();

    console_println!("Initializing storage...");
    let storage = disk.info();
    console_vprintln!("Storage: {}", storage.name);
    console_vprintln!("Capacity: {} MB", storage.total_size / (1024 * 1024));

    console_println!("Mounting filesystem...");
    let mut volume = match Fat32Volume::mount(disk) {
        Ok(volume) => volume,
        Err(e) => boot_fail(platform, config.reset_on_fail, BLINK_FS_FAIL, e),
    };
    console_vprintln!("Filesystem mounted");
    console_vprintln!("Cluster size: {} bytes", volume.cluster_size);

    console_println!("Loading configuration...");
    match load_config(&mut volume, &mut config) {
        Ok(()) => console_vprintln!("Configuration loaded"),
        Err(_) => console_vprintln!("No boot.cfg found, using defaults"),
    }
    console::set_quiet(config.quiet);
    console::set_verbose(config.verbose);

    console_vprintln!("Boot image: {}", config.image_path);
    if let Some(fallback) = config.fallback() {
        console_vprintln!("Fallback: {}", fallback);
    }

    if config.boot_delay_ms > 0 {
        console_println!("Waiting {} ms...", config.boot_delay_ms);
        platform.delay_ms(config.boot_delay_ms);
    }

    // Mark the attempt, pick the image
    config.boot_attempt();
    let Some(primary) = config.image() else {
        boot_fail(
            platform,
            config.reset_on_fail,
            BLINK_FILE_NOT_FOUND,
            BootError::NotFound,
        )
    };

    console_println!("Loading: {}", primary);

    let mut path = primary;
    let file = match volume.open(path) {
        Ok(file) => file,
        // Only a missing primary is worth a second try, and only once
        Err(BootError::NotFound) => match config.fallback() {
            Some(fallback) => {
                console_println!("Primary image not found, trying fallback...");
                path = fallback;
                match volume.open(path) {
                    Ok(file) => file,
                    Err(e) => {
                        boot_fail(platform, config.reset_on_fail, BLINK_FILE_NOT_FOUND, e)
                    }
                }
            }
            None => boot_fail(
                platform,
                config.reset_on_fail,
                BLINK_FILE_NOT_FOUND,
                BootError::NotFound,
            ),
        },
        Err(e) => boot_fail(platform, config.reset_on_fail, BLINK_FILE_NOT_FOUND, e),
    };

    console_vprintln!("File size: {} bytes", file.size());

    let ram_region = MemRegion {
        base: info.ram_base,
        size: info.ram_size,
        flags: MEM_READ | MEM_WRITE | MEM_EXEC | MEM_RAM,
    };

    let loader_config = LoaderConfig {
        regions: core::slice::from_ref(&ram_region),
        validate_addresses: true,
        zero_bss: true,
        verify_after_load: config.verify,
    };

    let load_start_us = platform.time_us();

    let mut source = FileSource::new(&mut volume, file);
    // The region table above is real RAM, which is what makes this sound
    let mut target = unsafe { DirectMemory::new() };
    let loaded = elf::load(&loader_config, &mut source, &mut target);

    let load_time_us = platform.time_us().wrapping_sub(load_start_us);

    let result = match loaded {
        Ok(result) => result,
        Err(e) => {
            console_println!("[x] image load failed: {} (code {})", e, e.code());
            boot_fail(platform, config.reset_on_fail, load_blink_code(e), e)
        }
    };

    if let Err(e) = elf::validate_loaded(&result) {
        boot_fail(platform, config.reset_on_fail, BLINK_ELF_INVALID, e);
    }

    console_println!("Loaded successfully!");
    console_vprintln!("  Entry point: 0x{:08X}", result.entry);
    console_vprintln!(
        "  Load region: 0x{:08X} - 0x{:08X}",
        result.load_base,
        result.load_end
    );
    console_vprintln!("  Total size:  {} bytes", result.total_size);
    console_vprintln!("  Segments:    {}", result.segment_count());
    for (i, seg) in result.segments.iter().enumerate() {
        console_vprintln!(
            "    segment {}: 0x{:08X} - 0x{:08X} [{}]",
            i,
            seg.vaddr,
            seg.vaddr.wrapping_add(seg.size),
            elf::segment_permissions(seg.flags)
        );
    }
    console_vprintln!("  Copied:      {} bytes", result.bytes_copied);
    console_vprintln!("  Zeroed:      {} bytes (BSS)", result.bytes_zeroed);
    console_vprintln!("  Load time:   {} us", load_time_us);

    console_vprintln!();
    console_vprintln!("Preparing handoff...");

    handoff::build(handoff, &result, &info, path);
    handoff.boot_time_us = platform.time_us().wrapping_sub(boot_start_us);
    handoff.loader_time_us = load_time_us;

    console_vprintln!(
        "Handoff structure at: 0x{:08X}",
        &*handoff as *const Handoff as usize
    );
    console_vprintln!(
        "Total boot time: {} us ({} ms)",
        handoff.boot_time_us,
        handoff.boot_time_us / 1000
    );

    console_println!();
    console_println!(">>> Jumping to payload at 0x{:08X}", result.entry);
    console_println!("========================================");
    console_println!();

    // Let the UART drain before interrupts go away
    platform.delay_ms(10);
    platform.led_set(false);

    unsafe { crate::arch::jump(handoff, result.entry) }
}
