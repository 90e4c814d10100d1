//! Hardware Abstraction Contracts
//!
//! The bootloader core is platform-agnostic; everything it needs from the
//! hardware comes through these traits. A port implements them over its
//! clock, timer, LED, reset controller and storage driver.

use crate::error::BootResult;

/// Logical sector size. The filesystem layer supports no other value.
pub const SECTOR_SIZE: usize = 512;

/// Storage device information, for diagnostics only.
#[derive(Debug, Clone, Copy)]
pub struct StorageInfo {
    pub sector_count: u32,
    pub total_size: u32,
    pub read_only: bool,
    pub name: &'static str,
}

/// A block-oriented storage device read one 512-byte sector at a time.
///
/// Sector indices are linear LBA across the whole device starting at 0.
/// Reads must be idempotent, and must return bit-identical bytes for the
/// same sector for the duration of a boot attempt: the segment loader reads
/// the image twice (validate, then materialize) and relies on it. Recovery
/// from a failed read (e.g. re-initializing an SD card after a data-token
/// timeout) is the implementation's responsibility.
pub trait BlockSource {
    fn read_sector(&mut self, lba: u32, buf: &mut [u8; SECTOR_SIZE]) -> BootResult<()>;

    fn info(&self) -> StorageInfo;
}

/// Platform identification and memory layout, filled in by the port.
#[derive(Debug, Clone, Copy)]
pub struct PlatformInfo {
    // Memory layout
    pub ram_base: u32,
    pub ram_size: u32,
    pub loader_base: u32,
    pub loader_size: u32,

    // System state
    pub sys_clock_hz: u32,
    /// Reset cause, `BOOT_*` flags from `mimiboot_common::handoff`.
    pub reset_reason: u32,
    /// Storage type, `SOURCE_*` flags from `mimiboot_common::handoff`.
    pub boot_source: u32,

    // Identification
    pub chip_id: u32,
    pub platform_name: &'static str,
}

/// Everything else the boot sequence needs from the hardware: console
/// bring-up, timing, the status LED and the reset controller.
pub trait Platform {
    /// Platform information snapshot.
    fn info(&self) -> PlatformInfo;

    /// Initialize the debug console. Ports install their UART transmit
    /// routine via `mimiboot_common::console::init_console` here. Optional.
    fn console_init(&mut self) {}

    /// Microseconds since reset. May wrap; used for boot-time reporting.
    fn time_us(&self) -> u32;

    fn delay_ms(&self, ms: u32);

    /// Set the status LED. Optional.
    fn led_set(&mut self, _on: bool) {}

    /// Blink the status LED `count` times. Used for error indication.
    fn led_blink(&mut self, count: u32, on_ms: u32, off_ms: u32) {
        for _ in 0..count {
            self.led_set(true);
            self.delay_ms(on_ms);
            self.led_set(false);
            self.delay_ms(off_ms);
        }
    }

    /// Software reset of the whole system.
    fn reset(&mut self) -> !;
}
