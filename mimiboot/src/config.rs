//! Boot Configuration
//!
//! Parses `boot.cfg` from the root of the volume to determine which image
//! to load and with what parameters.
//!
//! File format:
//!
//! ```text
//! # MimiBoot configuration
//! image = /boot/kernel.elf
//! fallback = /boot/recovery.elf
//! verbose = 1
//! ```
//!
//! Simple `key = value` lines, `#` for comments, whitespace ignored,
//! unknown keys skipped. A missing file is not an error; the defaults
//! below apply.

use heapless::String;

pub const MAX_PATH: usize = 128;

pub const DEFAULT_IMAGE: &str = "/boot/kernel.elf";
pub const DEFAULT_FALLBACK: &str = "/boot/recovery.elf";
pub const DEFAULT_CONFIG_PATH: &str = "/boot.cfg";
pub const DEFAULT_BAUD: u32 = 115_200;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Boot configuration state.
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// Primary image path.
    pub image_path: String<MAX_PATH>,
    /// Fallback image path.
    pub fallback_path: String<MAX_PATH>,
    pub has_fallback: bool,

    /// Menu timeout, unused without a menu.
    pub timeout_ms: u32,
    /// Delay before boot.
    pub boot_delay_ms: u32,

    pub console_baud: u32,
    pub verbose: bool,
    pub quiet: bool,

    /// Read back and verify the loaded image.
    pub verify: bool,
    /// Reset instead of halting in the blink loop on boot failure.
    pub reset_on_fail: bool,
    /// Attempts before switching to the fallback image.
    pub max_retries: u32,

    /// Boot attempts this power cycle. Not persisted across resets, so
    /// fallback-after-retries only applies within a single session.
    pub boot_count: u32,
    pub config_loaded: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        let mut config = BootConfig {
            image_path: String::new(),
            fallback_path: String::new(),
            has_fallback: true,
            timeout_ms: 0,
            boot_delay_ms: 0,
            console_baud: DEFAULT_BAUD,
            verbose: true,
            quiet: false,
            verify: false,
            reset_on_fail: false,
            max_retries: DEFAULT_MAX_RETRIES,
            boot_count: 0,
            config_loaded: false,
        };
        assign(&mut config.image_path, DEFAULT_IMAGE);
        assign(&mut config.fallback_path, DEFAULT_FALLBACK);
        config
    }
}

impl BootConfig {
    /// Parse configuration text, overriding current values line by line.
    pub fn parse(&mut self, text: &str) {
        for line in text.lines() {
            self.parse_line(line);
        }
        self.config_loaded = true;
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let key = key.trim();
        // Strip a trailing comment from the value
        let value = value.split('#').next().unwrap_or("").trim();

        match key {
            "image" => assign(&mut self.image_path, value),
            "fallback" => {
                assign(&mut self.fallback_path, value);
                self.has_fallback = true;
            }
            "timeout" => self.timeout_ms = parse_uint(value),
            "delay" => self.boot_delay_ms = parse_uint(value),
            "baudrate" | "baud" => self.console_baud = parse_uint(value),
            "verbose" => self.verbose = parse_bool(value),
            "quiet" => {
                self.quiet = parse_bool(value);
                if self.quiet {
                    self.verbose = false;
                }
            }
            "verify" => self.verify = parse_bool(value),
            "reset_on_fail" => self.reset_on_fail = parse_bool(value),
            "max_retries" | "retries" => self.max_retries = parse_uint(value),
            // Unknown keys ignored
            _ => {}
        }
    }

    /// Path of the image to boot: the primary, or the fallback once the
    /// attempt counter reaches `max_retries`. `None` when nothing is
    /// configured.
    pub fn image(&self) -> Option<&str> {
        if self.boot_count >= self.max_retries
            && self.has_fallback
            && !self.fallback_path.is_empty()
        {
            return Some(self.fallback_path.as_str());
        }

        if !self.image_path.is_empty() {
            return Some(self.image_path.as_str());
        }

        None
    }

    /// Fallback path, when one is configured.
    pub fn fallback(&self) -> Option<&str> {
        if self.has_fallback && !self.fallback_path.is_empty() {
            Some(self.fallback_path.as_str())
        } else {
            None
        }
    }

    /// Mark a boot attempt. Called before trying to load.
    pub fn boot_attempt(&mut self) {
        self.boot_count += 1;
    }

    /// Reset the attempt counter after a successful load.
    pub fn boot_success(&mut self) {
        self.boot_count = 0;
    }
}

/// Copy into a bounded string, truncating at capacity.
fn assign<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    for c in src.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}

/// Parse leading decimal digits; anything after them is ignored.
fn parse_uint(s: &str) -> u32 {
    let mut value: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u32);
    }
    value
}

fn parse_bool(s: &str) -> bool {
    matches!(s, "1" | "true" | "yes" | "on")
}
