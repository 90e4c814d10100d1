// Console layer for MimiBoot
// Byte-oriented diagnostic output over a platform-installed sink

use core::fmt::{self, Write};
use lazy_static::lazy_static;
use spin::Mutex;

// === CONSOLE MACROS ===

#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {{
        let console = $crate::console::CONSOLE.lock();
        let _ = console.print(format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! console_println {
    () => {
        $crate::console_print!("\r\n")
    };
    ($($arg:tt)*) => {{
        $crate::console_print!($($arg)*);
        $crate::console_print!("\r\n");
    }};
}

/// Verbose-only variant; suppressed unless the console is in verbose mode.
#[macro_export]
macro_rules! console_vprintln {
    () => {{
        let console = $crate::console::CONSOLE.lock();
        let _ = console.print_verbose(format_args!("\r\n"));
    }};
    ($($arg:tt)*) => {{
        let console = $crate::console::CONSOLE.lock();
        let _ = console.print_verbose(format_args!($($arg)*));
        let _ = console.print_verbose(format_args!("\r\n"));
    }};
}

// === CONSOLE MANAGER ===

/// Output sink installed by the platform, typically a UART transmit routine.
pub type ConsoleSink = fn(u8);

pub struct Console {
    sink: Option<ConsoleSink>,
    quiet: bool,
    verbose: bool,
}

impl Console {
    pub const fn new() -> Self {
        Console {
            sink: None,
            quiet: false,
            verbose: true,
        }
    }

    pub fn set_sink(&mut self, sink: ConsoleSink) {
        self.sink = Some(sink);
    }

    /// Suppress all output. Verbose output stays off while quiet is set.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn print(&self, args: fmt::Arguments) -> fmt::Result {
        if self.quiet {
            return Ok(());
        }
        match self.sink {
            Some(sink) => SinkWriter(sink).write_fmt(args),
            None => Ok(()),
        }
    }

    pub fn print_verbose(&self, args: fmt::Arguments) -> fmt::Result {
        if !self.verbose {
            return Ok(());
        }
        self.print(args)
    }
}

struct SinkWriter(ConsoleSink);

impl Write for SinkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            (self.0)(byte);
        }
        Ok(())
    }
}

// Global console instance
lazy_static! {
    pub static ref CONSOLE: Mutex<Console> = Mutex::new(Console::new());
}

// === HIGH-LEVEL FUNCTIONS ===

/// Install the platform output sink. Until this is called, console output is
/// silently dropped.
pub fn init_console(sink: ConsoleSink) {
    CONSOLE.lock().set_sink(sink);
}

pub fn set_quiet(quiet: bool) {
    CONSOLE.lock().set_quiet(quiet);
}

pub fn set_verbose(verbose: bool) {
    CONSOLE.lock().set_verbose(verbose);
}
