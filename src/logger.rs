//! Console logger
//!
//! Routes the `log` facade to the UART via `kprintln!`. Records look like
//! `[WARN ] pid 1: invalid syscall number 99`.

use log::{LevelFilter, Log, Metadata, Record};

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

/// Compile-time log ceiling; the `trace` feature lifts it.
pub const MAX_LEVEL: LevelFilter = if cfg!(feature = "trace") {
    LevelFilter::Trace
} else {
    LevelFilter::Info
};

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            crate::kprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Later calls are ignored.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
}
