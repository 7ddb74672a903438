//! `log` backend on top of a `Console`
//!
//! Records are rendered as `[LEVEL target] message` through the console's
//! bounded formatter, so an over-long record is truncated, never split.
//! The boot stage itself only logs at debug and trace; what reaches the
//! wire is decided by the level the image installs.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::console::Console;

/// Console-backed logger
pub struct ConsoleLogger<C: Console + Sync + 'static> {
    console: &'static C,
    level: LevelFilter,
}

impl<C: Console + Sync + 'static> ConsoleLogger<C> {
    pub const fn new(console: &'static C, level: LevelFilter) -> Self {
        Self { console, level }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl<C: Console + Sync + 'static> Log for ConsoleLogger<C> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        self.console.format_and_write(format_args!(
            "[{:<5} {}] {}\n",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

/// Register `logger` as the global `log` backend.
///
/// Fails if a logger is already installed; the max level is left untouched
/// in that case.
pub fn install<C: Console + Sync + 'static>(
    logger: &'static ConsoleLogger<C>,
) -> Result<(), SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::boxed::Box;
    use std::string::String;
    use std::sync::Mutex;
    use std::vec::Vec;

    struct SharedTape {
        out: Mutex<Vec<u8>>,
    }

    impl Console for SharedTape {
        fn write_char(&self, c: u8) -> u8 {
            self.out.lock().unwrap().push(c);
            c
        }

        fn read_char(&self) -> u8 {
            0
        }
    }

    fn leaked_tape() -> &'static SharedTape {
        Box::leak(Box::new(SharedTape {
            out: Mutex::new(Vec::new()),
        }))
    }

    fn written(tape: &SharedTape) -> String {
        String::from_utf8(tape.out.lock().unwrap().clone()).unwrap()
    }

    fn emit(logger: &dyn Log, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("mw_boot::boot")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_record_format() {
        let tape = leaked_tape();
        let logger = ConsoleLogger::new(tape, LevelFilter::Trace);

        emit(&logger, Level::Info, "selected l");
        assert_eq!(written(tape), "[INFO  mw_boot::boot] selected l\r\n");
    }

    #[test]
    fn test_level_filter() {
        let tape = leaked_tape();
        let logger = ConsoleLogger::new(tape, LevelFilter::Info);

        emit(&logger, Level::Debug, "hidden");
        emit(&logger, Level::Trace, "hidden");
        assert!(written(tape).is_empty());

        emit(&logger, Level::Warn, "shown");
        assert_eq!(written(tape), "[WARN  mw_boot::boot] shown\r\n");
        assert_eq!(logger.level(), LevelFilter::Info);
    }

    #[test]
    fn test_off_writes_nothing() {
        let tape = leaked_tape();
        let logger = ConsoleLogger::new(tape, LevelFilter::Off);

        emit(&logger, Level::Error, "nope");
        assert!(written(tape).is_empty());
    }

    #[test]
    fn test_long_record_truncated() {
        let tape = leaked_tape();
        let logger = ConsoleLogger::new(tape, LevelFilter::Trace);
        let long: String = core::iter::repeat('x').take(1_000).collect();

        emit(&logger, Level::Error, &long);
        let out = written(tape);
        assert!(out.starts_with("[ERROR mw_boot::boot] xxx"));
        assert!(!out.ends_with('\n'));
        assert_eq!(out.len(), crate::console::format::FORMAT_BUFFER_SIZE);
    }
}
