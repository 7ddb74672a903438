//! Console output
//!
//! Byte-level console on top of a blocking character device. Two things
//! happen here and nowhere else:
//! - `\n` becomes `\r\n` on the way out, whatever the caller's convention
//! - formatted output is rendered into a fixed buffer before it is written
//!
//! This is NOT a terminal: there is no input echo, no line editing and no
//! buffering. `read_char`/`write_char` go straight to the driver.

use core::fmt;

pub mod format;

pub use format::{BoundedBuffer, FORMAT_BUFFER_SIZE};

/// Blocking character console
pub trait Console {
    /// Write one byte, waiting for the device; returns the byte written
    fn write_char(&self, c: u8) -> u8;

    /// Wait for and return one byte of input
    fn read_char(&self) -> u8;

    /// Write raw bytes, inserting `\r` before every `\n`
    fn write_string(&self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                self.write_char(b'\r');
            }
            self.write_char(byte);
        }
    }

    /// Render `args` into a `FORMAT_BUFFER_SIZE` buffer and write it out.
    ///
    /// Output past the buffer is dropped without notice. Returns the number
    /// of rendered bytes (before newline translation).
    fn format_and_write(&self, args: fmt::Arguments) -> usize {
        let mut buffer = BoundedBuffer::<FORMAT_BUFFER_SIZE>::new();
        buffer.render(args);
        self.write_string(buffer.as_bytes());
        buffer.len()
    }
}

impl<C: Console + ?Sized> Console for &C {
    fn write_char(&self, c: u8) -> u8 {
        (**self).write_char(c)
    }

    fn read_char(&self) -> u8 {
        (**self).read_char()
    }

    fn write_string(&self, bytes: &[u8]) {
        (**self).write_string(bytes)
    }

    fn format_and_write(&self, args: fmt::Arguments) -> usize {
        (**self).format_and_write(args)
    }
}

/// Formatted console output
///
/// ```ignore
/// console_print!(uart, "BRAM: {} KB\n", kb);
/// ```
#[macro_export]
macro_rules! console_print {
    ($console:expr, $($arg:tt)*) => {
        $crate::console::Console::format_and_write(&$console, format_args!($($arg)*))
    };
}

/// Formatted console output followed by a newline
#[macro_export]
macro_rules! console_println {
    ($console:expr) => {
        $crate::console::Console::write_string(&$console, b"\n")
    };
    ($console:expr, $($arg:tt)*) => {{
        let _ = $crate::console_print!($console, $($arg)*);
        $crate::console::Console::write_string(&$console, b"\n")
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    /// Console that records what it is given
    struct Tape {
        out: RefCell<Vec<u8>>,
        input: RefCell<Vec<u8>>,
    }

    impl Tape {
        fn new() -> Self {
            Self {
                out: RefCell::new(Vec::new()),
                input: RefCell::new(Vec::new()),
            }
        }

        fn take(&self) -> Vec<u8> {
            core::mem::take(&mut *self.out.borrow_mut())
        }
    }

    impl Console for Tape {
        fn write_char(&self, c: u8) -> u8 {
            self.out.borrow_mut().push(c);
            c
        }

        fn read_char(&self) -> u8 {
            self.input.borrow_mut().remove(0)
        }
    }

    #[test]
    fn test_newline_translation() {
        let tape = Tape::new();
        tape.write_string(b"a\nb\r\n\n");
        assert_eq!(tape.take(), b"a\r\nb\r\r\n\r\n");
    }

    #[test]
    fn test_write_string_is_repeatable() {
        let tape = Tape::new();
        let input = b"Load binaries\n mw_debug stop\n\n";

        tape.write_string(input);
        let first = tape.take();
        tape.write_string(input);
        let second = tape.take();

        assert_eq!(first, second);
        // Only the carriage returns were added
        let stripped: Vec<u8> = first.iter().copied().filter(|&b| b != b'\r').collect();
        assert_eq!(stripped, input);
        assert_eq!(first.len(), input.len() + 3);
    }

    #[test]
    fn test_write_string_no_newline_untouched() {
        let tape = Tape::new();
        tape.write_string(b"\rplain\ttext");
        assert_eq!(tape.take(), b"\rplain\ttext");
    }

    #[test]
    fn test_format_and_write() {
        let tape = Tape::new();
        let count = tape.format_and_write(format_args!("CLK: {} MHz\n", 100));
        assert_eq!(count, 13);
        assert_eq!(tape.take(), b"CLK: 100 MHz\r\n");
    }

    #[test]
    fn test_format_truncates_silently() {
        let tape = Tape::new();
        let long = "x".repeat(FORMAT_BUFFER_SIZE + 50);

        let count = tape.format_and_write(format_args!("{}\n", long));
        assert_eq!(count, FORMAT_BUFFER_SIZE);
        let out = tape.take();
        assert_eq!(out.len(), FORMAT_BUFFER_SIZE);
        assert!(out.iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_macros() {
        let tape = Tape::new();
        console_print!(tape, "{:x}", 0x1000000);
        console_println!(tape, " start");
        console_println!(tape);
        assert_eq!(tape.take(), b"1000000 start\r\n\r\n");
    }

    #[test]
    fn test_console_by_reference() {
        let tape = Tape::new();
        tape.input.borrow_mut().push(b'l');
        let by_ref = &tape;

        assert_eq!(Console::read_char(&by_ref), b'l');
        assert_eq!(Console::write_char(&by_ref, b'.'), b'.');
        assert_eq!(tape.take(), b".");
    }
}
