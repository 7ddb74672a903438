//! Configuration errors
//!
//! Nothing on the boot path itself returns an error: hardware faults hang and
//! unknown keystrokes are ignored. Only a bad build-time configuration is
//! reported, and the shipped configuration is checked in `const` context.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("UART baud rate must be non-zero")]
    ZeroBaudRate,

    #[error("UART baud rate {baud_rate} too high for a {proc_freq_hz} Hz clock")]
    BaudRateTooHigh { proc_freq_hz: u64, baud_rate: u64 },

    #[error("UART clock divisor {divisor} does not fit the 8-bit divisor register")]
    DivisorOverflow { divisor: u64 },

    #[error("Boot option table is empty")]
    EmptyOptionTable,

    #[error("Boot option key {key:#04x} is bound more than once")]
    DuplicateKey { key: u8 },
}
