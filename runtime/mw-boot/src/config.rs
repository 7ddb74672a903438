//! Boot stage configuration and option table composition
//!
//! The option table is chosen at compile time through cargo features, the
//! same way the console component is selected for the kernel image:
//! - `boot-dual`: vmlinux.bin + dtb on `'l'`, dtbImage.microwatt on `'w'`
//! - `boot-vmlinux`: vmlinux.bin + dtb on `'l'` only
//!
//! `BootConfig::DEFAULT` is validated at compile time, so a shipped image can
//! never carry a divisor that does not fit or an ambiguous key table.

use static_assertions::const_assert;

use crate::boot::options::{validate_options, BootOption};
use crate::error::ConfigError;

/// Processor clock the divisor is computed for
pub const PROC_FREQ_HZ: u64 = 100_000_000;

/// Console baud rate
pub const UART_BAUD_RATE: u64 = 115_200;

/// Status reads performed after UART init before the first byte goes out.
///
/// Empirical: the console is garbled without it (possibly PLL settling).
/// This is a poll count, not a duration.
pub const SETTLE_POLLS: u32 = 100_000;

/// Length of the progress run printed after a selection
pub const PROGRESS_MARKS: usize = 80;

/// UART clocking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub proc_freq_hz: u64,
    pub baud_rate: u64,
}

impl UartConfig {
    pub const DEFAULT: Self = Self {
        proc_freq_hz: PROC_FREQ_HZ,
        baud_rate: UART_BAUD_RATE,
    };

    /// Clock divisor: `proc_freq / (baud * 16) - 1`, truncating.
    ///
    /// The potato divisor register is 8 bits wide.
    pub const fn divisor(&self) -> Result<u8, ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }

        let quotient = match self.baud_rate.checked_mul(16) {
            Some(oversampled) => self.proc_freq_hz / oversampled,
            None => 0,
        };

        if quotient == 0 {
            return Err(ConfigError::BaudRateTooHigh {
                proc_freq_hz: self.proc_freq_hz,
                baud_rate: self.baud_rate,
            });
        }

        let divisor = quotient - 1;
        if divisor > u8::MAX as u64 {
            return Err(ConfigError::DivisorOverflow { divisor });
        }

        Ok(divisor as u8)
    }
}

/// Divisor for `UartConfig::DEFAULT`, computed at compile time
pub const DEFAULT_DIVISOR: u8 = match UartConfig::DEFAULT.divisor() {
    Ok(divisor) => divisor,
    Err(_) => panic!("default UART clocking has no valid divisor"),
};

/// Generator revisions the LiteDRAM init code was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DramBuild {
    pub migen: &'static str,
    pub litex: &'static str,
}

/// Everything the boot stage needs that is fixed at build time
#[derive(Debug, Clone, Copy)]
pub struct BootConfig {
    pub uart: UartConfig,
    pub settle_polls: u32,
    pub progress_marks: usize,
    pub progress_mark: u8,
    /// Shown in the welcome banner
    pub build_tag: &'static str,
    /// Named in the memory controller banner when known
    pub dram_build: Option<DramBuild>,
    pub options: &'static [BootOption],
}

impl BootConfig {
    pub const DEFAULT: Self = Self {
        uart: UartConfig::DEFAULT,
        settle_polls: SETTLE_POLLS,
        progress_marks: PROGRESS_MARKS,
        progress_mark: b'.',
        build_tag: concat!("v", env!("CARGO_PKG_VERSION")),
        dram_build: None,
        options: BOOT_OPTIONS,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = self.uart.divisor() {
            return Err(err);
        }
        validate_options(self.options)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "boot-dual")] {
        /// Boot options compiled into this image
        pub const BOOT_OPTIONS: &[BootOption] = crate::boot::options::DUAL_OPTIONS;
    } else {
        /// Boot options compiled into this image
        pub const BOOT_OPTIONS: &[BootOption] = crate::boot::options::VMLINUX_OPTIONS;
    }
}

const_assert!(BootConfig::DEFAULT.validate().is_ok());
