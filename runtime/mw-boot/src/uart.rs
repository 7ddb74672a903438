//! Potato UART driver (polling)
//!
//! Minimal console UART of the Microwatt SoC. There are no interrupts and no
//! buffering beyond the byte in flight: every read and write busy-waits on
//! the status register with no timeout.
//!
//! A `PotatoUart` only comes out of `init`/`init_default`, so a driver value
//! always has its divisor programmed and its base address fixed.

use crate::config::{UartConfig, DEFAULT_DIVISOR};
use crate::console::Console;
use crate::error::ConfigError;
use crate::mmio::RegisterBus;
use crate::soc::{
    ConsoleStatus, POTATO_CONSOLE_CLOCK_DIV, POTATO_CONSOLE_RX, POTATO_CONSOLE_STATUS,
    POTATO_CONSOLE_TX,
};

/// Initialized potato UART
#[derive(Debug)]
pub struct PotatoUart<B: RegisterBus> {
    bus: B,
    base: usize,
    divisor: u8,
}

impl<B: RegisterBus> PotatoUart<B> {
    /// Program the clock divisor and return the ready driver
    pub fn init(bus: B, base: usize, config: &UartConfig) -> Result<Self, ConfigError> {
        let divisor = config.divisor()?;
        bus.write8(base + POTATO_CONSOLE_CLOCK_DIV, divisor);

        log::trace!(
            "uart@{:#x}: divisor {} ({} Hz / {} baud)",
            base,
            divisor,
            config.proc_freq_hz,
            config.baud_rate
        );

        Ok(Self { bus, base, divisor })
    }

    /// `init` with the compile-time checked default clocking
    pub fn init_default(bus: B, base: usize) -> Self {
        bus.write8(base + POTATO_CONSOLE_CLOCK_DIV, DEFAULT_DIVISOR);
        Self {
            bus,
            base,
            divisor: DEFAULT_DIVISOR,
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn divisor(&self) -> u8 {
        self.divisor
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u8 {
        self.bus.read8(self.base + offset)
    }

    #[inline]
    fn write_reg(&self, offset: usize, value: u8) {
        self.bus.write8(self.base + offset, value)
    }

    /// Fresh snapshot of the status register
    pub fn status(&self) -> ConsoleStatus {
        ConsoleStatus::from_bits_retain(self.read_reg(POTATO_CONSOLE_STATUS))
    }

    /// Check if the receive side has no byte waiting
    pub fn is_rx_empty(&self) -> bool {
        self.status().contains(ConsoleStatus::RX_EMPTY)
    }

    /// Check if the transmit side cannot take another byte
    pub fn is_tx_full(&self) -> bool {
        self.status().contains(ConsoleStatus::TX_FULL)
    }

    /// Read a byte (blocking)
    pub fn read_byte(&self) -> u8 {
        while self.is_rx_empty() {
            core::hint::spin_loop();
        }
        self.read_reg(POTATO_CONSOLE_RX)
    }

    /// Write a byte (blocking)
    pub fn write_byte(&self, byte: u8) {
        while self.is_tx_full() {
            core::hint::spin_loop();
        }
        self.write_reg(POTATO_CONSOLE_TX, byte);
    }

    /// Read the status register `polls` times and discard the results
    pub fn settle(&self, polls: u32) {
        for _ in 0..polls {
            let _ = self.read_reg(POTATO_CONSOLE_STATUS);
        }
    }
}

impl<B: RegisterBus> Console for PotatoUart<B> {
    fn write_char(&self, c: u8) -> u8 {
        self.write_byte(c);
        c
    }

    fn read_char(&self) -> u8 {
        self.read_byte()
    }
}
