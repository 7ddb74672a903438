//! Microwatt boot stage
//!
//! Everything the first-stage firmware of a Microwatt SoC needs before it can
//! hand control to a pre-loaded Linux image:
//! - `mmio`: raw 8/64-bit register access at fixed addresses
//! - `uart`: polling potato UART driver (divisor setup, blocking byte I/O)
//! - `console`: CRLF-translating console and bounded formatted output
//! - `sysinfo`: system controller registers and the SoC info report
//! - `boot`: keystroke-driven boot dispatcher and its collaborators
//!
//! # Testing Strategy
//! - Unit tests: per module, against the simulated SoC in `sim`
//! - Integration tests: the whole boot stage in `tests/boot_flow.rs`
//! - Hardware: `runtime/mw-loader` links this crate into the boot image

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod boot;
pub mod config;
pub mod console;
pub mod error;
pub mod logger;
pub mod mmio;
pub mod soc;
pub mod sysinfo;
pub mod uart;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use boot::{BootOption, DispatchState, Dispatcher, DtbAddress, Handoff, KernelAddress, MemoryController};
pub use config::{BootConfig, DramBuild, UartConfig};
pub use console::Console;
pub use error::ConfigError;
pub use mmio::{Mmio, RegisterBus};
pub use sysinfo::{SystemController, SystemInfo};
pub use uart::PotatoUart;
