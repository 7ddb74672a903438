//! Boot dispatcher
//!
//! Prints the menu, waits for one keystroke that matches a boot option and
//! commits to it. Keys that match nothing are dropped without a trace.
//!
//! ```text
//!   Idle --announce--> AwaitingSelection --matching key--> Committed
//!                        ^            |
//!                        +-- other ---+
//! ```
//!
//! Commitment is final: a committed dispatcher reads no further input, and
//! `dispatch` consumes the dispatcher so the hand-off happens at most once.

pub mod handoff;
pub mod options;

pub use handoff::{Handoff, MemoryController};
pub use options::{BootOption, DtbAddress, ImageLoad, KernelAddress};

use crate::config::BootConfig;
use crate::console::Console;
use crate::console_print;
use crate::error::ConfigError;
use crate::mmio::RegisterBus;
use crate::sysinfo::{SystemController, SystemInfo};
use crate::uart::PotatoUart;

/// Where the dispatcher is in its boot cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Menu not printed yet
    Idle,
    /// Menu printed, reading keys
    AwaitingSelection,
    /// Option bound to `key` chosen; no more input is taken
    Committed { key: u8 },
}

/// Keystroke-driven boot option selection
pub struct Dispatcher<'a, C: Console + ?Sized> {
    console: &'a C,
    config: &'a BootConfig,
    state: DispatchState,
}

impl<'a, C: Console + ?Sized> Dispatcher<'a, C> {
    pub fn new(console: &'a C, config: &'a BootConfig) -> Result<Self, ConfigError> {
        options::validate_options(config.options)?;

        Ok(Self {
            console,
            config,
            state: DispatchState::Idle,
        })
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn options(&self) -> &'a [BootOption] {
        self.config.options
    }

    /// Print the menu and start accepting keys
    pub fn announce(&mut self) {
        if self.state != DispatchState::Idle {
            return;
        }

        match self.config.options {
            [only] => {
                console_print!(
                    self.console,
                    "Load binaries into SDRAM and press '{}' to start:\n\n",
                    only.key as char
                );
                console_print!(self.console, " {}\n\n", only.load_command());
            }
            options => {
                console_print!(
                    self.console,
                    "Load binaries into SDRAM and select option to start:\n\n"
                );
                for option in options {
                    console_print!(self.console, "{}:\n", option.description);
                    console_print!(self.console, " {}\n", option.load_command());
                    console_print!(self.console, " press '{}' to start\n\n", option.key as char);
                }
            }
        }

        self.state = DispatchState::AwaitingSelection;
    }

    /// Offer one keystroke.
    ///
    /// Returns the option it selects and commits to it. Returns `None` for
    /// unbound keys and for any key once the dispatcher is not awaiting a
    /// selection.
    pub fn select(&mut self, key: u8) -> Option<&'a BootOption> {
        if self.state != DispatchState::AwaitingSelection {
            return None;
        }

        let option = options::find(self.config.options, key)?;
        self.state = DispatchState::Committed { key };
        log::debug!("boot: selected '{}' ({})", key as char, option.name);
        Some(option)
    }

    /// Block until a key selects an option
    pub fn await_selection(&mut self) -> &'a BootOption {
        match self.state {
            DispatchState::Idle => self.announce(),
            DispatchState::AwaitingSelection => {}
            DispatchState::Committed { key } => {
                if let Some(option) = options::find(self.config.options, key) {
                    return option;
                }
            }
        }

        loop {
            let key = self.console.read_char();
            if let Some(option) = self.select(key) {
                return option;
            }
        }
    }

    fn commit<H: Handoff + ?Sized>(&self, option: &BootOption, handoff: &H) {
        console_print!(self.console, "Loading {}...\n", option.name);
        for _ in 0..self.config.progress_marks {
            self.console.write_char(self.config.progress_mark);
        }
        self.console.write_string(b"\n");

        log::debug!(
            "boot: load_and_jump(kernel={:#x}, dtb={:#x})",
            option.kernel.raw(),
            option.dtb.raw()
        );
        handoff.load_and_jump(option.kernel, option.dtb);
    }

    /// Announce, wait for a selection and hand off.
    ///
    /// Returns only if the hand-off itself returns.
    pub fn dispatch<H: Handoff + ?Sized>(mut self, handoff: &H) -> &'a BootOption {
        let option = self.await_selection();
        self.commit(option, handoff);
        log::debug!("boot: hand-off to {} returned", option.name);
        option
    }

    /// `dispatch`, then spin forever if the hand-off comes back
    pub fn run<H: Handoff + ?Sized>(self, handoff: &H) -> ! {
        self.dispatch(handoff);
        halt()
    }
}

/// How a boot stage ended without leaving the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// No DRAM, so no option can be loaded
    NoDram,
    /// The hand-off for this option returned
    Returned(BootOption),
}

/// The whole boot stage on an initialized UART.
///
/// Settles the UART, prints the SoC report, brings up DRAM when present,
/// maps it at 0, then runs the dispatcher.
pub fn start<B, S, M, H>(
    uart: &PotatoUart<B>,
    syscon: &SystemController<S>,
    memory: &M,
    handoff: &H,
    config: &BootConfig,
) -> Result<BootOutcome, ConfigError>
where
    B: RegisterBus,
    S: RegisterBus,
    M: MemoryController + ?Sized,
    H: Handoff + ?Sized,
{
    let dispatcher = Dispatcher::new(uart, config)?;

    uart.settle(config.settle_polls);
    console_print!(uart, "\n\nWelcome to Microwatt !\n\n");

    let info = SystemInfo::read(syscon);
    info.report(uart);
    console_print!(uart, "\n");

    if !info.has_dram() {
        console_print!(uart, "No DRAM present, nothing to boot\n");
        return Ok(BootOutcome::NoDram);
    }

    match config.dram_build {
        Some(build) => console_print!(
            uart,
            "LiteDRAM built from Migen {} and LiteX {}\n",
            build.migen,
            build.litex
        ),
        None => console_print!(uart, "Initializing LiteDRAM...\n"),
    };
    memory.init();
    log::debug!("boot: memory controller up");
    syscon.map_dram_at_zero();

    console_print!(uart, "Microwatt Loader ({})\n\n", config.build_tag);
    let option = dispatcher.dispatch(handoff);
    Ok(BootOutcome::Returned(*option))
}

/// Nothing left to run
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
