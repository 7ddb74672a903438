//! Microwatt Loader - first-stage boot image
//!
//! Linked with the platform start code, the LiteDRAM init code and the
//! Linux trampoline. The start code sets up a stack and calls `main`, which
//! runs the boot stage from `mw-boot` on the real register bus:
//! - potato UART init (owned here for the life of the image)
//! - console logger installation
//! - SoC report, DRAM bring-up and the boot menu
//! - hand-off to the pre-loaded kernel

#![no_std]

use core::panic::PanicInfo;

use log::LevelFilter;
use mw_boot::boot::{self, BootOutcome};
use mw_boot::config::{BootConfig, DramBuild};
use mw_boot::logger::{self, ConsoleLogger};
use mw_boot::soc::{SYSCON_BASE, UART_BASE};
use mw_boot::{console_print, Mmio, PotatoUart, SystemController};
use spin::Once;

pub mod arch;

type Uart = PotatoUart<Mmio>;

static UART: Once<Uart> = Once::new();
static LOGGER: Once<ConsoleLogger<Uart>> = Once::new();

const CONFIG: BootConfig = BootConfig {
    build_tag: concat!(
        "v",
        env!("CARGO_PKG_VERSION"),
        "-",
        env!("MW_LOADER_GIT_SHA")
    ),
    dram_build: match (option_env!("MIGEN_GIT_SHA1"), option_env!("LITEX_GIT_SHA1")) {
        (Some(migen), Some(litex)) => Some(DramBuild { migen, litex }),
        _ => None,
    },
    ..BootConfig::DEFAULT
};

cfg_if::cfg_if! {
    if #[cfg(feature = "log-trace")] {
        const LOG_LEVEL: LevelFilter = LevelFilter::Trace;
    } else if #[cfg(feature = "log-debug")] {
        const LOG_LEVEL: LevelFilter = LevelFilter::Debug;
    } else if #[cfg(feature = "log-info")] {
        const LOG_LEVEL: LevelFilter = LevelFilter::Info;
    } else if #[cfg(feature = "log-warn")] {
        const LOG_LEVEL: LevelFilter = LevelFilter::Warn;
    } else if #[cfg(feature = "log-error")] {
        const LOG_LEVEL: LevelFilter = LevelFilter::Error;
    } else {
        const LOG_LEVEL: LevelFilter = LevelFilter::Off;
    }
}

/// Loader entry point (called from the start code)
#[no_mangle]
pub extern "C" fn main() -> ! {
    // SAFETY: the potato UART is the only user of UART_BASE and the loader
    // runs single-threaded with interrupts off.
    let uart = UART.call_once(|| {
        match PotatoUart::init(unsafe { Mmio::new() }, UART_BASE, &CONFIG.uart) {
            Ok(uart) => uart,
            Err(_) => boot::halt(),
        }
    });

    let console_logger = LOGGER.call_once(|| ConsoleLogger::new(uart, LOG_LEVEL));
    // Only fails if a logger is already set, and nothing else sets one
    let _ = logger::install(console_logger);

    // SAFETY: same as above, for the system controller block
    let syscon = SystemController::new(unsafe { Mmio::new() }, SYSCON_BASE);

    match boot::start(uart, &syscon, &arch::LiteDram, &arch::LinuxHandoff, &CONFIG) {
        Ok(BootOutcome::NoDram) => {}
        Ok(BootOutcome::Returned(option)) => {
            log::error!("hand-off to {} returned", option.name);
        }
        Err(err) => {
            console_print!(uart, "Bad boot configuration: {}\n", err);
        }
    }

    boot::halt()
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(uart) = UART.get() {
        console_print!(uart, "PANIC: {}\n", info);
    }
    boot::halt()
}
