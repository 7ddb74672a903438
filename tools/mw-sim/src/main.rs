//! Microwatt boot stage simulator
//!
//! Runs the complete boot stage (UART init, SoC report, DRAM bring-up,
//! menu and hand-off) against the simulated SoC. Console output goes to
//! stdout byte for byte; keystrokes come from `--keys`, then stdin.
//!
//! Usage:
//!   mw-sim --keys w
//!   echo l | mw-sim --variant vmlinux --clock 50000000
//!   mw-sim --no-dram

use std::io::{self, Read, Write};
use std::process;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use mw_boot::boot::options::{DUAL_OPTIONS, VMLINUX_OPTIONS};
use mw_boot::boot::{self, BootOutcome};
use mw_boot::config::{SETTLE_POLLS, UART_BAUD_RATE};
use mw_boot::sim::{
    InputSource, OutputSink, RecordingHandoff, RecordingMemory, SimBus, DEFAULT_SIGNATURE,
};
use mw_boot::soc::{SocFeatures, SYSCON_BASE, UART_BASE};
use mw_boot::{BootConfig, BootOption, DramBuild, PotatoUart, SystemController, UartConfig};

/// Back-off while the operator has not typed anything
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Boot option table to compile into the simulated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// 'l' vmlinux.bin + microwatt.dtb, 'w' dtbImage.microwatt
    Dual,
    /// 'l' vmlinux.bin + microwatt.dtb only
    Vmlinux,
}

impl Variant {
    fn options(self) -> &'static [BootOption] {
        match self {
            Variant::Dual => DUAL_OPTIONS,
            Variant::Vmlinux => VMLINUX_OPTIONS,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mw-sim")]
#[command(about = "Run the Microwatt boot stage against a simulated SoC")]
struct Args {
    /// Boot option table
    #[arg(long, value_enum, default_value_t = Variant::Dual)]
    variant: Variant,

    /// Keystrokes fed to the UART before stdin
    #[arg(long, default_value = "")]
    keys: String,

    /// Clear HAS_DRAM in the system controller
    #[arg(long)]
    no_dram: bool,

    /// System controller signature
    #[arg(long)]
    signature: Option<String>,

    /// Processor clock in Hz (also used for the UART divisor)
    #[arg(long, default_value = "100000000")]
    clock: String,

    /// BRAM size in bytes
    #[arg(long, default_value = "0x4000")]
    bram_size: String,

    /// DRAM size in bytes
    #[arg(long, default_value = "0x10000000")]
    dram_size: String,

    /// Console baud rate
    #[arg(long, default_value_t = UART_BAUD_RATE)]
    baud: u64,

    /// Status reads after UART init
    #[arg(long, default_value_t = SETTLE_POLLS)]
    settle_polls: u32,

    /// Migen revision shown in the LiteDRAM banner (needs --litex)
    #[arg(long, requires = "litex")]
    migen: Option<String>,

    /// LiteX revision shown in the LiteDRAM banner (needs --migen)
    #[arg(long, requires = "migen")]
    litex: Option<String>,
}

fn parse_hex_or_dec(s: &str) -> Result<u64> {
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).context("Invalid hex number")
    } else {
        s.parse::<u64>().context("Invalid decimal number")
    }
}

/// Forward stdin byte by byte from a reader thread.
///
/// The channel disconnects at end of input or on a read error.
fn spawn_stdin_reader() -> Receiver<u8> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for byte in io::stdin().lock().bytes() {
            match byte {
                Ok(byte) => {
                    if tx.send(byte).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::error!("stdin: {}", err);
                    break;
                }
            }
        }
    });
    rx
}

/// Operator keys: `--keys` first, then whatever the stdin channel delivers
struct Keystrokes {
    scripted: std::vec::IntoIter<u8>,
    stdin: Receiver<u8>,
}

impl Keystrokes {
    fn new(keys: String, stdin: Receiver<u8>) -> Self {
        Self {
            scripted: keys.into_bytes().into_iter(),
            stdin,
        }
    }

    /// Next key without blocking. `Ok(None)` means nothing typed yet.
    fn next_key(&mut self) -> Result<Option<u8>> {
        if let Some(key) = self.scripted.next() {
            return Ok(Some(key));
        }
        match self.stdin.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                bail!("Input exhausted before a boot option was selected")
            }
        }
    }

    /// The simulated UART only asks while the firmware waits for a key, so
    /// running out of input there ends the run.
    fn into_source(mut self) -> InputSource {
        Box::new(move || match self.next_key() {
            Ok(Some(key)) => Some(key),
            Ok(None) => {
                thread::sleep(IDLE_POLL);
                None
            }
            Err(err) => {
                let _ = io::stdout().flush();
                log::error!("{}", err);
                process::exit(1);
            }
        })
    }
}

/// Write one console byte, flushing at line ends
fn write_console<W: Write>(out: &mut W, byte: u8) -> io::Result<()> {
    out.write_all(&[byte])?;
    if byte == b'\n' {
        out.flush()?;
    }
    Ok(())
}

fn console_sink() -> OutputSink {
    let mut stdout = io::stdout();
    Box::new(move |byte| {
        if let Err(err) = write_console(&mut stdout, byte) {
            log::error!("stdout: {}", err);
            process::exit(1);
        }
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let clock = parse_hex_or_dec(&args.clock).context("--clock")?;
    let bram_size = parse_hex_or_dec(&args.bram_size).context("--bram-size")?;
    let dram_size = parse_hex_or_dec(&args.dram_size).context("--dram-size")?;
    let signature = match args.signature.as_deref() {
        Some(s) => parse_hex_or_dec(s).context("--signature")?,
        None => DEFAULT_SIGNATURE,
    };

    let mut features = SocFeatures::HAS_UART | SocFeatures::HAS_DRAM;
    if args.no_dram {
        features.remove(SocFeatures::HAS_DRAM);
    }

    // Lives for the whole run; the boot config wants 'static strings
    let dram_build = match (args.migen, args.litex) {
        (Some(migen), Some(litex)) => Some(DramBuild {
            migen: Box::leak(migen.into_boxed_str()),
            litex: Box::leak(litex.into_boxed_str()),
        }),
        _ => None,
    };

    let config = BootConfig {
        uart: UartConfig {
            proc_freq_hz: clock,
            baud_rate: args.baud,
        },
        settle_polls: args.settle_polls,
        dram_build,
        options: args.variant.options(),
        ..BootConfig::DEFAULT
    };
    config.validate().context("Invalid boot configuration")?;

    log::debug!("variant {:?}, features {:?}", args.variant, features);

    let keys = Keystrokes::new(args.keys, spawn_stdin_reader());
    let bus = SimBus::new()
        .with_signature(signature)
        .with_features(features)
        .with_clock(clock)
        .with_bram_size(bram_size)
        .with_dram_size(dram_size)
        .with_input_source(keys.into_source())
        .with_output_sink(console_sink());

    let uart = PotatoUart::init(&bus, UART_BASE, &config.uart).context("UART init")?;
    log::debug!("uart divisor {}", uart.divisor());

    let syscon = SystemController::new(&bus, SYSCON_BASE);
    let memory = RecordingMemory::new();
    let handoff = RecordingHandoff::new();

    let outcome = boot::start(&uart, &syscon, &memory, &handoff, &config)
        .context("Boot stage rejected its configuration")?;
    io::stdout().flush().context("Failed to flush console")?;

    match outcome {
        BootOutcome::NoDram => {
            log::warn!("No DRAM: boot stage halted before the menu");
        }
        BootOutcome::Returned(option) => {
            for (kernel, dtb) in handoff.calls() {
                log::info!(
                    "load_and_jump: {} kernel={:#x} dtb={:#x}",
                    option.name,
                    kernel.raw(),
                    dtb.raw()
                );
            }
            log::info!(
                "{} status reads, {} memory init, control={:#x}",
                bus.status_reads(),
                memory.init_count(),
                bus.control()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_stdin() -> Receiver<u8> {
        let (_, rx) = mpsc::channel();
        rx
    }

    fn sim_config(options: &'static [BootOption]) -> BootConfig {
        BootConfig {
            settle_polls: 1_000,
            options,
            ..BootConfig::DEFAULT
        }
    }

    #[test]
    fn test_parse_hex_or_dec() {
        assert_eq!(parse_hex_or_dec("0x4000").unwrap(), 16 * 1024);
        assert_eq!(parse_hex_or_dec("100000000").unwrap(), 100_000_000);
        assert!(parse_hex_or_dec("0xzz").is_err());
        assert!(parse_hex_or_dec("fast").is_err());
    }

    #[test]
    fn test_scripted_keys_before_stdin() {
        let (tx, rx) = mpsc::channel();
        tx.send(b'w').unwrap();
        let mut keys = Keystrokes::new("xl".into(), rx);

        assert_eq!(keys.next_key().unwrap(), Some(b'x'));
        assert_eq!(keys.next_key().unwrap(), Some(b'l'));
        assert_eq!(keys.next_key().unwrap(), Some(b'w'));
        assert_eq!(keys.next_key().unwrap(), None);

        drop(tx);
        assert!(keys.next_key().is_err());
    }

    #[test]
    fn test_quiet_stdin_is_not_end_of_input() {
        let (_tx, rx) = mpsc::channel();
        let mut keys = Keystrokes::new(String::new(), rx);

        for _ in 0..10 {
            assert_eq!(keys.next_key().unwrap(), None);
        }
    }

    #[test]
    fn test_no_dram_boot_with_closed_stdin() {
        let bus = SimBus::new()
            .with_features(SocFeatures::HAS_UART)
            .with_input_source(Keystrokes::new(String::new(), closed_stdin()).into_source());
        let uart = bus.console();
        let syscon = SystemController::new(&bus, SYSCON_BASE);
        let handoff = RecordingHandoff::new();

        let outcome = boot::start(
            &uart,
            &syscon,
            &RecordingMemory::new(),
            &handoff,
            &sim_config(DUAL_OPTIONS),
        )
        .unwrap();

        assert_eq!(outcome, BootOutcome::NoDram);
        assert!(bus.output_string().contains("Welcome to Microwatt !"));
        assert!(handoff.calls().is_empty());
    }

    #[test]
    fn test_scripted_boot_with_closed_stdin() {
        let bus = SimBus::new()
            .with_input_source(Keystrokes::new("qw".into(), closed_stdin()).into_source());
        let uart = bus.console();
        let syscon = SystemController::new(&bus, SYSCON_BASE);
        let handoff = RecordingHandoff::new();

        boot::start(
            &uart,
            &syscon,
            &RecordingMemory::new(),
            &handoff,
            &sim_config(DUAL_OPTIONS),
        )
        .unwrap();

        assert_eq!(handoff.calls().len(), 1);
        assert_eq!(handoff.calls()[0].1.raw(), u64::MAX);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_write_errors_surface() {
        let mut out = Vec::new();
        write_console(&mut out, b'a').unwrap();
        write_console(&mut out, b'\n').unwrap();
        assert_eq!(out, b"a\n");

        let err = write_console(&mut BrokenPipe, b'a').unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::try_parse_from(["mw-sim", "--variant", "vmlinux", "--keys", "l", "--no-dram"])
            .unwrap();
        assert_eq!(args.variant, Variant::Vmlinux);
        assert_eq!(args.variant.options().len(), 1);
        assert!(args.no_dram);
        assert_eq!(args.settle_polls, SETTLE_POLLS);

        assert!(Args::try_parse_from(["mw-sim", "--migen", "abc"]).is_err());
    }
}
