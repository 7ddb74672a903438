//! Simulated Microwatt SoC
//!
//! A `RegisterBus` that models the potato UART and the system controller so
//! the boot stage can run on the host. Default mode for development and
//! testing; the boot image is built with `default-features = false`.
//!
//! The model is single-threaded (interior mutability through `RefCell`),
//! which matches the boot stage: one thread of control, no interrupts.
//!
//! An attached input source stands in for an operator at the terminal, who
//! types only once the firmware sits waiting for a key. It is pulled on a
//! status read that directly follows another status read, and only after
//! the console has transmitted something. Settle polls before the first
//! output, and the lone status check in front of a byte that goes out
//! without waiting, never pull input. Bytes queued with `push_input` are
//! visible to every status read.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::boot::{DtbAddress, Handoff, KernelAddress, MemoryController};
use crate::mmio::RegisterBus;
use crate::soc::{
    ConsoleStatus, SocFeatures, POTATO_CONSOLE_CLOCK_DIV, POTATO_CONSOLE_RX,
    POTATO_CONSOLE_STATUS, POTATO_CONSOLE_TX, SYSCON_BASE, SYS_REG_BRAMINFO, SYS_REG_CLKINFO,
    SYS_REG_CTRL, SYS_REG_DRAMINFO, SYS_REG_INFO, SYS_REG_SIGNATURE, UART_BASE,
};
use crate::uart::PotatoUart;

/// Pulled while the receiver is waited on and the RX queue is dry.
/// `None` means no input (yet).
pub type InputSource = Box<dyn FnMut() -> Option<u8>>;

/// Receives every transmitted byte as it is written
pub type OutputSink = Box<dyn FnMut(u8)>;

/// Signature reported by a stock Microwatt system controller
pub const DEFAULT_SIGNATURE: u64 = 0xf00d_aa55_0001_0001;

struct SysconRegs {
    signature: u64,
    info: u64,
    bram_size: u64,
    dram_size: u64,
    clock_hz: u64,
    control: u64,
}

struct UartState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    rx_stall: usize,
    tx_stall: usize,
    divisor: Option<u8>,
}

/// Register-level model of the SoC
pub struct SimBus {
    uart: RefCell<UartState>,
    syscon: RefCell<SysconRegs>,
    status_reads: Cell<usize>,
    last_was_status: Cell<bool>,
    transmitted: Cell<bool>,
    input: RefCell<Option<InputSource>>,
    output: RefCell<Option<OutputSink>>,
}

impl SimBus {
    /// UART + DRAM SoC: 16 KB BRAM, 256 MB DRAM, 100 MHz
    pub fn new() -> Self {
        Self {
            uart: RefCell::new(UartState {
                rx: VecDeque::new(),
                tx: Vec::new(),
                rx_stall: 0,
                tx_stall: 0,
                divisor: None,
            }),
            syscon: RefCell::new(SysconRegs {
                signature: DEFAULT_SIGNATURE,
                info: (SocFeatures::HAS_UART | SocFeatures::HAS_DRAM).bits(),
                bram_size: 16 * 1024,
                dram_size: 256 * 1024 * 1024,
                clock_hz: 100_000_000,
                control: 0,
            }),
            status_reads: Cell::new(0),
            last_was_status: Cell::new(false),
            transmitted: Cell::new(false),
            input: RefCell::new(None),
            output: RefCell::new(None),
        }
    }

    pub fn with_signature(self, signature: u64) -> Self {
        self.syscon.borrow_mut().signature = signature;
        self
    }

    pub fn with_features(self, features: SocFeatures) -> Self {
        self.syscon.borrow_mut().info = features.bits();
        self
    }

    pub fn with_bram_size(self, bytes: u64) -> Self {
        self.syscon.borrow_mut().bram_size = bytes;
        self
    }

    pub fn with_dram_size(self, bytes: u64) -> Self {
        self.syscon.borrow_mut().dram_size = bytes;
        self
    }

    pub fn with_clock(self, hz: u64) -> Self {
        self.syscon.borrow_mut().clock_hz = hz;
        self
    }

    pub fn with_input_source(self, source: InputSource) -> Self {
        *self.input.borrow_mut() = Some(source);
        self
    }

    pub fn with_output_sink(self, sink: OutputSink) -> Self {
        *self.output.borrow_mut() = Some(sink);
        self
    }

    /// Initialized UART on this bus at the stock base address
    pub fn console(&self) -> PotatoUart<&Self> {
        PotatoUart::init_default(self, UART_BASE)
    }

    /// Queue bytes for the UART receiver
    pub fn push_input(&self, bytes: &[u8]) {
        self.uart.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.uart.borrow().rx.len()
    }

    /// Report RX empty for the next `polls` status reads, whatever is queued
    pub fn stall_rx(&self, polls: usize) {
        self.uart.borrow_mut().rx_stall = polls;
    }

    /// Report TX full for the next `polls` status reads
    pub fn stall_tx(&self, polls: usize) {
        self.uart.borrow_mut().tx_stall = polls;
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads.get()
    }

    /// Last value written to the clock divisor register
    pub fn divisor(&self) -> Option<u8> {
        self.uart.borrow().divisor
    }

    /// Current system control register
    pub fn control(&self) -> u64 {
        self.syscon.borrow().control
    }

    /// Everything transmitted so far
    pub fn output(&self) -> Vec<u8> {
        self.uart.borrow().tx.clone()
    }

    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut self.uart.borrow_mut().tx)
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.uart.borrow().tx).into_owned()
    }

    fn refill_rx(&self) {
        if !self.uart.borrow().rx.is_empty() {
            return;
        }
        let next = match self.input.borrow_mut().as_mut() {
            Some(source) => source(),
            None => None,
        };
        if let Some(byte) = next {
            self.uart.borrow_mut().rx.push_back(byte);
        }
    }

    /// Back-to-back status reads after the first transmitted byte
    fn awaiting_input(&self) -> bool {
        self.last_was_status.get() && self.transmitted.get()
    }

    fn uart_status(&self) -> u8 {
        self.status_reads.set(self.status_reads.get() + 1);
        if self.awaiting_input() {
            self.refill_rx();
        }
        self.last_was_status.set(true);

        let mut uart = self.uart.borrow_mut();
        let mut status = ConsoleStatus::empty();

        if uart.rx_stall > 0 {
            uart.rx_stall -= 1;
            status |= ConsoleStatus::RX_EMPTY;
        } else if uart.rx.is_empty() {
            status |= ConsoleStatus::RX_EMPTY;
        }

        if uart.tx_stall > 0 {
            uart.tx_stall -= 1;
            status |= ConsoleStatus::TX_FULL;
        } else {
            status |= ConsoleStatus::TX_EMPTY;
        }

        status.bits()
    }

    fn transmit(&self, byte: u8) {
        self.transmitted.set(true);
        self.uart.borrow_mut().tx.push(byte);
        if let Some(sink) = self.output.borrow_mut().as_mut() {
            sink(byte);
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimBus {
    fn read8(&self, addr: usize) -> u8 {
        let offset = addr.checked_sub(UART_BASE);
        if offset != Some(POTATO_CONSOLE_STATUS) {
            self.last_was_status.set(false);
        }
        match offset {
            Some(POTATO_CONSOLE_STATUS) => self.uart_status(),
            Some(POTATO_CONSOLE_RX) => self.uart.borrow_mut().rx.pop_front().unwrap_or(0),
            Some(POTATO_CONSOLE_CLOCK_DIV) => self.uart.borrow().divisor.unwrap_or(0),
            _ => {
                log::trace!("sim: read8 of unmodelled address {:#x}", addr);
                0
            }
        }
    }

    fn write8(&self, addr: usize, value: u8) {
        self.last_was_status.set(false);
        match addr.checked_sub(UART_BASE) {
            Some(POTATO_CONSOLE_TX) => self.transmit(value),
            Some(POTATO_CONSOLE_CLOCK_DIV) => self.uart.borrow_mut().divisor = Some(value),
            _ => log::trace!("sim: write8 {:#x} to unmodelled address {:#x}", value, addr),
        }
    }

    fn read64(&self, addr: usize) -> u64 {
        let regs = self.syscon.borrow();
        match addr.checked_sub(SYSCON_BASE) {
            Some(SYS_REG_SIGNATURE) => regs.signature,
            Some(SYS_REG_INFO) => regs.info,
            Some(SYS_REG_BRAMINFO) => regs.bram_size,
            Some(SYS_REG_DRAMINFO) => regs.dram_size,
            Some(SYS_REG_CLKINFO) => regs.clock_hz,
            Some(SYS_REG_CTRL) => regs.control,
            _ => {
                log::trace!("sim: read64 of unmodelled address {:#x}", addr);
                0
            }
        }
    }

    fn write64(&self, addr: usize, value: u64) {
        match addr.checked_sub(SYSCON_BASE) {
            Some(SYS_REG_CTRL) => self.syscon.borrow_mut().control = value,
            _ => log::trace!("sim: write64 {:#x} to unmodelled address {:#x}", value, addr),
        }
    }
}

/// Hand-off that records its arguments and returns
#[derive(Default)]
pub struct RecordingHandoff {
    calls: RefCell<Vec<(KernelAddress, DtbAddress)>>,
}

impl RecordingHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(KernelAddress, DtbAddress)> {
        self.calls.borrow().clone()
    }
}

impl Handoff for RecordingHandoff {
    fn load_and_jump(&self, kernel: KernelAddress, dtb: DtbAddress) {
        self.calls.borrow_mut().push((kernel, dtb));
    }
}

/// Memory controller that counts init calls
#[derive(Default)]
pub struct RecordingMemory {
    inits: Cell<usize>,
}

impl RecordingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_count(&self) -> usize {
        self.inits.get()
    }
}

impl MemoryController for RecordingMemory {
    fn init(&self) {
        self.inits.set(self.inits.get() + 1);
    }
}
