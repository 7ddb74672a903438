//! Microwatt SoC register map

use bitflags::bitflags;

/// System controller register block
pub const SYSCON_BASE: usize = 0xc000_0000;

/// Potato UART register block
pub const UART_BASE: usize = 0xc000_2000;

/// System controller register offsets (64-bit registers)
pub const SYS_REG_SIGNATURE: usize = 0x00;
pub const SYS_REG_INFO: usize = 0x08;
pub const SYS_REG_BRAMINFO: usize = 0x10;
pub const SYS_REG_DRAMINFO: usize = 0x18;
pub const SYS_REG_CLKINFO: usize = 0x20;
pub const SYS_REG_CTRL: usize = 0x28;

/// Potato UART register offsets (8-bit accesses)
pub const POTATO_CONSOLE_TX: usize = 0x00;
pub const POTATO_CONSOLE_RX: usize = 0x08;
pub const POTATO_CONSOLE_STATUS: usize = 0x10;
pub const POTATO_CONSOLE_CLOCK_DIV: usize = 0x18;

bitflags! {
    /// Potato UART status register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConsoleStatus: u8 {
        const RX_EMPTY = 0x01;
        const TX_EMPTY = 0x02;
        const RX_FULL  = 0x04;
        const TX_FULL  = 0x08;
    }
}

bitflags! {
    /// SYS_REG_INFO feature bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SocFeatures: u64 {
        const HAS_UART = 1 << 0;
        const HAS_DRAM = 1 << 1;
    }
}

bitflags! {
    /// SYS_REG_CTRL bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SysControl: u64 {
        /// Alias DRAM at physical address 0 (instead of BRAM)
        const DRAM_AT_0  = 1 << 0;
        const CORE_RESET = 1 << 1;
        const SOC_RESET  = 1 << 2;
    }
}
