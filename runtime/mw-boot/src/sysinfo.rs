//! System controller and SoC info report

use crate::console::Console;
use crate::console_print;
use crate::mmio::RegisterBus;
use crate::soc::{
    SocFeatures, SysControl, SYS_REG_BRAMINFO, SYS_REG_CLKINFO, SYS_REG_CTRL, SYS_REG_DRAMINFO,
    SYS_REG_INFO, SYS_REG_SIGNATURE,
};

/// Access to the system controller register block
pub struct SystemController<B: RegisterBus> {
    bus: B,
    base: usize,
}

impl<B: RegisterBus> SystemController<B> {
    pub const fn new(bus: B, base: usize) -> Self {
        Self { bus, base }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u64 {
        self.bus.read64(self.base + offset)
    }

    pub fn signature(&self) -> u64 {
        self.read_reg(SYS_REG_SIGNATURE)
    }

    pub fn features(&self) -> SocFeatures {
        SocFeatures::from_bits_retain(self.read_reg(SYS_REG_INFO))
    }

    /// Block RAM size in bytes
    pub fn bram_size(&self) -> u64 {
        self.read_reg(SYS_REG_BRAMINFO)
    }

    /// DRAM size in bytes (meaningless without `HAS_DRAM`)
    pub fn dram_size(&self) -> u64 {
        self.read_reg(SYS_REG_DRAMINFO)
    }

    /// Core clock in Hz
    pub fn clock_frequency(&self) -> u64 {
        self.read_reg(SYS_REG_CLKINFO)
    }

    /// Alias DRAM at address 0. Writes the control register as a whole.
    pub fn map_dram_at_zero(&self) {
        self.bus
            .write64(self.base + SYS_REG_CTRL, SysControl::DRAM_AT_0.bits());
        log::debug!("syscon: DRAM mapped at 0x0");
    }
}

/// One read of the SoC identification registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    pub signature: u64,
    pub features: SocFeatures,
    pub bram_bytes: u64,
    /// Only read when the SoC reports DRAM
    pub dram_bytes: Option<u64>,
    pub clock_hz: u64,
}

impl SystemInfo {
    pub fn read<B: RegisterBus>(syscon: &SystemController<B>) -> Self {
        let signature = syscon.signature();
        let features = syscon.features();
        let bram_bytes = syscon.bram_size();
        let dram_bytes = if features.contains(SocFeatures::HAS_DRAM) {
            Some(syscon.dram_size())
        } else {
            None
        };
        let clock_hz = syscon.clock_frequency();

        Self {
            signature,
            features,
            bram_bytes,
            dram_bytes,
            clock_hz,
        }
    }

    pub fn has_dram(&self) -> bool {
        self.features.contains(SocFeatures::HAS_DRAM)
    }

    pub fn bram_kb(&self) -> u64 {
        self.bram_bytes / 1024
    }

    pub fn dram_mb(&self) -> Option<u64> {
        self.dram_bytes.map(|bytes| bytes / (1024 * 1024))
    }

    pub fn clock_mhz(&self) -> u64 {
        self.clock_hz / 1_000_000
    }

    /// Print the SoC summary
    pub fn report<C: Console + ?Sized>(&self, console: &C) {
        console_print!(console, " Soc signature: {:016x}\n", self.signature);
        console_print!(console, "  Soc features: ");
        if self.features.contains(SocFeatures::HAS_UART) {
            console_print!(console, "UART ");
        }
        if self.features.contains(SocFeatures::HAS_DRAM) {
            console_print!(console, "DRAM ");
        }
        console_print!(console, "\n");
        console_print!(console, "          BRAM: {} KB\n", self.bram_kb());
        if let Some(mb) = self.dram_mb() {
            console_print!(console, "          DRAM: {} MB\n", mb);
        }
        console_print!(console, "           CLK: {} MHz\n", self.clock_mhz());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;
    use crate::soc::SYSCON_BASE;

    #[test]
    fn test_unit_conversions() {
        let info = SystemInfo {
            signature: 0,
            features: SocFeatures::HAS_UART,
            bram_bytes: 131_072,
            dram_bytes: None,
            clock_hz: 100_000_000,
        };

        assert_eq!(info.bram_kb(), 128);
        assert_eq!(info.clock_mhz(), 100);
        assert_eq!(info.dram_mb(), None);
    }

    #[test]
    fn test_conversions_truncate() {
        let info = SystemInfo {
            signature: 0,
            features: SocFeatures::HAS_DRAM,
            bram_bytes: 2047,
            dram_bytes: Some(3 * 1024 * 1024 - 1),
            clock_hz: 49_999_999,
        };

        assert_eq!(info.bram_kb(), 1);
        assert_eq!(info.dram_mb(), Some(2));
        assert_eq!(info.clock_mhz(), 49);
    }

    #[test]
    fn test_read_from_registers() {
        let bus = SimBus::new()
            .with_signature(0xf00d_aa55_0001_0001)
            .with_bram_size(131_072)
            .with_dram_size(256 * 1024 * 1024)
            .with_clock(100_000_000);
        let syscon = SystemController::new(&bus, SYSCON_BASE);

        let info = SystemInfo::read(&syscon);
        assert_eq!(info.signature, 0xf00d_aa55_0001_0001);
        assert!(info.has_dram());
        assert_eq!(info.bram_kb(), 128);
        assert_eq!(info.dram_mb(), Some(256));
        assert_eq!(info.clock_mhz(), 100);
    }

    #[test]
    fn test_dram_size_skipped_without_dram() {
        let bus = SimBus::new()
            .with_features(SocFeatures::HAS_UART)
            .with_dram_size(256 * 1024 * 1024);
        let syscon = SystemController::new(&bus, SYSCON_BASE);

        let info = SystemInfo::read(&syscon);
        assert!(!info.has_dram());
        assert_eq!(info.dram_bytes, None);
    }

    #[test]
    fn test_map_dram_at_zero() {
        let bus = SimBus::new();
        let syscon = SystemController::new(&bus, SYSCON_BASE);
        assert_eq!(bus.control(), 0);

        syscon.map_dram_at_zero();
        assert_eq!(bus.control(), SysControl::DRAM_AT_0.bits());
    }

    #[test]
    fn test_report_text() {
        let bus = SimBus::new();
        let info = SystemInfo {
            signature: 0xf00d_aa55_0001_0001,
            features: SocFeatures::HAS_UART | SocFeatures::HAS_DRAM,
            bram_bytes: 131_072,
            dram_bytes: Some(512 * 1024 * 1024),
            clock_hz: 100_000_000,
        };

        info.report(&bus.console());
        let text = bus.output_string();
        assert_eq!(
            text,
            " Soc signature: f00daa5500010001\r\n\
             \x20 Soc features: UART DRAM \r\n\
             \x20         BRAM: 128 KB\r\n\
             \x20         DRAM: 512 MB\r\n\
             \x20          CLK: 100 MHz\r\n"
        );
    }

    #[test]
    fn test_report_without_dram() {
        let bus = SimBus::new();
        let info = SystemInfo {
            signature: 1,
            features: SocFeatures::HAS_UART,
            bram_bytes: 8192,
            dram_bytes: None,
            clock_hz: 50_000_000,
        };

        info.report(&bus.console());
        let text = bus.output_string();
        assert!(text.contains("  Soc features: UART \r\n"));
        assert!(text.contains("BRAM: 8 KB"));
        assert!(!text.contains("DRAM"));
        assert!(text.contains("CLK: 50 MHz"));
    }
}
