//! Boot option tables
//!
//! Every option names the images the operator must pre-load over JTAG and
//! the register pair handed to `load_linux`. The two address sentinels are
//! passed through untouched: the hand-off code gives them meaning.

use core::fmt;

use crate::error::ConfigError;

/// Where the vmlinux/dtb flow expects the device tree
pub const DTB_ADDR: u64 = 0x0100_0000;

/// Where a dtbImage (kernel with embedded device tree) is loaded
pub const DTBIMAGE_ADDR: u64 = 0x0050_0000;

/// Kernel entry handed to `load_linux`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct KernelAddress(pub u64);

impl KernelAddress {
    /// Use the boot image's own default entry
    pub const IMAGE_DEFAULT: Self = Self(0);

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Device tree location handed to `load_linux`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct DtbAddress(pub u64);

impl DtbAddress {
    /// No separate device tree (embedded in the image)
    pub const NONE: Self = Self(u64::MAX);

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One image the operator loads before pressing the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLoad {
    pub file: &'static str,
    /// `None` loads at the debugger's default (address 0)
    pub addr: Option<u64>,
}

/// A selectable boot target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootOption {
    /// Keystroke that selects this option
    pub key: u8,
    /// Shown as "Loading <name>..."
    pub name: &'static str,
    /// Menu heading
    pub description: &'static str,
    pub images: &'static [ImageLoad],
    pub kernel: KernelAddress,
    pub dtb: DtbAddress,
}

impl BootOption {
    /// The debugger command line that pre-loads this option's images
    pub fn load_command(&self) -> LoadCommand<'_> {
        LoadCommand(self)
    }
}

/// `mw_debug` invocation for one option
pub struct LoadCommand<'a>(&'a BootOption);

impl fmt::Display for LoadCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mw_debug -b jtag stop")?;
        for image in self.0.images {
            write!(f, " load {}", image.file)?;
            if let Some(addr) = image.addr {
                write!(f, " {:x}", addr)?;
            }
        }
        f.write_str(" start")
    }
}

/// vmlinux.bin at 0 plus a separate device tree
pub const VMLINUX: BootOption = BootOption {
    key: b'l',
    name: "Linux",
    description: "vmlinux.bin and dtb",
    images: &[
        ImageLoad {
            file: "vmlinux.bin",
            addr: None,
        },
        ImageLoad {
            file: "microwatt.dtb",
            addr: Some(DTB_ADDR),
        },
    ],
    kernel: KernelAddress::IMAGE_DEFAULT,
    dtb: DtbAddress(DTB_ADDR),
};

/// dtbImage with the device tree linked in
pub const DTB_IMAGE: BootOption = BootOption {
    key: b'w',
    name: "dtbImage",
    description: "dtbImage.microwatt",
    images: &[ImageLoad {
        file: "dtbImage.microwatt",
        addr: Some(DTBIMAGE_ADDR),
    }],
    kernel: KernelAddress(DTBIMAGE_ADDR),
    dtb: DtbAddress::NONE,
};

pub const VMLINUX_OPTIONS: &[BootOption] = &[VMLINUX];

pub const DUAL_OPTIONS: &[BootOption] = &[VMLINUX, DTB_IMAGE];

/// Reject tables that cannot be dispatched unambiguously
pub const fn validate_options(options: &[BootOption]) -> Result<(), ConfigError> {
    if options.is_empty() {
        return Err(ConfigError::EmptyOptionTable);
    }

    let mut i = 0;
    while i < options.len() {
        let mut j = i + 1;
        while j < options.len() {
            if options[i].key == options[j].key {
                return Err(ConfigError::DuplicateKey {
                    key: options[i].key,
                });
            }
            j += 1;
        }
        i += 1;
    }

    Ok(())
}

/// Find the option bound to `key`
pub fn find(options: &[BootOption], key: u8) -> Option<&BootOption> {
    options.iter().find(|option| option.key == key)
}
