//! Microwatt (POWER) collaborators
//!
//! `load_linux` and `invalidate_icache` come from the start code,
//! `sdrinit` from the generated LiteDRAM init code.

use mw_boot::boot::{DtbAddress, Handoff, KernelAddress, MemoryController};

extern "C" {
    fn invalidate_icache();
    fn sdrinit() -> i32;
}

cfg_if::cfg_if! {
    if #[cfg(feature = "boot-dual")] {
        extern "C" {
            fn load_linux(kernel: u64, dtb: u64);
        }

        /// Jump into the kernel through the start code trampoline
        pub struct LinuxHandoff;

        impl Handoff for LinuxHandoff {
            fn load_and_jump(&self, kernel: KernelAddress, dtb: DtbAddress) {
                // SAFETY: both images were placed in DRAM by the debugger
                // before the key was pressed; DRAM is mapped at 0.
                unsafe {
                    invalidate_icache();
                    load_linux(kernel.raw(), dtb.raw());
                }
            }
        }
    } else {
        extern "C" {
            fn load_linux(dtb: u64);
        }

        /// Jump into vmlinux at 0 through the start code trampoline
        pub struct LinuxHandoff;

        impl Handoff for LinuxHandoff {
            fn load_and_jump(&self, kernel: KernelAddress, dtb: DtbAddress) {
                // The single-image trampoline always enters at 0
                debug_assert_eq!(kernel, KernelAddress::IMAGE_DEFAULT);
                // SAFETY: as above
                unsafe {
                    invalidate_icache();
                    load_linux(dtb.raw());
                }
            }
        }
    }
}

/// LiteDRAM controller, trained by the generated init code
pub struct LiteDram;

impl MemoryController for LiteDram {
    fn init(&self) {
        // SAFETY: called once, before anything touches DRAM
        let trained = unsafe { sdrinit() };
        log::debug!("litedram: sdrinit returned {}", trained);
    }
}
