//! Collaborators outside the boot stage
//!
//! Both are provided by the platform image (assembly and the LiteDRAM init
//! code). The boot stage only decides when to call them.

use super::options::{DtbAddress, KernelAddress};

/// Transfer of control to a pre-loaded image
pub trait Handoff {
    /// Jump into the loaded kernel.
    ///
    /// On hardware this does not return. Returning means the target could
    /// not be entered, and the caller has nothing left to run.
    fn load_and_jump(&self, kernel: KernelAddress, dtb: DtbAddress);
}

/// External memory controller bring-up
pub trait MemoryController {
    /// Train and enable DRAM. Assumed to succeed; no status is returned.
    fn init(&self);
}

impl<H: Handoff + ?Sized> Handoff for &H {
    fn load_and_jump(&self, kernel: KernelAddress, dtb: DtbAddress) {
        (**self).load_and_jump(kernel, dtb)
    }
}

impl<M: MemoryController + ?Sized> MemoryController for &M {
    fn init(&self) {
        (**self).init()
    }
}
