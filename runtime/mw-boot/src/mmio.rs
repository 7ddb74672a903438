//! Register access layer
//!
//! Raw volatile reads and writes at fixed physical addresses. There is no
//! bounds checking and no error path: a bad address is a hardware trap, not
//! something this layer can report.

use core::ptr::{read_volatile, write_volatile};

/// Byte and doubleword access to memory-mapped registers.
///
/// Methods take `&self` because register side effects live in the hardware,
/// not in the accessor.
pub trait RegisterBus {
    /// Read an 8-bit register
    fn read8(&self, addr: usize) -> u8;

    /// Write an 8-bit register
    fn write8(&self, addr: usize, value: u8);

    /// Read a 64-bit register
    fn read64(&self, addr: usize) -> u64;

    /// Write a 64-bit register
    fn write64(&self, addr: usize, value: u64);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline]
    fn read8(&self, addr: usize) -> u8 {
        (**self).read8(addr)
    }

    #[inline]
    fn write8(&self, addr: usize, value: u8) {
        (**self).write8(addr, value)
    }

    #[inline]
    fn read64(&self, addr: usize) -> u64 {
        (**self).read64(addr)
    }

    #[inline]
    fn write64(&self, addr: usize, value: u64) {
        (**self).write64(addr, value)
    }
}

/// Physical MMIO bus (real hardware)
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create the MMIO accessor
    ///
    /// # Safety
    /// Every address later passed to the bus must map to a valid register
    /// (or RAM) for the access width used.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read8(&self, addr: usize) -> u8 {
        unsafe { read_volatile(addr as *const u8) }
    }

    #[inline]
    fn write8(&self, addr: usize, value: u8) {
        unsafe { write_volatile(addr as *mut u8, value) }
    }

    #[inline]
    fn read64(&self, addr: usize) -> u64 {
        unsafe { read_volatile(addr as *const u64) }
    }

    #[inline]
    fn write64(&self, addr: usize, value: u64) {
        unsafe { write_volatile(addr as *mut u64, value) }
    }
}
