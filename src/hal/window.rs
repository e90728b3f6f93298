//! Register window access.
//!
//! The controller's registers are reached through a window of fixed-width
//! byte offsets. [`RegisterWindow`] abstracts that window so the same driver
//! code runs against memory-mapped I/O or a test double.

/// Scoped access to the controller's control/status registers.
///
/// Reads take `&self` because some registers (e.g. the interrupt
/// acknowledge register) have read side effects that live in the device,
/// not in the driver.
pub trait RegisterWindow {
    /// Read an 8-bit register
    fn read8(&self, offset: usize) -> u8;
    /// Read a 16-bit register
    fn read16(&self, offset: usize) -> u16;
    /// Read a 32-bit register
    fn read32(&self, offset: usize) -> u32;
    /// Write an 8-bit register
    fn write8(&mut self, offset: usize, value: u8);
    /// Write a 16-bit register
    fn write16(&mut self, offset: usize, value: u16);
    /// Write a 32-bit register
    fn write32(&mut self, offset: usize, value: u32);

    /// Set bits in an 8-bit register
    #[inline(always)]
    fn set_bits8(&mut self, offset: usize, bits: u8) {
        let v = self.read8(offset);
        self.write8(offset, v | bits);
    }

    /// Clear bits in an 8-bit register
    #[inline(always)]
    fn clear_bits8(&mut self, offset: usize, bits: u8) {
        let v = self.read8(offset);
        self.write8(offset, v & !bits);
    }

    /// Set bits in a 16-bit register
    #[inline(always)]
    fn set_bits16(&mut self, offset: usize, bits: u16) {
        let v = self.read16(offset);
        self.write16(offset, v | bits);
    }

    /// Clear bits in a 16-bit register
    #[inline(always)]
    fn clear_bits16(&mut self, offset: usize, bits: u16) {
        let v = self.read16(offset);
        self.write16(offset, v & !bits);
    }

    /// Set bits in a 32-bit register
    #[inline(always)]
    fn set_bits32(&mut self, offset: usize, bits: u32) {
        let v = self.read32(offset);
        self.write32(offset, v | bits);
    }

    /// Clear bits in a 32-bit register
    #[inline(always)]
    fn clear_bits32(&mut self, offset: usize, bits: u32) {
        let v = self.read32(offset);
        self.write32(offset, v & !bits);
    }
}

impl<T: RegisterWindow + ?Sized> RegisterWindow for &mut T {
    fn read8(&self, offset: usize) -> u8 {
        (**self).read8(offset)
    }
    fn read16(&self, offset: usize) -> u16 {
        (**self).read16(offset)
    }
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }
    fn write8(&mut self, offset: usize, value: u8) {
        (**self).write8(offset, value);
    }
    fn write16(&mut self, offset: usize, value: u16) {
        (**self).write16(offset, value);
    }
    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }
}

/// Memory-mapped register window.
#[derive(Debug)]
pub struct MmioWindow {
    base: usize,
}

impl MmioWindow {
    /// Create a window at the mapped base address of the control registers.
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of the device's register BAR,
    /// mapped for the lifetime of the window, and no other code may access
    /// the same registers concurrently.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the window
    #[must_use]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterWindow for MmioWindow {
    #[inline(always)]
    fn read8(&self, offset: usize) -> u8 {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u8) }
    }

    #[inline(always)]
    fn read16(&self, offset: usize) -> u16 {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u16) }
    }

    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write8(&mut self, offset: usize, value: u8) {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }

    #[inline(always)]
    fn write16(&mut self, offset: usize, value: u16) {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u16, value) }
    }

    #[inline(always)]
    fn write32(&mut self, offset: usize, value: u32) {
        // SAFETY: guaranteed by the contract of `MmioWindow::new`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}
