//! MII management bus.
//!
//! The ST201 has no management controller: the driver toggles the clock,
//! data and direction lines of the PHY control register itself. Frames follow
//! IEEE 802.3 Clause 22: a 32-bit preamble of ones, start `01`, opcode, 5-bit
//! PHY address, 5-bit register address, turnaround and 16 data bits.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{IoError, Result};
use crate::hal::window::RegisterWindow;
use crate::internal::constants::MII_DELAY_US;
use crate::internal::register::mac::{PHYCTL_MCLK, PHYCTL_MDATA, PHYCTL_MDIR, PHYCTL_OFFSET};

// =============================================================================
// MDIO Constants
// =============================================================================

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// Start-of-frame delimiter
const MII_STARTDELIM: u32 = 0b01;
/// Read opcode
const MII_READOP: u32 = 0b10;
/// Write opcode
const MII_WRITEOP: u32 = 0b01;
/// Turnaround pattern driven on writes
const MII_TURNAROUND: u32 = 0b10;
/// Preamble length in clock cycles
const MII_PREAMBLE_BITS: u32 = 32;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// This trait can be implemented by different backends, allowing
/// the PHY driver to work with various MDIO implementations.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

// =============================================================================
// Bit-banged MDIO
// =============================================================================

/// Bit-banged management bus over the PHY control register.
///
/// Borrows the register window and delay for the duration of one or more
/// transactions, so it is cheap to construct on demand.
pub struct BitBangMdio<'a, R: RegisterWindow, D: DelayNs> {
    regs: &'a mut R,
    delay: &'a mut D,
}

impl<'a, R: RegisterWindow, D: DelayNs> BitBangMdio<'a, R, D> {
    /// Create a bus over the given register window
    pub fn new(regs: &'a mut R, delay: &'a mut D) -> Self {
        Self { regs, delay }
    }

    #[inline(always)]
    fn set(&mut self, bits: u8) {
        self.regs.set_bits8(PHYCTL_OFFSET, bits);
    }

    #[inline(always)]
    fn clr(&mut self, bits: u8) {
        self.regs.clear_bits8(PHYCTL_OFFSET, bits);
    }

    #[inline(always)]
    fn pause(&mut self) {
        self.delay.delay_us(MII_DELAY_US);
    }

    /// One full clock cycle: low, wait, high, wait.
    fn cycle(&mut self) {
        self.clr(PHYCTL_MCLK);
        self.pause();
        self.set(PHYCTL_MCLK);
        self.pause();
    }

    /// Drive the preamble: 32 clocks with data held high.
    fn sync(&mut self) {
        self.set(PHYCTL_MDIR | PHYCTL_MDATA);

        for _ in 0..MII_PREAMBLE_BITS {
            self.set(PHYCTL_MCLK);
            self.pause();
            self.clr(PHYCTL_MCLK);
            self.pause();
        }
    }

    /// Clock out the low `width` bits of `bits`, MSB first.
    ///
    /// Data is set up while the clock is low and latched by the PHY on the
    /// rising edge.
    fn send(&mut self, bits: u32, width: u32) {
        self.clr(PHYCTL_MCLK);

        for shift in (0..width).rev() {
            if bits & (1 << shift) != 0 {
                self.set(PHYCTL_MDATA);
            } else {
                self.clr(PHYCTL_MDATA);
            }
            self.pause();
            self.clr(PHYCTL_MCLK);
            self.pause();
            self.set(PHYCTL_MCLK);
        }
    }

    fn send_header(&mut self, op: u32, phy_addr: u8, reg_addr: u8) {
        self.send(MII_STARTDELIM, 2);
        self.send(op, 2);
        self.send(u32::from(phy_addr & MAX_PHY_ADDR), 5);
        self.send(u32::from(reg_addr & MAX_REG_ADDR), 5);
    }

    #[inline(always)]
    fn sample(&self) -> bool {
        self.regs.read8(PHYCTL_OFFSET) & PHYCTL_MDATA != 0
    }
}

impl<R: RegisterWindow, D: DelayNs> MdioBus for BitBangMdio<'_, R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.regs.write8(PHYCTL_OFFSET, 0);
        self.set(PHYCTL_MDIR);
        self.sync();
        self.send_header(MII_READOP, phy_addr, reg_addr);

        // Release the data line to the PHY.
        self.clr(PHYCTL_MDIR);

        // Idle bit
        self.clr(PHYCTL_MCLK | PHYCTL_MDATA);
        self.pause();
        self.set(PHYCTL_MCLK);
        self.pause();

        // The PHY pulls the line low to acknowledge.
        self.clr(PHYCTL_MCLK);
        self.pause();
        let nack = self.sample();
        self.set(PHYCTL_MCLK);
        self.pause();

        let mut value = 0u16;
        if nack {
            // Keep the cycle count identical to a successful read.
            for _ in 0..16 {
                self.cycle();
            }
        } else {
            for bit in (0..16).rev() {
                self.clr(PHYCTL_MCLK);
                self.pause();
                if self.sample() {
                    value |= 1 << bit;
                }
                self.pause();
                self.set(PHYCTL_MCLK);
                self.pause();
            }
        }

        self.cycle();

        if nack {
            return Err(IoError::PhyError.into());
        }
        Ok(value)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.set(PHYCTL_MDIR);
        self.sync();
        self.send_header(MII_WRITEOP, phy_addr, reg_addr);
        self.send(MII_TURNAROUND, 2);
        self.send(u32::from(value), 16);

        // Idle bit
        self.set(PHYCTL_MCLK);
        self.pause();
        self.clr(PHYCTL_MCLK);
        self.pause();

        self.clr(PHYCTL_MDIR);
        Ok(())
    }
}
