//! ISR-safe device wrapper using critical sections.
//!
//! Provides [`SharedSte`] so the interrupt handler, the timer callback and
//! the transmit path run in one exclusion domain.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use crate::driver::device::Ste;
use crate::hal::buffer::BufferPool;
use crate::hal::timer::TimerService;
use crate::hal::window::RegisterWindow;
use crate::internal::constants::{DEFAULT_RX_DESCRIPTORS, DEFAULT_TX_DESCRIPTORS};
use crate::phy::{PhyDriver, StandardPhy};

/// ISR-safe packet engine wrapper using critical sections.
///
/// The wrapper starts empty so it can live in a `static`; the device is
/// moved in with [`install`](Self::install) before it is started, which
/// keeps its descriptor rings at their final address.
///
/// # Example
///
/// ```ignore
/// static NIC: SharedSte<MmioWindow, Pool, Timer, Delay> = SharedSte::new();
///
/// NIC.install(Ste::new(window, pool, timer, delay, StandardPhy::new(1), config));
/// NIC.with(|nic| nic.start()).transpose()?;
///
/// #[interrupt]
/// fn PCI_INTA() {
///     NIC.with(|nic| nic.handle_interrupt(&mut stack));
/// }
/// ```
pub struct SharedSte<
    R,
    P,
    T,
    D,
    Y = StandardPhy,
    const RX: usize = { DEFAULT_RX_DESCRIPTORS },
    const TX: usize = { DEFAULT_TX_DESCRIPTORS },
> where
    P: BufferPool,
    T: TimerService,
{
    inner: CriticalSectionCell<Option<Ste<R, P, T, D, Y, RX, TX>>>,
}

impl<R, P, T, D, Y, const RX: usize, const TX: usize> SharedSte<R, P, T, D, Y, RX, TX>
where
    R: RegisterWindow,
    P: BufferPool,
    T: TimerService,
    D: DelayNs,
    Y: PhyDriver,
{
    /// Create an empty wrapper (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Move a device into the wrapper, returning the one it replaces.
    ///
    /// A replaced device is stopped first so none of its buffers stay with
    /// the hardware.
    pub fn install(
        &self,
        ste: Ste<R, P, T, D, Y, RX, TX>,
    ) -> Option<Ste<R, P, T, D, Y, RX, TX>> {
        self.inner.with(|slot| {
            let mut previous = slot.replace(ste);
            if let Some(old) = previous.as_mut() {
                old.stop();
            }
            previous
        })
    }

    /// Stop the device and move it out of the wrapper.
    pub fn take(&self) -> Option<Ste<R, P, T, D, Y, RX, TX>> {
        self.inner.with(|slot| {
            let mut ste = slot.take();
            if let Some(ste) = ste.as_mut() {
                ste.stop();
            }
            ste
        })
    }

    /// Whether a device is installed
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the device.
    ///
    /// Interrupts are disabled for the duration of the closure. Returns
    /// `None` if no device is installed.
    #[inline]
    pub fn with<O, F>(&self, f: F) -> Option<O>
    where
        F: FnOnce(&mut Ste<R, P, T, D, Y, RX, TX>) -> O,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Try to execute a closure, returning `None` if already borrowed or if
    /// no device is installed.
    #[inline]
    pub fn try_with<O, F>(&self, f: F) -> Option<O>
    where
        F: FnOnce(&mut Ste<R, P, T, D, Y, RX, TX>) -> O,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }
}

impl<R, P, T, D, Y, const RX: usize, const TX: usize> Default for SharedSte<R, P, T, D, Y, RX, TX>
where
    R: RegisterWindow,
    P: BufferPool,
    T: TimerService,
    D: DelayNs,
    Y: PhyDriver,
{
    fn default() -> Self {
        Self::new()
    }
}
