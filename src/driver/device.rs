//! Core ST201 packet engine.
//!
//! This module contains the main [`Ste`] structure and core operations:
//!
//! - Initialization, stop and full reset
//! - Transmit start from the network stack's queue
//! - Interrupt dispatch
//! - MII access through the PHY control register
//!
//! Receive filtering lives in [`filtering`](super::filtering), periodic
//! statistics and the transmit watchdog in [`watchdog`](super::watchdog).

use embedded_hal::delay::DelayNs;

use super::config::{Duplex, State, SteConfig};
use super::error::{ConfigError, DmaError, Error, IoError, Result};
use super::filtering::{FilterState, program_station_address};
use super::interrupt::InterruptStatus;
use super::stats::{Counters, StatsBlock};
use crate::hal::buffer::BufferPool;
use crate::hal::mdio::BitBangMdio;
use crate::hal::stack::NetStack;
use crate::hal::timer::{STATS_TICK_MS, TX_TIMEOUT_MS, TimerEvent, TimerService};
use crate::hal::window::RegisterWindow;
use crate::internal::constants::{
    DEFAULT_RX_DESCRIPTORS, DEFAULT_TX_DESCRIPTORS, INTR_LOOP_LIMIT, RESET_SETTLE_US,
    TX_DMABURST_THRESH,
};
use crate::internal::dma::{RxEngine, TxEngine, wait_dma_halt, wait_reset};
use crate::internal::register::dma::{
    ASICCTL_FULL_RESET, ASICCTL_OFFSET, DMACTL_OFFSET, DMACTL_RXDMA_STALL, DMACTL_TXDMA_STALL,
    DMACTL_TXDMA_UNSTALL, RX_DMALIST_PTR_OFFSET, TX_DMABURST_THRESH_OFFSET, TX_DMALIST_PTR_OFFSET,
};
use crate::internal::register::intr::{
    IMR_OFFSET, ISR_ACK_OFFSET, ISR_INTLATCH, ISR_OFFSET, STE_INTRS,
};
use crate::internal::register::mac::{
    MACCTL0_FULLDUPLEX, MACCTL0_OFFSET, MACCTL1_OFFSET, MACCTL1_RX_DISABLE, MACCTL1_RX_ENABLE,
    MACCTL1_STATS_DISABLE, MACCTL1_STATS_ENABLE, MACCTL1_TX_DISABLE, MACCTL1_TX_ENABLE,
};
use crate::phy::{LinkStatus, PhyDriver, StandardPhy};

// =============================================================================
// ST201 Packet Engine
// =============================================================================

/// Sundance ST201 packet engine
///
/// Owns the register window, both descriptor rings, the transceiver driver
/// and every counter. All entry points take `&mut self`; wrap the device in
/// [`SharedSte`](crate::sync::SharedSte) to share it with interrupt context.
///
/// # Type Parameters
/// * `R` - Register window ([`MmioWindow`](crate::hal::MmioWindow) on hardware)
/// * `P` - Packet buffer pool
/// * `T` - One-shot timer service
/// * `D` - Delay provider for MII bit timing and the reset settle time
/// * `Y` - PHY driver, reprogrammed on every init and polled by the
///   statistics tick (default [`StandardPhy`])
/// * `RX` - Receive ring size (default 64)
/// * `TX` - Transmit ring size (default 64)
///
/// # Placement
///
/// The descriptor rings are embedded in the device. [`start`](Self::start)
/// translates their host addresses through
/// [`BufferPool::bus_addr_of`] and hands the result to the controller, so
/// the device must be at its final location (a `static`, or a local that is
/// not moved afterwards) before it is started.
///
/// # Example
/// ```ignore
/// let config = SteConfig::new().with_mac_address(eeprom_mac);
/// let phy = StandardPhy::new(config.phy_address);
/// let mut nic: Ste<_, _, _, _> = Ste::new(window, pool, timer, delay, phy, config);
/// nic.start()?;
///
/// // interrupt handler
/// nic.handle_interrupt(&mut stack);
///
/// // timer callback
/// nic.handle_timer(event, &mut stack);
/// ```
pub struct Ste<
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
    pub(super) regs: R,
    pub(super) pool: P,
    pub(super) timer: T,
    pub(super) delay: D,
    pub(super) phy: Y,
    pub(super) config: SteConfig,
    pub(super) rx: RxEngine<P::Buffer, RX>,
    pub(super) tx: TxEngine<P::Buffer, TX>,
    /// Receive filter, reprogrammed on every init
    pub(super) filter: FilterState,
    pub(super) counters: Counters,
    /// Most recent statistics block snapshot
    pub(super) last_stats: StatsBlock,
    state: State,
    /// Transmit ring was full when the stack last had frames queued
    pub(super) tx_busy: bool,
    pub(super) link: Option<LinkStatus>,
    pub(super) stats_timer: Option<T::Handle>,
    pub(super) tx_timer: Option<T::Handle>,
}

impl<R, P, T, D, Y, const RX: usize, const TX: usize> Ste<R, P, T, D, Y, RX, TX>
where
    R: RegisterWindow,
    P: BufferPool,
    T: TimerService,
    D: DelayNs,
    Y: PhyDriver,
{
    /// Create a stopped device. Nothing is written to the hardware until
    /// [`start`](Self::start).
    pub fn new(regs: R, pool: P, timer: T, delay: D, phy: Y, config: SteConfig) -> Self {
        Self {
            regs,
            pool,
            timer,
            delay,
            phy,
            filter: FilterState::from_config(&config),
            config,
            rx: RxEngine::new(),
            tx: TxEngine::new(),
            counters: Counters::new(),
            last_stats: StatsBlock::default(),
            state: State::Stopped,
            tx_busy: false,
            link: None,
            stats_timer: None,
            tx_timer: None,
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the active configuration
    #[inline(always)]
    pub fn config(&self) -> &SteConfig {
        &self.config
    }

    /// Get the station address
    #[inline(always)]
    pub fn mac_address(&self) -> &[u8; 6] {
        &self.config.mac_address
    }

    /// Cumulative driver counters
    #[inline(always)]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Statistics block as read on the last pull
    pub fn last_stats(&self) -> &StatsBlock {
        &self.last_stats
    }

    /// Last link status reported by the PHY
    pub fn link(&self) -> Option<LinkStatus> {
        self.link
    }

    /// Whether the transmit ring filled up and the stack must wait
    #[inline(always)]
    pub fn is_tx_busy(&self) -> bool {
        self.tx_busy
    }

    /// Transmit entries currently holding a frame
    pub fn tx_in_flight(&self) -> usize {
        self.tx.in_flight()
    }

    /// Current transmit start threshold in bytes
    pub fn tx_start_threshold(&self) -> u16 {
        self.tx.start_threshold()
    }

    /// Receive filter settings
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Register window
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Buffer pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Timer service
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// PHY driver
    pub fn phy(&self) -> &Y {
        &self.phy
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the device up; equivalent to [`init`](Self::init).
    pub fn start(&mut self) -> Result<()> {
        self.init()
    }

    /// Stop the device, then program and start it from scratch.
    ///
    /// Sequence:
    /// 1. Validate the configuration and [`stop`](Self::stop)
    /// 2. Translate both descriptor lists to bus addresses
    /// 3. Program the station address
    /// 4. Fill the receive ring and reset the transmit ring
    /// 5. Program burst, start and reclaim thresholds
    /// 6. Program the receive filter (the retained multicast hash included)
    /// 7. Load the receive list pointer and unstall both DMA engines
    /// 8. Apply duplex and enable transmitter, receiver and statistics
    /// 9. Restart auto-negotiation on the PHY
    /// 10. Acknowledge and unmask interrupts, arm the statistics tick
    ///
    /// # Errors
    /// - Any [`SteConfig::validate`] error
    /// - `DmaAddressOutOfRange` - the pool cannot give a descriptor list a
    ///   32-bit bus address; nothing is allocated
    /// - `NoRxBuffers` - the pool could not fill the receive ring; the
    ///   device is left stopped with every buffer returned
    pub fn init(&mut self) -> Result<()> {
        self.config.validate()?;
        self.stop();

        if let Err(e) = self.rx.map(&self.pool).and_then(|()| self.tx.map(&self.pool)) {
            log::error!("descriptor lists not reachable by DMA: {e}");
            return Err(e.into());
        }

        program_station_address(&mut self.regs, &self.config.mac_address);

        if let Err(e) = self.rx.init(&mut self.pool) {
            log::error!("receive ring fill failed: {e}");
            self.stop();
            return Err(e.into());
        }
        self.tx.init(&mut self.pool);

        self.regs.write8(TX_DMABURST_THRESH_OFFSET, TX_DMABURST_THRESH);
        self.tx.program_thresholds(&mut self.regs);
        self.filter.program(&mut self.regs);

        self.rx.attach(&mut self.regs, &mut self.counters);
        self.regs.write32(TX_DMALIST_PTR_OFFSET, 0);
        self.regs.set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_UNSTALL);

        self.apply_duplex();
        self.regs.write16(
            MACCTL1_OFFSET,
            MACCTL1_STATS_ENABLE | MACCTL1_TX_ENABLE | MACCTL1_RX_ENABLE,
        );
        self.media_change();

        self.regs.write16(ISR_OFFSET, 0xFFFF);
        self.regs.write16(IMR_OFFSET, STE_INTRS);

        self.stats_timer = Some(self.timer.schedule(TimerEvent::StatsTick, STATS_TICK_MS));
        self.tx_busy = false;
        self.state = State::Running;

        log::debug!(
            "started: {} rx / {} tx descriptors, start threshold {} bytes",
            RX,
            TX,
            self.tx.start_threshold()
        );
        Ok(())
    }

    /// Stop the device and return every buffer to the pool.
    ///
    /// Masks interrupts, disables the MAC, stalls both DMA engines and
    /// cancels both timers. Safe to call in any state, any number of times.
    pub fn stop(&mut self) {
        if let Some(handle) = self.stats_timer.take() {
            self.timer.cancel(handle);
        }
        if let Some(handle) = self.tx_timer.take() {
            self.timer.cancel(handle);
        }

        self.regs.write16(IMR_OFFSET, 0);
        self.regs.write16(
            MACCTL1_OFFSET,
            MACCTL1_STATS_DISABLE | MACCTL1_TX_DISABLE | MACCTL1_RX_DISABLE,
        );
        self.regs
            .set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_STALL | DMACTL_RXDMA_STALL);
        wait_dma_halt(&self.regs, &mut self.counters);
        self.regs.write32(TX_DMALIST_PTR_OFFSET, 0);
        self.regs.write32(RX_DMALIST_PTR_OFFSET, 0);

        self.rx.release(&mut self.pool);
        self.tx.release(&mut self.pool);
        self.tx_busy = false;

        if self.state == State::Running {
            log::debug!("stopped");
        }
        self.state = State::Stopped;
    }

    /// Stop the device before the host powers down or reboots.
    pub fn shutdown(&mut self) {
        self.stop();
    }

    /// Global reset of every ASIC block.
    ///
    /// Waits the 100 ms settle time, then polls for the reset to complete.
    /// The rings are left as they were; follow with [`init`](Self::init).
    ///
    /// # Errors
    /// - `ResetFailed` - the reset was still busy after the bounded poll
    pub fn reset(&mut self) -> Result<()> {
        log::error!("global reset");
        self.regs.set_bits32(ASICCTL_OFFSET, ASICCTL_FULL_RESET);
        self.delay.delay_us(RESET_SETTLE_US);

        if wait_reset(&self.regs, &mut self.counters) {
            Ok(())
        } else {
            Err(ConfigError::ResetFailed.into())
        }
    }

    /// Full reset followed by re-initialisation, for unrecoverable faults.
    pub(super) fn recover(&mut self) {
        if let Err(e) = self.reset() {
            log::error!("{e}");
        }
        if let Err(e) = self.init() {
            log::error!("re-init after reset failed: {e}");
        }
    }

    /// Restart auto-negotiation on the transceiver.
    ///
    /// A global reset pulses the external reset line as well, so the PHY is
    /// reprogrammed on every init. A PHY that does not answer is logged and
    /// the link is picked up by a later statistics tick.
    fn media_change(&mut self) {
        let mut mdio = BitBangMdio::new(&mut self.regs, &mut self.delay);
        if let Err(e) = self.phy.enable_auto_negotiation(&mut mdio) {
            log::warn!("PHY {} media change failed: {e}", self.phy.address());
        }
    }

    /// Mirror the link duplex into the MAC
    pub(super) fn apply_duplex(&mut self) {
        match self.link.map(|link| link.duplex) {
            Some(Duplex::Full) => self.regs.set_bits16(MACCTL0_OFFSET, MACCTL0_FULLDUPLEX),
            _ => self.regs.clear_bits16(MACCTL0_OFFSET, MACCTL0_FULLDUPLEX),
        }
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Move frames from the stack's queue onto the transmit ring.
    ///
    /// Frames are enqueued while entries are free and committed to the
    /// controller as one batch; the transmit watchdog is re-armed. Frames
    /// the ring rejects (empty, oversized, uncoalescable) are dropped and
    /// counted.
    ///
    /// Returns the number of frames committed.
    ///
    /// # Errors
    /// - `InvalidState` - the device is not running
    /// - `NoDescriptorsAvailable` - the ring filled up with frames still
    ///   queued; call again once [`is_tx_busy`](Self::is_tx_busy) clears.
    ///   Frames that did fit were committed.
    pub fn start_transmit<S>(&mut self, stack: &mut S) -> Result<usize>
    where
        S: NetStack<P::Buffer>,
    {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        if self.tx_busy {
            return Err(DmaError::NoDescriptorsAvailable.into());
        }

        let mut queued = 0;
        while stack.has_pending() {
            if !self.tx.has_free() {
                self.tx_busy = true;
                break;
            }
            let Some(frame) = stack.dequeue() else {
                break;
            };
            match self.tx.enqueue(frame, &mut self.pool, &mut self.counters) {
                Ok(()) => queued += 1,
                Err(e) => log::debug!("transmit frame dropped: {e}"),
            }
        }

        if self.tx.commit(&mut self.regs, &mut self.counters) {
            self.arm_tx_watchdog();
        }

        if self.tx_busy {
            return Err(DmaError::NoDescriptorsAvailable.into());
        }
        Ok(queued)
    }

    /// Start queued frames from a recovery or interrupt path.
    ///
    /// A full ring is expected there and shows up in `tx_busy`.
    pub(super) fn restart_transmit<S>(&mut self, stack: &mut S)
    where
        S: NetStack<P::Buffer>,
    {
        match self.start_transmit(stack) {
            Ok(_) | Err(Error::Dma(DmaError::NoDescriptorsAvailable)) => {}
            Err(e) => log::debug!("transmit restart failed: {e}"),
        }
    }

    fn arm_tx_watchdog(&mut self) {
        if let Some(handle) = self.tx_timer.take() {
            self.timer.cancel(handle);
        }
        self.tx_timer = Some(self.timer.schedule(TimerEvent::TxTimeout, TX_TIMEOUT_MS));
    }

    /// Reclaim completed transmit entries and restart the watchdog period
    /// for whatever is still in flight.
    fn tx_reclaim(&mut self) {
        self.tx.reclaim(&mut self.regs, &mut self.pool, &mut self.counters);

        if let Some(handle) = self.tx_timer.take() {
            self.timer.cancel(handle);
        }
        if self.tx.head().is_some() {
            self.tx_timer = Some(self.timer.schedule(TimerEvent::TxTimeout, TX_TIMEOUT_MS));
        }
        if self.tx.has_free() {
            self.tx_busy = false;
        }
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Service the device interrupt.
    ///
    /// Returns `false` without touching anything if this device has no
    /// interrupt latched (shared interrupt lines). Otherwise interrupts are
    /// masked, status is acknowledged and dispatched until no serviced
    /// source remains (at most `INTR_LOOP_LIMIT` rounds), interrupts are
    /// unmasked, and queued transmit frames are started.
    pub fn handle_interrupt<S>(&mut self, stack: &mut S) -> bool
    where
        S: NetStack<P::Buffer>,
    {
        if self.regs.read16(ISR_OFFSET) & ISR_INTLATCH == 0 {
            return false;
        }
        self.regs.write16(IMR_OFFSET, 0);

        let mut rounds = 0;
        loop {
            if rounds == INTR_LOOP_LIMIT {
                self.counters.intr_loop_exhausted += 1;
                log::warn!("interrupt still asserted after {INTR_LOOP_LIMIT} rounds");
                break;
            }
            rounds += 1;

            let status = InterruptStatus::from_raw(self.regs.read16(ISR_ACK_OFFSET));
            if !status.any() {
                break;
            }
            // A failed re-init leaves the rings empty; just acknowledge.
            if self.state == State::Running {
                self.dispatch(status, stack);
            }
        }

        if self.state == State::Running {
            self.regs.write16(IMR_OFFSET, STE_INTRS);
            if stack.has_pending() {
                self.restart_transmit(stack);
            }
        }
        true
    }

    fn dispatch<S>(&mut self, status: InterruptStatus, stack: &mut S)
    where
        S: NetStack<P::Buffer>,
    {
        if status.rx_dma_done {
            self.rx_drain(stack);
        }
        if status.tx_dma_done {
            self.tx_reclaim();
        }
        if status.tx_done {
            self.tx
                .complete_with_errors(&mut self.regs, &mut self.counters);
        }
        if status.stats_overflow {
            self.counters.stats_overflows += 1;
            self.restart_stats_tick();
        }
        if status.is_fatal() {
            self.counters.host_errors += 1;
            log::error!("host error, resetting");
            self.recover();
        }
    }

    pub(super) fn rx_drain<S>(&mut self, stack: &mut S)
    where
        S: NetStack<P::Buffer>,
    {
        if let Err(e) = self
            .rx
            .drain(&mut self.regs, &mut self.pool, stack, &mut self.counters)
        {
            log::warn!("receive drain: {e}");
        }
    }

    // =========================================================================
    // MII Access
    // =========================================================================

    /// Run `f` with the bit-banged management bus.
    ///
    /// ```ignore
    /// let bmsr = nic.with_mdio(|mdio| mdio.read(phy_addr, 1))?;
    /// ```
    pub fn with_mdio<O, F>(&mut self, f: F) -> O
    where
        F: FnOnce(&mut BitBangMdio<'_, R, D>) -> O,
    {
        let mut mdio = BitBangMdio::new(&mut self.regs, &mut self.delay);
        f(&mut mdio)
    }

    /// Run `f` with the PHY driver and the management bus.
    ///
    /// ```ignore
    /// let id = nic.with_phy(|phy, mdio| phy.phy_id(mdio))?;
    /// ```
    pub fn with_phy<O, F>(&mut self, f: F) -> O
    where
        F: FnOnce(&mut Y, &mut BitBangMdio<'_, R, D>) -> O,
    {
        let mut mdio = BitBangMdio::new(&mut self.regs, &mut self.delay);
        f(&mut self.phy, &mut mdio)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
