//! Periodic statistics and the transmit watchdog.
//!
//! Two one-shot timer events drive this module:
//!
//! - [`TimerEvent::StatsTick`] every `STATS_TICK_MS`: pull the clear-on-read
//!   statistics block, poll the PHY and mirror its duplex into the MAC
//! - [`TimerEvent::TxTimeout`], armed on every transmit commit: the
//!   controller stopped completing descriptors, so everything is drained and
//!   the device is reset and re-initialised

use embedded_hal::delay::DelayNs;

use super::config::State;
use super::device::Ste;
use super::stats::StatsBlock;
use crate::hal::buffer::BufferPool;
use crate::hal::mdio::BitBangMdio;
use crate::hal::stack::NetStack;
use crate::hal::timer::{STATS_TICK_MS, TimerEvent, TimerService};
use crate::hal::window::RegisterWindow;
use crate::phy::{LinkEvent, PhyDriver};

impl<R, P, T, D, Y, const RX: usize, const TX: usize> Ste<R, P, T, D, Y, RX, TX>
where
    R: RegisterWindow,
    P: BufferPool,
    T: TimerService,
    D: DelayNs,
    Y: PhyDriver,
{
    /// Handle an expired timer event.
    ///
    /// Must be called from the same exclusion domain as
    /// [`handle_interrupt`](Self::handle_interrupt). Events arriving while the
    /// device is stopped are ignored.
    pub fn handle_timer<S>(&mut self, event: TimerEvent, stack: &mut S)
    where
        S: NetStack<P::Buffer>,
    {
        if self.state() != State::Running {
            return;
        }

        match event {
            TimerEvent::StatsTick => {
                self.stats_timer = None;
                self.stats_tick();
            }
            TimerEvent::TxTimeout => {
                self.tx_timer = None;
                self.tx_timeout(stack);
            }
        }
    }

    /// Read the statistics block and fold it into the counters.
    pub(super) fn pull_stats(&mut self) {
        let block = StatsBlock::read(&self.regs);
        self.counters.collisions += u64::from(block.collisions());
        self.counters.rx_missed += u64::from(block.rx_lost_frames);
        self.last_stats = block;
    }

    /// Pull statistics now and start a fresh tick period.
    pub(super) fn restart_stats_tick(&mut self) {
        if let Some(handle) = self.stats_timer.take() {
            self.timer.cancel(handle);
        }
        self.pull_stats();
        self.stats_timer = Some(self.timer.schedule(TimerEvent::StatsTick, STATS_TICK_MS));
    }

    fn stats_tick(&mut self) {
        self.pull_stats();

        let polled = {
            let mut mdio = BitBangMdio::new(&mut self.regs, &mut self.delay);
            self.phy.poll_link(&mut mdio)
        };
        match polled {
            Ok(Some(LinkEvent::Up(link))) => {
                log::debug!("link up: {:?} {:?}", link.speed, link.duplex);
                self.link = Some(link);
                self.apply_duplex();
            }
            Ok(Some(LinkEvent::Down)) => {
                log::debug!("link down");
                self.link = None;
                self.apply_duplex();
            }
            Ok(None) => {}
            Err(e) => log::warn!("PHY poll failed: {e}"),
        }

        self.stats_timer = Some(self.timer.schedule(TimerEvent::StatsTick, STATS_TICK_MS));
    }

    fn tx_timeout<S>(&mut self, stack: &mut S)
    where
        S: NetStack<P::Buffer>,
    {
        self.counters.tx_errors += 1;
        self.counters.tx_timeouts += 1;
        log::error!("transmit timeout, {} frames in flight", self.tx.in_flight());

        self.tx
            .complete_with_errors(&mut self.regs, &mut self.counters);
        self.tx
            .reclaim(&mut self.regs, &mut self.pool, &mut self.counters);
        self.rx_drain(stack);

        self.recover();

        if self.state() == State::Running && stack.has_pending() {
            self.restart_transmit(stack);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
