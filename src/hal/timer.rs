//! One-shot timer service.

/// Events the driver schedules on the timer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// Periodic statistics pull and link poll
    StatsTick,
    /// Transmit watchdog expiry
    TxTimeout,
}

/// Interval between statistics pulls
pub const STATS_TICK_MS: u32 = 1000;

/// Time a committed transmit batch may stay unreclaimed
pub const TX_TIMEOUT_MS: u32 = 5000;

/// Schedules one-shot callbacks.
///
/// When an event fires, the platform calls
/// [`Ste::handle_timer`](crate::Ste::handle_timer) with it from the same
/// exclusion domain as every other driver entry point.
pub trait TimerService {
    /// Handle identifying a scheduled event
    type Handle: Copy;

    /// Arrange for `event` to fire once after `delay_ms` milliseconds.
    fn schedule(&mut self, event: TimerEvent, delay_ms: u32) -> Self::Handle;

    /// Cancel a pending event. Cancelling an expired handle is a no-op.
    fn cancel(&mut self, handle: Self::Handle);
}
