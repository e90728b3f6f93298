//! Interrupt status handling for the ST201.
//!
//! This module provides the [`InterruptStatus`] structure for parsing the
//! 16-bit interrupt status word read from `ISR_ACK` (which also clears the
//! latched sources) or peeked from `ISR`.

use crate::internal::register::intr::{
    ISR_HOSTERR, ISR_INTLATCH, ISR_LINKEVENT, ISR_RX_DMADONE, ISR_STATS_OFLOW, ISR_TX_DMADONE,
    ISR_TX_DONE, STE_INTRS,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from the interrupt status register.
///
/// # Example
///
/// ```ignore
/// let status = InterruptStatus::from_raw(regs.read16(ISR_ACK_OFFSET));
/// if status.rx_dma_done {
///     // drain the receive ring
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// An interrupt is latched for this device
    pub latched: bool,
    /// Host bus error; the device needs a full reset
    pub host_error: bool,
    /// Transmit status FIFO holds at least one entry
    pub tx_done: bool,
    /// A statistics counter is about to wrap
    pub stats_overflow: bool,
    /// Link state changed
    pub link_event: bool,
    /// Download DMA finished a descriptor that requested an interrupt
    pub tx_dma_done: bool,
    /// Upload DMA finished a descriptor
    pub rx_dma_done: bool,
}

impl InterruptStatus {
    /// Create from a raw status word
    #[inline]
    pub fn from_raw(status: u16) -> Self {
        Self {
            latched: (status & ISR_INTLATCH) != 0,
            host_error: (status & ISR_HOSTERR) != 0,
            tx_done: (status & ISR_TX_DONE) != 0,
            stats_overflow: (status & ISR_STATS_OFLOW) != 0,
            link_event: (status & ISR_LINKEVENT) != 0,
            tx_dma_done: (status & ISR_TX_DMADONE) != 0,
            rx_dma_done: (status & ISR_RX_DMADONE) != 0,
        }
    }

    /// Convert back to a raw status word
    #[inline]
    pub fn to_raw(&self) -> u16 {
        let mut val = 0u16;
        if self.latched {
            val |= ISR_INTLATCH;
        }
        if self.host_error {
            val |= ISR_HOSTERR;
        }
        if self.tx_done {
            val |= ISR_TX_DONE;
        }
        if self.stats_overflow {
            val |= ISR_STATS_OFLOW;
        }
        if self.link_event {
            val |= ISR_LINKEVENT;
        }
        if self.tx_dma_done {
            val |= ISR_TX_DMADONE;
        }
        if self.rx_dma_done {
            val |= ISR_RX_DMADONE;
        }
        val
    }

    /// Whether any source the driver services is set
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() & STE_INTRS != 0
    }

    /// Whether a fault that requires a full reset is set
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.host_error
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_each_source() {
        let s = InterruptStatus::from_raw(ISR_RX_DMADONE | ISR_INTLATCH);
        assert!(s.rx_dma_done && s.latched);
        assert!(!s.tx_dma_done && !s.host_error);
        assert!(s.any());

        let s = InterruptStatus::from_raw(ISR_HOSTERR);
        assert!(s.is_fatal());
    }

    #[test]
    fn raw_round_trip_keeps_known_bits() {
        let raw = ISR_TX_DONE | ISR_TX_DMADONE | ISR_STATS_OFLOW | ISR_LINKEVENT;
        assert_eq!(InterruptStatus::from_raw(raw).to_raw(), raw);
        // Unknown bits are dropped.
        assert_eq!(InterruptStatus::from_raw(0x8000).to_raw(), 0);
    }

    #[test]
    fn unserviced_sources_are_not_any() {
        assert!(!InterruptStatus::from_raw(ISR_INTLATCH | ISR_LINKEVENT).any());
        assert!(!InterruptStatus::default().any());
    }
}
