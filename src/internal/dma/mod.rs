//! DMA Engines
//!
//! Descriptor layouts, the explicitly linked descriptor ring, and the receive
//! and transmit engines built on top of it. All memory is statically sized
//! with const generics; buffers come from an external [`BufferPool`].
//!
//! # Architecture
//!
//! - [`RxEngine`]: fully posted receive ring, drained from a single head cursor
//! - [`TxEngine`]: free list plus a posted chain (head/tail), filled in batches
//! - [`DescriptorRing`]: fixed array of descriptors with software and hardware
//!   links
//! - [`Slot`]: buffer ownership of a single ring entry
//!
//! The engines must not move once their rings have been handed to the
//! controller (between `init` and `release`).
//!
//! [`BufferPool`]: crate::hal::BufferPool

pub(crate) mod descriptor;
pub(crate) mod ring;
pub(crate) mod rx;
pub(crate) mod slot;
pub(crate) mod tx;

pub use ring::DescriptorRing;
pub use rx::RxEngine;
pub use slot::Slot;
pub use tx::TxEngine;

use crate::driver::stats::Counters;
use crate::hal::window::RegisterWindow;
use crate::internal::register::STE_TIMEOUT;
use crate::internal::register::dma::{
    ASICCTL_OFFSET, ASICCTL_RESET_BUSY, DMACTL_DMA_HALTINPROG, DMACTL_OFFSET,
};

/// Poll until no DMA halt is in progress.
///
/// Returns `false` after [`STE_TIMEOUT`] polls; the timeout is counted and
/// the caller carries on.
pub(crate) fn wait_dma_halt<R: RegisterWindow>(regs: &R, counters: &mut Counters) -> bool {
    for _ in 0..STE_TIMEOUT {
        if regs.read32(DMACTL_OFFSET) & DMACTL_DMA_HALTINPROG == 0 {
            return true;
        }
    }
    counters.dma_wait_timeouts += 1;
    log::warn!("DMA halt still in progress after {STE_TIMEOUT} polls");
    false
}

/// Poll until the ASIC reports no reset in progress.
pub(crate) fn wait_reset<R: RegisterWindow>(regs: &R, counters: &mut Counters) -> bool {
    for _ in 0..STE_TIMEOUT {
        if regs.read32(ASICCTL_OFFSET) & ASICCTL_RESET_BUSY == 0 {
            return true;
        }
    }
    counters.reset_timeouts += 1;
    log::warn!("reset still busy after {STE_TIMEOUT} polls");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn halt_wait_succeeds_when_idle() {
        let regs = MockRegisters::new();
        let mut counters = Counters::new();
        assert!(wait_dma_halt(&regs, &mut counters));
        assert_eq!(counters.dma_wait_timeouts, 0);
    }

    #[test]
    fn halt_wait_is_bounded() {
        let regs = MockRegisters::new();
        regs.set_halt_stuck(true);
        let mut counters = Counters::new();
        assert!(!wait_dma_halt(&regs, &mut counters));
        assert_eq!(counters.dma_wait_timeouts, 1);
    }

    #[test]
    fn reset_wait_is_bounded() {
        let regs = MockRegisters::new();
        regs.set_reset_stuck(true);
        let mut counters = Counters::new();
        assert!(!wait_reset(&regs, &mut counters));
        assert_eq!(counters.reset_timeouts, 1);
    }
}
