//! TX DMA descriptor for frame transmission.

use super::bits::{STE_MAXFRAGS, frag, txctl};
use super::{Descriptor, VolatileCell};

/// One (address, length) fragment entry.
#[repr(C)]
struct Fragment {
    addr: VolatileCell<u32>,
    len: VolatileCell<u32>,
}

impl Fragment {
    const fn new() -> Self {
        Self {
            addr: VolatileCell::new(0),
            len: VolatileCell::new(0),
        }
    }
}

/// TX DMA descriptor: control word plus eight fragments, 72 bytes.
#[repr(C, align(8))]
pub struct TxDescriptor {
    /// Bus address of the next descriptor
    next: VolatileCell<u32>,
    /// Frame length and control/completion bits
    ctl: VolatileCell<u32>,
    /// Gather list
    frags: [Fragment; STE_MAXFRAGS],
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 72;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: VolatileCell::new(0),
            ctl: VolatileCell::new(0),
            frags: [const { Fragment::new() }; STE_MAXFRAGS],
        }
    }

    /// Fill fragment `index`. Out-of-range indices are ignored.
    pub fn set_fragment(&self, index: usize, addr: u32, len: usize, last: bool) {
        if let Some(f) = self.frags.get(index) {
            let mut word = (len as u32) & frag::LEN_MASK;
            if last {
                word |= frag::LAST;
            }
            f.addr.set(addr);
            f.len.set(word);
        }
    }

    /// Write the control word for a frame of `total_len` bytes.
    ///
    /// Clears `DMADONE`, so this also hands the descriptor to hardware once
    /// it is reachable from the list pointer.
    pub fn prepare(&self, total_len: usize) {
        self.ctl.set(total_len as u32 & frag::LEN_MASK);
    }

    /// Request a TX_DMADONE interrupt when this descriptor completes.
    #[inline(always)]
    pub fn set_dma_intr(&self) {
        self.ctl.update(|v| v | txctl::DMAINTR);
    }

    /// Drop the TX_DMADONE interrupt request.
    #[inline(always)]
    pub fn clear_dma_intr(&self) {
        self.ctl.update(|v| v & !txctl::DMAINTR);
    }

    /// Whether the interrupt request bit is set.
    #[inline(always)]
    #[must_use]
    pub fn has_dma_intr(&self) -> bool {
        (self.ctl.get() & txctl::DMAINTR) != 0
    }

    /// Whether the download DMA completed this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_done(&self) -> bool {
        (self.ctl.get() & txctl::DMADONE) != 0
    }

    /// Raw control word.
    #[inline(always)]
    #[must_use]
    pub fn ctl(&self) -> u32 {
        self.ctl.get()
    }

    /// Fragment `index` as (address, length word).
    #[must_use]
    pub fn fragment(&self, index: usize) -> Option<(u32, u32)> {
        self.frags.get(index).map(|f| (f.addr.get(), f.len.get()))
    }

    /// Simulate a hardware completion (testing only).
    #[cfg(test)]
    pub fn complete(&self) {
        self.ctl.update(|v| v | txctl::DMADONE);
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Descriptor for TxDescriptor {
    #[inline(always)]
    fn next_addr(&self) -> u32 {
        self.next.get()
    }

    #[inline(always)]
    fn set_next_addr(&self, addr: u32) {
        self.next.set(addr);
    }

    fn clear(&self) {
        self.ctl.set(0);
        for f in &self.frags {
            f.addr.set(0);
            f.len.set(0);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
