//! RX DMA descriptor for frame reception.

use super::bits::{frag, rxstat};
use super::{Descriptor, VolatileCell};

/// RX DMA descriptor: one fragment, 16 bytes.
#[repr(C, align(8))]
pub struct RxDescriptor {
    /// Bus address of the next descriptor
    next: VolatileCell<u32>,
    /// Completion status and received length
    status: VolatileCell<u32>,
    /// Fragment buffer bus address
    frag_addr: VolatileCell<u32>,
    /// Fragment buffer length and LAST flag
    frag_len: VolatileCell<u32>,
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed RX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: VolatileCell::new(0),
            status: VolatileCell::new(0),
            frag_addr: VolatileCell::new(0),
            frag_len: VolatileCell::new(0),
        }
    }

    /// Point the descriptor at a receive buffer and hand it to the DMA engine.
    ///
    /// Clearing the status word is what returns the descriptor to hardware.
    pub fn arm(&self, buffer_addr: u32, len: usize) {
        self.frag_addr.set(buffer_addr);
        self.frag_len
            .set(((len as u32) & frag::LEN_MASK) | frag::LAST);
        self.status.set(0);
    }

    /// Raw status word. Zero means the descriptor is still owned by hardware.
    #[inline(always)]
    #[must_use]
    pub fn status(&self) -> u32 {
        self.status.get()
    }

    /// Whether hardware has written anything back to this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn has_status(&self) -> bool {
        self.status.get() != 0
    }

    /// Whether the upload DMA completed this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_done(&self) -> bool {
        (self.status.get() & rxstat::DMADONE) != 0
    }

    /// Whether the frame was received with an error.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        (self.status.get() & rxstat::FRAME_ERR) != 0
    }

    /// Received frame length in bytes.
    #[inline(always)]
    #[must_use]
    pub fn frame_len(&self) -> usize {
        (self.status.get() & rxstat::FRAMELEN_MASK) as usize
    }

    /// Fragment buffer address.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.frag_addr.get()
    }

    /// Fragment length word.
    #[inline(always)]
    #[must_use]
    pub fn buffer_len_raw(&self) -> u32 {
        self.frag_len.get()
    }

    /// Simulate a hardware write-back (testing only).
    #[cfg(test)]
    pub fn complete(&self, status: u32) {
        self.status.set(status);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Descriptor for RxDescriptor {
    #[inline(always)]
    fn next_addr(&self) -> u32 {
        self.next.get()
    }

    #[inline(always)]
    fn set_next_addr(&self, addr: u32) {
        self.next.set(addr);
    }

    fn clear(&self) {
        self.status.set(0);
        self.frag_addr.set(0);
        self.frag_len.set(0);
    }
}

// =============================================================================
// Tests
// =============================================================================
