//! DMA-capable packet buffers.
//!
//! Buffers are owned by an external pool. The driver only holds handles:
//! receive handles sit in the receive ring until a frame lands in them, and
//! transmit handles sit in the transmit ring until the controller has fetched
//! every fragment.

/// One physically contiguous piece of a packet buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Bus address of the first byte
    pub bus_addr: u32,
    /// Number of valid bytes
    pub len: usize,
}

impl Segment {
    /// Create a segment descriptor
    #[must_use]
    pub const fn new(bus_addr: u32, len: usize) -> Self {
        Self { bus_addr, len }
    }
}

/// Handle to a DMA-capable buffer.
///
/// A buffer handed out by [`BufferPool::alloc`] is a single contiguous
/// segment. Frames queued for transmission by the network stack may span
/// several segments (a scatter list); the transmit path maps each segment onto
/// one descriptor fragment.
pub trait PacketBuffer {
    /// Bus-visible segments making up the frame, in order.
    fn segments(&self) -> impl Iterator<Item = Segment> + '_;

    /// Total number of valid bytes across all segments.
    fn total_len(&self) -> usize;

    /// Bus address of the first byte of the first segment.
    fn bus_addr(&self) -> u32;

    /// Writable capacity of the first segment.
    fn capacity(&self) -> usize;

    /// Valid bytes of the first segment.
    fn as_slice(&self) -> &[u8];

    /// Full writable area of the first segment (up to `capacity`).
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Set the number of valid bytes in a single-segment buffer.
    fn set_len(&mut self, len: usize);

    /// Gather every segment into `dst`, returning the bytes copied.
    fn copy_to(&self, dst: &mut [u8]) -> usize;
}

/// Source of DMA-capable buffers.
pub trait BufferPool {
    /// Buffer handle type
    type Buffer: PacketBuffer;

    /// Allocate a contiguous buffer with at least `min_size` bytes of
    /// capacity. `None` is a transient shortage, not an error.
    fn alloc(&mut self, min_size: usize) -> Option<Self::Buffer>;

    /// Return a buffer to the pool.
    fn free(&mut self, buffer: Self::Buffer);

    /// Bus address at which the controller reaches host memory at `host`.
    ///
    /// Used for the descriptor lists, which live inside the device rather
    /// than in pool buffers. Returns `None` when the memory is not reachable
    /// through the controller's 32-bit address space. The default assumes
    /// host and bus addresses are identical; pools behind an IOMMU or a bus
    /// offset must override it.
    fn bus_addr_of(&self, host: usize) -> Option<u32> {
        u32::try_from(host).ok()
    }
}
