//! Transmit engine.
//!
//! Entries are either on the free list or on the posted chain that the
//! download DMA engine walks. Frames are first collected into a pending
//! batch; [`TxEngine::commit`] splices the batch onto the posted chain with
//! the engine stalled. Only the last descriptor of the chain requests a
//! completion interrupt.

use super::descriptor::bits::STE_MAXFRAGS;
use super::descriptor::{Descriptor, TxDescriptor};
use super::ring::DescriptorRing;
use super::slot::Slot;
use super::{wait_dma_halt, wait_reset};
use crate::driver::error::{ConfigResult, DmaError, DmaResult};
use crate::driver::stats::Counters;
use crate::hal::buffer::{BufferPool, PacketBuffer};
use crate::hal::window::RegisterWindow;
use crate::internal::constants::{
    PACKET_SIZE, TX_RECLAIM_THRESH, TX_STATUS_DRAIN_LIMIT, TX_THRESH_MAX, TX_THRESH_MIN,
    TX_THRESH_STEP,
};
use crate::internal::register::dma::{
    ASICCTL_OFFSET, ASICCTL_TX_RESET, DMACTL_OFFSET, DMACTL_TXDMA_STALL, DMACTL_TXDMA_STOPPED,
    DMACTL_TXDMA_UNSTALL, TX_DMALIST_PTR_OFFSET, TX_RECLAIM_THRESH_OFFSET, TX_STARTTHRESH_OFFSET,
    TX_STATUS_OFFSET, TXSTATUS_EXCESSCOLLS, TXSTATUS_FAULTS, TXSTATUS_RECLAIMERR,
    TXSTATUS_TXDONE, TXSTATUS_UNDERRUN,
};
use crate::internal::register::mac::{MACCTL1_OFFSET, MACCTL1_TX_ENABLE};

/// Transmit ring, free list and posted chain.
pub struct TxEngine<B, const N: usize> {
    ring: DescriptorRing<TxDescriptor, N>,
    slots: [Slot<B>; N],
    /// Top of the free-entry stack
    free: Option<usize>,
    free_count: usize,
    /// Oldest unreclaimed entry of the posted chain
    head: Option<usize>,
    /// Newest entry of the posted chain
    tail: Option<usize>,
    /// First and last entries enqueued since the last commit
    batch: Option<(usize, usize)>,
    /// Start threshold in bytes; survives re-initialisation
    start_thresh: u16,
}

impl<B: PacketBuffer, const N: usize> TxEngine<B, N> {
    /// Create an engine with every entry unlinked. Call [`init`](Self::init)
    /// before use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing::from_array([const { TxDescriptor::new() }; N]),
            slots: [const { Slot::Vacant }; N],
            free: None,
            free_count: 0,
            head: None,
            tail: None,
            batch: None,
            start_thresh: TX_THRESH_MIN,
        }
    }

    /// Translate the descriptor array to bus addresses through `pool`.
    ///
    /// Must run again whenever the engine has moved.
    pub fn map<P: BufferPool>(&mut self, pool: &P) -> ConfigResult<()> {
        self.ring.map(|host| pool.bus_addr_of(host))
    }

    /// Return any attached buffers and put every entry on the free list.
    ///
    /// The start threshold is kept.
    pub fn init<P>(&mut self, pool: &mut P)
    where
        P: BufferPool<Buffer = B>,
    {
        for slot in &mut self.slots {
            if let Some(buffer) = slot.release() {
                pool.free(buffer);
            }
        }

        self.ring.initialize_list();
        self.free = if N > 0 { Some(0) } else { None };
        self.free_count = N;
        self.head = None;
        self.tail = None;
        self.batch = None;
    }

    /// Release every buffer. The download engine must be stalled.
    pub fn release<P>(&mut self, pool: &mut P)
    where
        P: BufferPool<Buffer = B>,
    {
        self.init(pool);
    }

    /// Write the start and reclaim thresholds.
    pub fn program_thresholds<R: RegisterWindow>(&self, regs: &mut R) {
        regs.write16(TX_STARTTHRESH_OFFSET, self.start_thresh);
        regs.write8(TX_RECLAIM_THRESH_OFFSET, TX_RECLAIM_THRESH);
    }

    /// Map `frame` onto a free entry and append it to the pending batch.
    ///
    /// Frames spanning more than `STE_MAXFRAGS` segments are copied into one
    /// pool buffer first. Every failure consumes the frame: it goes back to
    /// the pool and the entry stays free.
    ///
    /// # Errors
    ///
    /// - [`DmaError::NoDescriptorsAvailable`]: no free entry; check
    ///   [`has_free`](Self::has_free) before dequeuing from the stack
    /// - [`DmaError::InvalidLength`]: empty frame
    /// - [`DmaError::FrameTooLarge`]: longer than `PACKET_SIZE`
    /// - [`DmaError::NoBuffers`]: no buffer to coalesce into
    pub fn enqueue<P>(&mut self, frame: B, pool: &mut P, counters: &mut Counters) -> DmaResult<()>
    where
        P: BufferPool<Buffer = B>,
    {
        let Some(index) = self.pop_free() else {
            pool.free(frame);
            counters.tx_dropped += 1;
            return Err(DmaError::NoDescriptorsAvailable);
        };

        let total = frame.total_len();
        if total == 0 {
            return Err(self.drop_frame(index, frame, pool, counters, DmaError::InvalidLength));
        }
        if total > PACKET_SIZE {
            return Err(self.drop_frame(index, frame, pool, counters, DmaError::FrameTooLarge));
        }

        let frame = if frame.segments().filter(|s| s.len > 0).count() > STE_MAXFRAGS {
            match Self::coalesce(frame, total, pool) {
                Ok(flat) => {
                    counters.tx_coalesced += 1;
                    flat
                }
                Err(frame) => {
                    log::warn!("no buffer to coalesce a {total} byte frame");
                    return Err(self.drop_frame(index, frame, pool, counters, DmaError::NoBuffers));
                }
            }
        } else {
            frame
        };

        let desc = self.ring.entry_at(index);
        {
            let mut segments = frame.segments().filter(|s| s.len > 0).peekable();
            let mut frag = 0;
            while let Some(segment) = segments.next() {
                let last = segments.peek().is_none();
                desc.set_fragment(frag, segment.bus_addr, segment.len, last);
                frag += 1;
            }
        }
        desc.prepare(frame.total_len());

        if let Some(stale) = self.slots[index].post(frame) {
            pool.free(stale);
        }

        self.batch = match self.batch {
            None => Some((index, index)),
            Some((first, last)) => {
                self.ring.link(last, index);
                Some((first, index))
            }
        };

        Ok(())
    }

    /// Hand the pending batch to the download engine.
    ///
    /// Returns `false` if nothing was pending.
    pub fn commit<R: RegisterWindow>(&mut self, regs: &mut R, counters: &mut Counters) -> bool {
        let Some((first, last)) = self.batch.take() else {
            return false;
        };

        self.ring.entry_at(last).set_dma_intr();

        regs.set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_STALL);
        wait_dma_halt(regs, counters);

        let was_empty = match self.tail {
            Some(tail) => {
                self.ring.entry_at(tail).clear_dma_intr();
                self.ring.link(tail, first);
                false
            }
            None => {
                self.head = Some(first);
                true
            }
        };
        self.tail = Some(last);

        // An empty chain leaves the pointer parked on a reclaimed entry.
        if was_empty || regs.read32(TX_DMALIST_PTR_OFFSET) == 0 {
            regs.write32(TX_DMALIST_PTR_OFFSET, self.ring.bus_addr(first));
        }

        regs.set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_UNSTALL);
        true
    }

    /// Free the buffers of every completed entry from the head of the chain.
    ///
    /// Returns the number of entries reclaimed. If entries remain but the
    /// engine has stopped, it is pointed back at the head and unstalled.
    pub fn reclaim<R, P>(&mut self, regs: &mut R, pool: &mut P, counters: &mut Counters) -> usize
    where
        R: RegisterWindow,
        P: BufferPool<Buffer = B>,
    {
        let mut reclaimed = 0;

        while let Some(index) = self.head {
            if !self.ring.entry_at(index).is_done() {
                break;
            }
            self.head = if self.tail == Some(index) {
                None
            } else {
                self.ring.advance(index)
            };

            self.slots[index].complete();
            if let Some(buffer) = self.slots[index].take() {
                pool.free(buffer);
            }
            counters.tx_packets += 1;
            self.push_free(index);
            reclaimed += 1;
        }

        match self.head {
            None => self.tail = None,
            Some(head) => {
                if regs.read32(DMACTL_OFFSET) & DMACTL_TXDMA_STOPPED != 0
                    || regs.read32(TX_DMALIST_PTR_OFFSET) == 0
                {
                    regs.write32(TX_DMALIST_PTR_OFFSET, self.ring.bus_addr(head));
                    regs.set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_UNSTALL);
                }
            }
        }

        reclaimed
    }

    /// Consume transmit status entries, resetting the transmitter on faults.
    ///
    /// At most `TX_STATUS_DRAIN_LIMIT` entries are consumed per call; a FIFO
    /// that is still not empty afterwards is counted.
    pub fn complete_with_errors<R: RegisterWindow>(&mut self, regs: &mut R, counters: &mut Counters) {
        for _ in 0..TX_STATUS_DRAIN_LIMIT {
            let status = regs.read8(TX_STATUS_OFFSET);
            if status & TXSTATUS_TXDONE == 0 {
                return;
            }

            if status & TXSTATUS_FAULTS != 0 {
                counters.tx_errors += 1;
                if status & TXSTATUS_UNDERRUN != 0 {
                    counters.tx_underruns += 1;
                }
                if status & TXSTATUS_EXCESSCOLLS != 0 {
                    counters.tx_excess_collisions += 1;
                }
                if status & TXSTATUS_RECLAIMERR != 0 {
                    counters.tx_reclaim_errors += 1;
                }
                log::warn!("transmit error, status {status:#04x}");
                self.reset_transmitter(regs, counters, status & TXSTATUS_UNDERRUN != 0);
            }

            regs.write8(TX_STATUS_OFFSET, status);
        }

        if regs.read8(TX_STATUS_OFFSET) & TXSTATUS_TXDONE != 0 {
            counters.tx_status_overruns += 1;
            log::warn!("transmit status FIFO not drained after {TX_STATUS_DRAIN_LIMIT} entries");
        }
    }

    /// Reset the transmit logic only and resume from the head of the chain.
    fn reset_transmitter<R: RegisterWindow>(
        &mut self,
        regs: &mut R,
        counters: &mut Counters,
        underrun: bool,
    ) {
        regs.set_bits32(ASICCTL_OFFSET, ASICCTL_TX_RESET);
        wait_reset(regs, counters);

        if let Some(head) = self.head {
            regs.write32(TX_DMALIST_PTR_OFFSET, self.ring.bus_addr(head));
        }

        if underrun && self.start_thresh < TX_THRESH_MAX {
            self.start_thresh = self.start_thresh.saturating_add(TX_THRESH_STEP).min(TX_THRESH_MAX);
            log::warn!("tx underrun, start threshold now {} bytes", self.start_thresh);
        }
        self.program_thresholds(regs);

        regs.set_bits16(MACCTL1_OFFSET, MACCTL1_TX_ENABLE);
        regs.set_bits32(DMACTL_OFFSET, DMACTL_TXDMA_UNSTALL);
    }

    /// Whether an entry is available for [`enqueue`](Self::enqueue)
    #[inline(always)]
    pub fn has_free(&self) -> bool {
        self.free.is_some()
    }

    /// Number of free entries
    #[inline(always)]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Number of entries holding a frame (posted or pending)
    #[inline(always)]
    pub fn in_flight(&self) -> usize {
        N - self.free_count
    }

    /// Whether the posted chain and the pending batch are both empty
    pub fn is_idle(&self) -> bool {
        self.head.is_none() && self.batch.is_none()
    }

    /// Whether frames were enqueued but not yet committed
    pub fn has_pending_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Current transmit start threshold in bytes
    #[inline(always)]
    pub fn start_threshold(&self) -> u16 {
        self.start_thresh
    }

    /// Oldest unreclaimed entry
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Bus address of the descriptor at `index`
    pub fn bus_addr(&self, index: usize) -> u32 {
        self.ring.bus_addr(index)
    }

    fn pop_free(&mut self) -> Option<usize> {
        let index = self.free?;
        self.free = self.ring.advance(index);
        self.free_count -= 1;
        self.ring.unlink(index);
        Some(index)
    }

    fn push_free(&mut self, index: usize) {
        self.ring.entry_at(index).clear();
        self.ring.unlink(index);
        self.ring.set_soft_link(index, self.free);
        self.free = Some(index);
        self.free_count += 1;
    }

    fn drop_frame<P>(
        &mut self,
        index: usize,
        frame: B,
        pool: &mut P,
        counters: &mut Counters,
        error: DmaError,
    ) -> DmaError
    where
        P: BufferPool<Buffer = B>,
    {
        pool.free(frame);
        self.push_free(index);
        counters.tx_errors += 1;
        counters.tx_dropped += 1;
        error
    }

    /// Copy a scattered frame into one pool buffer.
    fn coalesce<P>(frame: B, total: usize, pool: &mut P) -> Result<B, B>
    where
        P: BufferPool<Buffer = B>,
    {
        let Some(mut flat) = pool.alloc(total) else {
            return Err(frame);
        };
        let copied = {
            let dst = flat.as_mut_slice();
            let len = total.min(dst.len());
            frame.copy_to(&mut dst[..len])
        };
        flat.set_len(copied);
        pool.free(frame);
        Ok(flat)
    }

    /// Mark every posted entry as fetched by hardware.
    #[cfg(test)]
    pub(crate) fn complete_posted(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            self.ring.entry_at(index).complete();
            count += 1;
            cursor = if self.tail == Some(index) {
                None
            } else {
                self.ring.advance(index)
            };
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn descriptor(&self, index: usize) -> &TxDescriptor {
        self.ring.entry_at(index)
    }

    #[cfg(test)]
    pub(crate) fn set_start_threshold(&mut self, thresh: u16) {
        self.start_thresh = thresh;
    }
}

impl<B: PacketBuffer, const N: usize> Default for TxEngine<B, N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
