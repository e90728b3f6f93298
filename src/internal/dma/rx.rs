//! Receive engine.
//!
//! Every entry of the receive ring always holds a buffer posted to the
//! upload DMA engine. A drain walks completed descriptors from the head,
//! swaps in a fresh buffer for each good frame and hands the filled one to
//! the stack. When no replacement buffer is available the frame is dropped
//! and the same buffer is re-posted, so the ring never shrinks.

use super::descriptor::RxDescriptor;
use super::descriptor::bits::rxstat;
use super::ring::DescriptorRing;
use super::slot::Slot;
use super::wait_dma_halt;
use crate::driver::error::{ConfigError, ConfigResult, DmaError, DmaResult};
use crate::driver::stats::Counters;
use crate::hal::buffer::{BufferPool, PacketBuffer};
use crate::hal::stack::{NetStack, RxFrame};
use crate::hal::window::RegisterWindow;
use crate::internal::constants::{ETH_HEADER_SIZE, PACKET_SIZE, RX_BUFFER_SIZE, RX_STALL_RETRIES};
use crate::internal::register::dma::{
    DMACTL_OFFSET, DMACTL_RXDMA_STALL, DMACTL_RXDMA_STOPPED, DMACTL_RXDMA_UNSTALL,
    RX_DMALIST_PTR_OFFSET,
};

/// Receive ring plus the buffers posted to it.
pub struct RxEngine<B, const N: usize> {
    ring: DescriptorRing<RxDescriptor, N>,
    slots: [Slot<B>; N],
    head: usize,
}

impl<B: PacketBuffer, const N: usize> RxEngine<B, N> {
    /// Create an empty engine. Nothing is posted until [`init`](Self::init).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing::from_array([const { RxDescriptor::new() }; N]),
            slots: [const { Slot::Vacant }; N],
            head: 0,
        }
    }

    /// Translate the descriptor array to bus addresses through `pool`.
    ///
    /// Must run again whenever the engine has moved.
    pub fn map<P: BufferPool>(&mut self, pool: &P) -> ConfigResult<()> {
        self.ring.map(|host| pool.bus_addr_of(host))
    }

    /// Link the ring into a circle and post a fresh buffer to every entry.
    ///
    /// Any buffers left from a previous run go back to the pool first. If the
    /// pool cannot fill the whole ring, everything allocated so far is
    /// returned and the ring is left empty.
    pub fn init<P>(&mut self, pool: &mut P) -> ConfigResult<()>
    where
        P: BufferPool<Buffer = B>,
    {
        self.release(pool);

        for index in 0..N {
            let Some(buffer) = pool.alloc(RX_BUFFER_SIZE) else {
                log::warn!("rx ring fill failed at entry {index} of {N}");
                self.release(pool);
                return Err(ConfigError::NoRxBuffers);
            };
            self.install(index, buffer, pool);
        }

        self.head = 0;
        Ok(())
    }

    /// Point the receive list pointer at the first entry.
    ///
    /// The upload engine is stalled around the update.
    pub fn attach<R: RegisterWindow>(&mut self, regs: &mut R, counters: &mut Counters) {
        regs.set_bits32(DMACTL_OFFSET, DMACTL_RXDMA_STALL);
        wait_dma_halt(regs, counters);
        regs.write32(RX_DMALIST_PTR_OFFSET, self.ring.base_addr_u32());
        self.head = 0;
        regs.set_bits32(DMACTL_OFFSET, DMACTL_RXDMA_UNSTALL);
    }

    /// Deliver every completed frame, then restart the upload engine if it
    /// ran off the ring.
    ///
    /// Returns the number of frames delivered. Restart attempts are bounded by
    /// `RX_STALL_RETRIES`; running out of attempts is counted and reported as
    /// [`DmaError::StallRecoveryExhausted`]. Frames delivered before that point
    /// stay delivered.
    pub fn drain<R, P, S>(
        &mut self,
        regs: &mut R,
        pool: &mut P,
        stack: &mut S,
        counters: &mut Counters,
    ) -> DmaResult<usize>
    where
        R: RegisterWindow,
        P: BufferPool<Buffer = B>,
        S: NetStack<B>,
    {
        let mut delivered = self.drain_completed(pool, stack, counters);
        let mut retries = 0;

        while self.stalled(regs) {
            if retries == RX_STALL_RETRIES {
                counters.rx_stall_exhausted += 1;
                log::warn!("rx DMA still stopped after {RX_STALL_RETRIES} restarts");
                return Err(DmaError::StallRecoveryExhausted);
            }
            retries += 1;

            counters.rx_stall_recoveries += 1;
            log::debug!("rx DMA stopped, reloading list pointer");
            self.attach(regs, counters);
            delivered += self.drain_completed(pool, stack, counters);
        }

        Ok(delivered)
    }

    /// Return every posted buffer to the pool and clear the ring.
    ///
    /// The upload engine must be stalled.
    pub fn release<P>(&mut self, pool: &mut P)
    where
        P: BufferPool<Buffer = B>,
    {
        for slot in &mut self.slots {
            if let Some(buffer) = slot.release() {
                pool.free(buffer);
            }
        }
        self.ring.initialize();
        self.head = 0;
    }

    /// Index of the next descriptor to inspect
    #[inline(always)]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Number of entries holding a buffer owned by hardware
    pub fn posted(&self) -> usize {
        self.slots.iter().filter(|s| s.is_hardware()).count()
    }

    /// Bus address of the first descriptor
    pub fn base_addr(&self) -> u32 {
        self.ring.base_addr_u32()
    }

    /// Ring capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// One pass over the ring, bounded by its size.
    fn drain_completed<P, S>(&mut self, pool: &mut P, stack: &mut S, counters: &mut Counters) -> usize
    where
        P: BufferPool<Buffer = B>,
        S: NetStack<B>,
    {
        let mut delivered = 0;

        for _ in 0..N {
            let index = self.head;
            let desc = self.ring.entry_at(index);
            if !desc.has_status() {
                break;
            }
            let status = desc.status();
            let len = desc.frame_len();

            self.head = self.ring.advance(index).unwrap_or(0);
            self.slots[index].complete();

            if status & rxstat::FRAME_ERR != 0 {
                counters.rx_errors += 1;
                self.rearm(index);
                continue;
            }

            if status & rxstat::DMADONE == 0 {
                counters.rx_errors += 1;
                counters.rx_bad_status += 1;
                log::warn!("rx descriptor {index} returned without DMADONE (status {status:#010x})");
                self.rearm(index);
                continue;
            }

            if len < ETH_HEADER_SIZE {
                counters.rx_errors += 1;
                counters.rx_runts += 1;
                self.rearm(index);
                continue;
            }

            let Some(fresh) = pool.alloc(RX_BUFFER_SIZE) else {
                counters.rx_errors += 1;
                counters.rx_alloc_failures += 1;
                self.rearm(index);
                continue;
            };

            let filled = self.slots[index].take();
            self.install(index, fresh, pool);
            let Some(mut filled) = filled else {
                continue;
            };

            let len = len.min(filled.capacity());
            filled.set_len(len);
            match RxFrame::new(filled) {
                Ok(frame) => {
                    stack.deliver(frame);
                    counters.rx_packets += 1;
                    delivered += 1;
                }
                Err(buffer) => {
                    pool.free(buffer);
                    counters.rx_errors += 1;
                    counters.rx_runts += 1;
                }
            }
        }

        delivered
    }

    /// Attach `buffer` to entry `index` and hand it to hardware.
    fn install<P>(&mut self, index: usize, buffer: B, pool: &mut P)
    where
        P: BufferPool<Buffer = B>,
    {
        self.ring
            .entry_at(index)
            .arm(buffer.bus_addr(), buffer.capacity().min(PACKET_SIZE));
        if let Some(displaced) = self.slots[index].post(buffer) {
            pool.free(displaced);
        }
    }

    /// Re-post the buffer already attached to entry `index`.
    fn rearm(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if let Some(buffer) = slot.buffer() {
            self.ring
                .entry_at(index)
                .arm(buffer.bus_addr(), buffer.capacity().min(PACKET_SIZE));
        }
        slot.rearm();
    }

    fn stalled<R: RegisterWindow>(&self, regs: &R) -> bool {
        regs.read32(RX_DMALIST_PTR_OFFSET) == 0
            || regs.read32(DMACTL_OFFSET) & DMACTL_RXDMA_STOPPED != 0
    }

    /// Simulate the upload engine writing `data` into entry `index`.
    #[cfg(test)]
    pub(crate) fn inject(&mut self, index: usize, data: &[u8], status: u32) {
        if let Some(buffer) = self.slots[index].buffer_mut() {
            let dst = buffer.as_mut_slice();
            let n = data.len().min(dst.len());
            dst[..n].copy_from_slice(&data[..n]);
        }
        self.ring.entry_at(index).complete(status);
    }

    /// Simulate a good frame landing in entry `index`.
    #[cfg(test)]
    pub(crate) fn inject_frame(&mut self, index: usize, data: &[u8]) {
        self.inject(index, data, rxstat::DMADONE | data.len() as u32);
    }

    #[cfg(test)]
    pub(crate) fn descriptor(&self, index: usize) -> &RxDescriptor {
        self.ring.entry_at(index)
    }
}

impl<B: PacketBuffer, const N: usize> Default for RxEngine<B, N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
