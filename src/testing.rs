//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the packet engine
//! on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::vec::Vec;

use crate::driver::error::Result;
use crate::hal::buffer::{BufferPool, PacketBuffer, Segment};
use crate::hal::mdio::MdioBus;
use crate::hal::stack::{NetStack, RxFrame};
use crate::hal::timer::{TimerEvent, TimerService};
use crate::hal::window::RegisterWindow;
use crate::internal::phy_regs::standard::{bmcr, phy_reg};
use crate::internal::register::dma::{
    ASICCTL_FULL_RESET, ASICCTL_OFFSET, ASICCTL_RESET_BUSY, DMACTL_DMA_HALTINPROG, DMACTL_OFFSET,
    DMACTL_RXDMA_STALL, DMACTL_RXDMA_STOPPED, DMACTL_RXDMA_UNSTALL, DMACTL_TXDMA_STALL,
    DMACTL_TXDMA_STOPPED, DMACTL_TXDMA_UNSTALL, TX_STATUS_OFFSET,
};
use crate::internal::register::intr::{ISR_ACK_OFFSET, ISR_INTLATCH, ISR_OFFSET};
use crate::internal::register::mac::{
    MACCTL1_OFFSET, MACCTL1_RX_DISABLE, MACCTL1_RX_ENABLE, MACCTL1_RX_ENABLED,
    MACCTL1_STATS_DISABLE, MACCTL1_STATS_ENABLE, MACCTL1_TX_DISABLE, MACCTL1_TX_ENABLE,
    MACCTL1_TX_ENABLED, PHYCTL_MCLK, PHYCTL_MDATA, PHYCTL_MDIR, PHYCTL_OFFSET, STATS_OFFSET,
};

/// Size of the simulated register window
const WINDOW_SIZE: usize = 0x80;

/// Size of the statistics block at `STATS_OFFSET`
const STATS_LEN: usize = 24;

const DMA_COMMANDS: [u32; 4] = [
    DMACTL_RXDMA_STALL,
    DMACTL_RXDMA_UNSTALL,
    DMACTL_TXDMA_STALL,
    DMACTL_TXDMA_UNSTALL,
];

// =============================================================================
// Simulated MII PHY
// =============================================================================

/// A Clause 22 PHY listening on the bit-banged management lines.
///
/// Bits driven by the MAC are latched on rising clock edges while `MDIR` is
/// set and decoded when `MDIR` drops. For reads, the PHY then answers on the
/// rising edges that follow: one idle edge, an acknowledge (low) and sixteen
/// data bits, MSB first.
#[derive(Debug, Default)]
struct PhySim {
    address: Option<u8>,
    registers: [u16; 32],
    ctl: u8,
    bits: Vec<bool>,
    pending_read: Option<(u8, u8)>,
    /// Rising edges since the MAC released the data line
    input_edges: usize,
    rising_edges: usize,
}

impl PhySim {
    fn write(&mut self, value: u8) {
        let prev = self.ctl;
        self.ctl = value;

        let was_driving = prev & PHYCTL_MDIR != 0;
        let driving = value & PHYCTL_MDIR != 0;
        if driving && !was_driving {
            self.bits.clear();
            self.pending_read = None;
        }
        if was_driving && !driving {
            self.decode();
            self.input_edges = 0;
        }

        if prev & PHYCTL_MCLK == 0 && value & PHYCTL_MCLK != 0 {
            self.rising_edges += 1;
            if driving {
                self.bits.push(value & PHYCTL_MDATA != 0);
            } else {
                self.input_edges += 1;
            }
        }
    }

    fn read(&self) -> u8 {
        if self.ctl & PHYCTL_MDIR != 0 {
            return self.ctl;
        }
        let high = match self.pending_read {
            Some((phy, reg)) if self.address == Some(phy) => match self.input_edges {
                1 => false,
                k @ 2..=17 => (self.registers[usize::from(reg)] >> (17 - k)) & 1 != 0,
                _ => true,
            },
            _ => true,
        };
        if high {
            self.ctl | PHYCTL_MDATA
        } else {
            self.ctl & !PHYCTL_MDATA
        }
    }

    fn field(bits: &[bool]) -> u16 {
        bits.iter().fold(0, |acc, &b| (acc << 1) | u16::from(b))
    }

    fn decode(&mut self) {
        let bits = core::mem::take(&mut self.bits);
        let Some(start) = bits.iter().position(|b| !b) else {
            return;
        };
        let frame = &bits[start..];
        if frame.len() < 14 || Self::field(&frame[0..2]) != 0b01 {
            return;
        }

        let op = Self::field(&frame[2..4]);
        let phy = Self::field(&frame[4..9]) as u8;
        let reg = Self::field(&frame[9..14]) as u8;

        match op {
            0b10 => self.pending_read = Some((phy, reg)),
            0b01 if frame.len() >= 32 && self.address == Some(phy) => {
                let mut value = Self::field(&frame[16..32]);
                if reg == phy_reg::BMCR {
                    value &= !bmcr::RESET;
                }
                self.registers[usize::from(reg)] = value;
            }
            _ => {}
        }
    }
}

// =============================================================================
// Mock Register Window
// =============================================================================

#[derive(Debug)]
struct RegisterFile {
    mem: [u8; WINDOW_SIZE],
    isr: VecDeque<u16>,
    isr_stuck: Option<u16>,
    tx_status: VecDeque<u8>,
    tx_status_acks: Vec<u8>,
    rx_stopped: bool,
    rx_stopped_sticky: bool,
    tx_stopped: bool,
    halt_stuck: bool,
    reset_stuck: bool,
    dma_commands: Vec<u32>,
    resets: Vec<u32>,
    macctl1: u16,
    stats_enabled: bool,
    phy: PhySim,
}

/// Byte-addressed register file that models the side effects the driver
/// relies on.
///
/// - `DMACTL`: stall/unstall commands are logged and drive the stopped bits
/// - `ASICCTL`: reset writes are logged and complete immediately
/// - `ISR_ACK`: pops the next queued status; `ISR` peeks it
/// - `TX_STATUS`: reads peek the status FIFO, writes pop it
/// - `MACCTL1`: enable/disable commands drive the enabled status bits
/// - `PHYCTL`: drives a simulated MII PHY
/// - statistics block: clear on read
#[derive(Debug)]
pub struct MockRegisters {
    inner: RefCell<RegisterFile>,
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegisters {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(RegisterFile {
                mem: [0; WINDOW_SIZE],
                isr: VecDeque::new(),
                isr_stuck: None,
                tx_status: VecDeque::new(),
                tx_status_acks: Vec::new(),
                rx_stopped: false,
                rx_stopped_sticky: false,
                tx_stopped: false,
                halt_stuck: false,
                reset_stuck: false,
                dma_commands: Vec::new(),
                resets: Vec::new(),
                macctl1: 0,
                stats_enabled: false,
                phy: PhySim::default(),
            }),
        }
    }

    // --- plain memory -------------------------------------------------------

    pub fn peek8(&self, offset: usize) -> u8 {
        self.inner.borrow().mem[offset]
    }

    pub fn peek16(&self, offset: usize) -> u16 {
        let m = &self.inner.borrow().mem;
        u16::from_le_bytes([m[offset], m[offset + 1]])
    }

    pub fn peek32(&self, offset: usize) -> u32 {
        let m = &self.inner.borrow().mem;
        u32::from_le_bytes([m[offset], m[offset + 1], m[offset + 2], m[offset + 3]])
    }

    pub fn poke32(&self, offset: usize, value: u32) {
        self.inner.borrow_mut().mem[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn load_stats(&self, block: &[u8; STATS_LEN]) {
        self.inner.borrow_mut().mem[STATS_OFFSET..STATS_OFFSET + STATS_LEN].copy_from_slice(block);
    }

    // --- interrupts and transmit status ------------------------------------

    /// Queue a status word for the next `ISR_ACK` read
    pub fn push_isr(&self, status: u16) {
        self.inner.borrow_mut().isr.push_back(status);
    }

    /// Make every `ISR_ACK` read return `status`
    pub fn set_isr_stuck(&self, status: Option<u16>) {
        self.inner.borrow_mut().isr_stuck = status;
    }

    pub fn pending_isr(&self) -> usize {
        self.inner.borrow().isr.len()
    }

    pub fn push_tx_status(&self, status: u8) {
        self.inner.borrow_mut().tx_status.push_back(status);
    }

    pub fn tx_status_acks(&self) -> Vec<u8> {
        self.inner.borrow().tx_status_acks.clone()
    }

    // --- DMA and reset -----------------------------------------------------

    pub fn set_rx_stopped(&self, stopped: bool) {
        self.inner.borrow_mut().rx_stopped = stopped;
    }

    /// Keep the receive engine stopped through unstall commands
    pub fn set_rx_stopped_sticky(&self, sticky: bool) {
        let mut r = self.inner.borrow_mut();
        r.rx_stopped_sticky = sticky;
        r.rx_stopped = sticky;
    }

    pub fn set_tx_stopped(&self, stopped: bool) {
        self.inner.borrow_mut().tx_stopped = stopped;
    }

    pub fn set_halt_stuck(&self, stuck: bool) {
        self.inner.borrow_mut().halt_stuck = stuck;
    }

    pub fn set_reset_stuck(&self, stuck: bool) {
        self.inner.borrow_mut().reset_stuck = stuck;
    }

    pub fn dma_command_count(&self, command: u32) -> usize {
        self.inner
            .borrow()
            .dma_commands
            .iter()
            .filter(|&&c| c == command)
            .count()
    }

    /// Reset bits of every `ASICCTL` write that requested a reset
    pub fn resets(&self) -> Vec<u32> {
        self.inner.borrow().resets.clone()
    }

    pub fn clear_logs(&self) {
        let mut r = self.inner.borrow_mut();
        r.dma_commands.clear();
        r.resets.clear();
        r.tx_status_acks.clear();
    }

    // --- MAC control -------------------------------------------------------

    pub fn tx_enabled(&self) -> bool {
        self.inner.borrow().macctl1 & MACCTL1_TX_ENABLED != 0
    }

    pub fn rx_enabled(&self) -> bool {
        self.inner.borrow().macctl1 & MACCTL1_RX_ENABLED != 0
    }

    pub fn stats_enabled(&self) -> bool {
        self.inner.borrow().stats_enabled
    }

    // --- MII PHY -----------------------------------------------------------

    pub fn attach_phy(&self, address: u8) {
        self.inner.borrow_mut().phy.address = Some(address);
    }

    pub fn set_phy_register(&self, reg: u8, value: u16) {
        self.inner.borrow_mut().phy.registers[usize::from(reg)] = value;
    }

    pub fn phy_register(&self, reg: u8) -> u16 {
        self.inner.borrow().phy.registers[usize::from(reg)]
    }

    pub fn mii_rising_edges(&self) -> usize {
        self.inner.borrow().phy.rising_edges
    }

    pub fn reset_mii_edges(&self) {
        self.inner.borrow_mut().phy.rising_edges = 0;
    }
}

impl RegisterFile {
    fn mem_read(&self, offset: usize, width: usize) -> u32 {
        self.mem[offset..offset + width]
            .iter()
            .rev()
            .fold(0, |acc, &b| (acc << 8) | u32::from(b))
    }

    fn mem_write(&mut self, offset: usize, width: usize, value: u32) {
        self.mem[offset..offset + width].copy_from_slice(&value.to_le_bytes()[..width]);
    }

    fn dmactl_status(&self) -> u32 {
        let mut v = 0;
        if self.rx_stopped {
            v |= DMACTL_RXDMA_STOPPED;
        }
        if self.tx_stopped {
            v |= DMACTL_TXDMA_STOPPED;
        }
        if self.halt_stuck {
            v |= DMACTL_DMA_HALTINPROG;
        }
        v
    }

    fn dmactl_command(&mut self, value: u32) {
        for command in DMA_COMMANDS {
            if value & command == 0 {
                continue;
            }
            self.dma_commands.push(command);
            match command {
                DMACTL_RXDMA_STALL => self.rx_stopped = true,
                DMACTL_RXDMA_UNSTALL => self.rx_stopped = self.rx_stopped_sticky,
                DMACTL_TXDMA_STALL => self.tx_stopped = true,
                _ => self.tx_stopped = false,
            }
        }
    }

    fn macctl1_command(&mut self, value: u16) {
        if value & MACCTL1_TX_ENABLE != 0 {
            self.macctl1 |= MACCTL1_TX_ENABLED;
        }
        if value & MACCTL1_TX_DISABLE != 0 {
            self.macctl1 &= !MACCTL1_TX_ENABLED;
        }
        if value & MACCTL1_RX_ENABLE != 0 {
            self.macctl1 |= MACCTL1_RX_ENABLED;
        }
        if value & MACCTL1_RX_DISABLE != 0 {
            self.macctl1 &= !MACCTL1_RX_ENABLED;
        }
        if value & MACCTL1_STATS_ENABLE != 0 {
            self.stats_enabled = true;
        }
        if value & MACCTL1_STATS_DISABLE != 0 {
            self.stats_enabled = false;
        }
    }
}

fn is_stats(offset: usize) -> bool {
    (STATS_OFFSET..STATS_OFFSET + STATS_LEN).contains(&offset)
}

impl RegisterWindow for MockRegisters {
    fn read8(&self, offset: usize) -> u8 {
        let mut r = self.inner.borrow_mut();
        match offset {
            TX_STATUS_OFFSET => r.tx_status.front().copied().unwrap_or(0),
            PHYCTL_OFFSET => r.phy.read(),
            o if is_stats(o) => core::mem::take(&mut r.mem[o]),
            o => r.mem[o],
        }
    }

    fn read16(&self, offset: usize) -> u16 {
        let mut r = self.inner.borrow_mut();
        match offset {
            ISR_ACK_OFFSET => match r.isr_stuck {
                Some(status) => status,
                None => r.isr.pop_front().unwrap_or(0),
            },
            ISR_OFFSET => match (r.isr_stuck, r.isr.front()) {
                (Some(status), _) | (None, Some(&status)) => status | ISR_INTLATCH,
                (None, None) => 0,
            },
            MACCTL1_OFFSET => r.macctl1,
            o => r.mem_read(o, 2) as u16,
        }
    }

    fn read32(&self, offset: usize) -> u32 {
        let r = self.inner.borrow();
        match offset {
            DMACTL_OFFSET => r.dmactl_status(),
            ASICCTL_OFFSET => {
                if r.reset_stuck {
                    ASICCTL_RESET_BUSY
                } else {
                    0
                }
            }
            o => r.mem_read(o, 4),
        }
    }

    fn write8(&mut self, offset: usize, value: u8) {
        let r = self.inner.get_mut();
        match offset {
            TX_STATUS_OFFSET => {
                r.tx_status.pop_front();
                r.tx_status_acks.push(value);
            }
            PHYCTL_OFFSET => r.phy.write(value),
            o => r.mem[o] = value,
        }
    }

    fn write16(&mut self, offset: usize, value: u16) {
        let r = self.inner.get_mut();
        match offset {
            MACCTL1_OFFSET => r.macctl1_command(value),
            o => r.mem_write(o, 2, u32::from(value)),
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let r = self.inner.get_mut();
        match offset {
            DMACTL_OFFSET => r.dmactl_command(value),
            ASICCTL_OFFSET => {
                if value & ASICCTL_FULL_RESET != 0 {
                    r.resets.push(value & ASICCTL_FULL_RESET);
                }
            }
            o => r.mem_write(o, 4, value),
        }
    }
}

// =============================================================================
// Mock Buffers
// =============================================================================

/// Bus address stride between mock buffers
const BUS_STRIDE: u32 = 0x1000;

/// Bus address the mock pool gives the first descriptor list it translates
pub const MOCK_DMA_BASE: u32 = 0x4000_0000;

/// Packet buffer backed by host memory, optionally scattered.
#[derive(Debug)]
pub struct MockBuffer {
    id: usize,
    data: Vec<u8>,
    len: usize,
    extra: Vec<Vec<u8>>,
}

impl MockBuffer {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Every valid byte, gathered
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = std::vec![0u8; self.total_len()];
        self.copy_to(&mut out);
        out
    }
}

impl PacketBuffer for MockBuffer {
    fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let base = self.bus_addr();
        core::iter::once(Segment::new(base, self.len)).chain(
            self.extra
                .iter()
                .enumerate()
                .map(move |(i, s)| Segment::new(base + 0x100 * (i as u32 + 1), s.len())),
        )
    }

    fn total_len(&self) -> usize {
        self.len + self.extra.iter().map(Vec::len).sum::<usize>()
    }

    fn bus_addr(&self) -> u32 {
        0x1000_0000u32.wrapping_add((self.id as u32).wrapping_mul(BUS_STRIDE))
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    fn set_len(&mut self, len: usize) {
        self.len = len.min(self.data.len());
    }

    fn copy_to(&self, dst: &mut [u8]) -> usize {
        let mut copied = 0;
        for part in core::iter::once(&self.data[..self.len]).chain(self.extra.iter().map(Vec::as_slice)) {
            let n = part.len().min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&part[..n]);
            copied += n;
        }
        copied
    }
}

/// Buffer pool that tracks every outstanding buffer.
///
/// Freeing a buffer twice, or one the pool never handed out, panics.
#[derive(Debug, Default)]
pub struct MockPool {
    next_id: usize,
    outstanding: BTreeSet<usize>,
    alloc_calls: usize,
    fail_next: usize,
    fail_at: Option<usize>,
    capacity_limit: Option<usize>,
    /// Host address mapped to the DMA base
    dma_anchor: Cell<Option<usize>>,
    dma_base: Option<u32>,
    dma_refused: bool,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers handed out and not yet returned
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Fail the next `n` allocations
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    /// Fail only the allocation `n` calls from now (0 = the next one)
    pub fn fail_nth(&mut self, n: usize) {
        self.fail_at = Some(self.alloc_calls + n);
    }

    /// Fail allocations while `limit` buffers are outstanding
    pub fn set_capacity_limit(&mut self, limit: usize) {
        self.capacity_limit = Some(limit);
    }

    /// Map the next translated host address to `base` instead of
    /// `MOCK_DMA_BASE`
    pub fn set_dma_base(&mut self, base: u32) {
        self.dma_base = Some(base);
        self.dma_anchor.set(None);
    }

    /// Report every host address as unreachable by DMA
    pub fn refuse_dma_mapping(&mut self) {
        self.dma_refused = true;
    }

    /// A single-segment frame holding `bytes`, as queued by a stack
    pub fn frame(&mut self, bytes: &[u8]) -> MockBuffer {
        let mut buffer = self.make(bytes.len());
        buffer.data.copy_from_slice(bytes);
        buffer.len = bytes.len();
        buffer
    }

    /// A frame spread over one segment per part
    pub fn scattered(&mut self, parts: &[&[u8]]) -> MockBuffer {
        let Some((first, rest)) = parts.split_first() else {
            return self.frame(&[]);
        };
        let mut buffer = self.frame(first);
        buffer.extra = rest.iter().map(|p| p.to_vec()).collect();
        buffer
    }

    fn make(&mut self, capacity: usize) -> MockBuffer {
        let id = self.next_id;
        self.next_id += 1;
        self.outstanding.insert(id);
        MockBuffer {
            id,
            data: std::vec![0; capacity],
            len: 0,
            extra: Vec::new(),
        }
    }
}

impl BufferPool for MockPool {
    type Buffer = MockBuffer;

    fn alloc(&mut self, min_size: usize) -> Option<MockBuffer> {
        let call = self.alloc_calls;
        self.alloc_calls += 1;

        if self.fail_next > 0 {
            self.fail_next -= 1;
            return None;
        }
        if self.fail_at == Some(call) {
            self.fail_at = None;
            return None;
        }
        if self.capacity_limit.is_some_and(|limit| self.outstanding.len() >= limit) {
            return None;
        }
        Some(self.make(min_size))
    }

    fn free(&mut self, buffer: MockBuffer) {
        assert!(
            self.outstanding.remove(&buffer.id),
            "buffer {} freed twice or not from this pool",
            buffer.id
        );
    }

    /// Linear window: the first host address seen lands on the DMA base and
    /// everything else keeps its distance from it.
    fn bus_addr_of(&self, host: usize) -> Option<u32> {
        if self.dma_refused {
            return None;
        }
        let anchor = self.dma_anchor.get().unwrap_or(host);
        self.dma_anchor.set(Some(anchor));
        let offset = host as i128 - anchor as i128;
        u32::try_from(i128::from(self.dma_base.unwrap_or(MOCK_DMA_BASE)) + offset).ok()
    }
}

// =============================================================================
// Mock Network Stack
// =============================================================================

/// Records delivered frames and serves a transmit queue.
#[derive(Debug, Default)]
pub struct MockStack {
    delivered: Vec<RxFrame<MockBuffer>>,
    queue: VecDeque<MockBuffer>,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: MockBuffer) {
        self.queue.push_back(frame);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    pub fn take_delivered(&mut self) -> Vec<RxFrame<MockBuffer>> {
        core::mem::take(&mut self.delivered)
    }

    /// Return every delivered and queued buffer to `pool`
    pub fn recycle(&mut self, pool: &mut MockPool) {
        for frame in self.delivered.drain(..) {
            pool.free(frame.into_buffer());
        }
        for buffer in self.queue.drain(..) {
            pool.free(buffer);
        }
    }
}

impl NetStack<MockBuffer> for MockStack {
    fn deliver(&mut self, frame: RxFrame<MockBuffer>) {
        self.delivered.push(frame);
    }

    fn dequeue(&mut self) -> Option<MockBuffer> {
        self.queue.pop_front()
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

// =============================================================================
// Mock Timer
// =============================================================================

/// Timer service that records scheduled and cancelled events.
#[derive(Debug, Default)]
pub struct MockTimer {
    next: u32,
    active: Vec<(u32, TimerEvent, u32)>,
    scheduled: Vec<(TimerEvent, u32)>,
    cancelled: usize,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `event` is scheduled and not cancelled
    pub fn pending(&self, event: TimerEvent) -> bool {
        self.active.iter().any(|&(_, e, _)| e == event)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Delay of the active `event`, if any
    pub fn delay_of(&self, event: TimerEvent) -> Option<u32> {
        self.active
            .iter()
            .find(|&&(_, e, _)| e == event)
            .map(|&(_, _, d)| d)
    }

    /// Number of times `event` has been scheduled
    pub fn schedule_count(&self, event: TimerEvent) -> usize {
        self.scheduled.iter().filter(|&&(e, _)| e == event).count()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled
    }

    /// Expire `event`; returns whether it was pending
    pub fn fire(&mut self, event: TimerEvent) -> bool {
        match self.active.iter().position(|&(_, e, _)| e == event) {
            Some(i) => {
                self.active.remove(i);
                true
            }
            None => false,
        }
    }
}

impl TimerService for MockTimer {
    type Handle = u32;

    fn schedule(&mut self, event: TimerEvent, delay_ms: u32) -> u32 {
        let handle = self.next;
        self.next += 1;
        self.active.push((handle, event, delay_ms));
        self.scheduled.push((event, delay_ms));
        handle
    }

    fn cancel(&mut self, handle: u32) {
        if let Some(i) = self.active.iter().position(|&(h, _, _)| h == handle) {
            self.active.remove(i);
            self.cancelled += 1;
        }
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Reset the delay counter
    pub fn reset(&self) {
        *self.total_ns.borrow_mut() = 0;
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Register-level MDIO bus for testing PHY drivers without bit timing
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
}

impl MockMdioBus {
    /// Create a new mock MDIO bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    /// Get all writes that have been made
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Ok(self
            .registers
            .borrow()
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log
            .borrow_mut()
            .push((phy_addr, reg_addr, value));
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
        Ok(())
    }
}

// =============================================================================
// Tests for the mocks themselves
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::intr::ISR_RX_DMADONE;

    #[test]
    fn mock_mdio_read_write() {
        let mut mdio = MockMdioBus::new();
        mdio.set_register(1, 2, 0x1234);
        assert_eq!(mdio.read(1, 2).unwrap(), 0x1234);
        assert_eq!(mdio.read(1, 3).unwrap(), 0);

        mdio.write(1, 4, 0x5678).unwrap();
        assert_eq!(mdio.get_register(1, 4), Some(0x5678));
        assert_eq!(mdio.get_writes(), [(1, 4, 0x5678)]);
    }

    #[test]
    fn mock_delay_tracking() {
        use embedded_hal::delay::DelayNs;
        let mut delay = MockDelay::new();
        delay.delay_us(3);
        delay.delay_ms(1);
        assert_eq!(delay.total_us(), 1003);
        delay.reset();
        assert_eq!(delay.total_ns(), 0);
    }

    #[test]
    fn pool_tracks_outstanding() {
        let mut pool = MockPool::new();
        let a = pool.alloc(64).unwrap();
        let b = pool.alloc(64).unwrap();
        assert_eq!(pool.outstanding(), 2);
        assert_ne!(a.bus_addr(), b.bus_addr());
        pool.free(a);
        pool.free(b);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    #[should_panic(expected = "freed twice")]
    fn pool_catches_foreign_free() {
        let mut pool = MockPool::new();
        let mut other = MockPool::new();
        let a = other.alloc(10).unwrap();
        let _b = pool.alloc(10).unwrap();
        let a = MockBuffer { id: a.id + 7, ..a };
        pool.free(a);
    }

    #[test]
    fn pool_dma_window_is_linear() {
        let mut pool = MockPool::new();
        assert_eq!(pool.bus_addr_of(0x7f00_0000_1000), Some(MOCK_DMA_BASE));
        assert_eq!(pool.bus_addr_of(0x7f00_0000_1040), Some(MOCK_DMA_BASE + 0x40));
        assert_eq!(pool.bus_addr_of(0x7f00_0000_0ff0), Some(MOCK_DMA_BASE - 0x10));

        pool.refuse_dma_mapping();
        assert_eq!(pool.bus_addr_of(0x7f00_0000_1000), None);
    }

    #[test]
    fn scattered_buffer_gathers() {
        let mut pool = MockPool::new();
        let b = pool.scattered(&[&[1, 2], &[3], &[4, 5, 6]]);
        assert_eq!(b.total_len(), 6);
        assert_eq!(b.segments().count(), 3);
        assert_eq!(b.bytes(), [1, 2, 3, 4, 5, 6]);
        let mut short = [0u8; 4];
        assert_eq!(b.copy_to(&mut short), 4);
        assert_eq!(short, [1, 2, 3, 4]);
    }

    #[test]
    fn isr_queue_semantics() {
        let regs = MockRegisters::new();
        assert_eq!(regs.read16(ISR_OFFSET), 0);
        regs.push_isr(ISR_RX_DMADONE);
        assert_eq!(regs.read16(ISR_OFFSET), ISR_RX_DMADONE | ISR_INTLATCH);
        assert_eq!(regs.read16(ISR_ACK_OFFSET), ISR_RX_DMADONE);
        assert_eq!(regs.read16(ISR_ACK_OFFSET), 0);
    }

    #[test]
    fn timer_cancel_removes_event() {
        let mut timer = MockTimer::new();
        let h = timer.schedule(TimerEvent::StatsTick, 1000);
        assert!(timer.pending(TimerEvent::StatsTick));
        timer.cancel(h);
        timer.cancel(h);
        assert!(!timer.pending(TimerEvent::StatsTick));
        assert_eq!(timer.cancel_count(), 1);
    }
}
