//! Driver counters and the hardware statistics block.

use crate::hal::window::RegisterWindow;
use crate::internal::register::mac::STATS_OFFSET;

/// Size of the hardware statistics block in bytes
pub const STATS_BLOCK_SIZE: usize = 24;

/// Cumulative software counters.
///
/// Every recovered fault increments exactly one specific counter in addition
/// to the interface-level error totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    /// Frames delivered to the stack
    pub rx_packets: u64,
    /// Frames reclaimed after transmission
    pub tx_packets: u64,
    /// Receive errors (frame errors, bad status, runts, allocation failures)
    pub rx_errors: u64,
    /// Transmit errors (status faults, dropped frames, watchdog expiries)
    pub tx_errors: u64,
    /// Single, multiple and late collisions reported by the MAC
    pub collisions: u64,
    /// Receive frames the MAC had to discard for lack of descriptors
    pub rx_missed: u64,

    /// Replacement receive buffer allocation failures
    pub rx_alloc_failures: u64,
    /// Frames shorter than an Ethernet header
    pub rx_runts: u64,
    /// Completed receive descriptors without the DMA-done bit
    pub rx_bad_status: u64,
    /// Receive ring stall/reload/unstall cycles
    pub rx_stall_recoveries: u64,
    /// Receive drains that gave up on stall recovery
    pub rx_stall_exhausted: u64,

    /// Transmit frames copied into a single buffer
    pub tx_coalesced: u64,
    /// Transmit frames dropped (coalesce allocation failure, bad length)
    pub tx_dropped: u64,
    /// Transmit FIFO underruns
    pub tx_underruns: u64,
    /// Frames aborted after excessive collisions
    pub tx_excess_collisions: u64,
    /// Descriptor reclaim errors
    pub tx_reclaim_errors: u64,
    /// Transmit watchdog expiries
    pub tx_timeouts: u64,
    /// Transmit status drains cut short by the drain limit
    pub tx_status_overruns: u64,

    /// Host bus errors
    pub host_errors: u64,
    /// Statistics overflow interrupts
    pub stats_overflows: u64,
    /// Interrupt loops cut short by the round limit
    pub intr_loop_exhausted: u64,
    /// Bounded DMA halt waits that timed out
    pub dma_wait_timeouts: u64,
    /// Bounded reset waits that timed out
    pub reset_timeouts: u64,
}

impl Counters {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            rx_packets: 0,
            tx_packets: 0,
            rx_errors: 0,
            tx_errors: 0,
            collisions: 0,
            rx_missed: 0,
            rx_alloc_failures: 0,
            rx_runts: 0,
            rx_bad_status: 0,
            rx_stall_recoveries: 0,
            rx_stall_exhausted: 0,
            tx_coalesced: 0,
            tx_dropped: 0,
            tx_underruns: 0,
            tx_excess_collisions: 0,
            tx_reclaim_errors: 0,
            tx_timeouts: 0,
            tx_status_overruns: 0,
            host_errors: 0,
            stats_overflows: 0,
            intr_loop_exhausted: 0,
            dma_wait_timeouts: 0,
            reset_timeouts: 0,
        }
    }
}

/// Snapshot of the MAC statistics block.
///
/// The counters clear on read, so each snapshot holds the events since the
/// previous pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsBlock {
    /// Octets received OK
    pub rx_bytes: u32,
    /// Octets transmitted OK
    pub tx_bytes: u32,
    /// Frames transmitted OK
    pub tx_frames: u16,
    /// Frames received OK
    pub rx_frames: u16,
    /// Carrier sense errors
    pub carrier_sense_errors: u8,
    /// Late collisions
    pub late_collisions: u8,
    /// Frames sent after multiple collisions
    pub multi_collisions: u8,
    /// Frames sent after a single collision
    pub single_collisions: u8,
    /// Frames deferred
    pub tx_frames_deferred: u8,
    /// Frames lost for lack of receive descriptors
    pub rx_lost_frames: u8,
    /// Frames with excessive deferral
    pub tx_excess_defers: u8,
    /// Frames aborted after excessive collisions
    pub tx_abort_excess_collisions: u8,
    /// Broadcast frames transmitted
    pub tx_broadcast: u8,
    /// Broadcast frames received
    pub rx_broadcast: u8,
    /// Multicast frames transmitted
    pub tx_multicast: u8,
    /// Multicast frames received
    pub rx_multicast: u8,
}

impl StatsBlock {
    /// Decode the little-endian statistics block
    pub fn from_bytes(b: &[u8; STATS_BLOCK_SIZE]) -> Self {
        Self {
            rx_bytes: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            tx_bytes: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            tx_frames: u16::from_le_bytes([b[8], b[9]]),
            rx_frames: u16::from_le_bytes([b[10], b[11]]),
            carrier_sense_errors: b[12],
            late_collisions: b[13],
            multi_collisions: b[14],
            single_collisions: b[15],
            tx_frames_deferred: b[16],
            rx_lost_frames: b[17],
            tx_excess_defers: b[18],
            tx_abort_excess_collisions: b[19],
            tx_broadcast: b[20],
            rx_broadcast: b[21],
            tx_multicast: b[22],
            rx_multicast: b[23],
        }
    }

    /// Read the block one byte at a time
    pub fn read<R: RegisterWindow>(regs: &R) -> Self {
        let mut raw = [0u8; STATS_BLOCK_SIZE];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = regs.read8(STATS_OFFSET + i);
        }
        Self::from_bytes(&raw)
    }

    /// Collisions of every kind in this snapshot
    pub const fn collisions(&self) -> u32 {
        self.single_collisions as u32 + self.multi_collisions as u32 + self.late_collisions as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn decode_layout() {
        let mut raw = [0u8; STATS_BLOCK_SIZE];
        raw[0..4].copy_from_slice(&1000u32.to_le_bytes());
        raw[4..8].copy_from_slice(&2000u32.to_le_bytes());
        raw[8..10].copy_from_slice(&7u16.to_le_bytes());
        raw[10..12].copy_from_slice(&9u16.to_le_bytes());
        raw[13] = 1;
        raw[14] = 2;
        raw[15] = 3;
        raw[17] = 4;

        let s = StatsBlock::from_bytes(&raw);
        assert_eq!(s.rx_bytes, 1000);
        assert_eq!(s.tx_bytes, 2000);
        assert_eq!(s.tx_frames, 7);
        assert_eq!(s.rx_frames, 9);
        assert_eq!(s.collisions(), 6);
        assert_eq!(s.rx_lost_frames, 4);
    }

    #[test]
    fn read_from_registers_clears_block() {
        let regs = MockRegisters::new();
        let mut raw = [0u8; STATS_BLOCK_SIZE];
        raw[15] = 5;
        regs.load_stats(&raw);

        assert_eq!(StatsBlock::read(&regs).single_collisions, 5);
        assert_eq!(StatsBlock::read(&regs), StatsBlock::default());
    }

    #[test]
    fn collisions_do_not_overflow_u8() {
        let s = StatsBlock {
            late_collisions: 255,
            multi_collisions: 255,
            single_collisions: 255,
            ..StatsBlock::default()
        };
        assert_eq!(s.collisions(), 765);
    }
}
