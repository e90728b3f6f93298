//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers used
//! throughout the packet engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions
//! - **Thresholds**: Transmit start/reclaim/burst thresholds
//! - **Recovery bounds**: Retry and loop limits that replace unbounded waits
//! - **Defaults**: Ring sizes and station address
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/dma.rs`, `register/mac.rs`, etc.) as they are specific to
//! those hardware blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Ethernet header size (6 dst + 6 src + 2 type)
pub const ETH_HEADER_SIZE: usize = 14;

/// MAC address length
pub const MAC_ADDR_LEN: usize = 6;

/// Minimum Ethernet frame length without CRC
pub const MIN_FRAME_SIZE: usize = 60;

/// Packet buffer size; also the largest frame the controller handles
pub const PACKET_SIZE: usize = 1536;

/// Capacity requested for every receive buffer
pub const RX_BUFFER_SIZE: usize = PACKET_SIZE;

// =============================================================================
// Thresholds
// =============================================================================

/// Initial transmit start threshold in bytes
pub const TX_THRESH_MIN: u16 = MIN_FRAME_SIZE as u16;

/// Upper bound for the transmit start threshold
pub const TX_THRESH_MAX: u16 = PACKET_SIZE as u16;

/// Increment applied to the start threshold after each underrun
pub const TX_THRESH_STEP: u16 = MIN_FRAME_SIZE as u16;

/// Transmit reclaim threshold, in units of 16 bytes
pub const TX_RECLAIM_THRESH: u8 = (PACKET_SIZE >> 4) as u8;

/// Transmit DMA burst threshold, in units of 256 bytes
pub const TX_DMABURST_THRESH: u8 = (PACKET_SIZE >> 8) as u8;

// =============================================================================
// Recovery Bounds
// =============================================================================

/// Maximum stall/reload/unstall cycles per receive drain
pub const RX_STALL_RETRIES: u32 = 4;

/// Maximum transmit status entries consumed per drain
pub const TX_STATUS_DRAIN_LIMIT: u32 = 32;

/// Maximum acknowledge rounds per interrupt
pub const INTR_LOOP_LIMIT: u32 = 64;

/// Multicast addresses beyond this fall back to all-multicast
pub const MULTICAST_HASH_LIMIT: usize = 64;

/// Settle time after asserting a global reset
pub const RESET_SETTLE_US: u32 = 100_000;

/// Half-period of the MII management clock
pub const MII_DELAY_US: u32 = 1;

// =============================================================================
// Defaults
// =============================================================================

/// Default receive ring size
pub const DEFAULT_RX_DESCRIPTORS: usize = 64;

/// Default transmit ring size
pub const DEFAULT_TX_DESCRIPTORS: usize = 64;

/// Default PHY address on the management bus
pub const DEFAULT_PHY_ADDR: u8 = 0;

/// Default MAC address (locally administered)
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_thresholds() {
        assert_eq!(TX_RECLAIM_THRESH, 96);
        assert_eq!(TX_DMABURST_THRESH, 6);
        assert!(TX_THRESH_MIN < TX_THRESH_MAX);
        // 24 steps reach 1500; the 25th is clamped to the cap.
        let steps = (TX_THRESH_MAX - TX_THRESH_MIN) / TX_THRESH_STEP;
        assert_eq!(TX_THRESH_MIN + steps * TX_THRESH_STEP, 1500);
        assert_eq!((1500 + TX_THRESH_STEP).min(TX_THRESH_MAX), TX_THRESH_MAX);
    }
}
