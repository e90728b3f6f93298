//! DMA descriptor bit field constants.
//!
//! Both descriptor kinds are little-endian arrays of 32-bit words. The first
//! word is always the bus address of the next descriptor in the list, zero
//! marking the end of the chain.

#![allow(dead_code)]

/// Maximum number of fragments a transmit descriptor can carry
pub const STE_MAXFRAGS: usize = 8;

// =============================================================================
// Fragment entry (shared by RX and TX)
// =============================================================================

/// Fragment length word bit field constants
pub mod frag {
    /// Fragment length mask (13 bits)
    pub const LEN_MASK: u32 = 0x1FFF;
    /// This is the last fragment of the frame
    pub const LAST: u32 = 1 << 31;
}

// =============================================================================
// RX status word
// =============================================================================

/// Receive descriptor status word bit field constants
pub mod rxstat {
    /// Received frame length mask (13 bits)
    pub const FRAMELEN_MASK: u32 = 0x1FFF;
    /// Frame was received with an error
    pub const FRAME_ERR: u32 = 1 << 14;
    /// Upload DMA has completed this descriptor
    pub const DMADONE: u32 = 1 << 15;
    /// First fragment of the frame
    pub const FIRST_FRAG: u32 = 1 << 29;
    /// Last fragment of the frame
    pub const LAST_FRAG: u32 = 1 << 30;
    /// Descriptor was picked up by the DMA engine
    pub const DMA_INTR: u32 = 1 << 31;
}

// =============================================================================
// TX control word
// =============================================================================

/// Transmit descriptor control word bit field constants
pub mod txctl {
    /// Word alignment field
    pub const ALIGN_MASK: u32 = 0x0003;
    /// Frame identifier mask
    pub const FRAMEID_MASK: u32 = 0x03FC;
    /// Disable CRC generation
    pub const CRC_DISABLE: u32 = 1 << 13;
    /// Request a TX-done status entry for this frame
    pub const TXINTR: u32 = 1 << 15;
    /// Download DMA has completed this descriptor
    pub const DMADONE: u32 = 1 << 16;
    /// Raise TX_DMADONE when this descriptor completes
    pub const DMAINTR: u32 = 1 << 31;
}
