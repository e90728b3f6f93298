//! MAC Register Definitions
//!
//! MAC control, receive filtering, station address, the bit-banged PHY
//! management port and the statistics block.

// =============================================================================
// Register Offsets
// =============================================================================

/// MAC control 0 offset (16-bit)
pub const MACCTL0_OFFSET: usize = 0x50;
/// MAC control 1 offset (16-bit)
pub const MACCTL1_OFFSET: usize = 0x52;
/// Station address byte 0 offset (bytes 0..5 follow contiguously)
pub const PAR0_OFFSET: usize = 0x54;
/// Maximum frame length offset (16-bit)
pub const MAX_FRAMELEN_OFFSET: usize = 0x5A;
/// Receive mode offset (8-bit)
pub const RX_MODE_OFFSET: usize = 0x5C;
/// PHY management control offset (8-bit)
pub const PHYCTL_OFFSET: usize = 0x5E;
/// Multicast hash bits 0..31 offset (32-bit)
pub const MAR0_OFFSET: usize = 0x60;
/// Multicast hash bits 32..63 offset (32-bit)
pub const MAR1_OFFSET: usize = 0x64;
/// Statistics block offset (read byte at a time)
pub const STATS_OFFSET: usize = 0x68;

// =============================================================================
// MAC Control 0 (MACCTL0) Bits
// =============================================================================

/// Inter-packet gap field
pub const MACCTL0_IPG: u16 = 0x0003;
/// Full duplex operation
pub const MACCTL0_FULLDUPLEX: u16 = 0x0020;
/// Receive oversize frames
pub const MACCTL0_RCVLARGEFRAMES: u16 = 0x0040;
/// Flow control enable
pub const MACCTL0_FLOWCTL_ENABLE: u16 = 0x0100;

// =============================================================================
// MAC Control 1 (MACCTL1) Bits
// =============================================================================

/// Statistics counters enable
pub const MACCTL1_STATS_ENABLE: u16 = 0x0020;
/// Statistics counters disable
pub const MACCTL1_STATS_DISABLE: u16 = 0x0040;
/// Transmitter enable
pub const MACCTL1_TX_ENABLE: u16 = 0x0100;
/// Transmitter disable
pub const MACCTL1_TX_DISABLE: u16 = 0x0200;
/// Transmitter enabled status
pub const MACCTL1_TX_ENABLED: u16 = 0x0400;
/// Receiver enable
pub const MACCTL1_RX_ENABLE: u16 = 0x0800;
/// Receiver disable
pub const MACCTL1_RX_DISABLE: u16 = 0x1000;
/// Receiver enabled status
pub const MACCTL1_RX_ENABLED: u16 = 0x2000;

// =============================================================================
// Receive Mode (RX_MODE) Bits
// =============================================================================

/// Accept frames addressed to the station address
pub const RXMODE_UNICAST: u8 = 0x01;
/// Accept all multicast frames
pub const RXMODE_ALLMULTI: u8 = 0x02;
/// Accept broadcast frames
pub const RXMODE_BROADCAST: u8 = 0x04;
/// Accept every frame
pub const RXMODE_PROMISC: u8 = 0x08;
/// Accept multicast frames whose hash bit is set
pub const RXMODE_MULTIHASH: u8 = 0x10;
/// Accept all IP multicast frames
pub const RXMODE_ALLIPMULTI: u8 = 0x20;

// =============================================================================
// PHY Control (PHYCTL) Bits
// =============================================================================

/// Management clock line
pub const PHYCTL_MCLK: u8 = 0x01;
/// Management data line
pub const PHYCTL_MDATA: u8 = 0x02;
/// Management data direction (set = driven by the MAC)
pub const PHYCTL_MDIR: u8 = 0x04;
