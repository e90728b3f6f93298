//! Interrupt Register Definitions

/// Interrupt status acknowledge offset (16-bit, read clears latched bits)
pub const ISR_ACK_OFFSET: usize = 0x4A;
/// Interrupt mask offset (16-bit)
pub const IMR_OFFSET: usize = 0x4C;
/// Interrupt status offset (16-bit, read has no side effect)
pub const ISR_OFFSET: usize = 0x4E;

/// An interrupt is latched for this device
pub const ISR_INTLATCH: u16 = 0x0001;
/// Host bus error
pub const ISR_HOSTERR: u16 = 0x0002;
/// Transmit status FIFO has an entry
pub const ISR_TX_DONE: u16 = 0x0004;
/// Statistics counter overflow
pub const ISR_STATS_OFLOW: u16 = 0x0080;
/// Link state change
pub const ISR_LINKEVENT: u16 = 0x0100;
/// Download (transmit) DMA completed a descriptor with DMAINTR
pub const ISR_TX_DMADONE: u16 = 0x0200;
/// Upload (receive) DMA completed a descriptor
pub const ISR_RX_DMADONE: u16 = 0x0400;

/// Interrupt sources handled by the dispatcher
pub const STE_INTRS: u16 =
    ISR_RX_DMADONE | ISR_TX_DMADONE | ISR_TX_DONE | ISR_HOSTERR | ISR_STATS_OFLOW;
