//! DMA Controller Register Definitions
//!
//! The upload (receive) and download (transmit) engines walk explicitly
//! linked descriptor lists. Each engine has a stall/unstall command pair and
//! a stopped status bit in the shared DMA control register.

// =============================================================================
// Register Offsets
// =============================================================================

/// DMA control register offset (32-bit)
pub const DMACTL_OFFSET: usize = 0x00;
/// Transmit descriptor list pointer offset (32-bit)
pub const TX_DMALIST_PTR_OFFSET: usize = 0x04;
/// Transmit DMA burst threshold offset (8-bit)
pub const TX_DMABURST_THRESH_OFFSET: usize = 0x08;
/// Transmit DMA urgent threshold offset (8-bit)
pub const TX_DMAURG_THRESH_OFFSET: usize = 0x09;
/// Transmit DMA poll period offset (8-bit)
pub const TX_DMAPOLL_PERIOD_OFFSET: usize = 0x0A;
/// Receive DMA status offset (32-bit)
pub const RX_DMASTATUS_OFFSET: usize = 0x0C;
/// Receive descriptor list pointer offset (32-bit)
pub const RX_DMALIST_PTR_OFFSET: usize = 0x10;
/// ASIC control register offset (32-bit)
pub const ASICCTL_OFFSET: usize = 0x30;
/// Transmit start threshold offset (16-bit)
pub const TX_STARTTHRESH_OFFSET: usize = 0x3C;
/// Transmit status FIFO offset (8-bit)
pub const TX_STATUS_OFFSET: usize = 0x46;
/// Transmit reclaim threshold offset (8-bit)
pub const TX_RECLAIM_THRESH_OFFSET: usize = 0x5D;

// =============================================================================
// DMA Control Register (DMACTL) Bits
// =============================================================================

/// Receive DMA engine has stopped (end of list or stall)
pub const DMACTL_RXDMA_STOPPED: u32 = 1 << 0;
/// Transmit DMA completion request pending
pub const DMACTL_TXDMA_CMPREQ: u32 = 1 << 1;
/// Transmit DMA engine has stopped
pub const DMACTL_TXDMA_STOPPED: u32 = 1 << 2;
/// Receive DMA stall command
pub const DMACTL_RXDMA_STALL: u32 = 1 << 8;
/// Receive DMA unstall command
pub const DMACTL_RXDMA_UNSTALL: u32 = 1 << 9;
/// Transmit DMA stall command
pub const DMACTL_TXDMA_STALL: u32 = 1 << 16;
/// Transmit DMA unstall command
pub const DMACTL_TXDMA_UNSTALL: u32 = 1 << 17;
/// Transmit DMA in progress
pub const DMACTL_TXDMA_INPROG: u32 = 1 << 18;
/// A DMA halt (stall) is still in progress
pub const DMACTL_DMA_HALTINPROG: u32 = 1 << 22;
/// Discard receive frames on FIFO overflow
pub const DMACTL_RX_DISCARD_OFLOWS: u32 = 1 << 28;
/// Target abort seen on the host bus
pub const DMACTL_TARGET_ABORT: u32 = 1 << 30;
/// Master abort seen on the host bus
pub const DMACTL_MASTER_ABORT: u32 = 1 << 31;

// =============================================================================
// ASIC Control Register (ASICCTL) Bits
// =============================================================================

/// Global reset
pub const ASICCTL_GLOBAL_RESET: u32 = 1 << 16;
/// Receive logic reset
pub const ASICCTL_RX_RESET: u32 = 1 << 17;
/// Transmit logic reset
pub const ASICCTL_TX_RESET: u32 = 1 << 18;
/// DMA engine reset
pub const ASICCTL_DMA_RESET: u32 = 1 << 19;
/// FIFO reset
pub const ASICCTL_FIFO_RESET: u32 = 1 << 20;
/// Network (MAC) reset
pub const ASICCTL_NETWORK_RESET: u32 = 1 << 21;
/// Host interface reset
pub const ASICCTL_HOST_RESET: u32 = 1 << 22;
/// Autoinit (EEPROM reload) reset
pub const ASICCTL_AUTOINIT_RESET: u32 = 1 << 23;
/// External reset
pub const ASICCTL_EXTRESET_RESET: u32 = 1 << 24;
/// Software interrupt request
pub const ASICCTL_SOFTINTR: u32 = 1 << 25;
/// A reset sequence is still running
pub const ASICCTL_RESET_BUSY: u32 = 1 << 26;

/// Every reset source, used for a full device reset
pub const ASICCTL_FULL_RESET: u32 = ASICCTL_GLOBAL_RESET
    | ASICCTL_RX_RESET
    | ASICCTL_TX_RESET
    | ASICCTL_DMA_RESET
    | ASICCTL_FIFO_RESET
    | ASICCTL_NETWORK_RESET
    | ASICCTL_AUTOINIT_RESET
    | ASICCTL_HOST_RESET
    | ASICCTL_EXTRESET_RESET;

// =============================================================================
// Transmit Status (TX_STATUS) Bits
// =============================================================================

/// Descriptor reclaim error
pub const TXSTATUS_RECLAIMERR: u8 = 0x02;
/// Statistics counter overflow
pub const TXSTATUS_STATSOFLOW: u8 = 0x04;
/// Excessive collisions, frame aborted
pub const TXSTATUS_EXCESSCOLLS: u8 = 0x08;
/// Transmit FIFO underrun
pub const TXSTATUS_UNDERRUN: u8 = 0x10;
/// Interrupt was requested for this frame
pub const TXSTATUS_TXINTR_REQ: u8 = 0x40;
/// Status entry is valid
pub const TXSTATUS_TXDONE: u8 = 0x80;

/// Status bits that require a transmit reset
pub const TXSTATUS_FAULTS: u8 = TXSTATUS_UNDERRUN | TXSTATUS_EXCESSCOLLS | TXSTATUS_RECLAIMERR;
