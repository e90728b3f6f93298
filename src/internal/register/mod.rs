//! Register map for the ST201 control/status window.
//!
//! The controller exposes a single window of byte, word and dword registers.
//! Offsets are relative to the start of that window; access goes through
//! [`RegisterWindow`](crate::hal::RegisterWindow) so the driver never
//! performs raw address arithmetic.
//!
//! - [`dma`]: DMA control, descriptor list pointers, ASIC reset control
//! - [`mac`]: MAC control, receive filter, station address, PHY control,
//!   statistics block
//! - [`intr`]: interrupt status, acknowledge and mask registers

pub mod dma;
pub mod intr;
pub mod mac;

/// Bounded poll count for DMA halt and reset completion.
pub const STE_TIMEOUT: u32 = 1000;
