//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Control/status register offsets and bit definitions
//! - [`constants`]: Internal constants and magic numbers
//! - [`phy_regs`]: IEEE 802.3 PHY register definitions
//! - [`dma`]: Descriptors, descriptor ring and the receive/transmit engines

pub(crate) mod constants;
pub(crate) mod dma;
pub(crate) mod phy_regs;
pub(crate) mod register;
