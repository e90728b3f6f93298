//! PHY Register Definitions
//!
//! Registers of the transceiver reached over the MII management bus, as
//! opposed to the controller registers in [`register`](super::register).

pub mod standard;
