//! Core driver components for the ST201 packet engine.
//!
//! This module contains the essential building blocks for configuring and
//! operating the controller:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`device`] - The main [`Ste`] packet engine
//! - [`interrupt`] - Interrupt status decoding
//! - [`filtering`] - Station address, receive mode and multicast hash
//! - [`stats`] - Driver counters and the hardware statistics block
//! - [`watchdog`] - Statistics tick and transmit timeout recovery
//!
//! # Example
//!
//! ```ignore
//! use ste_nic::driver::{Ste, SteConfig};
//!
//! let config = SteConfig::new()
//!     .with_mac_address([0x00, 0x80, 0xC8, 0x12, 0x34, 0x56]);
//! ```

// Submodules
pub mod config;
pub mod device;
pub mod error;
pub mod filtering;
pub mod interrupt;
pub mod stats;
pub mod watchdog;

// Re-exports for convenience
pub use config::{Duplex, Speed, State, SteConfig};
pub use device::Ste;
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use filtering::{FilterState, crc_hash};
pub use interrupt::InterruptStatus;
pub use stats::{Counters, StatsBlock};
