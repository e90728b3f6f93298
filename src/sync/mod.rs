//! Synchronization and Concurrency Support
//!
//! The packet engine is not re-entrant: the interrupt handler, the timer
//! callback and the transmit path must never overlap. This module provides
//! the critical-section based exclusion domain for that:
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`] - ISR-safe
//!   interior mutability
//! - **Shared Wrapper** (`shared`): [`SharedSte`] - ISR-safe device wrapper
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use ste_nic::sync::SharedSte;
//!
//! static NIC: SharedSte<MmioWindow, Pool, Timer, Delay> = SharedSte::new();
//!
//! fn main() {
//!     NIC.install(Ste::new(window, pool, timer, delay, StandardPhy::new(1), SteConfig::new()));
//!     NIC.with(|nic| nic.start());
//! }
//!
//! #[interrupt]
//! fn PCI_INTA() {
//!     NIC.with(|nic| nic.handle_interrupt(&mut stack));
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedSte;
