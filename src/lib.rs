//! Sundance ST201 Packet Engine
//!
//! A `no_std`, `no_alloc` Rust implementation of the packet engine for the
//! Sundance ST201 10/100 Ethernet controller (D-Link DFE-550TX/FX).
//!
//! The controller moves frames through two chained descriptor lists in host
//! memory. This crate owns those lists, the interrupt loop that services
//! them, the transmit watchdog, periodic statistics collection, receive
//! filtering and the bit-banged MII management interface.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): the [`Ste`] packet engine, configuration,
//!    filtering, interrupt dispatch and watchdog recovery
//! 2. **PHY Layer** ([`phy`]): Ethernet PHY drivers over MII management
//! 3. **HAL Layer** ([`hal`]): the seams to the platform - register window,
//!    buffer pool, network stack, timers and the MDIO bus
//!
//! Everything the engine needs from the host is expressed as a trait so the
//! engine can be driven from a bare-metal PCI window, a hosted user-space
//! driver or the mock hardware used by the unit tests.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error types
//! - `critical-section`: Enable ISR-safe [`SharedSte`](sync::SharedSte) wrapper
//!
//! # Example
//!
//! ```ignore
//! use ste_nic::{Ste, SteConfig, StandardPhy, TimerEvent};
//! use ste_nic::hal::MmioWindow;
//!
//! // SAFETY: BAR0 of the ST201 mapped uncached for the life of the program
//! let window = unsafe { MmioWindow::new(bar0) };
//!
//! let config = SteConfig::new()
//!     .with_mac_address(eeprom_station_address)
//!     .with_phy_address(1);
//!
//! let phy = StandardPhy::new(config.phy_address);
//! let mut nic: Ste<_, _, _, _> = Ste::new(window, pool, timer, delay, phy, config);
//! nic.start()?;
//!
//! // From the interrupt handler
//! nic.handle_interrupt(&mut stack);
//!
//! // From the timer callback
//! nic.handle_timer(TimerEvent::StatsTick, &mut stack);
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (64 receive and 64 transmit descriptors),
//! the descriptor lists take about 2 KB inside the [`Ste`] value. Packet
//! buffers live in the caller's [`BufferPool`](hal::BufferPool). The device
//! must be at its final address before [`Ste::start`] because the hardware
//! holds the bus addresses of its descriptors.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here and mirror the tables in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Duplex, Speed, State, SteConfig};
pub use driver::device::Ste;
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::filtering::FilterState;
pub use driver::interrupt::InterruptStatus;
pub use driver::stats::{Counters, StatsBlock};

// Re-export the platform seams
pub use hal::{
    BitBangMdio, BufferPool, MdioBus, MmioWindow, NetStack, PacketBuffer, RegisterWindow, RxFrame,
    Segment, TimerEvent, TimerService,
};

// Re-export PHY types
pub use phy::{LinkEvent, LinkStatus, PhyCapabilities, PhyDriver, StandardPhy};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedSte};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::hal::timer::{STATS_TICK_MS, TX_TIMEOUT_MS};
    pub use crate::internal::constants::{
        // Descriptor counts
        DEFAULT_RX_DESCRIPTORS,
        DEFAULT_TX_DESCRIPTORS,
        // Station
        DEFAULT_MAC_ADDR,
        DEFAULT_PHY_ADDR,
        // Frame/buffer sizes
        ETH_HEADER_SIZE,
        MAC_ADDR_LEN,
        MIN_FRAME_SIZE,
        // Filtering
        MULTICAST_HASH_LIMIT,
        PACKET_SIZE,
        RX_BUFFER_SIZE,
        // Transmit start threshold
        TX_THRESH_MAX,
        TX_THRESH_MIN,
        TX_THRESH_STEP,
    };
}
