//! Hardware Abstraction Layer
//!
//! The packet engine never touches the host platform directly. Everything it
//! needs from the outside world is expressed as a trait in this module and
//! handed to the device at construction or per call.
//!
//! # Modules
//!
//! - [`window`]: Control/status register access ([`RegisterWindow`])
//! - [`mdio`]: MII management bus ([`MdioBus`], bit-banged [`BitBangMdio`])
//! - [`buffer`]: DMA-capable packet buffers ([`BufferPool`], [`PacketBuffer`])
//! - [`timer`]: One-shot timer service ([`TimerService`])
//! - [`stack`]: Upper network layer ([`NetStack`])
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.

pub mod buffer;
pub mod mdio;
pub mod stack;
pub mod timer;
pub mod window;

pub use buffer::{BufferPool, PacketBuffer, Segment};
pub use mdio::{BitBangMdio, MdioBus};
pub use stack::{NetStack, RxFrame};
pub use timer::{TimerEvent, TimerService};
pub use window::{MmioWindow, RegisterWindow};
