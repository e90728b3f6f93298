//! Ethernet PHY Drivers
//!
//! The PHY layer is independent of the MAC and talks to the transceiver only
//! through [`MdioBus`](crate::hal::MdioBus). The packet engine hands it a
//! [`BitBangMdio`](crate::hal::BitBangMdio) built over its own PHY control
//! register.
//!
//! # Example
//!
//! ```ignore
//! use ste_nic::phy::{PhyDriver, StandardPhy};
//! use ste_nic::Ste;
//!
//! let phy = StandardPhy::new(config.phy_address);
//! let mut nic = Ste::new(window, pool, timer, delay, phy, config);
//! nic.with_phy(|phy, mdio| phy.init(mdio))?;
//! ```

pub mod generic;
pub mod standard;

pub use generic::{LinkEvent, LinkStatus, PhyCapabilities, PhyDriver};
pub use standard::StandardPhy;
