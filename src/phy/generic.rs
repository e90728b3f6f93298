//! Generic PHY Driver Trait
//!
//! This module defines the common interface for Ethernet PHY drivers,
//! based on IEEE 802.3 Clause 22 standard registers.

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::Result;
use crate::hal::mdio::MdioBus;

// =============================================================================
// Link Status
// =============================================================================

/// Ethernet link status information
///
/// Contains the negotiated or configured link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// Create a new link status
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 10 Mbps Half Duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }

    /// Whether the link runs full duplex
    pub const fn is_full_duplex(&self) -> bool {
        matches!(self.duplex, Duplex::Full)
    }
}

/// Link transition reported by [`PhyDriver::poll_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Link came up, or its speed/duplex changed while up
    Up(LinkStatus),
    /// Link was up and is now down
    Down,
}

// =============================================================================
// PHY Capabilities
// =============================================================================

/// PHY technology abilities, as advertised or reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyCapabilities {
    /// 100BASE-TX Full Duplex
    pub speed_100_fd: bool,
    /// 100BASE-TX Half Duplex
    pub speed_100_hd: bool,
    /// 10BASE-T Full Duplex
    pub speed_10_fd: bool,
    /// 10BASE-T Half Duplex
    pub speed_10_hd: bool,
    /// Auto-negotiation
    pub auto_negotiation: bool,
}

impl PhyCapabilities {
    /// Default 10/100 Mbps PHY capabilities
    pub const fn standard_10_100() -> Self {
        Self {
            speed_100_fd: true,
            speed_100_hd: true,
            speed_10_fd: true,
            speed_10_hd: true,
            auto_negotiation: true,
        }
    }

    /// Abilities present in both sets
    #[must_use]
    pub const fn common(&self, other: &Self) -> Self {
        Self {
            speed_100_fd: self.speed_100_fd && other.speed_100_fd,
            speed_100_hd: self.speed_100_hd && other.speed_100_hd,
            speed_10_fd: self.speed_10_fd && other.speed_10_fd,
            speed_10_hd: self.speed_10_hd && other.speed_10_hd,
            auto_negotiation: self.auto_negotiation && other.auto_negotiation,
        }
    }

    /// Highest-priority mode in the set (IEEE 802.3 Annex 28B.3 order)
    pub const fn best(&self) -> Option<LinkStatus> {
        if self.speed_100_fd {
            Some(LinkStatus::new(Speed::Mbps100, Duplex::Full))
        } else if self.speed_100_hd {
            Some(LinkStatus::new(Speed::Mbps100, Duplex::Half))
        } else if self.speed_10_fd {
            Some(LinkStatus::new(Speed::Mbps10, Duplex::Full))
        } else if self.speed_10_hd {
            Some(LinkStatus::new(Speed::Mbps10, Duplex::Half))
        } else {
            None
        }
    }
}

// =============================================================================
// PHY Driver Trait
// =============================================================================

/// Trait for Ethernet PHY drivers
///
/// The packet engine only needs link state: it polls the PHY once per
/// statistics tick and mirrors the negotiated duplex into the MAC.
pub trait PhyDriver {
    /// Get the PHY address (0-31)
    fn address(&self) -> u8;

    /// Initialize the PHY
    ///
    /// Typically a soft reset followed by restarting auto-negotiation.
    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Perform a soft reset
    ///
    /// Writes to BMCR.RESET and waits for it to self-clear.
    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Check if the link is up
    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool>;

    /// Get current link status with speed/duplex
    ///
    /// Returns `None` if link is down, `Some(LinkStatus)` if link is up.
    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>>;

    /// Poll for link changes
    ///
    /// Returns the transition since the previous poll, or `None` when
    /// nothing changed (including a link that stays down).
    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkEvent>>;

    /// Enable and restart auto-negotiation
    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Read the PHY identifier: `(PHYIDR1 << 16) | PHYIDR2`
    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32>;
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Helper functions using standard IEEE 802.3 registers
pub mod ieee802_3 {
    use super::*;
    use crate::internal::phy_regs::standard::{anar, bmcr, bmsr, phy_reg};

    /// Read BMSR and check link status bit
    pub fn is_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        let bmsr_val = mdio.read(phy_addr, phy_reg::BMSR)?;
        Ok((bmsr_val & bmsr::LINK_STATUS) != 0)
    }

    /// Read BMSR and check AN complete bit
    pub fn is_an_complete<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        let bmsr_val = mdio.read(phy_addr, phy_reg::BMSR)?;
        Ok((bmsr_val & bmsr::AN_COMPLETE) != 0)
    }

    /// Set BMCR.RESET and poll until it self-clears, at most `max_attempts`
    /// reads. A PHY that is slow to clear the bit is not treated as an error.
    pub fn soft_reset<M: MdioBus>(mdio: &mut M, phy_addr: u8, max_attempts: u32) -> Result<()> {
        mdio.write(phy_addr, phy_reg::BMCR, bmcr::RESET)?;

        for _ in 0..max_attempts {
            let bmcr_val = mdio.read(phy_addr, phy_reg::BMCR)?;
            if (bmcr_val & bmcr::RESET) == 0 {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Advertise every 10/100 mode, then enable and restart auto-negotiation
    pub fn enable_auto_negotiation<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
        mdio.write(
            phy_addr,
            phy_reg::ANAR,
            anar::TX_FD | anar::TX_HD | anar::T10_FD | anar::T10_HD | anar::SELECTOR_802_3,
        )?;
        let bmcr_val = mdio.read(phy_addr, phy_reg::BMCR)?;
        mdio.write(
            phy_addr,
            phy_reg::BMCR,
            (bmcr_val | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE,
        )
    }

    /// Read PHY ID from PHYIDR1 and PHYIDR2
    pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<u32> {
        let id1 = mdio.read(phy_addr, phy_reg::PHYIDR1)? as u32;
        let id2 = mdio.read(phy_addr, phy_reg::PHYIDR2)? as u32;
        Ok((id1 << 16) | id2)
    }

    /// Decode an ANAR/ANLPAR ability word
    pub const fn abilities_from_word(word: u16) -> PhyCapabilities {
        PhyCapabilities {
            speed_100_fd: (word & anar::TX_FD) != 0,
            speed_100_hd: (word & anar::TX_HD) != 0,
            speed_10_fd: (word & anar::T10_FD) != 0,
            speed_10_hd: (word & anar::T10_HD) != 0,
            auto_negotiation: true,
        }
    }

    /// Resolve the negotiated mode from ANAR and ANLPAR
    pub fn negotiated_link<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<Option<LinkStatus>> {
        let local = abilities_from_word(mdio.read(phy_addr, phy_reg::ANAR)?);
        let partner = abilities_from_word(mdio.read(phy_addr, phy_reg::ANLPAR)?);
        Ok(local.common(&partner).best())
    }

    /// Get link status from BMCR (when AN is disabled)
    pub fn link_status_from_bmcr<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<LinkStatus> {
        let bmcr_val = mdio.read(phy_addr, phy_reg::BMCR)?;

        let speed = if (bmcr_val & bmcr::SPEED_100) != 0 {
            Speed::Mbps100
        } else {
            Speed::Mbps10
        };

        let duplex = if (bmcr_val & bmcr::DUPLEX_FULL) != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        };

        Ok(LinkStatus::new(speed, duplex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_mode_priority() {
        let all = PhyCapabilities::standard_10_100();
        assert_eq!(all.best(), Some(LinkStatus::fast_full()));

        let half_only = PhyCapabilities {
            speed_10_hd: true,
            ..PhyCapabilities::default()
        };
        assert_eq!(half_only.best(), Some(LinkStatus::slow_half()));
        assert_eq!(PhyCapabilities::default().best(), None);
    }

    #[test]
    fn common_abilities() {
        let local = PhyCapabilities::standard_10_100();
        let partner = PhyCapabilities {
            speed_100_hd: true,
            speed_10_fd: true,
            ..PhyCapabilities::default()
        };
        let common = local.common(&partner);
        assert_eq!(common.best(), Some(LinkStatus::new(Speed::Mbps100, Duplex::Half)));
    }
}
