//! Configuration types for the ST201 packet engine.

use crate::internal::constants::{DEFAULT_MAC_ADDR, DEFAULT_PHY_ADDR};
use crate::hal::mdio::MAX_PHY_ADDR;

use super::error::{ConfigError, ConfigResult};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    #[default]
    Half,
    /// Full duplex
    Full,
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Rings empty, DMA stalled, interrupts masked
    #[default]
    Stopped,
    /// Rings posted, MAC enabled, interrupts unmasked
    Running,
}

/// Packet engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SteConfig {
    /// Station address programmed into PAR0..5
    pub mac_address: [u8; 6],
    /// Address of the transceiver on the management bus
    pub phy_address: u8,
    /// Receive every frame
    pub promiscuous: bool,
    /// Receive broadcast frames
    pub broadcast: bool,
    /// Receive every multicast frame regardless of the hash filter
    pub all_multicast: bool,
}

impl Default for SteConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SteConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            phy_address: DEFAULT_PHY_ADDR,
            promiscuous: false,
            broadcast: true,
            all_multicast: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the station address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY address
    #[must_use]
    pub const fn with_phy_address(mut self, addr: u8) -> Self {
        self.phy_address = addr;
        self
    }

    /// Enable or disable promiscuous reception
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Enable or disable broadcast reception
    #[must_use]
    pub const fn with_broadcast(mut self, enabled: bool) -> Self {
        self.broadcast = enabled;
        self
    }

    /// Enable or disable all-multicast reception
    #[must_use]
    pub const fn with_all_multicast(mut self, enabled: bool) -> Self {
        self.all_multicast = enabled;
        self
    }

    /// Check the configuration for values the hardware cannot accept.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.phy_address > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress);
        }
        if self.mac_address[0] & 0x01 != 0 || self.mac_address == [0; 6] {
            return Err(ConfigError::InvalidMacAddress);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
