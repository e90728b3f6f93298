//! IEEE 802.3 Clause 22 PHY registers used by the generic PHY driver.

#![allow(dead_code)]

/// Standard PHY register addresses
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability
    pub const ANLPAR: u8 = 5;
}

/// BMCR bits
pub mod bmcr {
    /// Software reset, self-clearing
    pub const RESET: u16 = 1 << 15;
    /// Loopback
    pub const LOOPBACK: u16 = 1 << 14;
    /// Speed select (1 = 100 Mb/s)
    pub const SPEED_100: u16 = 1 << 13;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Power down
    pub const POWER_DOWN: u16 = 1 << 11;
    /// Electrically isolate from MII
    pub const ISOLATE: u16 = 1 << 10;
    /// Restart auto-negotiation, self-clearing
    pub const AN_RESTART: u16 = 1 << 9;
    /// Duplex select (1 = full)
    pub const DUPLEX_FULL: u16 = 1 << 8;
}

/// BMSR bits
pub mod bmsr {
    /// 100BASE-TX full duplex capable
    pub const TX_FD_CAPABLE: u16 = 1 << 14;
    /// 100BASE-TX half duplex capable
    pub const TX_HD_CAPABLE: u16 = 1 << 13;
    /// 10BASE-T full duplex capable
    pub const T10_FD_CAPABLE: u16 = 1 << 12;
    /// 10BASE-T half duplex capable
    pub const T10_HD_CAPABLE: u16 = 1 << 11;
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Auto-negotiation ability
    pub const AN_ABILITY: u16 = 1 << 3;
    /// Link is up (latched low)
    pub const LINK_STATUS: u16 = 1 << 2;
}

/// ANAR / ANLPAR technology ability bits
pub mod anar {
    /// Pause capable
    pub const PAUSE: u16 = 1 << 10;
    /// 100BASE-TX full duplex
    pub const TX_FD: u16 = 1 << 8;
    /// 100BASE-TX half duplex
    pub const TX_HD: u16 = 1 << 7;
    /// 10BASE-T full duplex
    pub const T10_FD: u16 = 1 << 6;
    /// 10BASE-T half duplex
    pub const T10_HD: u16 = 1 << 5;
    /// IEEE 802.3 selector field
    pub const SELECTOR_802_3: u16 = 0x0001;
}
