//! Clause 22 PHY driver.
//!
//! Works with any transceiver that implements the IEEE 802.3 basic register
//! set, which covers the PHYs found on ST201 boards.

use super::generic::{LinkEvent, LinkStatus, PhyDriver, ieee802_3};
use crate::driver::error::Result;
use crate::hal::mdio::MdioBus;
use crate::internal::phy_regs::standard::{bmcr, phy_reg};

/// Maximum BMCR reads while waiting for a soft reset to finish
const RESET_POLL_ATTEMPTS: u32 = 1000;

/// Clause 22 PHY driver that tracks link transitions.
#[derive(Debug)]
pub struct StandardPhy {
    addr: u8,
    last_link: Option<LinkStatus>,
}

impl StandardPhy {
    /// Create a driver for the PHY at `addr`
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            last_link: None,
        }
    }

    /// Last link status seen by [`poll_link`](PhyDriver::poll_link)
    pub const fn last_link(&self) -> Option<LinkStatus> {
        self.last_link
    }
}

impl PhyDriver for StandardPhy {
    fn address(&self) -> u8 {
        self.addr
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.soft_reset(mdio)?;
        self.enable_auto_negotiation(mdio)
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.last_link = None;
        ieee802_3::soft_reset(mdio, self.addr, RESET_POLL_ATTEMPTS)
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_link_up(mdio, self.addr)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        if !self.is_link_up(mdio)? {
            return Ok(None);
        }

        let bmcr_val = mdio.read(self.addr, phy_reg::BMCR)?;
        if bmcr_val & bmcr::AN_ENABLE != 0 {
            if !ieee802_3::is_an_complete(mdio, self.addr)? {
                return Ok(None);
            }
            return ieee802_3::negotiated_link(mdio, self.addr);
        }
        ieee802_3::link_status_from_bmcr(mdio, self.addr).map(Some)
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkEvent>> {
        let current = self.link_status(mdio)?;
        let previous = core::mem::replace(&mut self.last_link, current);
        Ok(match (previous, current) {
            (prev, Some(link)) if prev != Some(link) => Some(LinkEvent::Up(link)),
            (Some(_), None) => Some(LinkEvent::Down),
            _ => None,
        })
    }

    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        ieee802_3::enable_auto_negotiation(mdio, self.addr)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32> {
        ieee802_3::read_phy_id(mdio, self.addr)
    }
}
