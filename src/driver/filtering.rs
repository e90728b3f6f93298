//! Receive filtering: station address, receive mode and the multicast hash.
//!
//! The MAC hashes each multicast destination into one of 64 bits split across
//! `MAR0` (bits 0..31) and `MAR1` (bits 32..63). Frames whose bit is clear
//! are dropped in hardware while `RXMODE_MULTIHASH` is set.
//!
//! Hash collisions are possible; the stack is expected to filter the
//! remainder in software.
//!
//! The chosen [`FilterState`] is kept by the device and written back on every
//! initialisation, so a reset never loses multicast membership.

use embedded_hal::delay::DelayNs;

use super::config::{State, SteConfig};
use super::device::Ste;
use crate::hal::buffer::BufferPool;
use crate::hal::timer::TimerService;
use crate::hal::window::RegisterWindow;
use crate::internal::constants::{MAC_ADDR_LEN, MULTICAST_HASH_LIMIT};
use crate::internal::register::mac::{
    MAR0_OFFSET, MAR1_OFFSET, PAR0_OFFSET, RX_MODE_OFFSET, RXMODE_ALLMULTI, RXMODE_BROADCAST,
    RXMODE_MULTIHASH, RXMODE_PROMISC, RXMODE_UNICAST,
};
use crate::phy::PhyDriver;

/// Polynomial used by the hash engine (bit 0 is supplied by the carry)
const CRC_POLY: u32 = 0x04C1_1DB6;

/// Hash index (0..63) of a multicast address.
///
/// Big-endian CRC-32 over the address with each byte fed LSB first; the
/// index is the low six bits of the remainder.
pub fn crc_hash(addr: &[u8; MAC_ADDR_LEN]) -> u8 {
    let mut crc: u32 = 0xFFFF_FFFF;

    for &byte in addr {
        let mut data = byte;
        for _ in 0..8 {
            let carry = (crc >> 31) ^ u32::from(data & 0x01);
            crc <<= 1;
            data >>= 1;
            if carry != 0 {
                crc = (crc ^ CRC_POLY) | carry;
            }
        }
    }

    (crc & 0x3F) as u8
}

/// Write the station address into PAR0..5.
pub fn program_station_address<R: RegisterWindow>(regs: &mut R, addr: &[u8; MAC_ADDR_LEN]) {
    for (i, &byte) in addr.iter().enumerate() {
        regs.write8(PAR0_OFFSET + i, byte);
    }
}

/// Receive filter settings retained across resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterState {
    hash: [u32; 2],
    promiscuous: bool,
    broadcast: bool,
    all_multicast: bool,
    /// More groups were requested than the hash is used for
    overflow: bool,
}

impl FilterState {
    /// Filter with no multicast groups and the modes chosen in `config`
    pub const fn from_config(config: &SteConfig) -> Self {
        Self {
            hash: [0; 2],
            promiscuous: config.promiscuous,
            broadcast: config.broadcast,
            all_multicast: config.all_multicast,
            overflow: false,
        }
    }

    /// Replace the multicast group list.
    ///
    /// More than `MULTICAST_HASH_LIMIT` groups fall back to all-multicast and
    /// leave the previous hash words in place.
    pub fn set_multicast(&mut self, groups: &[[u8; MAC_ADDR_LEN]]) {
        if groups.len() > MULTICAST_HASH_LIMIT {
            log::debug!("{} multicast groups, accepting all multicast", groups.len());
            self.overflow = true;
            return;
        }

        self.overflow = false;
        self.hash = [0; 2];
        for addr in groups {
            let bit = crc_hash(addr);
            self.hash[usize::from(bit / 32)] |= 1 << (bit % 32);
        }
    }

    /// Accept every frame
    pub fn set_promiscuous(&mut self, enabled: bool) {
        self.promiscuous = enabled;
    }

    /// Accept every multicast frame
    pub fn set_all_multicast(&mut self, enabled: bool) {
        self.all_multicast = enabled;
    }

    /// Accept broadcast frames
    pub fn set_broadcast(&mut self, enabled: bool) {
        self.broadcast = enabled;
    }

    /// Whether multicast reception bypasses the hash
    pub const fn accepts_all_multicast(&self) -> bool {
        self.all_multicast || self.promiscuous || self.overflow
    }

    /// Whether promiscuous mode is requested
    pub const fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Hash words as written to MAR0 and MAR1
    pub const fn hash_words(&self) -> [u32; 2] {
        self.hash
    }

    /// Whether `addr` hashes to a bit that is set
    pub fn hash_hit(&self, addr: &[u8; MAC_ADDR_LEN]) -> bool {
        let bit = crc_hash(addr);
        self.hash[usize::from(bit / 32)] & (1 << (bit % 32)) != 0
    }

    /// Value for the receive mode register
    pub const fn rx_mode(&self) -> u8 {
        let mut mode = RXMODE_UNICAST;
        if self.promiscuous {
            mode |= RXMODE_PROMISC;
        }
        if self.broadcast {
            mode |= RXMODE_BROADCAST;
        }
        if self.accepts_all_multicast() {
            mode |= RXMODE_ALLMULTI;
        } else {
            mode |= RXMODE_MULTIHASH;
        }
        mode
    }

    /// Write the receive mode and, unless all multicast is accepted, the hash
    /// registers.
    pub fn program<R: RegisterWindow>(&self, regs: &mut R) {
        if !self.accepts_all_multicast() {
            regs.write32(MAR0_OFFSET, self.hash[0]);
            regs.write32(MAR1_OFFSET, self.hash[1]);
        }
        regs.write8(RX_MODE_OFFSET, self.rx_mode());
    }
}


// =============================================================================
// Device Filtering Methods
// =============================================================================

impl<R, P, T, D, Y, const RX: usize, const TX: usize> Ste<R, P, T, D, Y, RX, TX>
where
    R: RegisterWindow,
    P: BufferPool,
    T: TimerService,
    D: DelayNs,
    Y: PhyDriver,
{
    /// Replace the multicast group list.
    ///
    /// Takes effect immediately on a running device and is kept for every
    /// later initialisation.
    pub fn set_multicast(&mut self, groups: &[[u8; MAC_ADDR_LEN]]) {
        self.filter.set_multicast(groups);
        self.reprogram_filter();
    }

    /// Enable or disable promiscuous reception
    pub fn set_promiscuous(&mut self, enabled: bool) {
        self.filter.set_promiscuous(enabled);
        self.reprogram_filter();
    }

    /// Enable or disable reception of every multicast frame
    pub fn set_all_multicast(&mut self, enabled: bool) {
        self.filter.set_all_multicast(enabled);
        self.reprogram_filter();
    }

    /// Enable or disable broadcast reception
    pub fn set_broadcast(&mut self, enabled: bool) {
        self.filter.set_broadcast(enabled);
        self.reprogram_filter();
    }

    fn reprogram_filter(&mut self) {
        if self.state() == State::Running {
            self.filter.program(&mut self.regs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
