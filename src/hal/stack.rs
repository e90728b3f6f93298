//! Upper network layer interface.

use super::buffer::PacketBuffer;
use crate::internal::constants::{ETH_HEADER_SIZE, MAC_ADDR_LEN};

/// A received frame handed to the network stack.
///
/// The 14-byte Ethernet header is split off into [`header`](Self::header);
/// [`payload`](Self::payload) starts at the EtherType's payload. Ownership of
/// the buffer moves to the stack, which returns it to the pool when done.
#[derive(Debug)]
pub struct RxFrame<B> {
    header: [u8; ETH_HEADER_SIZE],
    buffer: B,
}

impl<B: PacketBuffer> RxFrame<B> {
    /// Split the header off a received buffer. Runt frames hand the buffer
    /// back.
    pub(crate) fn new(buffer: B) -> core::result::Result<Self, B> {
        let mut header = [0u8; ETH_HEADER_SIZE];
        match buffer.as_slice().get(..ETH_HEADER_SIZE) {
            Some(bytes) => header.copy_from_slice(bytes),
            None => return Err(buffer),
        }
        Ok(Self { header, buffer })
    }

    /// Raw Ethernet header
    pub fn header(&self) -> &[u8; ETH_HEADER_SIZE] {
        &self.header
    }

    /// Destination MAC address
    pub fn destination(&self) -> [u8; MAC_ADDR_LEN] {
        let mut mac = [0u8; MAC_ADDR_LEN];
        mac.copy_from_slice(&self.header[..MAC_ADDR_LEN]);
        mac
    }

    /// Source MAC address
    pub fn source(&self) -> [u8; MAC_ADDR_LEN] {
        let mut mac = [0u8; MAC_ADDR_LEN];
        mac.copy_from_slice(&self.header[MAC_ADDR_LEN..2 * MAC_ADDR_LEN]);
        mac
    }

    /// EtherType field
    pub fn ethertype(&self) -> u16 {
        u16::from_be_bytes([self.header[12], self.header[13]])
    }

    /// Frame contents following the header
    pub fn payload(&self) -> &[u8] {
        self.buffer.as_slice().get(ETH_HEADER_SIZE..).unwrap_or(&[])
    }

    /// Length of the whole frame including the header
    pub fn len(&self) -> usize {
        self.buffer.as_slice().len()
    }

    /// Whether the frame carries no payload
    pub fn is_empty(&self) -> bool {
        self.payload().is_empty()
    }

    /// Take back the underlying buffer
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

/// The network layer above the driver.
pub trait NetStack<B> {
    /// Accept a received frame.
    fn deliver(&mut self, frame: RxFrame<B>);

    /// Take the next frame queued for transmission.
    fn dequeue(&mut self) -> Option<B>;

    /// Whether frames are queued for transmission.
    fn has_pending(&self) -> bool;
}
