use core::fmt;

use crate::bytes::{ByteReader, ByteWriter};
use crate::Error;

/// A link-layer address: a 16-bit network id paired with a 16-bit host id within that network.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Address {
    network: u16,
    host: u16,
}

impl Address {
    /// The broadcast address, `0xFFFF:0xFFFF`. Allocated once at startup and immutable for the
    /// life of the process.
    pub const BROADCAST: Self = Address {
        network: 0xFFFF,
        host: 0xFFFF,
    };

    /// Creates a new address from a network id and a host id.
    pub fn new(network: u16, host: u16) -> Self {
        Address { network, host }
    }

    /// Returns the network id.
    pub fn network(&self) -> u16 {
        self.network
    }

    /// Returns the host id.
    pub fn host(&self) -> u16 {
        self.host
    }

    /// Returns whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Writes the address as two big-endian `u16` fields: network, then host.
    pub(crate) fn write(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        writer.write_u16_be(self.network)?;
        writer.write_u16_be(self.host)
    }

    /// Reads an address as two big-endian `u16` fields: network, then host.
    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self, Error> {
        let network = reader.read_u16_be()?;
        let host = reader.read_u16_be()?;
        Ok(Address { network, host })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.network, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_is_all_ones() {
        assert_eq!(Address::BROADCAST, Address::new(0xFFFF, 0xFFFF));
        assert!(Address::BROADCAST.is_broadcast());
    }

    #[test]
    fn non_broadcast_address_is_not_broadcast() {
        assert!(!Address::new(0xF000, 0x0001).is_broadcast());
    }

    #[test]
    fn write_read_round_trip() {
        let addr = Address::new(0xF000, 0x0001);
        let mut buf = [0u8; 4];
        addr.write(&mut ByteWriter::new(&mut buf)).unwrap();
        assert_eq!(buf, [0xF0, 0x00, 0x00, 0x01]);

        let decoded = Address::read(&mut ByteReader::new(&buf)).unwrap();
        assert_eq!(decoded, addr);
    }

}
