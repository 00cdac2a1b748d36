use crate::address::Address;
use crate::bytes::{ByteReader, ByteWriter};
use crate::Error;

/// Size in bytes of an encoded [`Header`] on the wire.
pub const HEADER_SIZE: usize = 10;

/// Size in bytes of the CRC trailer following the payload and padding.
pub const CRC_SIZE: usize = 2;

/// Number of data bytes per FEC triple once parity is stripped out; the logical frame (header +
/// padding + payload + CRC) is always padded to a multiple of this.
pub const DATA_BLOCK_SIZE: usize = 8;

/// The fixed 10-byte header prefixing every LLP frame.
///
/// Wire order: `src.network`, `src.host`, `dst.network`, `dst.host` (all big-endian `u16`),
/// `flags`, `padding`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    /// Address of the frame's originator.
    pub src: Address,
    /// Address of the frame's intended recipient. [`Address::BROADCAST`] for broadcast frames.
    pub dst: Address,
    /// Per-frame flags. Unused by this implementation; always `0` on encode, preserved verbatim
    /// on decode for forward compatibility with peers that set bits here.
    pub flags: u8,
    /// Count of zero bytes inserted between this header and the payload, chosen so that
    /// `HEADER_SIZE + padding + payload_len + CRC_SIZE` is a multiple of [`DATA_BLOCK_SIZE`].
    pub padding: u8,
}

impl Header {
    /// Computes the padding byte count needed to align a frame carrying `payload_len` bytes of
    /// payload to a multiple of [`DATA_BLOCK_SIZE`].
    pub fn padding_for(payload_len: usize) -> u8 {
        let unpadded = HEADER_SIZE + CRC_SIZE + payload_len;
        let remainder = unpadded % DATA_BLOCK_SIZE;
        if remainder == 0 {
            0
        } else {
            (DATA_BLOCK_SIZE - remainder) as u8
        }
    }

    /// Builds a header for a frame from `src` to `dst` carrying `payload_len` bytes of payload,
    /// with `flags` set to 0 and `padding` computed via [`Header::padding_for`].
    pub fn new(src: Address, dst: Address, payload_len: usize) -> Self {
        Header {
            src,
            dst,
            flags: 0,
            padding: Self::padding_for(payload_len),
        }
    }

    /// Encodes this header to its wire representation.
    pub fn write(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        self.src.write(writer)?;
        self.dst.write(writer)?;
        writer.write_u8(self.flags)?;
        writer.write_u8(self.padding)
    }

    /// Decodes a header from its wire representation.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, Error> {
        let src = Address::read(reader)?;
        let dst = Address::read(reader)?;
        let flags = reader.read_u8()?;
        let padding = reader.read_u8()?;
        Ok(Header {
            src,
            dst,
            flags,
            padding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_aligns_to_data_block_size() {
        // S1: a 2-byte payload needs 2 bytes of padding (10 + 2 + 2 + padding ≡ 0 mod 8).
        assert_eq!(Header::padding_for(2), 2);
        assert_eq!(Header::padding_for(0), 4);
        assert_eq!(Header::padding_for(6), 0);
        assert_eq!(Header::padding_for(7), 7);
    }

    #[test]
    fn write_read_round_trip() {
        let src = Address::new(0xF000, 0x0001);
        let dst = Address::BROADCAST;
        let header = Header::new(src, dst, 2);

        let mut buf = [0u8; HEADER_SIZE];
        header.write(&mut ByteWriter::new(&mut buf)).unwrap();
        assert_eq!(buf, [0xF0, 0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x02]);

        let decoded = Header::read(&mut ByteReader::new(&buf)).unwrap();
        assert_eq!(decoded, header);
    }
}
