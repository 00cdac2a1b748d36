//! Utilities for decoding from and encoding into bytes.
//!
//! [`ByteWriter`] and [`ByteReader`] wrap a `&mut [u8]` or `&[u8]` and offer small, panic-free
//! helpers for building and parsing the fixed-layout wire structures used by this crate (the LLP
//! header, FEC blocks, KISS parameter bytes). All multi-byte wire fields in this protocol are
//! big-endian, unlike the little-endian convention used by most radio link layers, so the
//! `_be` methods are the ones in regular use here.

use core::mem;

use byteorder::{BigEndian, ByteOrder};

use crate::Error;

/// Wrapper around a byte slice that can be used to encode data into bytes.
///
/// All `write_*` methods on this type will return `Error::Eof` when the underlying buffer slice is
/// full.
pub struct ByteWriter<'a>(&'a mut [u8]);

impl<'a> ByteWriter<'a> {
    /// Creates a writer that will write to `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        ByteWriter(buf)
    }

    /// Consumes `self` and returns the part of the contained buffer that has not yet been written
    /// to.
    pub fn into_rest(self) -> &'a mut [u8] {
        self.0
    }

    /// Returns the number of bytes that can be written to `self` until it is full.
    pub fn space_left(&self) -> usize {
        self.0.len()
    }

    /// Writes all bytes from `other` to `self`.
    ///
    /// Returns `Error::Eof` when `self` does not have enough space left to fit `other`. In that
    /// case, `self` will not be modified.
    pub fn write_slice(&mut self, other: &[u8]) -> Result<(), Error> {
        if self.space_left() < other.len() {
            Err(Error::Eof)
        } else {
            self.0[..other.len()].copy_from_slice(other);
            let this = mem::replace(&mut self.0, &mut []);
            self.0 = &mut this[other.len()..];
            Ok(())
        }
    }

    /// Writes a single byte to `self`.
    ///
    /// Returns `Error::Eof` when no space is left.
    pub fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        self.write_slice(&[byte])
    }

    /// Writes a `u16` to `self`, using Big Endian byte order.
    pub fn write_u16_be(&mut self, value: u16) -> Result<(), Error> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes `count` zero bytes to `self`.
    pub fn write_zeros(&mut self, count: usize) -> Result<(), Error> {
        if self.space_left() < count {
            Err(Error::Eof)
        } else {
            for _ in 0..count {
                self.write_u8(0)?;
            }
            Ok(())
        }
    }
}

/// Allows reading values from a borrowed byte slice.
pub struct ByteReader<'a>(&'a [u8]);

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` that will read from the given byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader(bytes)
    }

    /// Returns the number of bytes that can still be read from `self`.
    pub fn bytes_left(&self) -> usize {
        self.0.len()
    }

    /// Returns whether `self` is at the end of the underlying buffer (EOF).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a byte slice of length `len` from `self`.
    ///
    /// If `self` contains less than `len` bytes, `Error::Eof` will be returned and `self` will not
    /// be modified.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.bytes_left() < len {
            Err(Error::Eof)
        } else {
            let slice = &self.0[..len];
            self.0 = &self.0[len..];
            Ok(slice)
        }
    }

    /// Reads the remaining bytes from `self`.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = self.0;
        self.0 = &[];
        rest
    }

    /// Reads a single byte from `self`.
    ///
    /// Returns `Error::Eof` when `self` is empty.
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_slice(1)?[0])
    }

    /// Reads a `u16` from `self`, using Big Endian byte order.
    pub fn read_u16_be(&mut self) -> Result<u16, Error> {
        let s = self.read_slice(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_round_trip() {
        let mut buf = [0u8; 8];
        {
            let mut w = ByteWriter::new(&mut buf);
            w.write_u16_be(0xF000).unwrap();
            w.write_u8(0x01).unwrap();
            w.write_zeros(2).unwrap();
            w.write_slice(&[0xAA, 0xBB]).unwrap();
        }

        let mut r = ByteReader::new(&buf[..5]);
        assert_eq!(r.read_u16_be().unwrap(), 0xF000);
        assert_eq!(r.read_u8().unwrap(), 0x01);

        let mut r2 = ByteReader::new(&buf[5..7]);
        assert_eq!(r2.read_u8().unwrap(), 0x00);
        assert_eq!(r2.read_u8().unwrap(), 0x00);
    }

    #[test]
    fn write_slice_eof() {
        let mut buf = [0u8; 2];
        let mut w = ByteWriter::new(&mut buf);
        assert_eq!(w.write_slice(&[1, 2, 3]), Err(Error::Eof));
    }

    #[test]
    fn read_slice_eof() {
        let buf = [1u8, 2];
        let mut r = ByteReader::new(&buf);
        assert_eq!(r.read_slice(3), Err(Error::Eof));
    }
}
