use core::fmt;

/// Errors returned by the link-layer core.
///
/// These are strictly local, programmer-facing failures (a buffer was too small, a cursor ran off
/// the end of a fixed region). Wire-level badness — a bad CRC, an uncorrectable FEC block, a
/// malformed KISS frame — is never reported through `Error`; it is absorbed as described in the
/// protocol specification, since this is a best-effort datagram link with no retransmission.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Unexpectedly reached the end of a fixed-size buffer while reading or writing.
    ///
    /// Returned when a caller tries to fit more data into a buffer than it can hold (e.g. a
    /// transmit payload larger than `MAX_DATA_SIZE`), or when a `ByteReader` is asked for more
    /// bytes than remain.
    Eof,

    /// A value supplied by the caller is out of the range this type accepts.
    InvalidValue,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::Eof => "end of buffer",
            Error::InvalidValue => "invalid value for field",
        })
    }
}
