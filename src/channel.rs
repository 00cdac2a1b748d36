//! The radio channel handle: the byte-oriented interface to the AFSK modulator/demodulator.
//!
//! The modem modulator/demodulator, the squelch detector, and the LED drivers that react to it are
//! all hardware-specific and live outside this crate; [`Channel`] is the narrow, non-blocking
//! interface this crate needs from them, and [`RxIndicator`] is the narrow interface it drives in
//! the other direction.

/// Non-blocking, byte-oriented handle to the underlying radio channel.
///
/// Implementations own the AFSK demodulator's receive FIFO and the modulator's transmit FIFO (or
/// whatever buffering the hardware provides); all operations here must return immediately.
pub trait Channel {
    /// Reads one byte from the receive FIFO, or `None` if it is currently empty.
    fn get_byte(&mut self) -> Option<u8>;

    /// Writes one byte to the transmit FIFO.
    fn put_byte(&mut self, byte: u8);

    /// Returns whether the demodulator currently sees carrier and HDLC bit sync.
    ///
    /// While this is `true`, the CSMA scheduler treats the channel as busy and keeps draining
    /// received bytes instead of attempting to transmit.
    fn receiving(&self) -> bool;

    /// Returns the current value of the FIFO overflow / framing error status register.
    ///
    /// A nonzero value means the receive FIFO overflowed or a framing error was detected since the
    /// register was last cleared.
    fn status(&self) -> u8;

    /// Clears the status register, as if by assignment to zero.
    fn clear_status(&mut self);
}

/// Observes successfully decoded frames.
///
/// Implementations typically drive a receive-activity LED. Called once per validated frame, before
/// the frame's payload is handed to the delivery hook.
pub trait RxIndicator {
    /// Invoked once a frame has passed HDLC framing and CRC validation (or been admitted under
    /// `PASSALL`), just before its payload is delivered.
    fn on_frame_decoded(&mut self);
}

/// An [`RxIndicator`] that does nothing, for configurations with `OPEN_SQUELCH` disabled or no LED
/// to drive.
impl RxIndicator for () {
    fn on_frame_decoded(&mut self) {}
}
