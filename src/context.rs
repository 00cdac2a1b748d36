//! The link context: the single mutable record the receiver and transmitter state machines share.

use crate::address::Address;
use crate::config::Config;

/// Size in bytes of one FEC block: 8 data bytes interleaved with 4 parity bytes.
pub const INTERLEAVE_SIZE: usize = 12;

/// Largest frame (header + padding + payload + CRC, before FEC expansion) this crate will buffer.
pub const MAX_FRAME_LEN: usize = 576;

/// Smallest frame that can possibly be valid: a bare header plus CRC trailer, aligned to one FEC
/// block.
pub const MIN_FRAME_LEN: usize = 12;

/// Receives decoded frames handed up from the receiver.
///
/// Invoked once per validated frame (or, under `Config::PASSALL`, once per frame that merely
/// passed HDLC framing). `payload` borrows directly from the link context's frame buffer and is
/// only valid for the duration of the call.
pub trait FrameSink {
    /// Called with the frame's source address, destination address, and payload.
    fn on_frame(&mut self, src: Address, dst: Address, payload: &[u8]);
}

/// Owns every piece of mutable state the receiver and transmitter state machines touch.
///
/// There is exactly one `LinkContext` per modem. It is created at boot and lives until power-off;
/// its frame buffer is logically reset at each HDLC flag boundary, not physically cleared.
pub struct LinkContext<C: Config> {
    /// The channel handle connecting to the modem hardware.
    pub channel: C::Channel,
    /// Source of randomness for the CSMA scheduler.
    pub rng: C::Rng,
    /// Receive-activity indicator, driven when `Config::OPEN_SQUELCH` is set.
    pub rx_indicator: C::RxIndicator,
    /// The monotonic tick source, used by the CSMA scheduler's slot timer and the KISS inactivity
    /// timeout.
    pub timer: C::Timer,
    /// This modem's own link-layer address.
    pub local: Address,

    /// The frame buffer. Receive uses `buf[..frame_len]`; after `decode` strips the header, the
    /// payload sits at offset 0.
    pub(crate) buf: [u8; MAX_FRAME_LEN],

    // Receive state.
    pub(crate) sync: bool,
    pub(crate) escape: bool,
    pub(crate) frame_len: usize,
    pub(crate) read_len: usize,
    pub(crate) crc_in: u16,
    pub(crate) corrections_made: u32,
    pub(crate) interleave_in: [u8; INTERLEAVE_SIZE],

    // Transmit state.
    pub(crate) crc_out: u16,
    pub(crate) interleave_counter: usize,
    pub(crate) interleave_out: [u8; INTERLEAVE_SIZE],
    pub(crate) send_parity_block: bool,
    pub(crate) last_byte: u8,
}

impl<C: Config> LinkContext<C> {
    /// Creates a new link context for the given local address, wrapping the given hardware
    /// interfaces.
    pub fn new(
        local: Address,
        channel: C::Channel,
        rng: C::Rng,
        rx_indicator: C::RxIndicator,
        timer: C::Timer,
    ) -> Self {
        LinkContext {
            channel,
            rng,
            rx_indicator,
            timer,
            local,
            buf: [0; MAX_FRAME_LEN],
            sync: false,
            escape: false,
            frame_len: 0,
            read_len: 0,
            crc_in: 0xFFFF,
            corrections_made: 0,
            interleave_in: [0; INTERLEAVE_SIZE],
            crc_out: 0xFFFF,
            interleave_counter: 0,
            interleave_out: [0; INTERLEAVE_SIZE],
            send_parity_block: false,
            last_byte: 0,
        }
    }

    /// Number of single-bit errors the FEC layer has corrected since the current frame began
    /// syncing.
    pub fn corrections_made(&self) -> u32 {
        self.corrections_made
    }
}
