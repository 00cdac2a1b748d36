//! Host-facing serial framing: DIRECT, NMEA, and KISS TNC modes.
//!
//! The modem's UART carries whatever the host application speaks, not LLP's own HDLC framing.
//! [`KissCtx`] accumulates bytes from the host in the chosen [`SerialFraming`] mode until a
//! complete outbound packet is ready, at which point it is hustled off to [`crate::csma::transmit`].
//! On the way back down, [`KissCtx::deliver`] formats a received frame for egress to the host in
//! the same mode.

use crate::config::Config;
use crate::context::MAX_FRAME_LEN;
use crate::time::Instant;

const FEND: u8 = 0xC0;
const FESC: u8 = 0xDB;
const TFEND: u8 = 0xDC;
const TFESC: u8 = 0xDD;

enum_with_unknown! {
    /// KISS command nibble values, carried in the byte immediately following an opening `FEND`.
    ///
    /// Only the low nibble of the command byte is significant (the high nibble names a TNC port
    /// on multi-port hardware this crate doesn't model), so [`KissCtx::feed_kiss`] always masks
    /// its input down to 4 bits before converting. `Return` is conventionally sent as the full
    /// byte `0xFF`, which is why its nibble value below is `0x0F`, not `0xFF`.
    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    enum Command(u8) {
        Data = 0x00,
        TxDelay = 0x01,
        P = 0x02,
        SlotTime = 0x03,
        TxTail = 0x04,
        FullDuplex = 0x05,
        SetHardware = 0x06,
        Return = 0x0F,
    }
}

/// Selects how bytes arriving on the host serial link are framed into outbound packets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SerialFraming {
    /// Every byte is payload; frames are delimited only by inactivity or a full buffer.
    Direct,
    /// Frames are NMEA sentences: only sequences starting with `$GPGGA` are accepted, and a
    /// sentence ends when `*` appears 3 bytes before the buffer's current end.
    Nmea,
    /// Frames are delimited by `FEND` and may carry KISS TNC parameter commands.
    Kiss,
}

/// Accumulates bytes arriving on the host serial link into outbound packets.
///
/// Owns exactly the state the original firmware kept as free-standing globals in its serial
/// callback: the accumulation buffer, the in-frame flag, the escape flag, and the most recently
/// seen KISS command. This is deliberately separate from [`crate::context::LinkContext`]: the two
/// are driven by different event sources (host UART vs. radio channel) and the protocol spec calls
/// out that they must not be conflated.
pub struct KissCtx<C: Config> {
    framing: SerialFraming,
    buf: [u8; MAX_FRAME_LEN],
    frame_len: usize,
    in_frame: bool,
    escape: bool,
    command: Option<Command>,
    last_byte_at: Option<Instant>,
    nmea_sentences_seen: u8,

    /// TXDELAY parameter, in milliseconds, most recently set via a KISS command (`sbyte * 10`).
    pub preamble_ms: u32,
    /// TXTAIL parameter, in milliseconds, most recently set via a KISS command (`sbyte * 10`).
    pub tail_ms: u32,
    /// SLOTTIME parameter, in milliseconds, most recently set via a KISS command (`sbyte * 10`).
    pub slot_time_ms: u32,
    /// P-persistence parameter (0..255), most recently set via a KISS command.
    pub p: u8,

    _config: core::marker::PhantomData<C>,
}

impl<C: Config> KissCtx<C> {
    /// Creates a new serial framing context in the given mode, with CSMA parameters seeded from
    /// `Config`'s defaults.
    pub fn new(framing: SerialFraming) -> Self {
        KissCtx {
            framing,
            buf: [0; MAX_FRAME_LEN],
            frame_len: 0,
            in_frame: false,
            escape: false,
            command: None,
            last_byte_at: None,
            nmea_sentences_seen: 0,
            preamble_ms: 0,
            tail_ms: 0,
            slot_time_ms: C::CSMA_SLOT_TIME_MS,
            p: C::CSMA_P,
            _config: core::marker::PhantomData,
        }
    }

    /// Returns the payload accumulated so far for the frame in progress.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[..self.frame_len]
    }

    fn reset_frame(&mut self) {
        self.frame_len = 0;
        self.in_frame = false;
        self.escape = false;
        self.command = None;
        self.last_byte_at = None;
    }

    fn push(&mut self, byte: u8) -> bool {
        if self.frame_len >= self.buf.len() {
            return false;
        }
        self.buf[self.frame_len] = byte;
        self.frame_len += 1;
        true
    }

    /// Feeds one byte received from the host UART into the framer.
    ///
    /// Returns `Some(())` when this byte completed a frame — the caller should hand
    /// [`KissCtx::buffered`] to the CSMA scheduler and then call [`KissCtx::take_frame`] (or simply
    /// proceed, since the next call to this function implicitly starts a fresh frame).
    pub fn feed(&mut self, timer: &C::Timer, byte: u8) -> bool {
        self.last_byte_at = Some(timer.now());

        match self.framing {
            SerialFraming::Direct => self.feed_direct(byte),
            SerialFraming::Nmea => self.feed_nmea(byte),
            SerialFraming::Kiss => self.feed_kiss(byte),
        }
    }

    fn feed_direct(&mut self, byte: u8) -> bool {
        self.in_frame = true;
        if !self.push(byte) {
            // Buffer full: force-flush what we have.
            return true;
        }
        false
    }

    fn feed_nmea(&mut self, byte: u8) -> bool {
        if !self.in_frame {
            if byte != b'$' {
                return false;
            }
            self.in_frame = true;
            self.frame_len = 0;
        }

        if !self.push(byte) {
            self.reset_frame();
            return false;
        }

        // Validate the prefix as soon as enough bytes have arrived; a non-matching prefix aborts
        // the sentence immediately rather than waiting for the terminator.
        const PREFIX: &[u8] = b"$GPGGA";
        if self.frame_len <= PREFIX.len() && self.buf[..self.frame_len] != PREFIX[..self.frame_len] {
            trace!("kiss: nmea sentence doesn't match $GPGGA, discarding");
            self.reset_frame();
            return false;
        }

        if self.frame_len >= 3 && self.buf[self.frame_len - 3] == b'*' {
            let _ = self.push(b'\n');
            let _ = self.push(b'\r');
            self.in_frame = false;

            let skip = self.nmea_sentences_seen == 0 && C::NMEA_SKIP_SENTENCES > 0;
            if C::NMEA_SKIP_SENTENCES > 0 {
                self.nmea_sentences_seen = (self.nmea_sentences_seen + 1) % C::NMEA_SKIP_SENTENCES;
            }
            if skip {
                self.frame_len = 0;
                return false;
            }
            return true;
        }

        false
    }

    fn feed_kiss(&mut self, byte: u8) -> bool {
        if self.in_frame && byte == FEND && self.command == Some(Command::Data) {
            self.in_frame = false;
            return true;
        }
        if byte == FEND {
            self.in_frame = true;
            self.command = None;
            self.frame_len = 0;
            self.escape = false;
            return false;
        }
        if !self.in_frame || self.frame_len >= self.buf.len() {
            return false;
        }

        if self.frame_len == 0 && self.command.is_none() {
            self.command = Some(Command::from(byte & 0x0F));
            return false;
        }

        match self.command {
            Some(Command::Data) => {
                if byte == FESC {
                    self.escape = true;
                    return false;
                }
                let mut byte = byte;
                if self.escape {
                    if byte == TFEND {
                        byte = FEND;
                    }
                    if byte == TFESC {
                        byte = FESC;
                    }
                    self.escape = false;
                }
                self.push(byte);
            }
            Some(Command::TxDelay) => self.preamble_ms = u32::from(byte) * 10,
            Some(Command::TxTail) => self.tail_ms = u32::from(byte) * 10,
            Some(Command::SlotTime) => self.slot_time_ms = u32::from(byte) * 10,
            Some(Command::P) => self.p = byte,
            // FullDuplex, SetHardware, and Return are accepted and their parameter byte is
            // consumed (so framing doesn't desync), but this implementation has nothing to act on
            // them with: there is no half/full-duplex switch, no auxiliary hardware channel to
            // configure, and no host-side TNC state machine to acknowledge.
            Some(Command::FullDuplex) | Some(Command::SetHardware) | Some(Command::Return) => {}
            Some(Command::Unknown(_)) | None => {}
        }
        false
    }

    /// Called whenever a serial byte arrives, and whenever the frame buffer fills: force-flushes a
    /// partial `DIRECT`/`NMEA` frame if more than `TX_MAXWAIT_MS` has elapsed since the last byte.
    pub fn check_timeout(&mut self, timer: &C::Timer, force: bool) -> bool {
        if !self.in_frame {
            return false;
        }
        if force {
            debug!("kiss: force-flushing {} buffered byte(s), buffer full", self.frame_len);
            return true;
        }
        match self.last_byte_at {
            Some(last) if timer.now().duration_since(last) > timer.ms_to_ticks(C::TX_MAXWAIT_MS) => {
                debug!("kiss: flushing {} buffered byte(s) after inactivity timeout", self.frame_len);
                true
            }
            _ => false,
        }
    }

    /// Clears accumulated frame state after the caller has handed the buffered payload off to
    /// CSMA.
    pub fn take_frame(&mut self) {
        self.reset_frame();
    }

    /// Formats a received payload for egress to the host, per the configured framing mode.
    ///
    /// `DIRECT` and `NMEA` write the payload through unmodified; `KISS` wraps it in a data frame,
    /// escaping `FEND`/`FESC` bytes in the payload.
    pub fn deliver(&self, channel: &mut impl crate::channel::Channel, payload: &[u8]) {
        match self.framing {
            SerialFraming::Direct | SerialFraming::Nmea => {
                for &b in payload {
                    channel.put_byte(b);
                }
            }
            SerialFraming::Kiss => {
                channel.put_byte(FEND);
                channel.put_byte(0x00);
                for &b in payload {
                    match b {
                        FEND => {
                            channel.put_byte(FESC);
                            channel.put_byte(TFEND);
                        }
                        FESC => {
                            channel.put_byte(FESC);
                            channel.put_byte(TFESC);
                        }
                        _ => channel.put_byte(b),
                    }
                }
                channel.put_byte(FEND);
            }
        }
    }
}
