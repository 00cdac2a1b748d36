//! The bytewise HDLC/FEC receiver state machine.

use crate::config::Config;
use crate::context::{FrameSink, LinkContext, INTERLEAVE_SIZE, MIN_FRAME_LEN};
use crate::crc;
use crate::hamming;
use crate::header::{Header, CRC_SIZE, HEADER_SIZE};
use crate::interleave;

/// HDLC flag byte, delimiting frames.
pub const HDLC_FLAG: u8 = 0x7E;
/// HDLC abort/reset byte: drops synchronization without attempting to decode.
pub const HDLC_RESET: u8 = 0x7D;
/// Escape byte: the following byte is taken literally, even if it equals one of the three control
/// bytes above.
pub const LLP_ESC: u8 = 0x1B;

/// Drains every byte currently available from `ctx.channel`, running it through the receiver state
/// machine and delivering any frames that complete to `sink`.
///
/// Returns once the channel yields no more bytes (non-blocking EOF). This is the `llp_poll` entry
/// point.
pub fn poll<C: Config>(ctx: &mut LinkContext<C>, sink: &mut impl FrameSink) {
    while let Some(byte) = ctx.channel.get_byte() {
        receive_byte(ctx, sink, byte);
    }
}

fn receive_byte<C: Config>(ctx: &mut LinkContext<C>, sink: &mut impl FrameSink, byte: u8) {
    let is_payload_byte =
        ctx.escape || (ctx.sync && byte != HDLC_FLAG && byte != HDLC_RESET && byte != LLP_ESC);

    if is_payload_byte {
        ctx.read_len += 1;
        if ctx.frame_len < ctx.buf.len() {
            ctx.buf[ctx.frame_len] = byte;
            ctx.frame_len += 1;
        } else {
            warn!("receiver: frame overflowed MAX_FRAME_LEN, dropping and resyncing");
            ctx.sync = false;
        }
        if !C::DISABLE_INTERLEAVE && ctx.read_len % INTERLEAVE_SIZE == 0 {
            fec_flush(ctx);
        }
        ctx.escape = false;
        return;
    }

    match byte {
        HDLC_FLAG => {
            if ctx.frame_len >= MIN_FRAME_LEN {
                if C::PASSALL || ctx.crc_in == crc::CRC_VALID {
                    decode(ctx, sink);
                } else {
                    trace!("receiver: dropping frame, crc_in={:#06x} != CRC_VALID", ctx.crc_in);
                }
            }
            ctx.sync = true;
            ctx.crc_in = crc::init();
            ctx.frame_len = 0;
            ctx.read_len = 0;
            ctx.corrections_made = 0;
        }
        HDLC_RESET => {
            ctx.sync = false;
        }
        LLP_ESC => {
            ctx.escape = true;
            return;
        }
        _ => {}
    }
    ctx.escape = false;
}

/// Corrects and de-interleaves the 12 bytes just appended to the buffer, folding the corrected
/// data bytes into the running CRC and discarding the 4 parity bytes.
fn fec_flush<C: Config>(ctx: &mut LinkContext<C>) {
    let start = ctx.frame_len - INTERLEAVE_SIZE;
    ctx.interleave_in.copy_from_slice(&ctx.buf[start..start + INTERLEAVE_SIZE]);
    interleave::deinterleave(&mut ctx.interleave_in);

    let mut out = [0u8; 8];
    for i in 0..4 {
        let a = ctx.interleave_in[3 * i];
        let b = ctx.interleave_in[3 * i + 1];
        let parity = ctx.interleave_in[3 * i + 2];
        let low_nibble = parity & 0x0F;
        let high_nibble = (parity >> 4) & 0x0F;

        // `parity_block` puts `a`'s nibble in the low bits and `b`'s in the high bits
        // (`crate::hamming::parity_block`); each nibble corrects the byte it was computed over.
        let (a_corrected, a_fixed) = hamming::correct(a, hamming::syndrome(a, low_nibble));
        let (b_corrected, b_fixed) = hamming::correct(b, hamming::syndrome(b, high_nibble));

        if a_fixed {
            ctx.corrections_made += 1;
        }
        if b_fixed {
            ctx.corrections_made += 1;
        }

        ctx.crc_in = crc::update(ctx.crc_in, a_corrected);
        ctx.crc_in = crc::update(ctx.crc_in, b_corrected);

        out[2 * i] = a_corrected;
        out[2 * i + 1] = b_corrected;
    }

    ctx.buf[start..start + 8].copy_from_slice(&out);
    ctx.frame_len = start + 8;
}

/// Strips the header off a CRC-valid frame and delivers its payload to `sink`.
fn decode<C: Config>(ctx: &mut LinkContext<C>, sink: &mut impl FrameSink) {
    if C::OPEN_SQUELCH {
        ctx.rx_indicator.on_frame_decoded();
    }

    let header = match Header::read(&mut crate::bytes::ByteReader::new(&ctx.buf[..HEADER_SIZE])) {
        Ok(header) => header,
        Err(_) => return,
    };

    let strip = HEADER_SIZE + header.padding as usize;
    if ctx.frame_len < strip + CRC_SIZE {
        return;
    }
    let payload_len = ctx.frame_len - strip - CRC_SIZE;
    ctx.buf.copy_within(strip..strip + payload_len, 0);
    ctx.frame_len = payload_len;

    debug!(
        "receiver: delivering {:?} -> {:?}, {} byte(s), {} correction(s): {:?}",
        header.src,
        header.dst,
        payload_len,
        ctx.corrections_made,
        crate::utils::HexSlice(&ctx.buf[..payload_len]),
    );
    sink.on_frame(header.src, header.dst, &ctx.buf[..payload_len]);
}
