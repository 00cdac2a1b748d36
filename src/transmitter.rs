//! The HDLC/FEC frame transmitter.

use crate::address::Address;
use crate::bytes::ByteWriter;
use crate::config::Config;
use crate::context::{LinkContext, INTERLEAVE_SIZE};
use crate::crc;
use crate::hamming;
use crate::header::{Header, HEADER_SIZE};
use crate::interleave;
use crate::receiver::{HDLC_FLAG, HDLC_RESET, LLP_ESC};

/// Builds and emits exactly one HDLC-delimited, FEC-encoded frame addressed to `dst`.
pub fn send<C: Config>(ctx: &mut LinkContext<C>, dst: Address, payload: &[u8]) {
    trace!(
        "transmitter: sending {:?} -> {:?}, {} byte(s): {:?}",
        ctx.local,
        dst,
        payload.len(),
        crate::utils::HexSlice(payload),
    );

    ctx.crc_out = crc::init();
    ctx.interleave_counter = 0;
    ctx.send_parity_block = false;

    ctx.channel.put_byte(HDLC_FLAG);

    let header = Header::new(ctx.local, dst, payload.len());
    let mut header_buf = [0u8; HEADER_SIZE];
    header
        .write(&mut ByteWriter::new(&mut header_buf))
        .expect("a Header always fits HEADER_SIZE bytes");
    for &b in &header_buf {
        send_byte(ctx, b);
    }

    for _ in 0..header.padding {
        send_byte(ctx, 0);
    }

    for &b in payload {
        send_byte(ctx, b);
    }

    let low = (ctx.crc_out & 0xFF) as u8 ^ 0xFF;
    let high = (ctx.crc_out >> 8) as u8 ^ 0xFF;
    send_byte(ctx, low);
    send_byte(ctx, high);

    ctx.channel.put_byte(HDLC_FLAG);
}

/// Feeds one logical byte into the transmit pipeline: folds it into `crc_out`, buffers it (and,
/// every other call, a parity byte covering it and its predecessor) for interleaving, and flushes
/// a completed 12-byte block to the channel once full.
///
/// When `Config::DISABLE_INTERLEAVE` is set, bytes go straight to [`put_escaped`] with no
/// buffering or parity injection, mirroring the receiver's symmetric bypass.
fn send_byte<C: Config>(ctx: &mut LinkContext<C>, c: u8) {
    ctx.crc_out = crc::update(ctx.crc_out, c);

    if C::DISABLE_INTERLEAVE {
        put_escaped(ctx, c);
        return;
    }

    ctx.interleave_out[ctx.interleave_counter] = c;
    ctx.interleave_counter += 1;

    if ctx.send_parity_block {
        ctx.interleave_out[ctx.interleave_counter] = hamming::parity_block(ctx.last_byte, c);
        ctx.interleave_counter += 1;
    }
    ctx.send_parity_block = !ctx.send_parity_block;
    ctx.last_byte = c;

    if ctx.interleave_counter == INTERLEAVE_SIZE {
        interleave::interleave(&mut ctx.interleave_out);
        for i in 0..INTERLEAVE_SIZE {
            let b = ctx.interleave_out[i];
            put_escaped(ctx, b);
        }
        ctx.interleave_counter = 0;
    }
}

/// Writes `byte` to the channel, prefixing it with [`LLP_ESC`] when it collides with one of the
/// three unescaped HDLC control bytes.
fn put_escaped<C: Config>(ctx: &mut LinkContext<C>, byte: u8) {
    if byte == HDLC_FLAG || byte == HDLC_RESET || byte == LLP_ESC {
        ctx.channel.put_byte(LLP_ESC);
    }
    ctx.channel.put_byte(byte);
}
