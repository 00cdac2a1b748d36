//! A link-layer core for a half-duplex packet radio modem.
//!
//! This crate implements the framing, forward-error-correction, interleaving, and CSMA
//! transmit-arbitration engine that turns a raw bit-synchronous HDLC bytestream into reliable
//! addressed frames, and vice versa. It is runtime and hardware-agnostic: it does not assume an
//! RTOS, and provides hardware interfaces that need to be implemented once per platform.
//!
//! # Using this crate
//!
//! You have to provide a few hardware-specific services through [`config::Config`]:
//! * A [`channel::Channel`], the byte-oriented handle to the AFSK modulator/demodulator.
//! * A [`time::Timer`], a monotonic tick source.
//! * A source of randomness ([`rand_core::RngCore`]) for the CSMA persistence draw.
//!
//! Wrap those in a [`context::LinkContext`], then drive it with [`receiver::poll`] whenever bytes
//! might be available from the channel, and [`csma::transmit`] whenever the host has a frame ready
//! to send. Host-facing serial framing (`KISS`/`DIRECT`/`NMEA`) is handled by [`kiss::KissCtx`].

#![no_std]

#[macro_use]
mod utils;
#[macro_use]
mod log;

pub mod address;
pub mod channel;
pub mod config;
pub mod context;
mod crc;
mod error;
pub mod hamming;
pub mod header;
pub mod interleave;
pub mod kiss;
pub mod csma;
pub mod receiver;
pub mod transmitter;

pub use self::error::Error;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::channel::{Channel, RxIndicator};
    use crate::config::Config;
    use crate::time::{Duration, Instant, Timer};
    use rand_core::{Error as RandError, RngCore};

    pub const BUF_CAP: usize = 512;

    /// A loopback-friendly [`Channel`] mock: bytes written via `put_byte` land in `tx`; a test can
    /// preload `rx` to be drained by `get_byte`.
    pub struct TestChannel {
        pub rx: [u8; BUF_CAP],
        pub rx_len: usize,
        pub rx_pos: usize,
        pub tx: [u8; BUF_CAP],
        pub tx_len: usize,
        pub receiving: bool,
        pub status: u8,
    }

    impl Default for TestChannel {
        fn default() -> Self {
            TestChannel {
                rx: [0; BUF_CAP],
                rx_len: 0,
                rx_pos: 0,
                tx: [0; BUF_CAP],
                tx_len: 0,
                receiving: false,
                status: 0,
            }
        }
    }

    impl TestChannel {
        pub fn push_rx(&mut self, bytes: &[u8]) {
            self.rx[self.rx_len..self.rx_len + bytes.len()].copy_from_slice(bytes);
            self.rx_len += bytes.len();
        }

        pub fn sent(&self) -> &[u8] {
            &self.tx[..self.tx_len]
        }
    }

    impl Channel for TestChannel {
        fn get_byte(&mut self) -> Option<u8> {
            if self.rx_pos >= self.rx_len {
                return None;
            }
            let b = self.rx[self.rx_pos];
            self.rx_pos += 1;
            Some(b)
        }

        fn put_byte(&mut self, byte: u8) {
            self.tx[self.tx_len] = byte;
            self.tx_len += 1;
        }

        fn receiving(&self) -> bool {
            self.receiving
        }

        fn status(&self) -> u8 {
            self.status
        }

        fn clear_status(&mut self) {
            self.status = 0;
        }
    }

    /// A [`Timer`] mock whose clock only advances when told to.
    #[derive(Default)]
    pub struct TestTimer {
        pub ticks: core::cell::Cell<u32>,
    }

    impl TestTimer {
        pub fn advance(&self, ticks: u32) {
            self.ticks.set(self.ticks.get().wrapping_add(ticks));
        }
    }

    impl Timer for TestTimer {
        fn now(&self) -> Instant {
            Instant::from_raw_ticks(self.ticks.get())
        }

        fn ms_to_ticks(&self, ms: u32) -> Duration {
            Duration::from_ticks(ms)
        }

        fn cpu_relax(&self) {
            self.advance(1);
        }
    }

    /// An [`RngCore`] mock that always returns the same value, for deterministic CSMA tests.
    pub struct FixedRng(pub u32);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest {
                *b = self.0 as u8;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    pub struct TestConfig;

    impl Config for TestConfig {
        type Channel = TestChannel;
        type Timer = TestTimer;
        type Rng = FixedRng;
        type RxIndicator = ();
    }
}
