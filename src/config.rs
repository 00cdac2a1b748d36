//! Stack configuration trait.

use rand_core::RngCore;

use crate::channel::{Channel, RxIndicator};
use crate::time::Timer;

/// Trait for link-layer core configurations.
///
/// This trait collects the hardware interfaces and tunable parameters an application must supply:
/// the channel handle, the tick source, a source of randomness for CSMA, and an optional receive
/// indicator, plus the handful of constants the original firmware exposed as compile-time
/// `#define`s. Every application using this crate defines one type implementing `Config` and
/// builds a [`crate::context::LinkContext`] around it.
pub trait Config {
    /// The channel handle connecting to the AFSK modulator/demodulator.
    type Channel: Channel;

    /// The monotonic tick source.
    type Timer: Timer;

    /// Source of randomness for the p-persistent CSMA draw.
    type Rng: RngCore;

    /// Receives a callback for every successfully decoded frame. Use `()` if `OPEN_SQUELCH` is
    /// disabled and nothing needs to observe this.
    type RxIndicator: RxIndicator;

    /// If `true`, frames are delivered to the hook regardless of CRC validity. Debug-only: it
    /// defeats the purpose of the CRC trailer and must never be enabled in a deployed build.
    const PASSALL: bool = false;

    /// If `true`, both the receiver and the transmitter skip FEC entirely: parity bytes are
    /// neither emitted nor expected, and the interleave step is bypassed on both sides.
    const DISABLE_INTERLEAVE: bool = false;

    /// If `true`, [`RxIndicator::on_frame_decoded`] is invoked for every successfully decoded
    /// frame, typically lighting a receive-activity LED.
    const OPEN_SQUELCH: bool = false;

    /// Inactivity timeout, in milliseconds, after which a partially accumulated serial frame is
    /// force-flushed to the CSMA scheduler.
    const TX_MAXWAIT_MS: u32 = 5000;

    /// Decimation factor for `NMEA` serial framing: every Nth valid sentence is dropped. `0`
    /// disables decimation.
    const NMEA_SKIP_SENTENCES: u8 = 0;

    /// Persistence parameter for p-persistent CSMA: on a clear channel, transmit immediately with
    /// probability `p/255`. `255` means always transmit when clear.
    const CSMA_P: u8 = 255;

    /// Slot time, in milliseconds, backed off to when a clear-channel roll fails or the channel is
    /// busy.
    const CSMA_SLOT_TIME_MS: u32 = 200;
}
