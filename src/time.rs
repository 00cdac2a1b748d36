//! Time APIs for obtaining the current time and calculating with points in time and durations.
//!
//! The link-layer core does not know the rate of the underlying tick counter — that is a property
//! of whatever hardware timer the platform wires up — so [`Duration`] and [`Instant`] here are
//! expressed in raw, opaque ticks rather than a fixed physical unit. Conversion between
//! milliseconds and ticks is the [`Timer`] implementation's job (`ms_to_ticks`), exactly as the
//! wire protocol this crate implements describes it.

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// A span of time expressed in ticks of the platform's monotonic counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration(u32);

impl Duration {
    /// The zero-length duration.
    pub const ZERO: Self = Duration(0);

    /// Creates a [`Duration`] from a raw tick count.
    pub fn from_ticks(ticks: u32) -> Self {
        Duration(ticks)
    }

    /// Returns the number of ticks represented by `self`.
    pub fn as_ticks(&self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Duration(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Duration(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl PartialEq<u32> for Duration {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// A point in time, relative to an unspecified epoch, measured in raw ticks.
///
/// `Instant`s are obtained from an implementation of [`Timer`]. `Instant`s created from different
/// [`Timer`] instances (even when using the same implementation) are not compatible, and mixing
/// them in operations causes unspecified results.
///
/// Subtracting two `Instant`s always uses wrapping arithmetic, so a timer that free-runs and wraps
/// around still produces a usable (if occasionally wrong-by-a-wrap) duration, rather than a panic.
/// That tradeoff matches a bare-metal tick counter: it is expected to wrap, and the caller (the
/// CSMA and inactivity-timeout logic) only ever compares the result against a small threshold.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instant(u32);

impl Instant {
    /// Creates an `Instant` from a raw tick count since an arbitrary implementation-defined
    /// reference point.
    ///
    /// This should only be called from a [`Timer`] implementation.
    pub fn from_raw_ticks(ticks: u32) -> Self {
        Instant(ticks)
    }

    /// Returns the raw tick count from which this `Instant` was created.
    pub fn raw_ticks(&self) -> u32 {
        self.0
    }

    /// Calculates the duration of time that has passed between `earlier` and `self`, wrapping
    /// around on tick-counter overflow.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration(self.0.wrapping_sub(earlier.0))
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.duration_since(rhs)
    }
}

impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, d: Duration) -> Self {
        Instant(self.0.wrapping_add(d.as_ticks()))
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, d: Duration) {
        *self = *self + d;
    }
}

impl Sub<Duration> for Instant {
    type Output = Self;

    fn sub(self, d: Duration) -> Self {
        Instant(self.0.wrapping_sub(d.as_ticks()))
    }
}

impl SubAssign<Duration> for Instant {
    fn sub_assign(&mut self, d: Duration) {
        *self = *self - d;
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// Trait for monotonic time providers.
///
/// The hardware interface has to provide an implementation of `Timer` to the stack. Ticks need not
/// be any particular duration — `ms_to_ticks` is how the link-layer core learns the conversion
/// factor it needs for the CSMA slot timer and the KISS inactivity timeout.
///
/// This trait can also be implemented by a mock timer for testing.
pub trait Timer {
    /// Obtain the current time as an [`Instant`].
    ///
    /// The [`Instant`]s returned by this function must never move backwards in time, except when
    /// the underlying tick counter wraps around.
    fn now(&self) -> Instant;

    /// Converts a millisecond duration to the equivalent number of ticks, rounding however the
    /// implementation sees fit.
    fn ms_to_ticks(&self, ms: u32) -> Duration;

    /// Yields the CPU for one iteration of a busy-wait loop.
    ///
    /// [`crate::csma`]'s slot-time back-off calls this in a tight loop while it polls [`Timer::now`]
    /// for the slot to elapse, mirroring the original firmware's `cpu_relax()` spin hint. Real
    /// implementations should forward to [`core::hint::spin_loop`] or an architecture-specific
    /// wait-for-interrupt instruction; the default does exactly that. A test double may instead
    /// advance its fake clock here so a slot wait terminates without real wall-clock time passing.
    fn cpu_relax(&self) {
        core::hint::spin_loop();
    }
}
