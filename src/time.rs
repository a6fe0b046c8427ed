//! Time abstraction traits for platform-agnostic timing.
//!
//! All engine and driver timing flows through an injected [`TimeSource`],
//! so animations can be driven deterministically in tests and from any
//! monotonic millisecond clock on hardware.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for instant types.
///
/// Fade windows and flush deadlines are tracked as millisecond offsets
/// from a captured start instant, so the only operation required of an
/// instant is measuring the time elapsed since an earlier one.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}
