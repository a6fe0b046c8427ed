//! Timed color fades with a hold window.
//!
//! Provides [`ColorFade`] which advances a color from its live value
//! toward a target over a fade window, pins it at the target for a hold
//! window, then goes idle until re-targeted. One engine is needed per
//! simultaneously fading color.

use crate::color::{CHANNEL_MAX, Color};
use crate::time::{TimeDuration, TimeInstant};

/// Milliseconds added to every fade window so the slope divisor is never zero.
pub const MIN_FADE_MS: u64 = 10;

/// Milliseconds added to every hold window.
pub const MIN_HOLD_MS: u64 = 1;

/// Where a fade engine is in its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeState {
    /// No fade in progress. The output is frozen at its last value.
    Idle,
    /// Output is moving toward the target along the per-channel slopes.
    Fading,
    /// Output is pinned at the target until the hold window ends.
    Holding,
}

/// Fades one color from its live value to a target over time.
///
/// Starting a fade captures the live value as the implicit start point
/// and derives a per-channel slope; each [`tick`](ColorFade::tick)
/// advances the output by slope times elapsed time. Channel levels are
/// carried as `f32` between ticks so sub-unit slopes accumulate instead
/// of truncating away, and are quantized to 12-bit values on read.
///
/// # Type Parameters
/// * `I` - Time instant type
#[derive(Debug, Clone, Copy)]
pub struct ColorFade<I: TimeInstant> {
    levels: [f32; 3],
    target: Color,
    slope: [f32; 3],
    fade_ms: u64,
    hold_end_ms: u64,
    started_at: Option<I>,
    last_tick: Option<I>,
    state: FadeState,
}

impl<I: TimeInstant> ColorFade<I> {
    /// Creates an idle engine holding the given color.
    pub fn new(initial: Color) -> Self {
        let [r, g, b] = initial.channels();
        Self {
            levels: [r as f32, g as f32, b as f32],
            target: initial,
            slope: [0.0; 3],
            fade_ms: 0,
            hold_end_ms: 0,
            started_at: None,
            last_tick: None,
            state: FadeState::Idle,
        }
    }

    /// Starts a fade from the live value toward `target`.
    ///
    /// The fade window is `fade_duration` plus [`MIN_FADE_MS`], the hold
    /// window `hold_duration` plus [`MIN_HOLD_MS`]; the floors keep a
    /// zero-length request from producing a degenerate slope. Restarting
    /// mid-fade is allowed and recomputes the slopes from wherever the
    /// output currently is.
    pub fn start(
        &mut self,
        now: I,
        target: Color,
        fade_duration: I::Duration,
        hold_duration: I::Duration,
    ) {
        let fade_ms = fade_duration.as_millis() + MIN_FADE_MS;
        let targets = target.channels();
        for channel in 0..3 {
            self.slope[channel] = (targets[channel] as f32 - self.levels[channel]) / fade_ms as f32;
        }
        self.target = target;
        self.fade_ms = fade_ms;
        self.hold_end_ms = fade_ms + hold_duration.as_millis() + MIN_HOLD_MS;
        self.started_at = Some(now);
        self.last_tick = Some(now);
        self.state = FadeState::Fading;
    }

    /// Advances the fade to `now`.
    ///
    /// Returns `true` if the quantized output moved this tick. Settling
    /// onto the target at the start of the hold window does not count as
    /// a change, and neither does going idle once the hold window ends.
    /// Calling again without time passing is a no-op, and an `Idle`
    /// engine only re-clamps its output.
    pub fn tick(&mut self, now: I) -> bool {
        let mut changed = false;
        if self.state != FadeState::Idle {
            if let (Some(started), Some(last)) = (self.started_at, self.last_tick) {
                let elapsed = now.duration_since(started).as_millis();
                if elapsed < self.fade_ms {
                    let step = now.duration_since(last).as_millis() as f32;
                    for (level, slope) in self.levels.iter_mut().zip(self.slope) {
                        let next = *level + slope * step;
                        if quantize(next) != quantize(*level) {
                            changed = true;
                        }
                        *level = next;
                    }
                    self.last_tick = Some(now);
                } else if elapsed < self.hold_end_ms {
                    // Kill accumulated float drift by pinning the exact target.
                    let [r, g, b] = self.target.channels();
                    self.levels = [r as f32, g as f32, b as f32];
                    self.state = FadeState::Holding;
                } else {
                    self.state = FadeState::Idle;
                }
            }
        }
        for level in &mut self.levels {
            *level = level.clamp(0.0, CHANNEL_MAX as f32);
        }
        changed
    }

    /// The current output color.
    pub fn current(&self) -> Color {
        Color::new(
            quantize(self.levels[0]),
            quantize(self.levels[1]),
            quantize(self.levels[2]),
        )
    }

    /// The color being approached (or last approached when idle).
    pub fn target(&self) -> Color {
        self.target
    }

    /// Where the engine is in its timeline.
    pub fn state(&self) -> FadeState {
        self.state
    }

    /// Returns `true` while fading or holding.
    pub fn is_active(&self) -> bool {
        self.state != FadeState::Idle
    }
}

fn quantize(level: f32) -> u16 {
    level.clamp(0.0, CHANNEL_MAX as f32) as u16
}
