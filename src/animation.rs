//! Animation pattern engine.
//!
//! Provides [`Animator`] which owns a bounded pool of fade engines, a
//! bounded color sequence and the chain driver, and runs one of several
//! pattern algorithms over them. Each pattern is a pair of steps: an
//! `init` step that starts the next round of fades and a `control` step
//! that advances running fades and writes their colors to the LEDs.

use crate::color::Color;
use crate::driver::{ChainBus, ChainDriver, DriverError};
use crate::fade::ColorFade;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use heapless::Vec;
use rand_core::RngCore;

/// Maximum number of colors an animation can step through.
pub const MAX_COLORS: usize = 32;

/// Number of fade engines in the pool.
///
/// Bounds how many colors can be in flight at once; keep it at or below
/// the physical LED count. Patterns that need more LEDs than engines
/// reuse engines round-robin.
pub const MAX_FADERS: usize = 8;

/// Default fade duration in milliseconds.
pub const DEFAULT_FADE_MS: u64 = 500;

/// Default hold duration in milliseconds.
pub const DEFAULT_HOLD_MS: u64 = 0;

/// The animation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// All LEDs fade together through the color sequence, one color per cycle.
    Fader,
    /// Each engine drives its own LED; the sequence window slides across
    /// the chain so colors appear to travel.
    Chaser,
    /// Every engine independently fades to a fresh random color once it settles.
    Random,
    /// All LEDs fade together to one random color per cycle.
    RandomFader,
    /// All LEDs dark; the fade pool is left untouched.
    Stop,
}

/// Runs animation patterns over a pool of fade engines and an LED chain.
///
/// Tick this once per cooperative loop iteration. Each tick either starts
/// the next round of fades (when the pool has settled) or advances the
/// running ones, writes the resulting colors into the driver buffers, and
/// flushes to hardware only when something actually changed.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `B` - Chain bus implementation type
/// * `R` - Random number generator type
/// * `LEDS` - Total number of RGB LEDs on the chain
pub struct Animator<'t, I, T, B, R, const LEDS: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    B: ChainBus,
    R: RngCore,
{
    driver: ChainDriver<'t, I, T, B, LEDS>,
    time_source: &'t T,
    rng: R,
    pattern: Pattern,
    fade_duration: I::Duration,
    hold_duration: I::Duration,
    colors: Vec<Color, MAX_COLORS>,
    position: usize,
    faders: [ColorFade<I>; MAX_FADERS],
    changed: bool,
    is_fading: bool,
}

impl<'t, I, T, B, R, const LEDS: usize> Animator<'t, I, T, B, R, LEDS>
where
    I: TimeInstant,
    T: TimeSource<I>,
    B: ChainBus,
    R: RngCore,
{
    /// Creates an animator with the default configuration: the
    /// [`Pattern::RandomFader`] pattern, [`DEFAULT_FADE_MS`] fade,
    /// [`DEFAULT_HOLD_MS`] hold and an all-black color sequence.
    pub fn new(driver: ChainDriver<'t, I, T, B, LEDS>, time_source: &'t T, rng: R) -> Self {
        let mut animator = Self {
            driver,
            time_source,
            rng,
            pattern: Pattern::RandomFader,
            fade_duration: I::Duration::from_millis(DEFAULT_FADE_MS),
            hold_duration: I::Duration::from_millis(DEFAULT_HOLD_MS),
            colors: Vec::new(),
            position: 0,
            faders: [ColorFade::new(Color::BLACK); MAX_FADERS],
            changed: false,
            is_fading: false,
        };
        animator.change(
            Pattern::RandomFader,
            I::Duration::from_millis(DEFAULT_FADE_MS),
            I::Duration::from_millis(DEFAULT_HOLD_MS),
        );
        animator
    }

    /// Brings the chain up: blank, write the first sequence color to
    /// every LED, flush, unblank.
    ///
    /// Call once at startup, after the bus pins are configured.
    pub fn init(&mut self) {
        self.driver.blank();
        let initial = self.colors.first().copied().unwrap_or(Color::BLACK);
        self.driver.set_all(initial);
        self.driver.flush();
        self.driver.unblank();
    }

    /// Switches to a pattern that generates its own colors.
    ///
    /// Fully resets the engine: the color sequence becomes all black at
    /// maximum length, every pool engine is re-seeded to idle black, the
    /// position cursor returns to zero, and the next tick is forced to
    /// flush a frame.
    pub fn change(&mut self, pattern: Pattern, fade_duration: I::Duration, hold_duration: I::Duration) {
        self.colors.clear();
        for _ in 0..MAX_COLORS {
            let _ = self.colors.push(Color::BLACK);
        }
        self.reset(pattern, fade_duration, hold_duration);
    }

    /// Switches to a pattern stepping through the given color sequence.
    ///
    /// Same full reset as [`change`](Animator::change). The sequence is
    /// truncated to [`MAX_COLORS`]; an empty slice falls back to the
    /// all-black maximum-length sequence.
    pub fn change_with_colors(
        &mut self,
        pattern: Pattern,
        fade_duration: I::Duration,
        hold_duration: I::Duration,
        colors: &[Color],
    ) {
        if colors.is_empty() {
            self.change(pattern, fade_duration, hold_duration);
            return;
        }
        self.colors.clear();
        for &color in colors.iter().take(MAX_COLORS) {
            let _ = self.colors.push(color);
        }
        self.reset(pattern, fade_duration, hold_duration);
    }

    fn reset(&mut self, pattern: Pattern, fade_duration: I::Duration, hold_duration: I::Duration) {
        self.pattern = pattern;
        self.fade_duration = fade_duration;
        self.hold_duration = hold_duration;
        for fader in &mut self.faders {
            *fader = ColorFade::new(Color::BLACK);
        }
        self.position = 0;
        self.is_fading = false;
        self.changed = true;
    }

    /// Advances the animation one step and flushes on change.
    ///
    /// Runs the active pattern's control step while any pool engine is
    /// fading or holding, otherwise its init step to start the next
    /// cycle; then pushes a frame to the hardware if any channel moved
    /// (subject to the driver's update-interval throttle). Returns the
    /// changed flag.
    pub fn tick(&mut self) -> bool {
        let now = self.time_source.now();
        match self.pattern {
            Pattern::Fader => {
                if self.is_fading {
                    self.fader_control(now);
                } else {
                    self.fader_init(now);
                }
            }
            Pattern::Chaser => {
                if self.is_fading {
                    self.chaser_control(now);
                } else {
                    self.chaser_init(now);
                }
            }
            Pattern::Random => {
                if self.is_fading {
                    self.random_control(now);
                } else {
                    self.random_init(now);
                }
            }
            Pattern::RandomFader => {
                if self.is_fading {
                    self.random_fader_control(now);
                } else {
                    self.random_fader_init(now);
                }
            }
            Pattern::Stop => {
                self.driver.set_all(Color::BLACK);
            }
        }
        if self.changed {
            self.driver.flush();
        }
        self.changed
    }

    /// Starts the pool's first engine toward the next sequence color.
    fn fader_init(&mut self, now: I) {
        self.advance_position(self.colors.len() - 1);
        self.faders[0].start(
            now,
            self.colors[self.position],
            self.fade_duration,
            self.hold_duration,
        );
        self.changed = self.faders[0].tick(now);
        self.is_fading = self.faders[0].is_active();
    }

    /// Advances the single engine and mirrors it onto every LED.
    fn fader_control(&mut self, now: I) {
        self.changed = self.faders[0].tick(now);
        self.driver.set_all(self.faders[0].current());
        self.is_fading = self.faders[0].is_active();
    }

    /// Starts the next chase cycle.
    ///
    /// How colors map onto engines depends on how the sequence length
    /// compares to the pool size; each case cycles the position cursor
    /// over its own range, so the modulus is recomputed every cycle.
    fn chaser_init(&mut self, now: I) {
        self.changed = false;
        self.is_fading = false;
        let num_colors = self.colors.len();

        if num_colors == MAX_FADERS {
            // One engine per color; the cursor offsets which engine gets
            // which color, sliding the whole window one step per cycle.
            self.advance_position(num_colors - 1);
            for i in 0..MAX_FADERS {
                let engine = wrap_back(self.position, i, MAX_FADERS);
                self.faders[engine].start(
                    now,
                    self.colors[i],
                    self.fade_duration,
                    self.hold_duration,
                );
                self.changed = self.changed || self.faders[i].tick(now);
                self.is_fading = self.is_fading || self.faders[i].is_active();
            }
        }

        if num_colors > MAX_FADERS {
            // More colors than engines: engine i takes the color at
            // cursor minus i, wrapping over the sequence length.
            self.advance_position(num_colors - 1);
            for i in 0..MAX_FADERS {
                let color = wrap_back(self.position, i, num_colors);
                self.faders[i].start(
                    now,
                    self.colors[color],
                    self.fade_duration,
                    self.hold_duration,
                );
                self.changed = self.changed || self.faders[i].tick(now);
                self.is_fading = self.is_fading || self.faders[i].is_active();
            }
        }

        if num_colors < MAX_FADERS {
            // Fewer colors than engines: cursor ranges over the pool, and
            // engines past the last color fade to black.
            self.advance_position(MAX_FADERS - 1);
            for i in 0..MAX_FADERS {
                let target = if i < num_colors {
                    self.colors[i]
                } else {
                    Color::BLACK
                };
                let engine = wrap_back(self.position, i, MAX_FADERS);
                self.faders[engine].start(now, target, self.fade_duration, self.hold_duration);
                self.changed = self.changed || self.faders[i].tick(now);
                self.is_fading = self.is_fading || self.faders[i].is_active();
            }
        }
    }

    /// Advances every engine and spreads the pool across the chain.
    ///
    /// LED `i` shows engine `i % MAX_FADERS`, so the pool wraps around
    /// when the chain is longer than the pool.
    fn chaser_control(&mut self, now: I) {
        self.changed = false;
        self.is_fading = false;
        for i in 0..LEDS {
            let engine = i % MAX_FADERS;
            self.changed = self.faders[engine].tick(now) || self.changed;
            self.driver.write_translated(i, self.faders[engine].current());
            self.is_fading = self.is_fading || self.faders[engine].is_active();
        }
    }

    /// Starts every engine toward a fresh random color.
    fn random_init(&mut self, now: I) {
        self.changed = false;
        self.is_fading = false;
        for fader in &mut self.faders {
            let target = Color::random(&mut self.rng);
            fader.start(now, target, self.fade_duration, self.hold_duration);
            self.changed = self.changed || fader.tick(now);
            self.is_fading = self.is_fading || fader.is_active();
        }
    }

    /// Advances every engine and deals the pool out round-robin.
    fn random_control(&mut self, now: I) {
        self.changed = false;
        self.is_fading = false;
        self.position = 0;
        for i in 0..LEDS {
            self.changed = self.faders[self.position].tick(now) || self.changed;
            self.driver
                .write_translated(i, self.faders[self.position].current());
            self.is_fading = self.is_fading || self.faders[self.position].is_active();
            self.advance_position(MAX_FADERS - 1);
        }
    }

    /// Starts the pool's first engine toward one random color.
    fn random_fader_init(&mut self, now: I) {
        let target = Color::random(&mut self.rng);
        self.faders[0].start(now, target, self.fade_duration, self.hold_duration);
        self.changed = self.faders[0].tick(now);
        self.is_fading = self.faders[0].is_active();
    }

    /// Advances the single engine and mirrors it onto every LED.
    fn random_fader_control(&mut self, now: I) {
        self.changed = self.faders[0].tick(now);
        self.driver.set_all(self.faders[0].current());
        self.is_fading = self.faders[0].is_active();
    }

    /// Cycles the position cursor through `0..=max`.
    fn advance_position(&mut self, max: usize) {
        if self.position < max {
            self.position += 1;
        } else {
            self.position = 0;
        }
    }

    /// Buffers a color for one logical LED, bypassing pattern logic.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - `logical` is not below the LED count
    pub fn set_led(&mut self, logical: usize, color: Color) -> Result<(), DriverError> {
        self.driver.set(logical, color)
    }

    /// Buffers a color for every LED, bypassing pattern logic.
    pub fn set_all_leds(&mut self, color: Color) {
        self.driver.set_all(color);
    }

    /// Pushes the buffered frame to the chain (subject to the throttle).
    pub fn flush(&mut self) -> bool {
        self.driver.flush()
    }

    /// The active pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Returns `true` while any pool engine is fading or holding.
    pub fn is_fading(&self) -> bool {
        self.is_fading
    }

    /// The position cursor of the active pattern.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The color sequence the active pattern steps through.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// The fade engine pool.
    pub fn faders(&self) -> &[ColorFade<I>; MAX_FADERS] {
        &self.faders
    }

    /// The chain driver.
    pub fn driver(&self) -> &ChainDriver<'t, I, T, B, LEDS> {
        &self.driver
    }

    /// Mutable access to the chain driver.
    pub fn driver_mut(&mut self) -> &mut ChainDriver<'t, I, T, B, LEDS> {
        &mut self.driver
    }
}

/// Steps `offset` places backwards from `position` on a ring of `len` slots.
fn wrap_back(position: usize, offset: usize, len: usize) -> usize {
    if position >= offset {
        position - offset
    } else {
        len + position - offset
    }
}
