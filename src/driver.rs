//! Shift-register LED chain driver.
//!
//! Provides [`ChainDriver`] which owns the per-channel output buffers and
//! the logical-to-physical translation table, and shifts 12-bit channel
//! data out to the controller chain over four logic lines. Also defines
//! the [`ChainBus`] trait for hardware abstraction and a ready-made
//! [`GpioChainBus`] implementation over `embedded-hal` output pins.

use crate::color::Color;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use embedded_hal::digital::{OutputPin, PinState};

/// Number of bits shifted per channel per LED.
const PWM_BITS: u32 = 12;

/// Trait for abstracting the four control lines of an LED controller chain.
///
/// Implement this for your platform's pins (GPIO, port expander, etc.) to
/// let the driver reach the hardware. The chain is output-only, so these
/// methods cannot fail; handle any hardware errors internally.
pub trait ChainBus {
    /// Drives the serial data line high or low.
    fn set_data(&mut self, high: bool);

    /// Pulses the serial clock line once, shifting in the data bit.
    fn pulse_clock(&mut self);

    /// Pulses the latch line once, moving shifted data to the outputs.
    fn pulse_latch(&mut self);

    /// Asserts (`true`) or releases (`false`) the blank line.
    fn set_blank(&mut self, blank: bool);
}

/// [`ChainBus`] implementation over four `embedded-hal` output pins.
///
/// Pin errors are discarded: the chain is unidirectional with no recovery
/// path, and GPIO writes on the supported targets are infallible.
pub struct GpioChainBus<Clk, Dat, Lat, Blk> {
    clock: Clk,
    data: Dat,
    latch: Lat,
    blank: Blk,
}

impl<Clk, Dat, Lat, Blk> GpioChainBus<Clk, Dat, Lat, Blk>
where
    Clk: OutputPin,
    Dat: OutputPin,
    Lat: OutputPin,
    Blk: OutputPin,
{
    /// Wraps four already-configured output pins.
    pub fn new(clock: Clk, data: Dat, latch: Lat, blank: Blk) -> Self {
        Self {
            clock,
            data,
            latch,
            blank,
        }
    }

    /// Releases the pins.
    pub fn release(self) -> (Clk, Dat, Lat, Blk) {
        (self.clock, self.data, self.latch, self.blank)
    }
}

impl<Clk, Dat, Lat, Blk> ChainBus for GpioChainBus<Clk, Dat, Lat, Blk>
where
    Clk: OutputPin,
    Dat: OutputPin,
    Lat: OutputPin,
    Blk: OutputPin,
{
    fn set_data(&mut self, high: bool) {
        let _ = self.data.set_state(PinState::from(high));
    }

    fn pulse_clock(&mut self) {
        let _ = self.clock.set_high();
        let _ = self.clock.set_low();
    }

    fn pulse_latch(&mut self) {
        let _ = self.latch.set_high();
        let _ = self.latch.set_low();
    }

    fn set_blank(&mut self, blank: bool) {
        let _ = self.blank.set_state(PinState::from(blank));
    }
}

/// Errors that can occur during driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// A logical LED index was outside the chain.
    IndexOutOfRange {
        /// The rejected logical index.
        index: usize,
        /// Number of LEDs on the chain.
        count: usize,
    },
    /// A translation table entry pointed outside the chain.
    TranslationOutOfRange {
        /// Position of the offending entry.
        index: usize,
        /// The out-of-range physical index it held.
        value: usize,
    },
    /// Two translation table entries mapped to the same physical index.
    TranslationDuplicate {
        /// The physical index claimed twice.
        value: usize,
    },
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DriverError::IndexOutOfRange { index, count } => {
                write!(f, "logical LED index {} out of range for {} LEDs", index, count)
            }
            DriverError::TranslationOutOfRange { index, value } => {
                write!(
                    f,
                    "translation entry {} holds out-of-range physical index {}",
                    index, value
                )
            }
            DriverError::TranslationDuplicate { value } => {
                write!(f, "translation maps physical index {} more than once", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

/// Builds the 1:1 translation table (logical index N drives physical LED N).
pub fn identity_translation<const LEDS: usize>() -> [usize; LEDS] {
    core::array::from_fn(|i| i)
}

/// Drives a chain of shift-register LED controllers.
///
/// Owns three per-channel output buffers sized for the full chain and a
/// logical-to-physical translation table, so patterns address LEDs by
/// logical position regardless of how the build is wired. Buffered data
/// reaches the hardware only on [`flush`](ChainDriver::flush), which is
/// throttled to a minimum update interval to bound bus traffic.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `B` - Chain bus implementation type
/// * `LEDS` - Total number of RGB LEDs on the chain
pub struct ChainDriver<'t, I: TimeInstant, T: TimeSource<I>, B: ChainBus, const LEDS: usize> {
    bus: B,
    time_source: &'t T,
    red: [u16; LEDS],
    green: [u16; LEDS],
    blue: [u16; LEDS],
    translation: [usize; LEDS],
    min_update_interval: I::Duration,
    last_update: Option<I>,
    blanked: bool,
}

impl<'t, I: TimeInstant, T: TimeSource<I>, B: ChainBus, const LEDS: usize>
    ChainDriver<'t, I, T, B, LEDS>
{
    /// Creates a driver with all outputs buffered dark.
    ///
    /// `translation` maps logical LED index to physical chain position and
    /// must be a permutation of `0..LEDS`; rewiring a build only means
    /// swapping this table, never touching pattern code.
    ///
    /// # Errors
    /// * `TranslationOutOfRange` - an entry points outside the chain
    /// * `TranslationDuplicate` - two entries share a physical index
    pub fn new(
        bus: B,
        time_source: &'t T,
        translation: [usize; LEDS],
        min_update_interval: I::Duration,
    ) -> Result<Self, DriverError> {
        let mut seen = [false; LEDS];
        for (index, &value) in translation.iter().enumerate() {
            if value >= LEDS {
                return Err(DriverError::TranslationOutOfRange { index, value });
            }
            if seen[value] {
                return Err(DriverError::TranslationDuplicate { value });
            }
            seen[value] = true;
        }

        Ok(Self {
            bus,
            time_source,
            red: [0; LEDS],
            green: [0; LEDS],
            blue: [0; LEDS],
            translation,
            min_update_interval,
            last_update: None,
            blanked: false,
        })
    }

    /// Number of LEDs on the chain.
    pub const fn len(&self) -> usize {
        LEDS
    }

    /// Returns `true` for a zero-length chain.
    pub const fn is_empty(&self) -> bool {
        LEDS == 0
    }

    /// Buffers a color for one logical LED.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - `logical` is not below the LED count
    pub fn set(&mut self, logical: usize, color: Color) -> Result<(), DriverError> {
        if logical >= LEDS {
            return Err(DriverError::IndexOutOfRange {
                index: logical,
                count: LEDS,
            });
        }
        self.write_translated(logical, color);
        Ok(())
    }

    /// Buffers a color for every logical LED.
    pub fn set_all(&mut self, color: Color) {
        for logical in 0..LEDS {
            self.write_translated(logical, color);
        }
    }

    /// Reads back the buffered color of a logical LED.
    pub fn get(&self, logical: usize) -> Option<Color> {
        let physical = *self.translation.get(logical)?;
        Some(Color::new(
            self.red[physical],
            self.green[physical],
            self.blue[physical],
        ))
    }

    /// Write path for indices already validated by the caller.
    pub(crate) fn write_translated(&mut self, logical: usize, color: Color) {
        let physical = self.translation[logical];
        self.red[physical] = color.red;
        self.green[physical] = color.green;
        self.blue[physical] = color.blue;
    }

    /// Shifts the buffered frame out to the chain and latches it.
    ///
    /// For every physical LED in chain order this shifts 12 bits of blue,
    /// then red, then green, most-significant bit first, pulsing the
    /// clock once per bit; one latch pulse follows the last LED. If the
    /// minimum update interval since the previous frame has not elapsed
    /// the frame is dropped (not queued) and `false` is returned; the
    /// next successful flush carries the latest buffer state.
    pub fn flush(&mut self) -> bool {
        let now = self.time_source.now();
        if let Some(last) = self.last_update {
            if now.duration_since(last).as_millis() < self.min_update_interval.as_millis() {
                return false;
            }
        }

        for physical in 0..LEDS {
            self.shift_channel(self.blue[physical]);
            self.shift_channel(self.red[physical]);
            self.shift_channel(self.green[physical]);
        }
        self.bus.pulse_latch();
        self.last_update = Some(self.time_source.now());
        true
    }

    fn shift_channel(&mut self, value: u16) {
        for bit in (0..PWM_BITS).rev() {
            self.bus.set_data(value >> bit & 1 == 1);
            self.bus.pulse_clock();
        }
    }

    /// Forces all outputs dark regardless of latched data.
    pub fn blank(&mut self) {
        self.bus.set_blank(true);
        self.blanked = true;
    }

    /// Restores outputs to the data latched by the last flush.
    pub fn unblank(&mut self) {
        self.bus.set_blank(false);
        self.blanked = false;
    }

    /// Returns `true` while the blank line is asserted.
    pub fn is_blanked(&self) -> bool {
        self.blanked
    }
}
