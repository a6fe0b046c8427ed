//! Shared test infrastructure for rgb-animator integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use rand_core::RngCore;
use rgb_animator::{ChainBus, Color, TimeDuration, TimeInstant, TimeSource};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: RefCell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: RefCell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let mut current = self.current_time.borrow_mut();
        *current = TestInstant(current.0 + millis);
    }

    pub fn set_time(&self, time: TestInstant) {
        *self.current_time.borrow_mut() = time;
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        *self.current_time.borrow()
    }
}

// ============================================================================
// Mock Chain Bus
// ============================================================================

/// Everything a [`MockBus`] observed on the four lines.
///
/// Bits shifted since the last latch pulse accumulate in `pending_bits`;
/// each latch pulse decodes them into a frame of colors (the wire carries
/// blue, then red, then green, 12 bits each, most-significant bit first).
#[derive(Default)]
pub struct BusLog {
    pub pending_bits: Vec<bool>,
    pub frames: Vec<Vec<Color>>,
    pub latch_pulses: usize,
    pub blank_line: bool,
    pub blank_events: Vec<bool>,
}

impl BusLog {
    pub fn last_frame(&self) -> &[Color] {
        self.frames.last().expect("no frame latched")
    }
}

/// Mock chain bus that records shifted bits and decodes latched frames.
///
/// The log is shared, so tests keep a handle to it after the bus moves
/// into the driver.
pub struct MockBus {
    data_level: bool,
    log: Rc<RefCell<BusLog>>,
}

impl MockBus {
    pub fn new() -> (Self, Rc<RefCell<BusLog>>) {
        let log = Rc::new(RefCell::new(BusLog::default()));
        (
            Self {
                data_level: false,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl ChainBus for MockBus {
    fn set_data(&mut self, high: bool) {
        self.data_level = high;
    }

    fn pulse_clock(&mut self) {
        self.log.borrow_mut().pending_bits.push(self.data_level);
    }

    fn pulse_latch(&mut self) {
        let mut log = self.log.borrow_mut();
        log.latch_pulses += 1;
        let bits = std::mem::take(&mut log.pending_bits);
        assert_eq!(bits.len() % 36, 0, "frame is not a whole number of LEDs");
        let frame = bits
            .chunks(36)
            .map(|led| {
                let blue = word(&led[0..12]);
                let red = word(&led[12..24]);
                let green = word(&led[24..36]);
                Color::new(red, green, blue)
            })
            .collect();
        log.frames.push(frame);
    }

    fn set_blank(&mut self, blank: bool) {
        let mut log = self.log.borrow_mut();
        log.blank_line = blank;
        log.blank_events.push(blank);
    }
}

/// Assembles a 12-bit value from most-significant-bit-first samples.
fn word(bits: &[bool]) -> u16 {
    bits.iter().fold(0u16, |acc, &bit| acc << 1 | bit as u16)
}

// ============================================================================
// Mock RNG
// ============================================================================

/// Deterministic xorshift RNG for tests. Seed must be nonzero.
pub struct TestRng(pub u64);

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// ============================================================================
// Test Helper Colors
// ============================================================================

pub const RED: Color = Color::new(4095, 0, 0);
pub const GREEN: Color = Color::new(0, 4095, 0);
pub const BLUE: Color = Color::new(0, 0, 4095);
pub const WHITE: Color = Color::new(4095, 4095, 4095);

/// Compare two colors within a per-channel tolerance
pub fn colors_close(a: Color, b: Color, tolerance: u16) -> bool {
    a.red.abs_diff(b.red) <= tolerance
        && a.green.abs_diff(b.green) <= tolerance
        && a.blue.abs_diff(b.blue) <= tolerance
}
