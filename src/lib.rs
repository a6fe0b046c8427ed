#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Color`**: A 3-channel additive color with 12 bits per channel (0-4095)
//! - **`ColorFade`**: Fades one color toward a target over time, then holds it
//! - **`Pattern`**: Which animation algorithm runs (`Fader`, `Chaser`, `Random`, `RandomFader`, `Stop`)
//! - **`Animator`**: Runs a pattern over a fixed pool of fade engines and an LED chain
//! - **`ChainDriver`**: Buffers channel data and shifts it out to the controller chain
//! - **`ChainBus`**: Trait to implement for your chain's four control lines
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Colors are plain 12-bit integer channel values matching the controller's
//! PWM registers; no floating-point color space is exposed. Randomized
//! patterns draw their colors from any `rand_core::RngCore` you hand in.

pub mod animation;
pub mod color;
pub mod colors;
pub mod driver;
pub mod fade;
pub mod time;

pub use animation::{Animator, DEFAULT_FADE_MS, DEFAULT_HOLD_MS, MAX_COLORS, MAX_FADERS, Pattern};
pub use color::{CHANNEL_MAX, Color};
pub use driver::{ChainBus, ChainDriver, DriverError, GpioChainBus, identity_translation};
pub use fade::{ColorFade, FadeState, MIN_FADE_MS, MIN_HOLD_MS};
pub use time::{TimeDuration, TimeInstant, TimeSource};
