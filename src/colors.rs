//! Color construction helpers.
//!
//! Provides convenience functions for building [`Color`] values from HSV
//! (Hue, Saturation, Value) components, which is more intuitive than raw
//! channel levels for many LED animations like color wheels and hue
//! rotations.
//!
//! All functions scale the result into the 12-bit channel range.

use crate::color::{CHANNEL_MAX, Color};
use palette::{FromColor, Hsv, Srgb};

/// Creates a color from HSV (Hue, Saturation, Value) components.
///
/// Hue is in degrees; saturation and value are in `0.0..=1.0`.
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Color {
    let rgb = Srgb::from_color(Hsv::new(hue, saturation, value));
    let scale = CHANNEL_MAX as f32;
    Color::new(
        (rgb.red * scale) as u16,
        (rgb.green * scale) as u16,
        (rgb.blue * scale) as u16,
    )
}

/// Creates a color from hue only (full saturation and value).
#[inline]
pub fn hue(hue_degrees: f32) -> Color {
    hsv(hue_degrees, 1.0, 1.0)
}
