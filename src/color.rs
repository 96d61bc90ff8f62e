//! Color values and pixel handles.
//!
//! [`Color`] is a plain RGBA value passed by value into every drawing call,
//! so no two owners ever alias the same mutable color. [`Pixel`] is the
//! canvas-owned slot that remembers the last color set for one role
//! (background, foreground, fill, stroke).

use crate::error::{CanvasError, Result};
use std::fmt;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const MID_GRAY: Self = Self::rgb(0x88, 0x88, 0x88);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a named, hex or functional CSS color. `"none"` is transparent.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::TRANSPARENT);
        }
        let parsed = csscolorparser::parse(trimmed)
            .map_err(|e| CanvasError::InvalidColor(format!("{}: {}", s, e)))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self { r, g, b, a })
    }

    /// `#rrggbb`, alpha omitted.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Same color with its alpha scaled by `opacity` (clamped to 0..=1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let factor = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f64 * factor).round() as u8,
            ..self
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A single color slot owned by one canvas.
///
/// Channel getters return normalized values in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixel {
    color: Color,
}

impl Pixel {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn red(&self) -> f64 {
        self.color.r as f64 / 255.0
    }

    pub fn green(&self) -> f64 {
        self.color.g as f64 / 255.0
    }

    pub fn blue(&self) -> f64 {
        self.color.b as f64 / 255.0
    }

    pub fn alpha(&self) -> f64 {
        self.color.a as f64 / 255.0
    }

    /// Set from a color string. On a parse failure the slot keeps its value.
    pub fn set_color(&mut self, color: &str) -> Result<()> {
        self.color = Color::parse(color)?;
        Ok(())
    }

    pub fn set(&mut self, color: Color) {
        self.color = color;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn hex(&self) -> String {
        self.color.to_hex()
    }
}
