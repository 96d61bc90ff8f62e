//! Parameter types for engine operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`Canvas`](crate::Canvas) (which decides which
//! primitives to call) and the [`backend`](super::backend) (which does the
//! actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Filter`]: Resampling filter family for resizes.
//! - [`Sharpening`]: Unsharp-mask parameters (radius + sigma).
//! - [`ResizeParams`]: Target dimensions, filter and blur factor.
//! - [`Region`]: A rectangle for crop and chop; the origin may be negative.
//! - [`Modulation`]: Brightness/saturation/hue percentages (100 = unchanged).

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Point,
    Triangle,
    #[default]
    Gaussian,
    Catrom,
    Lanczos,
}

/// Sharpening parameters for unsharp mask.
///
/// - `radius`: Kernel radius in pixels (0 = derived from sigma)
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub radius: f64,
    pub sigma: f64,
}

impl Sharpening {
    /// Light sharpening suitable for thumbnails.
    pub fn light() -> Self {
        Self {
            radius: 0.0,
            sigma: 0.5,
        }
    }
}

/// Parameters for a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub filter: Filter,
    /// 1.0 keeps the filter as is; above 1.0 blurs, below sharpens.
    pub blur: f64,
}

impl ResizeParams {
    /// Gaussian resize with a neutral blur factor.
    pub fn gaussian(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: Filter::Gaussian,
            blur: 1.0,
        }
    }
}

/// A rectangular region of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Percentages for a modulate operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    pub brightness: f64,
    pub saturation: f64,
    pub hue: f64,
}

impl Modulation {
    pub fn identity() -> Self {
        Self {
            brightness: 100.0,
            saturation: 100.0,
            hue: 100.0,
        }
    }

    /// Map a -1..=1 factor to a modulate percentage (0..=200).
    pub fn percent(factor: f64) -> f64 {
        100.0 + factor.clamp(-1.0, 1.0) * 100.0
    }
}
