//! Whole-image filters.

use super::Canvas;
use crate::error::Result;
use crate::imaging::{ImageEngine, Modulation, Sharpening};

impl<E: ImageEngine> Canvas<E> {
    pub fn blur(&mut self, sigma: f64) -> Result<()> {
        self.with_raster(|engine, raster| engine.blur(raster, sigma))
    }

    /// Blur that backs off near edges.
    pub fn adaptive_blur(&mut self, sigma: f64) -> Result<()> {
        self.with_raster(|engine, raster| engine.adaptive_blur(raster, sigma))
    }

    /// Gaussian noise.
    pub fn add_noise(&mut self) -> Result<()> {
        self.with_raster(|engine, raster| engine.add_noise(raster))
    }

    /// Adjust brightness by `factor` in -1.0..=1.0 (clamped).
    pub fn set_brightness(&mut self, factor: f64) -> Result<()> {
        self.modulate(Modulation {
            brightness: Modulation::percent(factor),
            ..Modulation::identity()
        })
    }

    /// Adjust saturation by `factor` in -1.0..=1.0 (clamped).
    pub fn set_saturation(&mut self, factor: f64) -> Result<()> {
        self.modulate(Modulation {
            saturation: Modulation::percent(factor),
            ..Modulation::identity()
        })
    }

    /// Rotate hue by `factor` in -1.0..=1.0 (clamped); ±1.0 is half a turn.
    pub fn set_hue(&mut self, factor: f64) -> Result<()> {
        self.modulate(Modulation {
            hue: Modulation::percent(factor),
            ..Modulation::identity()
        })
    }

    fn modulate(&mut self, modulation: Modulation) -> Result<()> {
        self.with_raster(|engine, raster| engine.modulate(raster, modulation))
    }

    /// Sigmoidal contrast curve with strength `alpha` centered on `beta`
    /// (a percentage of the channel range). `sharpen` false reduces
    /// contrast instead.
    pub fn sigmoidal_contrast(&mut self, sharpen: bool, alpha: f64, beta: f64) -> Result<()> {
        self.with_raster(|engine, raster| engine.sigmoidal_contrast(raster, sharpen, alpha, beta))
    }

    pub fn contrast(&mut self, sharpen: bool) -> Result<()> {
        self.with_raster(|engine, raster| engine.contrast(raster, sharpen))
    }

    /// Sepia toning; `threshold` is a percentage of the channel range.
    pub fn sepia_tone(&mut self, threshold: f64) -> Result<()> {
        self.with_raster(|engine, raster| engine.sepia_tone(raster, threshold))
    }

    /// Unsharp mask; a zero radius lets the engine derive it from `sigma`.
    pub fn sharpen(&mut self, radius: f64, sigma: f64) -> Result<()> {
        self.with_raster(|engine, raster| engine.sharpen(raster, Sharpening { radius, sigma }))
    }
}
