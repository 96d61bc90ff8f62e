//! Image engine trait and shared types.
//!
//! The [`ImageEngine`] trait is the capability boundary the canvas calls
//! into: decode, encode, geometry, metadata, effects and the vector merge.
//! Every operation is synchronous and runs to completion.
//!
//! Engines report failures twice: the returned [`BackendError`] is the
//! status, and the raster handle keeps a pending diagnostic that
//! [`ImageEngine::last_error`] drains. Callers must drain after every
//! failure so a stale message never leaks into a later, unrelated one.
//!
//! The production implementation is
//! [`RustEngine`](super::rust_backend::RustEngine): pure Rust, no system
//! libraries.

use super::params::{Modulation, Quality, Region, ResizeParams, Sharpening};
use crate::color::Color;
use crate::drawing::DrawCommand;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, BackendError>;

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Capabilities a canvas needs from an image engine.
///
/// A `Raster` is an engine-owned handle that may be empty (no image
/// loaded yet) and carries its own pending-exception slot.
pub trait ImageEngine {
    type Raster;

    /// Allocate an empty raster handle with the given background color.
    fn new_raster(&self, background: Color) -> Self::Raster;

    /// Release a raster handle. Dropping the handle is the default.
    fn release(&self, raster: Self::Raster) {
        drop(raster);
    }

    /// Decode an image file into the raster, replacing its content.
    fn read_file(&self, raster: &mut Self::Raster, path: &Path) -> EngineResult<()>;

    /// Decode an in-memory image into the raster, replacing its content.
    fn read_blob(&self, raster: &mut Self::Raster, bytes: &[u8]) -> EngineResult<()>;

    /// Encode to `path`, format chosen by the file extension.
    fn write_file(&self, raster: &mut Self::Raster, path: &Path) -> EngineResult<()>;

    /// Encode to bytes in the raster's format (decoded or overridden).
    fn write_blob(&self, raster: &mut Self::Raster) -> EngineResult<Vec<u8>>;

    /// Override the encoder used by [`ImageEngine::write_blob`], e.g. `"png"`.
    fn set_format(&self, raster: &mut Self::Raster, format: &str) -> EngineResult<()>;

    /// Extension of the encoder `write_blob` uses, when one was decoded or
    /// set.
    fn format(&self, raster: &Self::Raster) -> Option<String>;

    /// An independent copy of pixels, properties and settings. The pending
    /// diagnostic stays with the original.
    fn duplicate(&self, raster: &Self::Raster) -> Self::Raster;

    /// Replace the content with a `width × height` image filled with the
    /// raster's background color.
    fn new_image(&self, raster: &mut Self::Raster, width: u32, height: u32) -> EngineResult<()>;

    /// Current size; zero for an empty raster.
    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    fn property_names(&self, raster: &Self::Raster) -> Vec<String>;

    fn property(&self, raster: &Self::Raster, key: &str) -> Option<String>;

    fn set_property(&self, raster: &mut Self::Raster, key: &str, value: &str)
    -> EngineResult<()>;

    fn quality(&self, raster: &Self::Raster) -> Quality;

    fn set_quality(&self, raster: &mut Self::Raster, quality: Quality) -> EngineResult<()>;

    fn set_background(&self, raster: &mut Self::Raster, color: Color) -> EngineResult<()>;

    fn resize(&self, raster: &mut Self::Raster, params: &ResizeParams) -> EngineResult<()>;

    /// Resize with edge-aware smoothing.
    fn adaptive_resize(&self, raster: &mut Self::Raster, width: u32, height: u32)
    -> EngineResult<()>;

    /// Keep only `region`, clipped to the raster bounds.
    fn crop(&self, raster: &mut Self::Raster, region: Region) -> EngineResult<()>;

    /// Remove the rows and columns covered by `region` and collapse.
    fn chop(&self, raster: &mut Self::Raster, region: Region) -> EngineResult<()>;

    /// Composite `src` over `dst` with its top-left corner at `(x, y)`.
    fn composite_over(
        &self,
        dst: &mut Self::Raster,
        src: &Self::Raster,
        x: i64,
        y: i64,
    ) -> EngineResult<()>;

    /// Rotate by `degrees` (positive clockwise); exposed corners are
    /// filled with `background`.
    fn rotate(&self, raster: &mut Self::Raster, background: Color, degrees: f64)
    -> EngineResult<()>;

    /// Mirror top-bottom.
    fn flip(&self, raster: &mut Self::Raster) -> EngineResult<()>;

    /// Mirror left-right.
    fn flop(&self, raster: &mut Self::Raster) -> EngineResult<()>;

    fn modulate(&self, raster: &mut Self::Raster, modulation: Modulation) -> EngineResult<()>;

    fn blur(&self, raster: &mut Self::Raster, sigma: f64) -> EngineResult<()>;

    fn adaptive_blur(&self, raster: &mut Self::Raster, sigma: f64) -> EngineResult<()>;

    fn add_noise(&self, raster: &mut Self::Raster) -> EngineResult<()>;

    fn sigmoidal_contrast(
        &self,
        raster: &mut Self::Raster,
        sharpen: bool,
        alpha: f64,
        beta: f64,
    ) -> EngineResult<()>;

    fn contrast(&self, raster: &mut Self::Raster, sharpen: bool) -> EngineResult<()>;

    fn sepia_tone(&self, raster: &mut Self::Raster, threshold: f64) -> EngineResult<()>;

    fn sharpen(&self, raster: &mut Self::Raster, sharpening: Sharpening) -> EngineResult<()>;

    /// Rasterize `commands` onto the raster in one pass.
    fn draw(&self, raster: &mut Self::Raster, commands: &[DrawCommand]) -> EngineResult<()>;

    /// Take the pending diagnostic, clearing it.
    fn last_error(&self, raster: &mut Self::Raster) -> Option<String>;
}
