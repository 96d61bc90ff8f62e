//! The canvas: one raster plus the color slots and drawing context that
//! travel with it.
//!
//! A [`Canvas`] owns exactly one engine raster, four [`Pixel`] slots
//! (background, foreground, fill, stroke) and one [`DrawingContext`]. They
//! are created together and released together by [`Canvas::destroy`] (or on
//! drop); once destroyed every other operation reports
//! [`CanvasError::Destroyed`].
//!
//! Operations are grouped by concern:
//!
//! - this module: lifecycle, file and blob I/O, metadata, colors, quality
//! - [`drawing`]: drawing attributes, transforms, shapes, push/pop
//! - [`text`]: text properties and annotations
//! - [`geometry`]: resize, crop, thumbnail, orientation, rotation
//! - [`effects`]: blur, noise, modulation, contrast, sepia, sharpen
//!
//! Every engine failure drains the raster's pending diagnostic into the
//! returned [`CanvasError::Engine`].

mod drawing;
mod effects;
mod geometry;
mod text;

use crate::color::{Color, Pixel};
use crate::config::{CanvasConfig, CanvasDefaults};
use crate::drawing::{DrawingContext, TextProperties};
use crate::environment;
use crate::error::{CanvasError, Result};
use crate::imaging::{EngineResult, Filter, ImageEngine, Quality, RustEngine};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Everything a live canvas owns besides the engine itself.
struct Resources<R> {
    raster: R,
    background: Pixel,
    foreground: Pixel,
    fill: Pixel,
    stroke: Pixel,
    drawing: DrawingContext,
}

/// An image surface with a vector drawing layer.
///
/// Generic over the [`ImageEngine`] doing the pixel work; the default is the
/// pure Rust [`RustEngine`].
///
/// # Example
/// ```no_run
/// use raster_canvas::Canvas;
///
/// # fn main() -> raster_canvas::Result<()> {
/// let mut canvas = Canvas::new();
/// canvas.open("photo.jpg")?;
/// canvas.auto_orientate().ok();
/// canvas.thumbnail(200, 200)?;
/// canvas.write("thumb.png")?;
/// # Ok(())
/// # }
/// ```
pub struct Canvas<E: ImageEngine = RustEngine> {
    engine: E,
    resources: Option<Resources<E::Raster>>,
    text: Option<TextProperties>,
    filename: Option<PathBuf>,
    thumbnail_filter: Filter,
    thumbnail_blur: f64,
}

impl Canvas<RustEngine> {
    /// A canvas on the pure Rust engine with stock defaults.
    pub fn new() -> Self {
        Self::with_engine(RustEngine::new())
    }
}

impl Default for Canvas<RustEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ImageEngine> Canvas<E> {
    pub fn with_engine(engine: E) -> Self {
        Self::with_defaults(engine, &CanvasDefaults::default())
    }

    /// Build a canvas from a validated configuration.
    pub fn with_config(engine: E, config: &CanvasConfig) -> Result<Self> {
        let defaults = config.resolve()?;
        Ok(Self::with_defaults(engine, &defaults))
    }

    pub fn with_defaults(engine: E, defaults: &CanvasDefaults) -> Self {
        environment::init();

        let mut raster = engine.new_raster(defaults.background);
        if engine.set_quality(&mut raster, defaults.quality).is_err() {
            log::warn!(
                target: "canvas",
                "engine rejected default quality: {}",
                engine.last_error(&mut raster).unwrap_or_default()
            );
        }

        let mut drawing = DrawingContext::new();
        let state = drawing.state_mut();
        state.stroke_color = defaults.stroke.color;
        state.stroke_width = defaults.stroke.width;
        state.stroke_opacity = defaults.stroke.opacity;
        state.stroke_antialias = defaults.stroke.antialias;
        state.line_cap = defaults.stroke.line_cap;
        state.line_join = defaults.stroke.line_join;
        state.fill_color = defaults.fill;

        log::debug!(target: "canvas", "canvas created");
        Self {
            engine,
            resources: Some(Resources {
                raster,
                background: Pixel::new(defaults.background),
                foreground: Pixel::new(defaults.foreground),
                fill: Pixel::new(defaults.fill),
                stroke: Pixel::new(defaults.stroke.color),
                drawing,
            }),
            text: None,
            filename: None,
            thumbnail_filter: defaults.thumbnail_filter,
            thumbnail_blur: defaults.thumbnail_blur,
        }
    }

    // -------------------------------------------------------------------------
    // Resource access
    // -------------------------------------------------------------------------

    fn resources(&self) -> Result<&Resources<E::Raster>> {
        self.resources.as_ref().ok_or(CanvasError::Destroyed)
    }

    fn resources_mut(&mut self) -> Result<&mut Resources<E::Raster>> {
        self.resources.as_mut().ok_or(CanvasError::Destroyed)
    }

    /// Run one engine call against the raster, draining its diagnostic on
    /// failure.
    fn with_raster<T>(
        &mut self,
        op: impl FnOnce(&E, &mut E::Raster) -> EngineResult<T>,
    ) -> Result<T> {
        let res = self.resources.as_mut().ok_or(CanvasError::Destroyed)?;
        op(&self.engine, &mut res.raster)
            .map_err(|status| CanvasError::engine(self.engine.last_error(&mut res.raster), status))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine raster handle, for reading pixels directly.
    pub fn raster(&self) -> Result<&E::Raster> {
        Ok(&self.resources()?.raster)
    }

    pub fn is_destroyed(&self) -> bool {
        self.resources.is_none()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Release the color slots, the drawing context and the raster, in that
    /// order. A second call reports [`CanvasError::NothingToDestroy`].
    pub fn destroy(&mut self) -> Result<()> {
        let Some(resources) = self.resources.take() else {
            return Err(CanvasError::NothingToDestroy);
        };
        let Resources {
            raster,
            background,
            foreground,
            fill,
            stroke,
            drawing,
        } = resources;

        drop((background, foreground, fill, stroke));
        if !drawing.pending().is_empty() {
            log::debug!(
                target: "canvas",
                "discarding {} unmerged drawing commands",
                drawing.pending().len()
            );
        }
        drop(drawing);
        self.engine.release(raster);
        self.text = None;
        log::debug!(target: "canvas", "canvas destroyed");
        Ok(())
    }

    /// Decode an image file, replacing the current raster content.
    ///
    /// The path is checked before the engine sees it: a missing path is
    /// [`CanvasError::NotFound`], a directory [`CanvasError::IsDirectory`].
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.resources()?;
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => return Err(CanvasError::IsDirectory(path.to_path_buf())),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CanvasError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(CanvasError::Io(e)),
        }

        self.with_raster(|engine, raster| engine.read_file(raster, path))?;
        self.filename = Some(path.to_path_buf());
        log::debug!(target: "canvas", "opened {}", path.display());
        Ok(())
    }

    /// Decode an in-memory image, replacing the current raster content.
    pub fn open_blob(&mut self, bytes: &[u8]) -> Result<()> {
        self.with_raster(|engine, raster| engine.read_blob(raster, bytes))
    }

    /// Merge pending drawings, then encode to `path` by its extension.
    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.update()?;
        self.with_raster(|engine, raster| engine.write_file(raster, path))?;
        self.filename = Some(path.to_path_buf());
        log::debug!(target: "canvas", "wrote {}", path.display());
        Ok(())
    }

    /// Merge pending drawings, then encode to bytes.
    ///
    /// The format is the decoded one unless overridden by
    /// [`Canvas::set_format`].
    pub fn blob(&mut self) -> Result<Vec<u8>> {
        self.update()?;
        self.with_raster(|engine, raster| engine.write_blob(raster))
    }

    /// Override the encoder used by [`Canvas::blob`], e.g. `"png"`.
    pub fn set_format(&mut self, format: &str) -> Result<()> {
        self.with_raster(|engine, raster| engine.set_format(raster, format))
    }

    /// Merge every pending drawing command into the raster.
    ///
    /// With nothing pending this does nothing, so calling it repeatedly is
    /// harmless.
    pub fn update(&mut self) -> Result<()> {
        let res = self.resources.as_mut().ok_or(CanvasError::Destroyed)?;
        let pending = res.drawing.pending().len();
        if pending == 0 {
            return Ok(());
        }
        if let Err(status) = self.engine.draw(&mut res.raster, res.drawing.pending()) {
            return Err(CanvasError::engine(
                self.engine.last_error(&mut res.raster),
                status,
            ));
        }
        res.drawing.take_commands();
        log::debug!(target: "canvas", "merged {} drawing commands", pending);
        Ok(())
    }

    /// Replace the content with a `width × height` image of the background
    /// color.
    pub fn blank(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        self.with_raster(|engine, raster| engine.new_image(raster, width, height))
    }

    /// An independent copy: a new canvas with a transparent background, the
    /// same size, and this canvas's pixels composited at the origin. Quality
    /// and output format carry over.
    pub fn try_clone(&self) -> Result<Self>
    where
        E: Clone,
    {
        let source = self.resources()?;
        let (width, height) = self.dimensions()?;

        let mut clone = Self::with_engine(self.engine.clone());
        clone.thumbnail_filter = self.thumbnail_filter;
        clone.thumbnail_blur = self.thumbnail_blur;
        clone.set_background(Color::TRANSPARENT)?;
        let quality = self.engine.quality(&source.raster);
        clone.with_raster(|engine, raster| engine.set_quality(raster, quality))?;
        if let Some(format) = self.engine.format(&source.raster) {
            clone.with_raster(|engine, raster| engine.set_format(raster, &format))?;
        }
        if width > 0 && height > 0 {
            clone.blank(width, height)?;
            clone.with_raster(|engine, raster| engine.composite_over(raster, &source.raster, 0, 0))?;
        }
        Ok(clone)
    }

    /// Last path successfully opened or written.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    // -------------------------------------------------------------------------
    // Size and metadata
    // -------------------------------------------------------------------------

    pub fn width(&self) -> Result<u32> {
        Ok(self.dimensions()?.0)
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.dimensions()?.1)
    }

    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let res = self.resources()?;
        Ok(self.engine.dimensions(&res.raster).as_tuple())
    }

    /// Every property the engine knows for the loaded image, keys and values
    /// trimmed.
    pub fn metadata(&self) -> Result<BTreeMap<String, String>> {
        let res = self.resources()?;
        Ok(self
            .engine
            .property_names(&res.raster)
            .into_iter()
            .filter_map(|key| {
                let value = self.engine.property(&res.raster, &key)?;
                Some((key.trim().to_string(), value.trim().to_string()))
            })
            .collect())
    }

    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<()> {
        self.with_raster(|engine, raster| engine.set_property(raster, key, value))
    }

    // -------------------------------------------------------------------------
    // Colors and quality
    // -------------------------------------------------------------------------

    pub fn set_background_color(&mut self, color: &str) -> Result<()> {
        self.set_background(Color::parse(color)?)
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        self.with_raster(|engine, raster| engine.set_background(raster, color))?;
        self.resources_mut()?.background.set(color);
        Ok(())
    }

    pub fn background_color(&self) -> Result<Color> {
        Ok(self.resources()?.background.color())
    }

    pub fn set_foreground_color(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        self.resources_mut()?.foreground.set(color);
        Ok(())
    }

    pub fn foreground_color(&self) -> Result<Color> {
        Ok(self.resources()?.foreground.color())
    }

    /// The background slot, for per-channel reads.
    pub fn background_pixel(&self) -> Result<&Pixel> {
        Ok(&self.resources()?.background)
    }

    pub fn foreground_pixel(&self) -> Result<&Pixel> {
        Ok(&self.resources()?.foreground)
    }

    /// Compression quality for lossy encoders, clamped to 1..=100.
    pub fn set_quality(&mut self, quality: u32) -> Result<()> {
        self.with_raster(|engine, raster| engine.set_quality(raster, Quality::new(quality)))
    }

    pub fn quality(&self) -> Result<u32> {
        let res = self.resources()?;
        Ok(self.engine.quality(&res.raster).value())
    }
}

impl<E: ImageEngine> Drop for Canvas<E> {
    fn drop(&mut self) {
        if self.resources.is_some() {
            let _ = self.destroy();
        }
    }
}
