//! Size, shape and orientation of the raster.
//!
//! Thumbnailing follows a two-branch plan (see
//! [`plan_thumbnail`](crate::imaging::plan_thumbnail)): sources smaller than
//! the target are padded onto a transparent backdrop, larger ones are shrunk
//! so they cover the target. Both branches end in a centered crop to the
//! exact requested size.

use super::Canvas;
use crate::color::Color;
use crate::error::{CanvasError, Result};
use crate::imaging::{
    EngineResult, Filter, ImageEngine, Region, ResizeParams, ThumbnailPlan,
    calculate_fit_dimensions, center_crop, plan_thumbnail, resolve_resize_dimensions,
};
use crate::orientation::{ORIENTATION_PROPERTY, OrientStep, Orientation};

impl<E: ImageEngine> Canvas<E> {
    /// Resize with a Gaussian filter and neutral blur.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize_with_filter(width, height, Filter::Gaussian, 1.0)
    }

    /// Resize with an explicit filter. A zero width or height is derived from
    /// the current aspect ratio; both zero keeps the current size.
    pub fn resize_with_filter(
        &mut self,
        width: u32,
        height: u32,
        filter: Filter,
        blur: f64,
    ) -> Result<()> {
        let (width, height) = resolve_resize_dimensions(self.dimensions()?, (width, height));
        let params = ResizeParams {
            width,
            height,
            filter,
            blur,
        };
        self.with_raster(|engine, raster| engine.resize(raster, &params))
    }

    pub fn adaptive_resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        self.with_raster(|engine, raster| engine.adaptive_resize(raster, width, height))
    }

    /// Scale proportionally so the image fits inside `width × height`.
    pub fn fit(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        let (fit_w, fit_h) = calculate_fit_dimensions(self.dimensions()?, (width, height));
        self.resize(fit_w, fit_h)
    }

    /// Keep the `width × height` region at `(x, y)`, clipped to the image.
    pub fn crop(&mut self, x: i64, y: i64, width: u32, height: u32) -> Result<()> {
        let region = Region::new(x, y, width, height);
        self.with_raster(|engine, raster| engine.crop(raster, region))
    }

    /// Remove the band of columns `x..x + width` and rows `y..y + height`,
    /// collapsing what remains.
    pub fn chop(&mut self, x: i64, y: i64, width: u32, height: u32) -> Result<()> {
        let region = Region::new(x, y, width, height);
        self.with_raster(|engine, raster| engine.chop(raster, region))
    }

    /// Composite `other` over this canvas with its top-left corner at
    /// `(x, y)`. Pending drawings on `other` are not merged.
    pub fn append_canvas(&mut self, other: &Canvas<E>, x: i64, y: i64) -> Result<()> {
        let source = &other.resources()?.raster;
        let res = self.resources.as_mut().ok_or(CanvasError::Destroyed)?;
        self.engine
            .composite_over(&mut res.raster, source, x, y)
            .map_err(|status| CanvasError::engine(self.engine.last_error(&mut res.raster), status))
    }

    /// Rotate the whole raster by `radians`, positive clockwise. Corners
    /// exposed by a non-right angle take the background color.
    pub fn rotate_canvas(&mut self, radians: f64) -> Result<()> {
        self.rotate_degrees(radians.to_degrees())
    }

    fn rotate_degrees(&mut self, degrees: f64) -> Result<()> {
        let background = self.resources()?.background.color();
        self.with_raster(|engine, raster| engine.rotate(raster, background, degrees))
    }

    /// Mirror top-bottom.
    pub fn flip(&mut self) -> Result<()> {
        self.with_raster(|engine, raster| engine.flip(raster))
    }

    /// Mirror left-right.
    pub fn flop(&mut self) -> Result<()> {
        self.with_raster(|engine, raster| engine.flop(raster))
    }

    /// Produce exactly `width × height`, padding small sources onto a
    /// transparent backdrop and shrinking large ones before a center crop.
    pub fn thumbnail(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        let current = self.dimensions()?;
        let target = (width, height);

        match plan_thumbnail(current, target) {
            ThumbnailPlan::Pad {
                side,
                offset_x,
                offset_y,
            } => {
                log::debug!(
                    target: "canvas",
                    "thumbnail {}x{} -> {}x{}: pad on {}x{} backdrop at ({}, {})",
                    current.0, current.1, width, height, side, side, offset_x, offset_y
                );
                self.pad_onto_backdrop(side, offset_x, offset_y)?;
            }
            ThumbnailPlan::Shrink {
                width: shrink_w,
                height: shrink_h,
            } => {
                log::debug!(
                    target: "canvas",
                    "thumbnail {}x{} -> {}x{}: shrink to {}x{}",
                    current.0, current.1, width, height, shrink_w, shrink_h
                );
                let params = ResizeParams {
                    width: shrink_w,
                    height: shrink_h,
                    filter: self.thumbnail_filter,
                    blur: self.thumbnail_blur,
                };
                self.with_raster(|engine, raster| engine.resize(raster, &params))?;
            }
        }

        let region = center_crop(self.dimensions()?, target);
        self.with_raster(|engine, raster| engine.crop(raster, region))
    }

    /// Replace the raster with a `side × side` transparent backdrop holding
    /// the current image at `(x, y)`.
    fn pad_onto_backdrop(&mut self, side: u32, x: i64, y: i64) -> Result<()> {
        self.replace_raster(
            |engine, _| engine.new_raster(Color::TRANSPARENT),
            |engine, backdrop, source, background| {
                fill_backdrop(engine, backdrop, source, side, x, y, background)
            },
        )
    }

    /// Build a replacement raster and swap it in only when `build` succeeds.
    /// On failure the replacement is released and the current raster is
    /// untouched.
    fn replace_raster(
        &mut self,
        init: impl FnOnce(&E, &E::Raster) -> E::Raster,
        build: impl FnOnce(&E, &mut E::Raster, &E::Raster, Color) -> EngineResult<()>,
    ) -> Result<()> {
        let res = self.resources.as_mut().ok_or(CanvasError::Destroyed)?;
        let engine = &self.engine;

        let mut scratch = init(engine, &res.raster);
        let background = res.background.color();
        if let Err(status) = build(engine, &mut scratch, &res.raster, background) {
            let err = CanvasError::engine(engine.last_error(&mut scratch), status);
            engine.release(scratch);
            return Err(err);
        }

        let original = std::mem::replace(&mut res.raster, scratch);
        engine.release(original);
        Ok(())
    }

    /// The orientation recorded in the image metadata, if any.
    pub fn orientation(&self) -> Result<Option<Orientation>> {
        let res = self.resources()?;
        Ok(self
            .engine
            .property(&res.raster, ORIENTATION_PROPERTY)
            .as_deref()
            .and_then(Orientation::parse))
    }

    /// Bring the pixels upright according to the EXIF orientation tag, then
    /// mark the image as top-left.
    ///
    /// Fails with [`CanvasError::NoOrientationData`] without touching the
    /// pixels when the tag is missing, unparsable or undefined. The steps
    /// run on a copy, so a failing step leaves pixels and tag as they were.
    /// Running it twice is a no-op the second time.
    pub fn auto_orientate(&mut self) -> Result<()> {
        let orientation = self.orientation()?.ok_or(CanvasError::NoOrientationData)?;
        let steps = orientation.steps().ok_or(CanvasError::NoOrientationData)?;
        let top_left = Orientation::TopLeft.code().to_string();

        log::debug!(target: "canvas", "orientation {} ({})", orientation, orientation.code());
        if steps.is_empty() {
            return self.set_metadata(ORIENTATION_PROPERTY, &top_left);
        }
        self.replace_raster(
            |engine, raster| engine.duplicate(raster),
            |engine, scratch, _, background| {
                for step in steps {
                    match *step {
                        OrientStep::Flip => engine.flip(scratch)?,
                        OrientStep::Flop => engine.flop(scratch)?,
                        OrientStep::Rotate(degrees) => engine.rotate(scratch, background, degrees)?,
                    }
                }
                engine.set_property(scratch, ORIENTATION_PROPERTY, &top_left)
            },
        )
    }
}

fn fill_backdrop<E: ImageEngine>(
    engine: &E,
    backdrop: &mut E::Raster,
    source: &E::Raster,
    side: u32,
    x: i64,
    y: i64,
    background: Color,
) -> EngineResult<()> {
    engine.new_image(backdrop, side, side)?;
    engine.composite_over(backdrop, source, x, y)?;
    engine.set_quality(backdrop, engine.quality(source))?;
    for key in engine.property_names(source) {
        if let Some(value) = engine.property(source, &key) {
            engine.set_property(backdrop, &key, &value)?;
        }
    }
    engine.set_background(backdrop, background)
}
