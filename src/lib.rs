//! # Raster Canvas
//!
//! An object-oriented canvas over a raster image engine: open an image,
//! normalize its orientation, resize, thumbnail, filter, draw vector shapes
//! and text on top, and write it back out.
//!
//! ```no_run
//! use raster_canvas::Canvas;
//!
//! # fn main() -> raster_canvas::Result<()> {
//! let mut canvas = Canvas::new();
//! canvas.open("photo.jpg")?;
//! canvas.auto_orientate().ok();
//! canvas.thumbnail(320, 240)?;
//!
//! canvas.set_stroke_color("#ff0000")?;
//! canvas.set_stroke_width(3.0)?;
//! canvas.translate(160.0, 120.0)?;
//! canvas.circle(50.0)?;
//!
//! canvas.write("thumb.png")?; // merges the circle first
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//!   caller ──► Canvas ──► ImageEngine (decode, geometry, effects, merge)
//!                │
//!                ├── DrawingContext   queued shapes + state stack
//!                ├── Pixel × 4        background / foreground / fill / stroke
//!                ├── orientation      EXIF code → flip/flop/rotate steps
//!                └── imaging::plan_thumbnail   pad-or-shrink decision
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`canvas`] | The [`Canvas`]: lifecycle, I/O, metadata, geometry, effects, drawing and text passthrough |
//! | [`drawing`] | Drawing state, coordinate transforms, queued draw commands, push/pop stack |
//! | [`orientation`] | EXIF orientation codes and the correction table |
//! | [`color`] | [`Color`] values and [`Pixel`] slots |
//! | [`imaging`] | [`ImageEngine`] trait, parameter types, pure geometry, the pure-Rust [`RustEngine`] |
//! | [`config`] | TOML configuration of canvas defaults |
//! | [`environment`] | Process-wide `init` / `shutdown` |
//! | [`error`] | [`CanvasError`] |
//!
//! # Design Decisions
//!
//! ## Deferred Drawing
//!
//! Shapes and annotations are not painted when called. They are queued with a
//! snapshot of the drawing state and painted in one batch by
//! [`Canvas::update`]. `write` and `blob` always call `update` first, so an
//! export never misses a pending shape.
//!
//! ## Engine Diagnostics Are Drained
//!
//! Engines keep a pending diagnostic on each raster. The canvas takes it
//! after every failure and puts it in [`CanvasError::Engine`], so a stale
//! message never shows up on an unrelated later failure.
//!
//! ## Pure-Rust Imaging
//!
//! [`RustEngine`] uses the `image` crate for codecs and geometry, `imageproc`
//! for free-angle rotation and noise, `kamadak-exif` and `png` for metadata,
//! `tiny-skia` for vector rasterization and `cosmic-text` for glyph outlines.
//! No system libraries are required.

pub mod canvas;
pub mod color;
pub mod config;
pub mod drawing;
pub mod environment;
pub mod error;
pub mod imaging;
pub mod orientation;

pub use canvas::Canvas;
pub use color::{Color, Pixel};
pub use config::{CanvasConfig, CanvasDefaults};
pub use drawing::{Alignment, DrawingContext, LineCap, LineJoin, TextProperties, Transform};
pub use error::{CanvasError, Result};
pub use imaging::{Filter, ImageEngine, RustEngine};
pub use orientation::Orientation;

#[cfg(test)]
pub(crate) mod test_helpers;
