//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (JPEG, PNG, TIFF, WebP) |
//! | **Metadata** | `kamadak-exif` fields, `png` text chunks |
//! | **Geometry** | `image::imageops` (resize, crop, overlay, quarter turns), `imageproc` free-angle warp |
//! | **Effects** | `imageops` blur/unsharpen/contrast, `imageproc` noise, per-pixel loops |
//! | **Vector merge** | `tiny-skia` paths, `cosmic-text` glyph outlines |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math, including the
//!   thumbnail planner (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageEngine`] trait + [`RustEngine`]

pub mod backend;
mod calculations;
mod params;
mod render;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EngineResult, ImageEngine};
pub use calculations::{
    ThumbnailPlan, calculate_fill_dimensions, calculate_fit_dimensions, center_crop,
    plan_thumbnail, resolve_resize_dimensions, rotated_bounds,
};
pub use params::{Filter, Modulation, Quality, Region, ResizeParams, Sharpening};
pub(crate) use render::release_fonts;
pub use rust_backend::{RustEngine, RustRaster};
