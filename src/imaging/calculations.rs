//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! The thumbnail planner lives here: [`plan_thumbnail`] decides between
//! padding and shrinking, [`center_crop`] computes the final window.

use super::params::Region;

/// How a thumbnail reaches its target before the final center crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailPlan {
    /// Source is smaller than the target in its limiting dimension: place it
    /// on a transparent `side × side` backdrop at the given offset.
    Pad {
        side: u32,
        offset_x: i64,
        offset_y: i64,
    },
    /// Source covers the target: resize to these dimensions first.
    Shrink { width: u32, height: u32 },
}

/// Decide how to bring `current` to `target` ahead of the center crop.
///
/// `ratio = min(cw / tw, ch / th)`. Below 1.0 the source is padded onto a
/// square backdrop of side `max(tw, th)`, offset by
/// `((tw - cw) / 2, (th - ch) / 2)` with truncating division. Otherwise the
/// source is scaled by `1 / ratio` so the limiting dimension matches the
/// target exactly and the other equals or exceeds it.
///
/// # Examples
/// ```
/// # use raster_canvas::imaging::{ThumbnailPlan, plan_thumbnail};
/// assert_eq!(
///     plan_thumbnail((800, 600), (100, 100)),
///     ThumbnailPlan::Shrink { width: 133, height: 100 }
/// );
/// assert_eq!(
///     plan_thumbnail((50, 40), (100, 100)),
///     ThumbnailPlan::Pad { side: 100, offset_x: 25, offset_y: 30 }
/// );
/// ```
pub fn plan_thumbnail(current: (u32, u32), target: (u32, u32)) -> ThumbnailPlan {
    let (cur_w, cur_h) = current;
    let (tgt_w, tgt_h) = target;

    let ratio = (cur_w as f64 / tgt_w as f64).min(cur_h as f64 / tgt_h as f64);

    if ratio < 1.0 {
        ThumbnailPlan::Pad {
            side: tgt_w.max(tgt_h),
            offset_x: (tgt_w as i64 - cur_w as i64) / 2,
            offset_y: (tgt_h as i64 - cur_h as i64) / 2,
        }
    } else {
        let (width, height) = calculate_fill_dimensions(current, target);
        ThumbnailPlan::Shrink { width, height }
    }
}

/// The `target`-sized window centered on `current`.
///
/// Offsets use truncating division; when `current` is smaller than `target`
/// in a dimension the offset goes negative and the engine clips.
pub fn center_crop(current: (u32, u32), target: (u32, u32)) -> Region {
    let (cur_w, cur_h) = current;
    let (tgt_w, tgt_h) = target;
    Region::new(
        (cur_w as i64 - tgt_w as i64) / 2,
        (cur_h as i64 - tgt_h as i64) / 2,
        tgt_w,
        tgt_h,
    )
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may
/// exceed. Rounding never drops a dimension below the target.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let ratio = (src_w as f64 / tgt_w as f64).min(src_h as f64 / tgt_h as f64);
    let w = (src_w as f64 / ratio).round() as u32;
    let h = (src_h as f64 / ratio).round() as u32;
    (w.max(tgt_w), h.max(tgt_h))
}

/// Largest size with the source aspect ratio that fits inside `bounds`.
///
/// Never returns a zero dimension for a non-empty source.
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Fill in a zero width or height from the source aspect ratio.
///
/// Both zero keeps the source size. A source without an aspect ratio (either
/// side zero) returns the request unchanged.
pub fn resolve_resize_dimensions(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return requested;
    }
    match requested {
        (0, 0) => source,
        (w, 0) => (w, ((w as f64 * src_h as f64 / src_w as f64).round() as u32).max(1)),
        (0, h) => (((h as f64 * src_w as f64 / src_h as f64).round() as u32).max(1), h),
        dims => dims,
    }
}

/// Bounding box of a `width × height` raster rotated by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let w = width as f64 * cos + height as f64 * sin;
    let h = width as f64 * sin + height as f64 * cos;
    // Snap near-integers so right angles don't grow by a pixel.
    let snap = |v: f64| {
        let rounded = v.round();
        if (v - rounded).abs() < 1e-6 {
            rounded as u32
        } else {
            v.ceil() as u32
        }
    };
    (snap(w), snap(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_size(current: (u32, u32), target: (u32, u32)) -> (u32, u32) {
        let working = match plan_thumbnail(current, target) {
            ThumbnailPlan::Pad { side, .. } => (side, side),
            ThumbnailPlan::Shrink { width, height } => (width, height),
        };
        let crop = center_crop(working, target);
        assert!(crop.x >= 0 && crop.y >= 0, "crop window leaves the raster");
        assert!(crop.x as u32 + crop.width <= working.0);
        assert!(crop.y as u32 + crop.height <= working.1);
        (crop.width, crop.height)
    }

    // =========================================================================
    // plan_thumbnail tests
    // =========================================================================

    #[test]
    fn thumbnail_shrinks_larger_landscape() {
        assert_eq!(
            plan_thumbnail((800, 600), (100, 100)),
            ThumbnailPlan::Shrink {
                width: 133,
                height: 100
            }
        );
    }

    #[test]
    fn thumbnail_pads_smaller_source() {
        assert_eq!(
            plan_thumbnail((50, 40), (100, 100)),
            ThumbnailPlan::Pad {
                side: 100,
                offset_x: 25,
                offset_y: 30
            }
        );
    }

    #[test]
    fn thumbnail_pads_when_only_one_dimension_is_short() {
        // 300x50 into 200x100: ratio = min(1.5, 0.5) → pad
        assert_eq!(
            plan_thumbnail((300, 50), (200, 100)),
            ThumbnailPlan::Pad {
                side: 200,
                offset_x: -50,
                offset_y: 25
            }
        );
    }

    #[test]
    fn thumbnail_equal_size_is_identity_shrink() {
        assert_eq!(
            plan_thumbnail((100, 100), (100, 100)),
            ThumbnailPlan::Shrink {
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn thumbnail_pad_offset_truncates_toward_zero() {
        // (100 - 33) / 2 = 33.5 → 33
        match plan_thumbnail((33, 33), (100, 100)) {
            ThumbnailPlan::Pad {
                offset_x, offset_y, ..
            } => assert_eq!((offset_x, offset_y), (33, 33)),
            other => panic!("expected pad, got {other:?}"),
        }
    }

    #[test]
    fn thumbnail_always_yields_exact_target() {
        let sources = [
            (1, 1),
            (50, 40),
            (100, 100),
            (101, 99),
            (800, 600),
            (600, 800),
            (3000, 7),
            (7, 3000),
            (1000, 999),
        ];
        let targets = [(1, 1), (3, 7), (100, 100), (200, 100), (100, 200), (640, 480)];
        for &source in &sources {
            for &target in &targets {
                assert_eq!(
                    final_size(source, target),
                    target,
                    "source {source:?} target {target:?}"
                );
            }
        }
    }

    // =========================================================================
    // center_crop tests
    // =========================================================================

    #[test]
    fn center_crop_offsets() {
        assert_eq!(center_crop((133, 100), (100, 100)), Region::new(16, 0, 100, 100));
        assert_eq!(center_crop((200, 200), (100, 50)), Region::new(50, 75, 100, 50));
    }

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_portrait_target() {
        // Source is wider, so height matches: 500, width = 500 * (4/3) = 667
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 500)), (667, 500));
    }

    #[test]
    fn fill_taller_source_to_landscape_target() {
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    #[test]
    fn fill_never_rounds_below_target() {
        let (w, h) = calculate_fill_dimensions((1000, 1000), (3, 3));
        assert!(w >= 3 && h >= 3);
    }

    // =========================================================================
    // fit / resize resolution tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        assert_eq!(calculate_fit_dimensions((800, 600), (100, 100)), (100, 75));
    }

    #[test]
    fn fit_portrait_into_square() {
        assert_eq!(calculate_fit_dimensions((600, 800), (100, 100)), (75, 100));
    }

    #[test]
    fn fit_upscales_small_source() {
        assert_eq!(calculate_fit_dimensions((10, 5), (100, 100)), (100, 50));
    }

    #[test]
    fn resolve_derives_missing_height() {
        assert_eq!(resolve_resize_dimensions((400, 300), (170, 0)), (170, 128));
    }

    #[test]
    fn resolve_derives_missing_width() {
        assert_eq!(resolve_resize_dimensions((400, 300), (0, 150)), (200, 150));
    }

    #[test]
    fn resolve_keeps_explicit_and_empty_requests() {
        assert_eq!(resolve_resize_dimensions((400, 300), (10, 20)), (10, 20));
        assert_eq!(resolve_resize_dimensions((400, 300), (0, 0)), (400, 300));
    }

    #[test]
    fn resize_dimensions_without_aspect_ratio_pass_through() {
        assert_eq!(resolve_resize_dimensions((0, 300), (170, 0)), (170, 0));
        assert_eq!(resolve_resize_dimensions((400, 0), (0, 150)), (0, 150));
        assert_eq!(resolve_resize_dimensions((0, 0), (10, 20)), (10, 20));
    }

    // =========================================================================
    // rotated_bounds tests
    // =========================================================================

    #[test]
    fn right_angles_swap_or_keep_axes() {
        assert_eq!(rotated_bounds(40, 30, 90.0), (30, 40));
        assert_eq!(rotated_bounds(40, 30, -90.0), (30, 40));
        assert_eq!(rotated_bounds(40, 30, 180.0), (40, 30));
    }

    #[test]
    fn diagonal_rotation_grows_bounds() {
        let (w, h) = rotated_bounds(100, 100, 45.0);
        assert_eq!((w, h), (142, 142));
    }
}
