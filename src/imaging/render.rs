//! Vector rasterization for queued drawing commands.
//!
//! Commands are painted onto a transparent `tiny_skia::Pixmap` the size of
//! the raster, then demultiplied and composited over the raster in one
//! pass. Text is shaped with `cosmic-text` and each glyph outline is filled
//! as a path, so no bitmap glyph cache is involved.

use crate::color::Color;
use crate::drawing::{Alignment, DrawCommand, DrawingState, LineCap, LineJoin, Shape};
use cosmic_text::{Attrs, Buffer, Command, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use image::{Rgba, RgbaImage};
use std::sync::{LazyLock, Mutex};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

struct FontContext {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

/// Font database shared by every raster; loaded on first text draw.
static FONTS: LazyLock<Mutex<Option<FontContext>>> = LazyLock::new(|| Mutex::new(None));

/// Drop the loaded font database. The next text draw reloads it.
pub(crate) fn release_fonts() {
    let mut fonts = FONTS.lock().unwrap_or_else(|e| e.into_inner());
    if fonts.take().is_some() {
        log::debug!(target: "canvas", "released font database");
    }
}

/// Rasterize `commands` and composite the result over `image`.
pub(crate) fn draw_commands(image: &mut RgbaImage, commands: &[DrawCommand]) -> Result<(), String> {
    if commands.is_empty() {
        return Ok(());
    }
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| format!("cannot draw on a {width}x{height} raster"))?;

    for command in commands {
        paint_command(&mut pixmap, command);
    }

    let layer = RgbaImage::from_fn(width, height, |x, y| {
        let index = (y * width + x) as usize;
        let c = pixmap.pixels()[index].demultiply();
        Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    });
    image::imageops::overlay(image, &layer, 0, 0);
    Ok(())
}

fn paint_command(pixmap: &mut Pixmap, command: &DrawCommand) {
    let state = &command.state;
    let transform = to_skia_transform(state);
    match &command.shape {
        Shape::Line { x, y } => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, 0.0);
            pb.line_to(*x as f32, *y as f32);
            if let Some(path) = pb.finish() {
                stroke_path(pixmap, &path, state, transform);
            }
        }
        Shape::Circle { radius } => {
            if let Some(path) = PathBuilder::from_circle(0.0, 0.0, radius.abs() as f32) {
                fill_path(pixmap, &path, state, transform);
                stroke_path(pixmap, &path, state, transform);
            }
        }
        Shape::Ellipse { rx, ry } => {
            let (rx, ry) = (rx.abs() as f32, ry.abs() as f32);
            if let Some(path) =
                Rect::from_xywh(-rx, -ry, rx * 2.0, ry * 2.0).and_then(PathBuilder::from_oval)
            {
                fill_path(pixmap, &path, state, transform);
                stroke_path(pixmap, &path, state, transform);
            }
        }
        Shape::Rectangle { width, height } => {
            let left = width.min(0.0) as f32;
            let top = height.min(0.0) as f32;
            if let Some(rect) = Rect::from_xywh(left, top, width.abs() as f32, height.abs() as f32)
            {
                let mut pb = PathBuilder::new();
                pb.push_rect(rect);
                if let Some(path) = pb.finish() {
                    fill_path(pixmap, &path, state, transform);
                    stroke_path(pixmap, &path, state, transform);
                }
            }
        }
        Shape::Text { text, x, y } => paint_text(pixmap, text, *x as f32, *y as f32, state, transform),
    }
}

fn to_skia_transform(state: &DrawingState) -> Transform {
    let t = state.transform;
    Transform::from_row(
        t.sx as f32,
        t.ky as f32,
        t.kx as f32,
        t.sy as f32,
        t.tx as f32,
        t.ty as f32,
    )
}

fn solid_paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias,
        ..Default::default()
    };
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint
}

fn fill_path(pixmap: &mut Pixmap, path: &tiny_skia::Path, state: &DrawingState, transform: Transform) {
    if state.fill_color.is_transparent() {
        return;
    }
    let paint = solid_paint(state.fill_color, state.stroke_antialias);
    pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
}

fn stroke_path(
    pixmap: &mut Pixmap,
    path: &tiny_skia::Path,
    state: &DrawingState,
    transform: Transform,
) {
    let color = state.stroke_color.with_opacity(state.stroke_opacity);
    if color.is_transparent() || state.stroke_width <= 0.0 {
        return;
    }
    let paint = solid_paint(color, state.stroke_antialias);
    let stroke = Stroke {
        width: state.stroke_width as f32,
        line_cap: match state.line_cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match state.line_join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        ..Default::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, transform, None);
}

fn paint_text(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    state: &DrawingState,
    transform: Transform,
) {
    let props = &state.text;
    let size = props.size.max(1.0) as f32;

    let mut fonts = FONTS.lock().unwrap_or_else(|e| e.into_inner());
    let ctx = fonts.get_or_insert_with(|| {
        log::debug!(target: "canvas", "loading font database");
        FontContext {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    });

    let family_name = if !props.family.is_empty() {
        Some(props.family.as_str())
    } else if !props.font.is_empty() {
        Some(props.font.as_str())
    } else {
        None
    };
    let family = family_name.map(Family::Name).unwrap_or(Family::SansSerif);
    let attrs = Attrs::new()
        .family(family)
        .weight(Weight(props.weight.clamp(1, 1000) as u16))
        .letter_spacing(props.kerning as f32);

    let mut buffer = Buffer::new(&mut ctx.font_system, Metrics::new(size, size * 1.2));
    buffer.set_text(&mut ctx.font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(&mut ctx.font_system, false);

    let mut text_width: f32 = 0.0;
    let mut first_baseline: Option<f32> = None;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for run in buffer.layout_runs() {
        text_width = text_width.max(run.line_w);
        first_baseline.get_or_insert(run.line_y);
        ascent = ascent.max(run.line_y - run.line_top);
        descent = descent.max(run.line_top + run.line_height - run.line_y);
    }
    let first_baseline = first_baseline.unwrap_or(0.0);

    let base_x = x + match props.alignment {
        Alignment::Center => -text_width / 2.0,
        Alignment::Right => -text_width,
        Alignment::Left | Alignment::Undefined => 0.0,
    };

    if !props.under_color.is_transparent() && text_width > 0.0 {
        if let Some(rect) = Rect::from_xywh(base_x, y - ascent, text_width, ascent + descent) {
            let paint = solid_paint(props.under_color, props.antialias);
            pixmap.fill_rect(rect, &paint, transform, None);
        }
    }

    if state.fill_color.is_transparent() {
        return;
    }
    let paint = solid_paint(state.fill_color, props.antialias);
    let FontContext {
        font_system,
        swash_cache,
    } = ctx;

    for run in buffer.layout_runs() {
        let line_offset = run.line_y - first_baseline;
        for glyph in run.glyphs.iter() {
            let physical = glyph.physical((base_x, y), 1.0);
            let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
            let glyph_y = y + line_offset + glyph.y - glyph.font_size * glyph.y_offset;

            let Some(commands) = swash_cache.get_outline_commands(font_system, physical.cache_key)
            else {
                continue;
            };
            // Outlines are y-up.
            let mut pb = PathBuilder::new();
            for cmd in commands {
                match cmd {
                    Command::MoveTo(p) => pb.move_to(p.x, -p.y),
                    Command::LineTo(p) => pb.line_to(p.x, -p.y),
                    Command::QuadTo(c, p) => pb.quad_to(c.x, -c.y, p.x, -p.y),
                    Command::CurveTo(c1, c2, p) => {
                        pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, p.x, -p.y)
                    }
                    Command::Close => pb.close(),
                }
            }
            if let Some(path) = pb.finish() {
                let glyph_transform = Transform::from_translate(glyph_x, glyph_y).post_concat(transform);
                pixmap.fill_path(&path, &paint, FillRule::Winding, glyph_transform, None);
            }
        }
    }
}
