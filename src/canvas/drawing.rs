//! Drawing attributes, transforms and shapes.
//!
//! Shapes are queued on the canvas's [`DrawingContext`](crate::DrawingContext)
//! and only reach the pixels on the next `update`, `write` or `blob`.

use super::Canvas;
use crate::color::{Color, Pixel};
use crate::drawing::{LineCap, LineJoin, Shape};
use crate::error::Result;
use crate::imaging::ImageEngine;

impl<E: ImageEngine> Canvas<E> {
    // -------------------------------------------------------------------------
    // State stack
    // -------------------------------------------------------------------------

    /// Save the current drawing state (transform, stroke, fill, text).
    pub fn push_drawing(&mut self) -> Result<()> {
        self.resources_mut()?.drawing.push();
        Ok(())
    }

    /// Restore the most recently pushed drawing state.
    pub fn pop_drawing(&mut self) -> Result<()> {
        let res = self.resources_mut()?;
        res.drawing.pop()?;

        let state = res.drawing.state();
        res.fill.set(state.fill_color);
        res.stroke.set(state.stroke_color);
        let text = state.text.clone();
        if let Some(record) = self.text.as_mut() {
            *record = text;
        }
        Ok(())
    }

    pub fn drawing_depth(&self) -> Result<usize> {
        Ok(self.resources()?.drawing.depth())
    }

    // -------------------------------------------------------------------------
    // Coordinate system
    // -------------------------------------------------------------------------

    /// Move the origin of the coordinate system.
    pub fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.resources_mut()?.drawing.translate(x, y);
        Ok(())
    }

    pub fn scale(&mut self, x: f64, y: f64) -> Result<()> {
        self.resources_mut()?.drawing.scale(x, y);
        Ok(())
    }

    /// Rotate the coordinate system by `radians`, positive clockwise.
    pub fn rotate(&mut self, radians: f64) -> Result<()> {
        self.resources_mut()?.drawing.rotate(radians);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Stroke and fill
    // -------------------------------------------------------------------------

    pub fn set_stroke_color(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        let res = self.resources_mut()?;
        res.stroke.set(color);
        res.drawing.state_mut().stroke_color = color;
        Ok(())
    }

    pub fn stroke_color(&self) -> Result<Color> {
        Ok(self.resources()?.stroke.color())
    }

    pub fn set_fill_color(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        let res = self.resources_mut()?;
        res.fill.set(color);
        res.drawing.state_mut().fill_color = color;
        Ok(())
    }

    pub fn fill_color(&self) -> Result<Color> {
        Ok(self.resources()?.fill.color())
    }

    pub fn stroke_pixel(&self) -> Result<&Pixel> {
        Ok(&self.resources()?.stroke)
    }

    pub fn fill_pixel(&self) -> Result<&Pixel> {
        Ok(&self.resources()?.fill)
    }

    pub fn set_stroke_width(&mut self, width: f64) -> Result<()> {
        self.resources_mut()?.drawing.state_mut().stroke_width = width;
        Ok(())
    }

    pub fn stroke_width(&self) -> Result<f64> {
        Ok(self.resources()?.drawing.state().stroke_width)
    }

    /// Stroke opacity, 0.0 (invisible) to 1.0.
    pub fn set_stroke_opacity(&mut self, opacity: f64) -> Result<()> {
        self.resources_mut()?.drawing.state_mut().stroke_opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn stroke_opacity(&self) -> Result<f64> {
        Ok(self.resources()?.drawing.state().stroke_opacity)
    }

    pub fn set_stroke_antialias(&mut self, antialias: bool) -> Result<()> {
        self.resources_mut()?.drawing.state_mut().stroke_antialias = antialias;
        Ok(())
    }

    pub fn stroke_antialias(&self) -> Result<bool> {
        Ok(self.resources()?.drawing.state().stroke_antialias)
    }

    pub fn set_stroke_line_cap(&mut self, cap: LineCap) -> Result<()> {
        self.resources_mut()?.drawing.state_mut().line_cap = cap;
        Ok(())
    }

    pub fn stroke_line_cap(&self) -> Result<LineCap> {
        Ok(self.resources()?.drawing.state().line_cap)
    }

    pub fn set_stroke_line_join(&mut self, join: LineJoin) -> Result<()> {
        self.resources_mut()?.drawing.state_mut().line_join = join;
        Ok(())
    }

    pub fn stroke_line_join(&self) -> Result<LineJoin> {
        Ok(self.resources()?.drawing.state().line_join)
    }

    // -------------------------------------------------------------------------
    // Shapes, anchored at the current origin
    // -------------------------------------------------------------------------

    /// Line from the origin to `(x, y)`.
    pub fn line(&mut self, x: f64, y: f64) -> Result<()> {
        self.emit(Shape::Line { x, y })
    }

    pub fn circle(&mut self, radius: f64) -> Result<()> {
        self.emit(Shape::Circle { radius })
    }

    /// Rectangle with corners at the origin and `(width, height)`.
    pub fn rectangle(&mut self, width: f64, height: f64) -> Result<()> {
        self.emit(Shape::Rectangle { width, height })
    }

    pub fn ellipse(&mut self, rx: f64, ry: f64) -> Result<()> {
        self.emit(Shape::Ellipse { rx, ry })
    }

    pub(super) fn emit(&mut self, shape: Shape) -> Result<()> {
        self.resources_mut()?.drawing.emit(shape);
        Ok(())
    }

    /// Number of shapes waiting for the next merge.
    pub fn pending_drawings(&self) -> Result<usize> {
        Ok(self.resources()?.drawing.pending().len())
    }
}
