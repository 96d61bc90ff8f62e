//! Vector drawing context.
//!
//! A [`DrawingContext`] accumulates shape commands against the current
//! [`DrawingState`] (stroke, fill, text attributes and coordinate transform).
//! Each command captures a snapshot of the state it was emitted under, so a
//! later `pop` cannot retroactively restyle shapes already queued.
//!
//! Shapes are anchored at the origin of the current transform. Callers
//! position them with [`DrawingContext::translate`], [`DrawingContext::rotate`]
//! and [`DrawingContext::scale`].
//!
//! Pending commands are handed to the engine in one batch by
//! [`DrawingContext::take_commands`]; the canvas does this on every
//! `update`, `write` and blob export.

use crate::color::Color;
use crate::error::{CanvasError, Result};
use serde::{Deserialize, Serialize};

/// 2D affine transform in row form, matching the `(sx, ky, kx, sy, tx, ty)`
/// layout most rasterizers use.
///
/// ```text
/// | sx kx tx |
/// | ky sy ty |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub ky: f64,
    pub kx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        ky: 0.0,
        kx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// `self * other`: `other` is applied to points first.
    pub fn pre_concat(self, other: Self) -> Self {
        Self {
            sx: self.sx * other.sx + self.kx * other.ky,
            ky: self.ky * other.sx + self.sy * other.ky,
            kx: self.sx * other.kx + self.kx * other.sy,
            sy: self.ky * other.kx + self.sy * other.sy,
            tx: self.sx * other.tx + self.kx * other.ty + self.tx,
            ty: self.ky * other.tx + self.sy * other.ty + self.ty,
        }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(x: f64, y: f64) -> Self {
        Self {
            sx: x,
            sy: y,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `radians`; positive turns clockwise on a y-down raster.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            sx: cos,
            ky: sin,
            kx: -sin,
            sy: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Map a point from local to raster coordinates.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx * x + self.kx * y + self.tx,
            self.ky * x + self.sy * y + self.ty,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Undefined,
    Left,
    Center,
    Right,
}

/// Annotation defaults. Colors other than the under color come from the
/// fill and stroke of the drawing state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProperties {
    /// Font name; also accepted as a family name by the rasterizer.
    pub font: String,
    pub family: String,
    pub size: f64,
    pub weight: u32,
    pub alignment: Alignment,
    pub antialias: bool,
    pub kerning: f64,
    pub under_color: Color,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            font: String::new(),
            family: String::new(),
            size: 12.0,
            weight: 400,
            alignment: Alignment::Undefined,
            antialias: true,
            kerning: 0.0,
            under_color: Color::TRANSPARENT,
        }
    }
}

impl TextProperties {
    /// A record with every field unset: no font, zero size and weight,
    /// antialiasing off.
    pub fn empty() -> Self {
        Self {
            font: String::new(),
            family: String::new(),
            size: 0.0,
            weight: 0,
            alignment: Alignment::Undefined,
            antialias: false,
            kerning: 0.0,
            under_color: Color::TRANSPARENT,
        }
    }
}

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub stroke_antialias: bool,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub fill_color: Color,
    pub transform: Transform,
    pub text: TextProperties,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            stroke_color: Color::TRANSPARENT,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            stroke_antialias: true,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            fill_color: Color::BLACK,
            transform: Transform::IDENTITY,
            text: TextProperties::default(),
        }
    }
}

/// Geometry of one queued command, in local (pre-transform) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// From the origin to `(x, y)`.
    Line { x: f64, y: f64 },
    /// Centered at the origin.
    Circle { radius: f64 },
    /// Corners at the origin and `(width, height)`; either may be negative.
    Rectangle { width: f64, height: f64 },
    /// Centered at the origin.
    Ellipse { rx: f64, ry: f64 },
    /// Baseline anchor at `(x, y)`.
    Text { text: String, x: f64, y: f64 },
}

/// A shape plus the state it was emitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub state: DrawingState,
}

#[derive(Debug, Clone, Default)]
pub struct DrawingContext {
    state: DrawingState,
    stack: Vec<DrawingState>,
    commands: Vec<DrawCommand>,
}

impl DrawingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DrawingState {
        &mut self.state
    }

    /// Snapshot the current state onto the stack.
    pub fn push(&mut self) {
        log::debug!(target: "canvas", "push drawing (depth {})", self.stack.len() + 1);
        self.stack.push(self.state.clone());
    }

    /// Restore and discard the most recent snapshot.
    pub fn pop(&mut self) -> Result<()> {
        let state = self.stack.pop().ok_or(CanvasError::EmptyDrawingStack)?;
        log::debug!(target: "canvas", "pop drawing (depth {})", self.stack.len());
        self.state = state;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        log::debug!(target: "canvas", "translate {} {}", x, y);
        self.state.transform = self.state.transform.pre_concat(Transform::translation(x, y));
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        log::debug!(target: "canvas", "scale {} {}", x, y);
        self.state.transform = self.state.transform.pre_concat(Transform::scaling(x, y));
    }

    pub fn rotate(&mut self, radians: f64) {
        log::debug!(target: "canvas", "rotate {}", radians);
        self.state.transform = self.state.transform.pre_concat(Transform::rotation(radians));
    }

    /// Queue a shape under the current state.
    pub fn emit(&mut self, shape: Shape) {
        self.commands.push(DrawCommand {
            shape,
            state: self.state.clone(),
        });
    }

    pub fn pending(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the queued commands for merging into a raster.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn translate_then_scale_applies_scale_first() {
        let t = Transform::IDENTITY
            .pre_concat(Transform::translation(10.0, 20.0))
            .pre_concat(Transform::scaling(2.0, 3.0));
        assert!(approx(t.apply(1.0, 1.0), (12.0, 23.0)));
    }

    #[test]
    fn rotation_quarter_turn_is_clockwise_on_raster() {
        let t = Transform::rotation(FRAC_PI_2);
        assert!(approx(t.apply(1.0, 0.0), (0.0, 1.0)));
    }

    #[test]
    fn push_pop_restores_state() {
        let mut ctx = DrawingContext::new();
        ctx.state_mut().stroke_width = 3.0;
        ctx.state_mut().stroke_color = Color::WHITE;
        ctx.translate(5.0, 5.0);
        let before = ctx.state().clone();

        ctx.push();
        ctx.state_mut().stroke_width = 10.0;
        ctx.state_mut().stroke_color = Color::rgb(255, 0, 0);
        ctx.translate(100.0, 0.0);
        ctx.rotate(1.0);
        ctx.pop().unwrap();

        assert_eq!(ctx.state(), &before);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn pop_on_empty_stack_fails() {
        let mut ctx = DrawingContext::new();
        assert!(matches!(ctx.pop(), Err(CanvasError::EmptyDrawingStack)));
    }

    #[test]
    fn nested_push_pop_is_lifo() {
        let mut ctx = DrawingContext::new();
        ctx.state_mut().stroke_width = 1.0;
        ctx.push();
        ctx.state_mut().stroke_width = 2.0;
        ctx.push();
        ctx.state_mut().stroke_width = 3.0;

        ctx.pop().unwrap();
        assert_eq!(ctx.state().stroke_width, 2.0);
        ctx.pop().unwrap();
        assert_eq!(ctx.state().stroke_width, 1.0);
    }

    #[test]
    fn commands_capture_state_at_emission() {
        let mut ctx = DrawingContext::new();
        ctx.push();
        ctx.translate(200.0, 200.0);
        ctx.state_mut().stroke_width = 5.0;
        ctx.emit(Shape::Circle { radius: 100.0 });
        ctx.pop().unwrap();
        ctx.emit(Shape::Line { x: 1.0, y: 1.0 });

        let commands = ctx.take_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].state.stroke_width, 5.0);
        assert!(approx(commands[0].state.transform.apply(0.0, 0.0), (200.0, 200.0)));
        assert!(commands[1].state.transform.is_identity());
        assert!(ctx.pending().is_empty());
    }
}
