//! EXIF orientation codes and the normalization table.
//!
//! ```text
//!     code  name           correction (applied in order)
//!     1     top-left       none
//!     2     top-right      flop
//!     3     bottom-right   rotate 180
//!     4     bottom-left    flip
//!     5     left-top       flip, rotate 90 cw
//!     6     right-top      rotate 90 cw
//!     7     right-bottom   flop, rotate 90 cw
//!     8     left-bottom    rotate 90 ccw
//! ```
//!
//! The quarter turns are the mathematical "-90°" (clockwise) for codes 5-7
//! and "+90°" (counter-clockwise) for code 8, which yields the visually
//! upright image for every code.

use std::fmt;

/// Metadata key holding the orientation code.
pub const ORIENTATION_PROPERTY: &str = "exif:Orientation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Undefined,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    LeftTop,
    RightTop,
    RightBottom,
    LeftBottom,
}

/// One primitive the normalizer asks the canvas to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientStep {
    /// Mirror top-bottom.
    Flip,
    /// Mirror left-right.
    Flop,
    /// Rotate the raster by this many degrees, positive clockwise.
    Rotate(f64),
}

impl Orientation {
    pub const ALL: [Self; 9] = [
        Self::Undefined,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
        Self::LeftTop,
        Self::RightTop,
        Self::RightBottom,
        Self::LeftBottom,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Parse a metadata value such as `"6"` or `" 6 "`.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u32>().ok().and_then(Self::from_code)
    }

    pub fn is_canonical(self) -> bool {
        self == Self::TopLeft
    }

    /// Corrections that bring an image stored with this orientation upright.
    ///
    /// Returns `None` for [`Orientation::Undefined`], which carries no
    /// information to act on.
    pub fn steps(self) -> Option<&'static [OrientStep]> {
        use OrientStep::*;
        let steps: &'static [OrientStep] = match self {
            Self::Undefined => return None,
            Self::TopLeft => &[],
            Self::TopRight => &[Flop],
            Self::BottomRight => &[Rotate(180.0)],
            Self::BottomLeft => &[Flip],
            Self::LeftTop => &[Flip, Rotate(90.0)],
            Self::RightTop => &[Rotate(90.0)],
            Self::RightBottom => &[Flop, Rotate(90.0)],
            Self::LeftBottom => &[Rotate(-90.0)],
        };
        Some(steps)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::LeftTop => "left-top",
            Self::RightTop => "right-top",
            Self::RightBottom => "right-bottom",
            Self::LeftBottom => "left-bottom",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
