//! Geometric operation types.
//!
//! A [`Transform`] describes *what* to do to the encoded image, not *how* —
//! execution belongs to a [`TransformCodec`](crate::codec::TransformCodec).
//! Parameter validation against the current image dimensions happens in the
//! [`JpegImage`](crate::jpeg::JpegImage) methods before any codec call.

use crate::orientation::SymmetryOp;

/// Rotation angle, clockwise. Only quarter-turn multiples exist losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Map a degree value to a rotation. Returns `None` unless 90, 180 or 270.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            90 => Some(Self::Quarter),
            180 => Some(Self::Half),
            270 => Some(Self::ThreeQuarter),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }
}

/// Mirror axis for a flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// JPEG encoding quality for downscales (1–100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    /// The downscale default, 75.
    fn default() -> Self {
        Self(75)
    }
}

/// A single geometric operation on an encoded JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Rotate(Rotation),
    Flip(FlipDirection),
    /// Mirror across the top-left → bottom-right diagonal.
    Transpose,
    /// Mirror across the top-right → bottom-left diagonal.
    Transverse,
    /// Extract the rectangle with upper-left corner (x, y).
    Crop { x: u32, y: u32, width: u32, height: u32 },
    /// Scale down to exactly `width` × `height`, re-encoding at `quality`.
    Downscale { width: u32, height: u32, quality: Quality },
}

impl Transform {
    /// The symmetry this operation applies to the frame, if any.
    ///
    /// Crop and downscale return `None`: they change dimensions without
    /// altering orientation semantics.
    pub fn symmetry(&self) -> Option<SymmetryOp> {
        match self {
            Self::Rotate(Rotation::Quarter) => Some(SymmetryOp::Rotate90),
            Self::Rotate(Rotation::Half) => Some(SymmetryOp::Rotate180),
            Self::Rotate(Rotation::ThreeQuarter) => Some(SymmetryOp::Rotate270),
            Self::Flip(FlipDirection::Horizontal) => Some(SymmetryOp::FlipHorizontal),
            Self::Flip(FlipDirection::Vertical) => Some(SymmetryOp::FlipVertical),
            Self::Transpose => Some(SymmetryOp::Transpose),
            Self::Transverse => Some(SymmetryOp::Transverse),
            Self::Crop { .. } | Self::Downscale { .. } => None,
        }
    }

    /// Lift a pure symmetry back into an executable transform.
    pub fn from_symmetry(op: SymmetryOp) -> Self {
        match op {
            SymmetryOp::Rotate90 => Self::Rotate(Rotation::Quarter),
            SymmetryOp::Rotate180 => Self::Rotate(Rotation::Half),
            SymmetryOp::Rotate270 => Self::Rotate(Rotation::ThreeQuarter),
            SymmetryOp::FlipHorizontal => Self::Flip(FlipDirection::Horizontal),
            SymmetryOp::FlipVertical => Self::Flip(FlipDirection::Vertical),
            SymmetryOp::Transpose => Self::Transpose,
            SymmetryOp::Transverse => Self::Transverse,
        }
    }

    /// Whether the operation swaps the image's width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Self::Rotate(Rotation::Quarter)
                | Self::Rotate(Rotation::ThreeQuarter)
                | Self::Transpose
                | Self::Transverse
        )
    }
}
