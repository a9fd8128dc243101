//! EXIF orientation as the dihedral group of a square (D4).
//!
//! The eight EXIF orientation values are the eight symmetries of a rectangle:
//! identity, three rotations, two axis flips, and two diagonal flips. Each
//! geometric operation the library supports acts on an orientation as
//! multiplication by a fixed group element, expressed here as compile-time
//! permutation tables over the eight values.
//!
//! Variant names follow the EXIF convention: the first word is the image row
//! that ends up at the top, the second the column that ends up at the left.

/// EXIF orientation tag value (1–8).
///
/// Absence of a tag is represented as `Option<Orientation>` at the codec
/// boundary — there is no "default" variant, and callers that need a default
/// for composition use [`Orientation::TopLeft`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// 1 — upright, no correction needed.
    TopLeft = 1,
    /// 2 — mirrored across the vertical axis.
    TopRight = 2,
    /// 3 — rotated 180°.
    BottomRight = 3,
    /// 4 — mirrored across the horizontal axis.
    BottomLeft = 4,
    /// 5 — mirrored across the top-left ↘ bottom-right diagonal.
    LeftTop = 5,
    /// 6 — rotated 90° clockwise.
    RightTop = 6,
    /// 7 — mirrored across the top-right ↙ bottom-left diagonal.
    RightBottom = 7,
    /// 8 — rotated 270° clockwise.
    LeftBottom = 8,
}

/// A geometric operation viewed purely as a symmetry of the image frame.
///
/// Crop and downscale do not appear here: they change dimensions but leave
/// orientation semantics untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetryOp {
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
    Transpose,
    Transverse,
}

use Orientation::*;

/// Generator permutations, indexed by `tag - 1`.
///
/// Each table is a bijection on {1..8}; the rotations have order 4, 2, 4 and
/// every other generator is an involution, consistent with D4.
const ROTATE_90: [Orientation; 8] = [
    LeftBottom,  // 1 → 8
    RightBottom, // 2 → 7
    RightTop,    // 3 → 6
    LeftTop,     // 4 → 5
    TopRight,    // 5 → 2
    TopLeft,     // 6 → 1
    BottomLeft,  // 7 → 4
    BottomRight, // 8 → 3
];

const ROTATE_180: [Orientation; 8] = [
    BottomRight, // 1 → 3
    BottomLeft,  // 2 → 4
    TopLeft,     // 3 → 1
    TopRight,    // 4 → 2
    RightBottom, // 5 → 7
    LeftBottom,  // 6 → 8
    LeftTop,     // 7 → 5
    RightTop,    // 8 → 6
];

const ROTATE_270: [Orientation; 8] = [
    RightTop,    // 1 → 6
    LeftTop,     // 2 → 5
    LeftBottom,  // 3 → 8
    RightBottom, // 4 → 7
    BottomLeft,  // 5 → 4
    BottomRight, // 6 → 3
    TopRight,    // 7 → 2
    TopLeft,     // 8 → 1
];

const FLIP_HORIZONTAL: [Orientation; 8] = [
    TopRight,    // 1 → 2
    TopLeft,     // 2 → 1
    BottomLeft,  // 3 → 4
    BottomRight, // 4 → 3
    RightTop,    // 5 → 6
    LeftTop,     // 6 → 5
    LeftBottom,  // 7 → 8
    RightBottom, // 8 → 7
];

const FLIP_VERTICAL: [Orientation; 8] = [
    BottomLeft,  // 1 → 4
    BottomRight, // 2 → 3
    TopRight,    // 3 → 2
    TopLeft,     // 4 → 1
    LeftBottom,  // 5 → 8
    RightBottom, // 6 → 7
    RightTop,    // 7 → 6
    LeftTop,     // 8 → 5
];

const TRANSPOSE: [Orientation; 8] = [
    LeftTop,     // 1 → 5
    RightTop,    // 2 → 6
    RightBottom, // 3 → 7
    LeftBottom,  // 4 → 8
    TopLeft,     // 5 → 1
    TopRight,    // 6 → 2
    BottomRight, // 7 → 3
    BottomLeft,  // 8 → 4
];

const TRANSVERSE: [Orientation; 8] = [
    RightBottom, // 1 → 7
    LeftBottom,  // 2 → 8
    LeftTop,     // 3 → 5
    RightTop,    // 4 → 6
    BottomRight, // 5 → 3
    BottomLeft,  // 6 → 4
    TopLeft,     // 7 → 1
    TopRight,    // 8 → 2
];

impl Orientation {
    /// All eight values, indexed by `tag - 1`.
    pub const ALL: [Self; 8] = [
        TopLeft,
        TopRight,
        BottomRight,
        BottomLeft,
        LeftTop,
        RightTop,
        RightBottom,
        LeftBottom,
    ];

    /// Build from a raw EXIF tag value. Returns `None` outside 1..=8.
    pub fn from_tag(value: u16) -> Option<Self> {
        if (1..=8).contains(&value) {
            Some(Self::ALL[(value - 1) as usize])
        } else {
            None
        }
    }

    /// The raw EXIF tag value (1–8).
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// The orientation after applying `op` to the image content.
    ///
    /// Total over all 8 × 7 pairs; pure table lookup.
    pub fn apply(self, op: SymmetryOp) -> Self {
        let table = match op {
            SymmetryOp::Rotate90 => &ROTATE_90,
            SymmetryOp::Rotate180 => &ROTATE_180,
            SymmetryOp::Rotate270 => &ROTATE_270,
            SymmetryOp::FlipHorizontal => &FLIP_HORIZONTAL,
            SymmetryOp::FlipVertical => &FLIP_VERTICAL,
            SymmetryOp::Transpose => &TRANSPOSE,
            SymmetryOp::Transverse => &TRANSVERSE,
        };
        table[(self as u8 - 1) as usize]
    }

    /// The single operation that brings an image with this orientation
    /// upright, or `None` for [`Orientation::TopLeft`] (already upright).
    pub fn corrective_op(self) -> Option<SymmetryOp> {
        match self {
            TopLeft => None,
            TopRight => Some(SymmetryOp::FlipHorizontal),
            BottomRight => Some(SymmetryOp::Rotate180),
            BottomLeft => Some(SymmetryOp::FlipVertical),
            LeftTop => Some(SymmetryOp::Transpose),
            RightTop => Some(SymmetryOp::Rotate90),
            RightBottom => Some(SymmetryOp::Transverse),
            LeftBottom => Some(SymmetryOp::Rotate270),
        }
    }
}

impl SymmetryOp {
    /// All seven generators, for exhaustive property checks.
    pub const ALL: [Self; 7] = [
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Transpose,
        Self::Transverse,
    ];
}
