//! Thumbnail sizing policy.
//!
//! Pure dimension math, no I/O: given the primary image's size, compute the
//! embedded thumbnail's target size with the longer edge fixed at
//! [`LONG_EDGE`] and the shorter edge floor-divided to preserve aspect ratio.

/// Conventional long edge of an embedded EXIF thumbnail, in pixels.
pub const LONG_EDGE: u32 = 160;

/// Target thumbnail dimensions for a primary image of `width` × `height`.
///
/// Landscape images pin the width at [`LONG_EDGE`]; square and portrait
/// images pin the height. The free edge is `floor(LONG_EDGE / aspect)`.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width > height {
        (LONG_EDGE, (LONG_EDGE as u64 * height as u64 / width as u64) as u32)
    } else {
        ((LONG_EDGE as u64 * width as u64 / height as u64) as u32, LONG_EDGE)
    }
}
