//! Collaborator interfaces for pixel and metadata work.
//!
//! The consistency engine never touches entropy-coded data itself. It talks
//! to two narrow traits:
//!
//! - [`TransformCodec`] — executes geometric operations on encoded bytes and
//!   reports pixel dimensions.
//! - [`ExifCodec`] — reads and writes the EXIF orientation tag and the
//!   embedded thumbnail blob, reporting absence as `None` rather than an
//!   error.
//!
//! The production implementation of both is
//! [`ReencodeCodec`](crate::reencode::ReencodeCodec); tests use the recording
//! [`mock::MockCodec`].

use crate::orientation::Orientation;
use crate::transform::Transform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JPEG data: {0}")]
    Malformed(String),
    #[error("image has no EXIF data")]
    NoExif,
    #[error("no pre-existing thumbnail found, cannot set")]
    NoThumbnail,
    #[error("processing failed: {0}")]
    Processing(String),
}

/// Executes geometric operations on encoded JPEG bytes.
pub trait TransformCodec {
    /// Pixel width and height of the encoded image.
    fn dimensions(&self, jpeg: &[u8]) -> Result<(u32, u32), CodecError>;

    /// Produce new encoded bytes implementing `op`.
    fn apply(&self, jpeg: &[u8], op: &Transform) -> Result<Vec<u8>, CodecError>;
}

/// Reads and writes EXIF orientation and thumbnail metadata.
///
/// Setters mutate the buffer in place; this is the one sanctioned exception
/// to "every operation returns a new buffer", since metadata is separate
/// from pixel content.
pub trait ExifCodec {
    /// The orientation tag, or `None` when no EXIF data or no tag is present.
    fn orientation(&self, jpeg: &[u8]) -> Result<Option<Orientation>, CodecError>;

    /// Overwrite the orientation tag. Fails with [`CodecError::NoExif`] when
    /// the buffer carries no writable orientation field.
    fn set_orientation(&self, jpeg: &mut Vec<u8>, orientation: Orientation)
    -> Result<(), CodecError>;

    /// The embedded thumbnail blob, or `None` when absent.
    fn thumbnail(&self, jpeg: &[u8]) -> Result<Option<Vec<u8>>, CodecError>;

    /// Replace the embedded thumbnail blob. Fails with
    /// [`CodecError::NoThumbnail`] when no thumbnail slot exists — a slot is
    /// never created where none was.
    fn set_thumbnail(&self, jpeg: &mut Vec<u8>, thumbnail: &[u8]) -> Result<(), CodecError>;

    /// Remove the embedded thumbnail blob entirely. A no-op when none is
    /// present.
    fn strip_thumbnail(&self, jpeg: &mut Vec<u8>) -> Result<(), CodecError>;
}
