//! # jpegturn
//!
//! Geometric transforms over encoded JPEG buffers that keep the embedded
//! EXIF **orientation tag** and EXIF **thumbnail** consistent with the image
//! content — without the library itself ever decoding pixel data for
//! correctness.
//!
//! The heart of the crate is the orientation algebra: the eight EXIF
//! orientation values form the dihedral group of a square (D4), and every
//! rotate/flip/transpose acts on the current value as multiplication by a
//! fixed group element. After any content-changing operation the embedded
//! thumbnail is re-derived at the conventional 160-pixel long edge, or
//! deliberately left stale when regenerating would mean upscaling.
//!
//! ```no_run
//! use jpegturn::{JpegImage, OrientationTracking, ReencodeCodec};
//!
//! # fn main() -> jpegturn::Result<()> {
//! let codec = ReencodeCodec::new();
//! let img = JpegImage::open("holiday.jpg", &codec)?;
//! // Rotate the pixels and keep the EXIF orientation tag in step.
//! let turned = img.rotate(90, OrientationTracking::Propagate)?;
//! turned.save("holiday-turned.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`orientation`] | The D4 orientation group: values 1–8, generator permutation tables, corrective operations |
//! | [`transform`] | Operation types: rotate, flip, transpose, transverse, crop, downscale |
//! | [`codec`] | Collaborator traits — [`TransformCodec`] for pixels, [`ExifCodec`] for metadata |
//! | [`exif`] | Byte-level APP1/TIFF reader and writer for orientation and thumbnail fields |
//! | [`reencode`] | `image`-crate backend implementing both codec traits (re-encoding, not lossless) |
//! | [`thumbnail`] | Pure thumbnail target-size math (long edge fixed at 160) |
//! | [`jpeg`] | [`JpegImage`] — the handle tying validation, dispatch, propagation and thumbnail refresh together |
//!
//! # Design Decisions
//!
//! ## Pixel work stays behind a trait
//!
//! True lossless JPEG transforms shuffle DCT blocks without re-encoding and
//! belong to a transcoder, not to this crate. All geometry goes through
//! [`TransformCodec`], so a jpegtran-style backend can be dropped in; the
//! bundled [`ReencodeCodec`] covers the same contract by decoding and
//! re-encoding, which is convenient but not lossless.
//!
//! ## Metadata is the one in-place mutation
//!
//! Every pixel transform returns a new [`JpegImage`]. Orientation and
//! thumbnail writes patch a handle's own buffer instead, because metadata is
//! separate from pixel content — the buffer stays the single source of truth
//! and dimensions are always queried, never cached.

pub mod codec;
pub mod exif;
pub mod jpeg;
pub mod orientation;
pub mod reencode;
pub mod thumbnail;
pub mod transform;

pub use codec::{CodecError, ExifCodec, TransformCodec};
pub use jpeg::{Error, JpegImage, OrientationTracking, Result};
pub use orientation::{Orientation, SymmetryOp};
pub use reencode::ReencodeCodec;
pub use transform::{FlipDirection, Quality, Rotation, Transform};
