//! Re-encoding transform backend built on the `image` crate.
//!
//! [`ReencodeCodec`] implements both collaborator traits: geometry by
//! decode → operate → JPEG encode, metadata via the [`exif`](crate::exif)
//! segment reader/writer. The source's APP1 Exif segment is copied into
//! every output, the way `jpegtran -copy all` carries markers through.
//!
//! This backend is **not lossless** — each geometric operation is a full
//! re-encode. It stands in where a true DCT-domain transcoder is
//! unavailable; anything that wraps one can replace it by implementing
//! [`TransformCodec`] over the same byte-level contract.

use crate::codec::{CodecError, ExifCodec, TransformCodec};
use crate::exif;
use crate::orientation::Orientation;
use crate::transform::{FlipDirection, Rotation, Transform};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Encode quality for operations that are conceptually lossless
/// (rotate/flip/transpose/crop). Downscale uses its own quality parameter.
const GEOMETRY_QUALITY: u8 = 95;

#[derive(Debug, Default)]
pub struct ReencodeCodec;

impl ReencodeCodec {
    pub fn new() -> Self {
        Self
    }
}

fn decode(jpeg: &[u8]) -> Result<DynamicImage, CodecError> {
    ImageReader::with_format(Cursor::new(jpeg), ImageFormat::Jpeg)
        .decode()
        .map_err(|e| CodecError::Malformed(e.to_string()))
}

fn encode(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| CodecError::Processing(e.to_string()))?;
    Ok(out)
}

impl TransformCodec for ReencodeCodec {
    fn dimensions(&self, jpeg: &[u8]) -> Result<(u32, u32), CodecError> {
        ImageReader::with_format(Cursor::new(jpeg), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }

    fn apply(&self, jpeg: &[u8], op: &Transform) -> Result<Vec<u8>, CodecError> {
        let img = decode(jpeg)?;
        let mut quality = GEOMETRY_QUALITY;
        let result = match *op {
            Transform::Rotate(Rotation::Quarter) => img.rotate90(),
            Transform::Rotate(Rotation::Half) => img.rotate180(),
            Transform::Rotate(Rotation::ThreeQuarter) => img.rotate270(),
            Transform::Flip(FlipDirection::Horizontal) => img.fliph(),
            Transform::Flip(FlipDirection::Vertical) => img.flipv(),
            // Mirror over the main diagonal: (x, y) → (y, x).
            Transform::Transpose => img.rotate90().fliph(),
            // Mirror over the anti-diagonal.
            Transform::Transverse => img.rotate90().flipv(),
            Transform::Crop { x, y, width, height } => img.crop_imm(x, y, width, height),
            Transform::Downscale { width, height, quality: q } => {
                quality = q.value();
                img.resize_exact(width, height, FilterType::Lanczos3)
            }
        };

        let encoded = encode(&result, quality)?;
        match exif::exif_segment(jpeg)? {
            Some(segment) => exif::with_exif_segment(&encoded, segment),
            None => Ok(encoded),
        }
    }
}

impl ExifCodec for ReencodeCodec {
    fn orientation(&self, jpeg: &[u8]) -> Result<Option<Orientation>, CodecError> {
        exif::orientation(jpeg)
    }

    fn set_orientation(
        &self,
        jpeg: &mut Vec<u8>,
        orientation: Orientation,
    ) -> Result<(), CodecError> {
        exif::set_orientation(jpeg, orientation)
    }

    fn thumbnail(&self, jpeg: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
        exif::thumbnail(jpeg)
    }

    fn set_thumbnail(&self, jpeg: &mut Vec<u8>, thumbnail: &[u8]) -> Result<(), CodecError> {
        exif::set_thumbnail(jpeg, thumbnail)
    }

    fn strip_thumbnail(&self, jpeg: &mut Vec<u8>) -> Result<(), CodecError> {
        exif::strip_thumbnail(jpeg)
    }
}
