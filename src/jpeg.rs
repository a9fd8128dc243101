//! The image handle and operation dispatch.
//!
//! [`JpegImage`] wraps an exclusively-owned encoded JPEG buffer and a
//! borrowed codec backend. Every geometric operation validates its
//! parameters against the current dimensions, delegates the pixel work to
//! the [`TransformCodec`], optionally keeps the EXIF orientation tag in step
//! ([`OrientationTracking::Propagate`]), and finally re-derives the embedded
//! thumbnail on the result.
//!
//! Pixel transforms always return a **new** handle; the only in-place
//! mutation is overwriting the orientation tag or thumbnail blob inside a
//! handle's own buffer, which is metadata, not pixel content.

use std::fs;
use std::path::Path;

use crate::codec::{CodecError, ExifCodec, TransformCodec};
use crate::orientation::Orientation;
use crate::thumbnail;
use crate::transform::{FlipDirection, Quality, Rotation, Transform};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An angle, crop rectangle or scale target outside the allowed domain.
    /// Detected before any codec call.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An orientation tag was required but the image carries none.
    #[error("could not find EXIF orientation")]
    MissingMetadata,
    /// Attempt to set a thumbnail on an image that has no thumbnail slot.
    #[error("no pre-existing thumbnail found, cannot set")]
    NoExistingThumbnail,
    /// Collaborator failure on malformed bytes, propagated unchanged.
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Whether a transform keeps the EXIF orientation tag in step with the new
/// pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationTracking {
    /// Leave the tag untouched.
    Ignore,
    /// Compose the operation's symmetry with the current tag (defaulting to
    /// upright when absent) and write the result.
    Propagate,
}

/// An encoded JPEG with geometry- and metadata-consistent transforms.
///
/// The buffer is the single source of truth: dimensions are queried from it
/// on demand, never cached.
pub struct JpegImage<'c, B: ?Sized> {
    data: Vec<u8>,
    codec: &'c B,
}

impl<'c, B: ?Sized> Clone for JpegImage<'c, B> {
    fn clone(&self) -> Self {
        Self { data: self.data.clone(), codec: self.codec }
    }
}

impl<'c, B: TransformCodec + ExifCodec + ?Sized> JpegImage<'c, B> {
    /// Read an image from a file.
    pub fn open(path: impl AsRef<Path>, codec: &'c B) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self { data, codec })
    }

    /// Wrap an in-memory encoded JPEG.
    pub fn from_blob(data: impl Into<Vec<u8>>, codec: &'c B) -> Self {
        Self { data: data.into(), codec }
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel width and height, queried from the buffer.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        Ok(self.codec.dimensions(&self.data)?)
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.dimensions()?.0)
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.dimensions()?.1)
    }

    /// The EXIF orientation tag, or `None` when absent.
    pub fn exif_orientation(&self) -> Result<Option<Orientation>> {
        Ok(self.codec.orientation(&self.data)?)
    }

    /// Overwrite the EXIF orientation tag in place.
    pub fn set_exif_orientation(&mut self, orientation: Orientation) -> Result<()> {
        Ok(self.codec.set_orientation(&mut self.data, orientation)?)
    }

    /// The embedded EXIF thumbnail as its own image handle, or `None`.
    pub fn exif_thumbnail(&self) -> Result<Option<JpegImage<'c, B>>> {
        Ok(self
            .codec
            .thumbnail(&self.data)?
            .map(|data| Self { data, codec: self.codec }))
    }

    /// Replace the embedded EXIF thumbnail in place.
    ///
    /// A thumbnail can only be replaced, never created: fails with
    /// [`Error::NoExistingThumbnail`] when the image has none.
    pub fn set_exif_thumbnail(&mut self, thumbnail: &[u8]) -> Result<()> {
        if self.codec.thumbnail(&self.data)?.is_none() {
            return Err(Error::NoExistingThumbnail);
        }
        Ok(self.codec.set_thumbnail(&mut self.data, thumbnail)?)
    }

    /// Rotate clockwise by 90, 180 or 270 degrees.
    pub fn rotate(&self, degrees: u16, tracking: OrientationTracking) -> Result<Self> {
        let rotation = Rotation::from_degrees(degrees).ok_or_else(|| {
            Error::InvalidParameter(format!("angle must be 90, 180 or 270, got {degrees}"))
        })?;
        self.transformed(Transform::Rotate(rotation), tracking)
    }

    /// Mirror across the vertical or horizontal axis.
    pub fn flip(&self, direction: FlipDirection, tracking: OrientationTracking) -> Result<Self> {
        self.transformed(Transform::Flip(direction), tracking)
    }

    /// Mirror across the top-left → bottom-right diagonal.
    pub fn transpose(&self, tracking: OrientationTracking) -> Result<Self> {
        self.transformed(Transform::Transpose, tracking)
    }

    /// Mirror across the top-right → bottom-left diagonal.
    pub fn transverse(&self, tracking: OrientationTracking) -> Result<Self> {
        self.transformed(Transform::Transverse, tracking)
    }

    /// Extract a rectangle. Never alters orientation semantics.
    ///
    /// The rectangle must satisfy `x < width`, `y < height`,
    /// `x + w <= width`, `y + h <= height` — exactly these inequalities, so
    /// a zero-area rectangle inside bounds is accepted.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let (image_w, image_h) = self.dimensions()?;
        let valid = x < image_w
            && y < image_h
            && x as u64 + width as u64 <= image_w as u64
            && y as u64 + height as u64 <= image_h as u64;
        if !valid {
            return Err(Error::InvalidParameter(format!(
                "crop rectangle {width}x{height}+{x}+{y} extends outside the {image_w}x{image_h} image"
            )));
        }
        self.transformed(
            Transform::Crop { x, y, width, height },
            OrientationTracking::Ignore,
        )
    }

    /// Scale down to exactly `width` × `height`.
    ///
    /// Downscaling to the current size returns a handle over bit-identical
    /// bytes without re-encoding; a target exceeding the current size in
    /// either dimension is rejected (this system never upscales).
    pub fn downscale(&self, width: u32, height: u32, quality: Quality) -> Result<Self> {
        let Some(data) = self.downscaled_bytes(width, height, quality)? else {
            return Ok(self.clone());
        };
        let mut new = Self { data, codec: self.codec };
        new.refresh_thumbnail()?;
        Ok(new)
    }

    /// Apply the single corrective operation that brings the image upright,
    /// so its orientation tag becomes 1.
    ///
    /// Fails with [`Error::MissingMetadata`] when no orientation tag is
    /// present.
    pub fn autotransform(&self) -> Result<Self> {
        let orientation = self.exif_orientation()?.ok_or(Error::MissingMetadata)?;
        match orientation.corrective_op() {
            None => Ok(self.clone()),
            Some(op) => self.transformed(Transform::from_symmetry(op), OrientationTracking::Propagate),
        }
    }

    /// Write the buffer to a file. The filename must end in `.jpg` or
    /// `.jpeg` (case-insensitive).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        if !is_jpeg {
            return Err(Error::InvalidParameter(format!(
                "{} does not end with '.jpg' or '.jpeg'",
                path.display()
            )));
        }
        fs::write(path, &self.data)?;
        Ok(())
    }

    /// Run a validated operation through the codec, propagate orientation
    /// when asked, and bring the result's thumbnail back in sync.
    fn transformed(&self, op: Transform, tracking: OrientationTracking) -> Result<Self> {
        let data = self.codec.apply(&self.data, &op)?;
        let mut new = Self { data, codec: self.codec };
        if tracking == OrientationTracking::Propagate
            && let Some(symmetry) = op.symmetry()
        {
            let current = new.exif_orientation()?.unwrap_or(Orientation::TopLeft);
            new.set_exif_orientation(current.apply(symmetry))?;
        }
        new.refresh_thumbnail()?;
        Ok(new)
    }

    /// Validate the target against the current size and run the scale.
    /// `Ok(None)` means the target equals the current size, so the encoded
    /// bytes would be unchanged.
    fn downscaled_bytes(
        &self,
        width: u32,
        height: u32,
        quality: Quality,
    ) -> Result<Option<Vec<u8>>> {
        let (image_w, image_h) = self.dimensions()?;
        if (width, height) == (image_w, image_h) {
            return Ok(None);
        }
        if width > image_w || height > image_h {
            return Err(Error::InvalidParameter(format!(
                "cannot upscale {image_w}x{image_h} to {width}x{height}"
            )));
        }
        let data = self
            .codec
            .apply(&self.data, &Transform::Downscale { width, height, quality })?;
        Ok(Some(data))
    }

    /// Regenerate the embedded thumbnail to track the current geometry.
    ///
    /// No-op when no thumbnail is embedded. When the 160-long-edge target
    /// would exceed the primary image in both dimensions the stale thumbnail
    /// is left in place (regenerating would mean upscaling). The reduced
    /// copy comes from the plain scale, which performs no refresh of its
    /// own, and any thumbnail the codec carried into it is stripped before
    /// embedding, so a regeneration writes exactly one thumbnail and never
    /// nests one inside another.
    fn refresh_thumbnail(&mut self) -> Result<()> {
        if self.codec.thumbnail(&self.data)?.is_none() {
            return Ok(());
        }
        let (width, height) = self.dimensions()?;
        let (target_w, target_h) = thumbnail::target_dimensions(width, height);
        if target_w > width && target_h > height {
            return Ok(());
        }
        let mut reduced = self
            .downscaled_bytes(target_w, target_h, Quality::default())?
            .unwrap_or_else(|| self.data.clone());
        self.codec.strip_thumbnail(&mut reduced)?;
        Ok(self.codec.set_thumbnail(&mut self.data, &reduced)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mock::{MockCodec, RecordedOp};

    fn applies(ops: &[RecordedOp]) -> Vec<&RecordedOp> {
        ops.iter()
            .filter(|op| matches!(op, RecordedOp::Apply(_)))
            .collect()
    }

    #[test]
    fn rotate_rejects_bad_angles() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        for angle in [0, 45, 91, 360] {
            assert!(matches!(
                img.rotate(angle, OrientationTracking::Ignore),
                Err(Error::InvalidParameter(_))
            ));
        }
        assert!(applies(&codec.recorded()).is_empty(), "codec must not be called");
    }

    #[test]
    fn rotate_quarter_swaps_dimensions() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let turned = img.rotate(90, OrientationTracking::Ignore).unwrap();
        assert_eq!(turned.dimensions().unwrap(), (80, 100));
    }

    #[test]
    fn rotate_without_tracking_leaves_orientation_alone() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image_with(100, 80, Some(6), None), &codec);
        let turned = img.rotate(90, OrientationTracking::Ignore).unwrap();
        assert_eq!(turned.exif_orientation().unwrap(), Orientation::from_tag(6));
        assert!(!codec
            .recorded()
            .iter()
            .any(|op| matches!(op, RecordedOp::SetOrientation(_))));
    }

    #[test]
    fn rotate_with_tracking_composes_orientation() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image_with(100, 80, Some(6), None), &codec);
        let turned = img.rotate(90, OrientationTracking::Propagate).unwrap();
        // apply(6, Rotate90) == 1
        assert_eq!(turned.exif_orientation().unwrap(), Some(Orientation::TopLeft));
    }

    #[test]
    fn tracking_defaults_to_upright_when_tag_is_absent() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let turned = img.rotate(90, OrientationTracking::Propagate).unwrap();
        // apply(1, Rotate90) == 8
        assert_eq!(turned.exif_orientation().unwrap(), Orientation::from_tag(8));
    }

    #[test]
    fn flip_with_tracking_composes_orientation() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image_with(100, 80, Some(3), None), &codec);
        let flipped = img
            .flip(FlipDirection::Horizontal, OrientationTracking::Propagate)
            .unwrap();
        // apply(3, FlipH) == 4
        assert_eq!(flipped.exif_orientation().unwrap(), Orientation::from_tag(4));
    }

    #[test]
    fn transpose_and_transverse_swap_dimensions() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let t = img.transpose(OrientationTracking::Ignore).unwrap();
        assert_eq!(t.dimensions().unwrap(), (80, 100));
        let t = img.transverse(OrientationTracking::Ignore).unwrap();
        assert_eq!(t.dimensions().unwrap(), (80, 100));
    }

    #[test]
    fn crop_inside_bounds_succeeds() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let cropped = img.crop(10, 10, 50, 40).unwrap();
        assert_eq!(cropped.dimensions().unwrap(), (50, 40));
    }

    #[test]
    fn crop_matching_full_bounds_succeeds() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let cropped = img.crop(0, 0, 100, 80).unwrap();
        assert_eq!(cropped.dimensions().unwrap(), (100, 80));
    }

    #[test]
    fn crop_past_right_edge_is_rejected() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        assert!(matches!(
            img.crop(60, 0, 50, 40),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            img.crop(100, 0, 1, 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn zero_area_crop_inside_bounds_is_accepted() {
        // The bound checks are deliberately exactly the original's; a
        // degenerate rectangle satisfies all four inequalities.
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let cropped = img.crop(10, 10, 0, 0).unwrap();
        assert_eq!(cropped.dimensions().unwrap(), (0, 0));
    }

    #[test]
    fn downscale_to_current_size_is_identity() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(
            MockCodec::image_with(100, 80, Some(6), Some(b"thumb")),
            &codec,
        );
        let same = img.downscale(100, 80, Quality::default()).unwrap();
        assert_eq!(same.as_bytes(), img.as_bytes(), "bytes must be bit-identical");
        assert!(applies(&codec.recorded()).is_empty(), "no codec transform");
        assert!(
            !codec
                .recorded()
                .iter()
                .any(|op| matches!(op, RecordedOp::SetThumbnail { .. })),
            "identity downscale must not touch the thumbnail"
        );
    }

    #[test]
    fn downscale_rejects_upscaling() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        assert!(matches!(
            img.downscale(200, 80, Quality::default()),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            img.downscale(100, 81, Quality::default()),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn downscale_produces_target_size() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let scaled = img.downscale(50, 40, Quality::new(60)).unwrap();
        assert_eq!(scaled.dimensions().unwrap(), (50, 40));
    }

    #[test]
    fn thumbnail_refresh_skipped_when_target_would_upscale() {
        // 100x50 downscaled to 40x20: the 160x80 target exceeds the primary
        // in both dimensions, so the stale thumbnail stays.
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(
            MockCodec::image_with(100, 50, None, Some(b"stale")),
            &codec,
        );
        let small = img.downscale(40, 20, Quality::default()).unwrap();
        let thumb = small.exif_thumbnail().unwrap().unwrap();
        assert_eq!(thumb.as_bytes(), b"stale");
        assert!(!codec
            .recorded()
            .iter()
            .any(|op| matches!(op, RecordedOp::SetThumbnail { .. })));
    }

    #[test]
    fn thumbnail_regenerated_after_rotation() {
        // 1600x800 rotated to 800x1600: portrait target is 80x160.
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(
            MockCodec::image_with(1600, 800, None, Some(b"old thumb")),
            &codec,
        );
        let turned = img.rotate(90, OrientationTracking::Ignore).unwrap();
        assert!(codec
            .recorded()
            .iter()
            .any(|op| matches!(op, RecordedOp::SetThumbnail { .. })));
        let thumb = turned.exif_thumbnail().unwrap().unwrap();
        assert_eq!(thumb.dimensions().unwrap(), (80, 160));
    }

    #[test]
    fn thumbnail_refresh_writes_once_and_never_nests() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(
            MockCodec::image_with(1600, 800, None, Some(b"old thumb")),
            &codec,
        );
        let turned = img.rotate(90, OrientationTracking::Ignore).unwrap();
        let writes = codec
            .recorded()
            .iter()
            .filter(|op| matches!(op, RecordedOp::SetThumbnail { .. }))
            .count();
        assert_eq!(writes, 1, "the reduced copy must not refresh a thumbnail of its own");
        let thumb = turned.exif_thumbnail().unwrap().unwrap();
        assert!(
            thumb.exif_thumbnail().unwrap().is_none(),
            "regenerated thumbnail must not contain a nested thumbnail"
        );
    }

    #[test]
    fn no_thumbnail_means_no_refresh_work() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(1600, 800), &codec);
        img.rotate(90, OrientationTracking::Ignore).unwrap();
        assert!(!codec
            .recorded()
            .iter()
            .any(|op| matches!(op, RecordedOp::SetThumbnail { .. })));
    }

    #[test]
    fn exif_thumbnail_is_its_own_handle() {
        let codec = MockCodec::new();
        let inner = MockCodec::image(16, 8);
        let img = JpegImage::from_blob(
            MockCodec::image_with(1000, 500, None, Some(&inner)),
            &codec,
        );
        let thumb = img.exif_thumbnail().unwrap().unwrap();
        assert_eq!(thumb.dimensions().unwrap(), (16, 8));
    }

    #[test]
    fn set_thumbnail_requires_existing_slot() {
        let codec = MockCodec::new();
        let mut img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        assert!(matches!(
            img.set_exif_thumbnail(b"new"),
            Err(Error::NoExistingThumbnail)
        ));
    }

    #[test]
    fn autotransform_rotates_sideways_image_upright() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image_with(100, 80, Some(6), None), &codec);
        let upright = img.autotransform().unwrap();
        assert_eq!(upright.exif_orientation().unwrap(), Some(Orientation::TopLeft));
        assert_eq!(upright.dimensions().unwrap(), (80, 100));
    }

    #[test]
    fn autotransform_covers_every_orientation() {
        for tag in 1..=8u16 {
            let codec = MockCodec::new();
            let img =
                JpegImage::from_blob(MockCodec::image_with(100, 80, Some(tag), None), &codec);
            let upright = img.autotransform().unwrap();
            assert_eq!(
                upright.exif_orientation().unwrap(),
                Some(Orientation::TopLeft),
                "orientation {tag} did not come out upright"
            );
        }
    }

    #[test]
    fn autotransform_on_upright_image_is_identity() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image_with(100, 80, Some(1), None), &codec);
        let upright = img.autotransform().unwrap();
        assert_eq!(upright.as_bytes(), img.as_bytes());
        assert!(applies(&codec.recorded()).is_empty());
    }

    #[test]
    fn autotransform_without_tag_is_missing_metadata() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        assert!(matches!(img.autotransform(), Err(Error::MissingMetadata)));
    }

    #[test]
    fn save_rejects_non_jpeg_filenames() {
        let codec = MockCodec::new();
        let img = JpegImage::from_blob(MockCodec::image(100, 80), &codec);
        let dir = tempfile::tempdir().unwrap();
        for name in ["image.png", "image.jpg.txt", "image"] {
            assert!(matches!(
                img.save(dir.path().join(name)),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn save_and_open_round_trip() {
        let codec = MockCodec::new();
        let bytes = MockCodec::image_with(100, 80, Some(5), None);
        let img = JpegImage::from_blob(bytes.clone(), &codec);
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("picture.JPEG");
        img.save(&path).unwrap();

        let reopened = JpegImage::open(&path, &codec).unwrap();
        assert_eq!(reopened.as_bytes(), bytes.as_slice());
        assert_eq!(reopened.exif_orientation().unwrap(), Orientation::from_tag(5));
    }
}
