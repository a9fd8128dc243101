//! Minimal EXIF reader/writer for JPEG buffers.
//!
//! Walks the JPEG marker stream to the APP1 `Exif` segment, then walks the
//! TIFF IFD chain inside it:
//! - IFD0 tag 0x0112 — the orientation value, patched in place on write.
//! - IFD1 tags 0x0201/0x0202 — offset and length of the embedded JPEG
//!   thumbnail, replaced by splicing on write.
//!
//! Pure Rust, no dependencies. Only the fields this crate needs are touched;
//! everything else in the segment is left byte-for-byte intact.

use crate::codec::CodecError;
use crate::orientation::Orientation;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const TAG_ORIENTATION: u16 = 0x0112;
const TAG_THUMB_OFFSET: u16 = 0x0201; // JPEGInterchangeFormat
const TAG_THUMB_LENGTH: u16 = 0x0202; // JPEGInterchangeFormatLength

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    fn read_u16(self, data: &[u8], at: usize) -> u16 {
        let b = [data[at], data[at + 1]];
        match self {
            Self::Big => u16::from_be_bytes(b),
            Self::Little => u16::from_le_bytes(b),
        }
    }

    fn read_u32(self, data: &[u8], at: usize) -> u32 {
        let b = [data[at], data[at + 1], data[at + 2], data[at + 3]];
        match self {
            Self::Big => u32::from_be_bytes(b),
            Self::Little => u32::from_le_bytes(b),
        }
    }

    fn write_u16(self, data: &mut [u8], at: usize, value: u16) {
        let b = match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        };
        data[at..at + 2].copy_from_slice(&b);
    }

    fn write_u32(self, data: &mut [u8], at: usize, value: u32) {
        let b = match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        };
        data[at..at + 4].copy_from_slice(&b);
    }
}

/// Location of the thumbnail payload and the IFD1 length field describing it.
struct ThumbnailSlot {
    data_start: usize,
    data_len: usize,
    length_value_at: usize,
}

/// Byte offsets of everything we read or patch, all absolute into the JPEG.
struct ExifLayout {
    segment_start: usize,
    segment_end: usize,
    order: ByteOrder,
    orientation_value_at: Option<usize>,
    thumbnail: Option<ThumbnailSlot>,
}

/// Locate the APP1 Exif segment and the fields of interest inside it.
///
/// Returns `Ok(None)` when the image simply has no Exif APP1 segment;
/// structural damage inside one that exists is a [`CodecError::Malformed`].
fn scan(jpeg: &[u8]) -> Result<Option<ExifLayout>, CodecError> {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return Err(CodecError::Malformed("missing SOI marker".into()));
    }

    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != 0xFF {
            return Err(CodecError::Malformed(format!(
                "expected marker at offset {pos}"
            )));
        }
        let marker = jpeg[pos + 1];
        // SOS means entropy-coded data follows; no Exif past this point.
        if marker == 0xDA {
            break;
        }
        // Standalone markers carry no length field.
        if marker == 0xD8 || marker == 0xD9 || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        let seg_len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        if seg_len < 2 || pos + 2 + seg_len > jpeg.len() {
            return Err(CodecError::Malformed("truncated segment".into()));
        }
        let payload = &jpeg[pos + 4..pos + 2 + seg_len];
        if marker == 0xE1 && payload.starts_with(EXIF_HEADER) {
            let tiff_start = pos + 4 + EXIF_HEADER.len();
            let segment_end = pos + 2 + seg_len;
            return parse_tiff(jpeg, pos, segment_end, tiff_start).map(Some);
        }
        pos += 2 + seg_len;
    }
    Ok(None)
}

/// Walk the TIFF structure of an Exif segment: IFD0 for the orientation
/// entry, then the linked IFD1 for the thumbnail slot.
fn parse_tiff(
    jpeg: &[u8],
    segment_start: usize,
    segment_end: usize,
    tiff_start: usize,
) -> Result<ExifLayout, CodecError> {
    if tiff_start + 8 > segment_end {
        return Err(CodecError::Malformed("truncated TIFF header".into()));
    }
    let order = match &jpeg[tiff_start..tiff_start + 2] {
        b"MM" => ByteOrder::Big,
        b"II" => ByteOrder::Little,
        _ => return Err(CodecError::Malformed("bad TIFF byte order mark".into())),
    };
    if order.read_u16(jpeg, tiff_start + 2) != 42 {
        return Err(CodecError::Malformed("bad TIFF magic".into()));
    }

    let mut layout = ExifLayout {
        segment_start,
        segment_end,
        order,
        orientation_value_at: None,
        thumbnail: None,
    };

    let ifd0_at = tiff_start + order.read_u32(jpeg, tiff_start + 4) as usize;
    let next_ifd = walk_ifd(jpeg, segment_end, ifd0_at, order, |tag, value_at| {
        if tag == TAG_ORIENTATION {
            layout.orientation_value_at = Some(value_at);
        }
    })?;

    if next_ifd != 0 {
        let ifd1_at = tiff_start + next_ifd as usize;
        let mut thumb_offset: Option<u32> = None;
        let mut thumb_length: Option<u32> = None;
        let mut length_value_at = 0usize;
        walk_ifd(jpeg, segment_end, ifd1_at, order, |tag, value_at| {
            if tag == TAG_THUMB_OFFSET {
                thumb_offset = Some(order.read_u32(jpeg, value_at));
            } else if tag == TAG_THUMB_LENGTH {
                thumb_length = Some(order.read_u32(jpeg, value_at));
                length_value_at = value_at;
            }
        })?;
        if let (Some(offset), Some(length)) = (thumb_offset, thumb_length) {
            let data_start = tiff_start + offset as usize;
            let data_len = length as usize;
            if data_start + data_len > segment_end {
                return Err(CodecError::Malformed(
                    "thumbnail extends past the Exif segment".into(),
                ));
            }
            layout.thumbnail = Some(ThumbnailSlot { data_start, data_len, length_value_at });
        }
    }

    Ok(layout)
}

/// Visit every entry of one IFD as `(tag, absolute value-field offset)` and
/// return the offset of the next IFD (0 when none).
fn walk_ifd(
    jpeg: &[u8],
    segment_end: usize,
    ifd_at: usize,
    order: ByteOrder,
    mut visit: impl FnMut(u16, usize),
) -> Result<u32, CodecError> {
    if ifd_at + 2 > segment_end {
        return Err(CodecError::Malformed("IFD offset out of range".into()));
    }
    let entry_count = order.read_u16(jpeg, ifd_at) as usize;
    let entries_start = ifd_at + 2;
    let next_at = entries_start + entry_count * 12;
    if next_at + 4 > segment_end {
        return Err(CodecError::Malformed("truncated IFD".into()));
    }
    for i in 0..entry_count {
        let entry_at = entries_start + i * 12;
        let tag = order.read_u16(jpeg, entry_at);
        // The 4-byte value field; SHORT/LONG values of count 1 are inline.
        visit(tag, entry_at + 8);
    }
    Ok(order.read_u32(jpeg, next_at))
}

/// Read the orientation tag. Values outside 1..=8 read as absent.
pub fn orientation(jpeg: &[u8]) -> Result<Option<Orientation>, CodecError> {
    let Some(layout) = scan(jpeg)? else {
        return Ok(None);
    };
    Ok(layout
        .orientation_value_at
        .and_then(|at| Orientation::from_tag(layout.order.read_u16(jpeg, at))))
}

/// Patch the orientation tag in place.
pub fn set_orientation(jpeg: &mut Vec<u8>, value: Orientation) -> Result<(), CodecError> {
    let Some(layout) = scan(jpeg)? else {
        return Err(CodecError::NoExif);
    };
    let Some(at) = layout.orientation_value_at else {
        return Err(CodecError::NoExif);
    };
    layout.order.write_u16(jpeg, at, value.tag());
    Ok(())
}

/// Read the embedded thumbnail blob, if any.
pub fn thumbnail(jpeg: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
    let Some(layout) = scan(jpeg)? else {
        return Ok(None);
    };
    Ok(layout
        .thumbnail
        .filter(|slot| slot.data_len > 0)
        .map(|slot| jpeg[slot.data_start..slot.data_start + slot.data_len].to_vec()))
}

/// Replace the embedded thumbnail blob, resizing the APP1 segment.
///
/// Fails with [`CodecError::NoThumbnail`] when no slot exists. The thumbnail
/// payload must be the final data in the segment (the layout every known
/// writer produces); anything else is rejected as malformed, since splicing
/// mid-segment would leave absolute IFD offsets stale.
pub fn set_thumbnail(jpeg: &mut Vec<u8>, thumb: &[u8]) -> Result<(), CodecError> {
    let Some(layout) = scan(jpeg)? else {
        return Err(CodecError::NoExif);
    };
    let Some(slot) = layout.thumbnail.filter(|slot| slot.data_len > 0) else {
        return Err(CodecError::NoThumbnail);
    };
    if slot.data_start + slot.data_len != layout.segment_end {
        return Err(CodecError::Malformed(
            "thumbnail payload is not the final data in the Exif segment".into(),
        ));
    }

    let old_segment_len =
        u16::from_be_bytes([jpeg[layout.segment_start + 2], jpeg[layout.segment_start + 3]])
            as usize;
    let new_segment_len = old_segment_len - slot.data_len + thumb.len();
    if new_segment_len > u16::MAX as usize {
        return Err(CodecError::Processing(format!(
            "replacement thumbnail of {} bytes overflows the Exif segment",
            thumb.len()
        )));
    }

    // Patch the fixed-position fields first; both sit before the payload.
    layout.order.write_u32(jpeg, slot.length_value_at, thumb.len() as u32);
    let len_bytes = (new_segment_len as u16).to_be_bytes();
    jpeg[layout.segment_start + 2..layout.segment_start + 4].copy_from_slice(&len_bytes);

    jpeg.splice(
        slot.data_start..slot.data_start + slot.data_len,
        thumb.iter().copied(),
    );
    Ok(())
}

/// Remove the embedded thumbnail payload, shrinking the APP1 segment.
///
/// A no-op when the image has no Exif segment or no thumbnail. The emptied
/// slot stays in IFD1 with length zero and reads as absent from then on.
pub fn strip_thumbnail(jpeg: &mut Vec<u8>) -> Result<(), CodecError> {
    let Some(layout) = scan(jpeg)? else {
        return Ok(());
    };
    let Some(slot) = layout.thumbnail.filter(|slot| slot.data_len > 0) else {
        return Ok(());
    };
    if slot.data_start + slot.data_len != layout.segment_end {
        return Err(CodecError::Malformed(
            "thumbnail payload is not the final data in the Exif segment".into(),
        ));
    }

    let old_segment_len =
        u16::from_be_bytes([jpeg[layout.segment_start + 2], jpeg[layout.segment_start + 3]])
            as usize;
    let len_bytes = ((old_segment_len - slot.data_len) as u16).to_be_bytes();
    layout.order.write_u32(jpeg, slot.length_value_at, 0);
    jpeg[layout.segment_start + 2..layout.segment_start + 4].copy_from_slice(&len_bytes);
    jpeg.drain(slot.data_start..slot.data_start + slot.data_len);
    Ok(())
}

/// The raw APP1 Exif segment, marker bytes included.
pub fn exif_segment(jpeg: &[u8]) -> Result<Option<&[u8]>, CodecError> {
    Ok(scan(jpeg)?.map(|layout| &jpeg[layout.segment_start..layout.segment_end]))
}

/// Insert a raw APP1 Exif segment directly after SOI.
pub fn with_exif_segment(jpeg: &[u8], segment: &[u8]) -> Result<Vec<u8>, CodecError> {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return Err(CodecError::Malformed("missing SOI marker".into()));
    }
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(segment);
    out.extend_from_slice(&jpeg[2..]);
    Ok(out)
}
