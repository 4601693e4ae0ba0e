use img_parts::Bytes;
use img_parts::jpeg::{Jpeg, JpegSegment};

use super::fragment::{Fragment, SegmentType, SegmentView};
use crate::error::{Result, XmpError};
use crate::xmp::codec::{self, SerializeOptions, XMP_PREAMBLE, XmpDocument};
use crate::xmp::writer::{self, MetadataObject, MetadataWriter, SplicePoint};
use crate::xmp::XmpPacket;

// The 16-bit length field counts itself.
const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Parse a JPEG byte stream with img-parts.
///
/// img-parts drops 0xFF fill bytes between segments, so a file that has them
/// is re-encoded without them. Every segment itself is kept as read.
pub fn parse_jpeg(bytes: impl Into<Bytes>) -> Result<Jpeg> {
    Jpeg::from_bytes(bytes.into()).map_err(|e| XmpError::Jpeg(e.to_string()))
}

/// The segments of a parsed JPEG as a fragment sequence.
///
/// img-parts keeps SOI implicit, so it is added back as the first fragment.
/// Entropy-coded scan data is not part of the returned fragments.
pub fn segment_fragments(jpeg: &Jpeg) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(jpeg.segments().len() + 1);
    fragments.push(Fragment::segment(SegmentType::Soi, Bytes::new()));
    fragments.extend(jpeg.segments().iter().map(|s| {
        Fragment::segment(SegmentType::from_byte(s.marker()), s.contents().clone())
    }));
    fragments
}

/// Replace or insert the XMP APP1 segment of `jpeg` with `payload`.
///
/// The returned point indexes `jpeg.segments()`, which does not include SOI.
/// All other segments are left exactly as parsed.
pub fn splice_xmp(jpeg: &mut Jpeg, payload: Bytes) -> Result<SplicePoint> {
    check_payload_len(payload.len())?;

    let point = writer::locate(jpeg.segments());
    let segment = JpegSegment::new_with_contents(SegmentType::App1.to_byte(), payload);
    point.apply_in_place(jpeg.segments_mut(), segment);

    log::debug!("XMP segment {point:?} in {} segments", jpeg.segments().len());
    Ok(point)
}

/// Write `document` into the JPEG `bytes` and return the re-encoded file.
pub fn write_xmp<D: XmpDocument + ?Sized>(
    bytes: impl Into<Bytes>,
    document: &D,
    options: &SerializeOptions,
) -> Result<(Bytes, SplicePoint)> {
    let payload = codec::encode_with(document, options)?;
    let mut jpeg = parse_jpeg(bytes)?;
    let point = splice_xmp(&mut jpeg, Bytes::from(payload))?;
    Ok((jpeg.encoder().bytes(), point))
}

/// Let `writer` place `metadata` into `jpeg`.
pub fn apply_writer(
    jpeg: &mut Jpeg,
    writer: &dyn MetadataWriter,
    metadata: &dyn MetadataObject,
) -> Result<SplicePoint> {
    let segment = writer.build_segment(metadata)?;
    check_payload_len(segment.payload.len())?;

    let point = {
        let views: Vec<&dyn SegmentView> =
            jpeg.segments().iter().map(|s| s as &dyn SegmentView).collect();
        writer.locate(&views)
    };
    let segment = JpegSegment::new_with_contents(segment.segment_type.to_byte(), segment.payload);
    point.apply_in_place(jpeg.segments_mut(), segment);

    log::debug!("{} segment {point:?}", writer.name());
    Ok(point)
}

/// The first XMP packet in `jpeg`, if any.
pub fn read_xmp(jpeg: &Jpeg) -> Result<Option<XmpPacket>> {
    let Some(segment) = jpeg.segments().iter().find(|s| {
        s.marker() == SegmentType::App1.to_byte() && codec::has_xmp_preamble(s.contents())
    }) else {
        return Ok(None);
    };

    XmpPacket::from_bytes(&segment.contents()[XMP_PREAMBLE.len()..]).map(Some)
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_SEGMENT_PAYLOAD {
        return Err(XmpError::PayloadTooLarge {
            len,
            max: MAX_SEGMENT_PAYLOAD,
        });
    }
    Ok(())
}
