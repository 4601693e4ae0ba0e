use img_parts::Bytes;
use img_parts::jpeg::JpegSegment;

/// JPEG marker kinds, keyed by the byte following `0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    /// Start of image.
    Soi,
    /// End of image.
    Eoi,
    /// Start of scan.
    Sos,
    Dqt,
    Dht,
    Dac,
    Dri,
    Dnl,
    Com,
    /// Start of frame; the low nibble of the marker (0..=15, never 4, 8 or 12).
    Sof(u8),
    /// Restart marker 0..=7.
    Rst(u8),
    /// JFIF.
    App0,
    /// EXIF or XMP.
    App1,
    App2,
    App3,
    App4,
    App5,
    App6,
    App7,
    App8,
    App9,
    AppA,
    AppB,
    AppC,
    /// IPTC / Photoshop resources.
    AppD,
    AppE,
    AppF,
    Other(u8),
}

impl SegmentType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0xD8 => SegmentType::Soi,
            0xD9 => SegmentType::Eoi,
            0xDA => SegmentType::Sos,
            0xDB => SegmentType::Dqt,
            0xC4 => SegmentType::Dht,
            0xCC => SegmentType::Dac,
            0xDD => SegmentType::Dri,
            0xDC => SegmentType::Dnl,
            0xFE => SegmentType::Com,
            0xC8 => SegmentType::Other(byte),
            0xC0..=0xCF => SegmentType::Sof(byte & 0x0F),
            0xD0..=0xD7 => SegmentType::Rst(byte & 0x07),
            0xE0 => SegmentType::App0,
            0xE1 => SegmentType::App1,
            0xE2 => SegmentType::App2,
            0xE3 => SegmentType::App3,
            0xE4 => SegmentType::App4,
            0xE5 => SegmentType::App5,
            0xE6 => SegmentType::App6,
            0xE7 => SegmentType::App7,
            0xE8 => SegmentType::App8,
            0xE9 => SegmentType::App9,
            0xEA => SegmentType::AppA,
            0xEB => SegmentType::AppB,
            0xEC => SegmentType::AppC,
            0xED => SegmentType::AppD,
            0xEE => SegmentType::AppE,
            0xEF => SegmentType::AppF,
            _ => SegmentType::Other(byte),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            SegmentType::Soi => 0xD8,
            SegmentType::Eoi => 0xD9,
            SegmentType::Sos => 0xDA,
            SegmentType::Dqt => 0xDB,
            SegmentType::Dht => 0xC4,
            SegmentType::Dac => 0xCC,
            SegmentType::Dri => 0xDD,
            SegmentType::Dnl => 0xDC,
            SegmentType::Com => 0xFE,
            SegmentType::Sof(n) => 0xC0 | (n & 0x0F),
            SegmentType::Rst(n) => 0xD0 | (n & 0x07),
            SegmentType::App0 => 0xE0,
            SegmentType::App1 => 0xE1,
            SegmentType::App2 => 0xE2,
            SegmentType::App3 => 0xE3,
            SegmentType::App4 => 0xE4,
            SegmentType::App5 => 0xE5,
            SegmentType::App6 => 0xE6,
            SegmentType::App7 => 0xE7,
            SegmentType::App8 => 0xE8,
            SegmentType::App9 => 0xE9,
            SegmentType::AppA => 0xEA,
            SegmentType::AppB => 0xEB,
            SegmentType::AppC => 0xEC,
            SegmentType::AppD => 0xED,
            SegmentType::AppE => 0xEE,
            SegmentType::AppF => 0xEF,
            SegmentType::Other(b) => b,
        }
    }

    /// `true` for markers a new XMP block must never be placed in front of.
    pub fn precedes_xmp(self) -> bool {
        matches!(self, SegmentType::Soi | SegmentType::App0)
    }
}

/// A marked structural chunk of a JPEG file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_type: SegmentType,
    /// Segment contents, without the marker and length bytes.
    pub payload: Bytes,
    /// Byte offset of the segment in its source file, 0 when unknown.
    pub offset: usize,
}

impl Segment {
    pub fn new(segment_type: SegmentType, payload: impl Into<Bytes>, offset: usize) -> Self {
        Self {
            segment_type,
            payload: payload.into(),
            offset,
        }
    }
}

/// One atomic unit of a JPEG file's structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Segment(Segment),
    /// Undifferentiated bytes between segments, e.g. entropy-coded scan data.
    Raw(Bytes),
}

impl Fragment {
    pub fn segment(segment_type: SegmentType, payload: impl Into<Bytes>) -> Self {
        Fragment::Segment(Segment::new(segment_type, payload, 0))
    }

    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Fragment::Raw(bytes.into())
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Fragment::Segment(s) => Some(s),
            Fragment::Raw(_) => None,
        }
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, Fragment::Segment(_))
    }
}

impl From<Segment> for Fragment {
    fn from(segment: Segment) -> Self {
        Fragment::Segment(segment)
    }
}

/// Read access to whatever a splice scan walks over.
///
/// Implemented for [`Fragment`] and for `img_parts` segments so the same scan
/// decides placement in both representations.
pub trait SegmentView {
    /// The marker type, or `None` when this is not a segment.
    fn segment_type(&self) -> Option<SegmentType>;
    /// Segment contents after the length field; empty for non-segments.
    fn payload(&self) -> &[u8];
}

impl<T: SegmentView + ?Sized> SegmentView for &T {
    fn segment_type(&self) -> Option<SegmentType> {
        (**self).segment_type()
    }

    fn payload(&self) -> &[u8] {
        (**self).payload()
    }
}

impl SegmentView for Fragment {
    fn segment_type(&self) -> Option<SegmentType> {
        self.as_segment().map(|s| s.segment_type)
    }

    fn payload(&self) -> &[u8] {
        match self {
            Fragment::Segment(s) => &s.payload,
            Fragment::Raw(_) => &[],
        }
    }
}

impl SegmentView for JpegSegment {
    fn segment_type(&self) -> Option<SegmentType> {
        Some(SegmentType::from_byte(self.marker()))
    }

    fn payload(&self) -> &[u8] {
        self.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── SegmentType ──────────────────────────────────────────────────

    #[test]
    fn every_marker_byte_round_trips() {
        for b in 0..=u8::MAX {
            assert_eq!(SegmentType::from_byte(b).to_byte(), b, "marker {b:#04X}");
        }
    }

    #[test]
    fn known_markers() {
        assert_eq!(SegmentType::from_byte(0xD8), SegmentType::Soi);
        assert_eq!(SegmentType::from_byte(0xE0), SegmentType::App0);
        assert_eq!(SegmentType::from_byte(0xE1), SegmentType::App1);
        assert_eq!(SegmentType::from_byte(0xC0), SegmentType::Sof(0));
        assert_eq!(SegmentType::from_byte(0xC2), SegmentType::Sof(2));
        assert_eq!(SegmentType::from_byte(0xC4), SegmentType::Dht);
        assert_eq!(SegmentType::from_byte(0xD3), SegmentType::Rst(3));
        assert_eq!(SegmentType::from_byte(0x01), SegmentType::Other(0x01));
    }

    #[test]
    fn only_soi_and_app0_precede_xmp() {
        assert!(SegmentType::Soi.precedes_xmp());
        assert!(SegmentType::App0.precedes_xmp());
        assert!(!SegmentType::App1.precedes_xmp());
        assert!(!SegmentType::Dqt.precedes_xmp());
    }

    // ── SegmentView ──────────────────────────────────────────────────

    #[test]
    fn raw_fragment_has_no_segment_view() {
        let raw = Fragment::raw(vec![1u8, 2, 3]);
        assert_eq!(raw.segment_type(), None);
        assert!(SegmentView::payload(&raw).is_empty());
        assert!(!raw.is_segment());
    }

    #[test]
    fn img_parts_segment_view() {
        let seg = JpegSegment::new_with_contents(0xE1, Bytes::from_static(b"Exif\0\0"));
        assert_eq!(seg.segment_type(), Some(SegmentType::App1));
        assert_eq!(SegmentView::payload(&seg), b"Exif\0\0");
    }
}
