use std::any::Any;

use super::codec::{self, SerializeOptions, XmpDocument};
use super::packet::XmpPacket;
use crate::error::{Result, XmpError};
use crate::jpeg::{Fragment, Segment, SegmentType, SegmentView};

/// Where a scan decided the XMP segment goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplicePoint {
    /// Overwrite the existing XMP segment at this index.
    Replace(usize),
    /// Insert a new segment at this index, shifting later ones right.
    Insert(usize),
}

impl SplicePoint {
    pub fn index(self) -> usize {
        match self {
            SplicePoint::Replace(i) | SplicePoint::Insert(i) => i,
        }
    }

    pub fn is_replace(self) -> bool {
        matches!(self, SplicePoint::Replace(_))
    }

    /// Build a new sequence from `items` with `candidate` spliced in.
    ///
    /// # Panics
    ///
    /// If the point does not come from a scan of `items` and lies past its end.
    pub(crate) fn apply<T: Clone>(self, items: &[T], candidate: T) -> Vec<T> {
        let mut output = Vec::with_capacity(items.len() + 1);
        output.extend_from_slice(items);
        self.apply_in_place(&mut output, candidate);
        output
    }

    /// Splice `candidate` into `items` directly. Panics like [`SplicePoint::apply`].
    pub(crate) fn apply_in_place<T>(self, items: &mut Vec<T>, candidate: T) {
        match self {
            SplicePoint::Replace(i) => items[i] = candidate,
            SplicePoint::Insert(i) => items.insert(i, candidate),
        }
    }
}

/// Scan state: still looking, or decided.
///
/// `insert_at` holds the first segment a new XMP block may be placed before;
/// once set it is never moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning { insert_at: Option<usize> },
    Done(SplicePoint),
}

impl ScanState {
    fn step<S: SegmentView>(self, index: usize, item: &S) -> Self {
        let ScanState::Scanning { insert_at } = self else {
            return self;
        };
        let Some(segment_type) = item.segment_type() else {
            return self;
        };

        if segment_type == SegmentType::App1 && codec::has_xmp_preamble(item.payload()) {
            ScanState::Done(SplicePoint::Replace(index))
        } else if insert_at.is_none() && !segment_type.precedes_xmp() {
            ScanState::Scanning {
                insert_at: Some(index),
            }
        } else {
            self
        }
    }

    fn finish(self, len: usize) -> SplicePoint {
        match self {
            ScanState::Done(point) => point,
            ScanState::Scanning { insert_at } => SplicePoint::Insert(insert_at.unwrap_or(len)),
        }
    }
}

/// Decide where an XMP segment belongs in `segments`.
///
/// The first APP1 segment carrying the XMP preamble (any letter case) is
/// replaced. Otherwise a new segment goes in front of the first segment that
/// is neither SOI nor APP0, or at the end when there is none. Later XMP
/// segments are never looked at, so duplicates already in the file survive.
pub fn locate<S: SegmentView>(segments: &[S]) -> SplicePoint {
    let mut state = ScanState::Scanning { insert_at: None };
    for (index, item) in segments.iter().enumerate() {
        state = state.step(index, item);
        if let ScanState::Done(_) = state {
            break;
        }
    }
    state.finish(segments.len())
}

/// Return a copy of `fragments` with `metadata` written as its XMP segment.
pub fn update<D: XmpDocument + ?Sized>(fragments: &[Fragment], metadata: &D) -> Result<Vec<Fragment>> {
    update_with(fragments, metadata, &SerializeOptions::default())
}

/// Like [`update`], serializing the document with `options`.
pub fn update_with<D: XmpDocument + ?Sized>(
    fragments: &[Fragment],
    metadata: &D,
    options: &SerializeOptions,
) -> Result<Vec<Fragment>> {
    let payload = codec::encode_with(metadata, options)?;
    let candidate = Fragment::Segment(Segment::new(SegmentType::App1, payload, 0));

    let point = locate(fragments);
    log::debug!("XMP splice into {} fragments: {point:?}", fragments.len());

    Ok(point.apply(fragments, candidate))
}

/// A metadata value whose concrete type is only known at run time.
///
/// Implemented for every `'static` type, so any value can be handed to a
/// [`MetadataWriter`].
pub trait MetadataObject: Any {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> MetadataObject for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Writes one kind of metadata into a sequence of JPEG segments.
pub trait MetadataWriter {
    /// Display name of this writer (e.g. "XMP").
    fn name(&self) -> &str;

    /// Whether this writer understands `metadata`.
    fn accepts(&self, metadata: &dyn MetadataObject) -> bool;

    /// Encode `metadata` as the segment this writer places.
    fn build_segment(&self, metadata: &dyn MetadataObject) -> Result<Segment>;

    /// Decide where the segment goes in `segments`.
    fn locate(&self, segments: &[&dyn SegmentView]) -> SplicePoint;

    /// Return a new sequence with `metadata` written into it.
    fn update_fragments(
        &self,
        fragments: &[Fragment],
        metadata: &dyn MetadataObject,
    ) -> Result<Vec<Fragment>> {
        let segment = self.build_segment(metadata)?;
        let views: Vec<&dyn SegmentView> = fragments.iter().map(|f| f as &dyn SegmentView).collect();
        let point = self.locate(&views);
        log::debug!("{} splice into {} fragments: {point:?}", self.name(), fragments.len());
        Ok(point.apply(fragments, Fragment::Segment(segment)))
    }
}

/// Writes [`XmpPacket`]s as the APP1 XMP segment.
#[derive(Debug, Clone, Default)]
pub struct XmpWriter {
    options: SerializeOptions,
}

impl XmpWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }
}

impl MetadataWriter for XmpWriter {
    fn name(&self) -> &str {
        "XMP"
    }

    fn accepts(&self, metadata: &dyn MetadataObject) -> bool {
        metadata.as_any().is::<XmpPacket>()
    }

    fn build_segment(&self, metadata: &dyn MetadataObject) -> Result<Segment> {
        let packet = metadata
            .as_any()
            .downcast_ref::<XmpPacket>()
            .ok_or_else(|| XmpError::InvalidMetadataType {
                found: metadata.type_name().to_string(),
            })?;
        let payload = codec::encode_with(packet, &self.options)?;
        Ok(Segment::new(SegmentType::App1, payload, 0))
    }

    fn locate(&self, segments: &[&dyn SegmentView]) -> SplicePoint {
        locate(segments)
    }
}
