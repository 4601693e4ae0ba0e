//! JPEG structure: the fragment model the splice works on, and the adapter to
//! real files through `img-parts`.

mod file;
mod fragment;

pub use file::{apply_writer, parse_jpeg, read_xmp, segment_fragments, splice_xmp, write_xmp};
pub use fragment::{Fragment, Segment, SegmentType, SegmentView};
