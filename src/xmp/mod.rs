//! XMP packet encoding and placement.
//!
//! - [`codec`]: the APP1 payload, a preamble followed by the serialized document
//! - [`XmpPacket`]: a packet-level document that serializes itself
//! - [`writer`]: the scan that replaces or inserts the XMP segment

pub mod codec;
mod packet;
pub mod writer;

pub use codec::{SerializeOptions, XMP_PREAMBLE, XmpDocument, encode, encode_with, has_xmp_preamble};
pub use packet::XmpPacket;
pub use writer::{MetadataObject, MetadataWriter, SplicePoint, XmpWriter, locate, update, update_with};
