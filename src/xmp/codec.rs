use serde::{Deserialize, Serialize};

use crate::error::{Result, SerializeError};

/// Identifies an APP1 payload as XMP: the namespace URI followed by a NUL.
pub const XMP_PREAMBLE: &[u8; 29] = b"http://ns.adobe.com/xap/1.0/\0";

/// Options a document honours when serializing itself.
///
/// The defaults give a writeable packet wrapped in `<?xpacket?>` processing
/// instructions with 2 KiB of padding, so the packet can later be edited in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Emit the bare `x:xmpmeta` body without the `<?xpacket?>` wrapper.
    pub omit_packet_wrapper: bool,
    /// Number of padding bytes between the body and the packet trailer.
    pub padding: usize,
    /// Pad the packet to exactly this many bytes instead of using `padding`.
    pub exact_packet_length: Option<usize>,
    /// Mark the packet read-only (`end="r"`).
    pub read_only: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            omit_packet_wrapper: false,
            padding: 2048,
            exact_packet_length: None,
            read_only: false,
        }
    }
}

/// A structured metadata document that can produce its canonical bytes.
///
/// Serialization must be deterministic and UTF-8 encoded.
pub trait XmpDocument {
    fn serialize(&self, options: &SerializeOptions) -> std::result::Result<Vec<u8>, SerializeError>;
}

/// Encode `document` as an APP1 payload using default serialize options.
pub fn encode<D: XmpDocument + ?Sized>(document: &D) -> Result<Vec<u8>> {
    encode_with(document, &SerializeOptions::default())
}

/// Encode `document` as an APP1 payload: preamble immediately followed by the
/// serialized document.
pub fn encode_with<D: XmpDocument + ?Sized>(document: &D, options: &SerializeOptions) -> Result<Vec<u8>> {
    let body = document.serialize(options)?;

    let mut payload = Vec::with_capacity(XMP_PREAMBLE.len() + body.len());
    payload.extend_from_slice(XMP_PREAMBLE);
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// Whether `payload` starts with the XMP preamble, ignoring ASCII case.
///
/// A payload that is only the preamble (nothing after it) does not count.
pub fn has_xmp_preamble(payload: &[u8]) -> bool {
    payload.len() > XMP_PREAMBLE.len()
        && payload[..XMP_PREAMBLE.len()].eq_ignore_ascii_case(XMP_PREAMBLE)
}
