use thiserror::Error;

/// Error raised by a document that cannot serialize itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SerializeError(pub String);

impl SerializeError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors produced while encoding XMP and splicing it into a JPEG.
///
/// No operation returns a partial result: on error, nothing was spliced and
/// nothing was written.
#[derive(Error, Debug)]
pub enum XmpError {
    /// The metadata object handed to a [`MetadataWriter`](crate::xmp::MetadataWriter)
    /// is not a document that writer understands.
    #[error("XmpWriter expects metadata of type XmpPacket, but was given {found}")]
    InvalidMetadataType { found: String },

    /// The document failed to produce its canonical serialization.
    #[error("failed to serialize XMP document: {0}")]
    SerializationFailure(#[from] SerializeError),

    /// The text is not an XMP packet.
    #[error("invalid XMP packet: {0}")]
    InvalidPacket(String),

    /// The byte stream could not be parsed as a JPEG.
    #[error("failed to parse JPEG: {0}")]
    Jpeg(String),

    /// The encoded payload does not fit a JPEG segment's 16-bit length field.
    #[error("XMP payload of {len} bytes exceeds the {max} bytes a JPEG segment can hold")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XmpError>;
