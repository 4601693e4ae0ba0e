use std::fmt;
use std::str::FromStr;

use super::codec::{SerializeOptions, XmpDocument};
use crate::error::{Result, SerializeError, XmpError};

const PACKET_HEADER: &str = "<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n";
const PACKET_BEGIN: &str = "<?xpacket begin";
const PACKET_END: &str = "<?xpacket end";
const PADDING_LINE: usize = 100;

/// An XMP packet held as its `x:xmpmeta` XML body.
///
/// The body is kept verbatim; no RDF model is built. Serializing wraps it in
/// `<?xpacket?>` processing instructions and padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpPacket {
    body: String,
}

impl XmpPacket {
    /// Parse packet text, dropping any existing `<?xpacket?>` wrapper and padding.
    pub fn parse(text: &str) -> Result<Self> {
        let mut body = text.trim_start_matches('\u{FEFF}').trim();

        if body.starts_with(PACKET_BEGIN) {
            let close = body
                .find("?>")
                .ok_or_else(|| XmpError::InvalidPacket("unterminated xpacket header".into()))?;
            body = &body[close + 2..];
        }
        if let Some(end) = body.rfind(PACKET_END) {
            body = &body[..end];
        }
        let body = body.trim();

        if body.is_empty() {
            return Err(XmpError::InvalidPacket("empty packet".into()));
        }
        if !body.contains("<x:xmpmeta") && !body.contains("<rdf:RDF") {
            return Err(XmpError::InvalidPacket(
                "no x:xmpmeta or rdf:RDF element".into(),
            ));
        }

        Ok(Self {
            body: body.to_string(),
        })
    }

    /// Parse a packet from UTF-8 bytes, e.g. an APP1 payload after the preamble.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| XmpError::InvalidPacket(format!("not UTF-8: {e}")))?;
        Self::parse(text)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl FromStr for XmpPacket {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for XmpPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

impl XmpDocument for XmpPacket {
    fn serialize(&self, options: &SerializeOptions) -> std::result::Result<Vec<u8>, SerializeError> {
        if options.omit_packet_wrapper {
            if options.exact_packet_length.is_some() {
                return Err(SerializeError::new(
                    "inconsistent options: exact packet length without packet wrapper",
                ));
            }
            return Ok(self.body.as_bytes().to_vec());
        }

        let trailer = if options.read_only {
            "<?xpacket end=\"r\"?>"
        } else {
            "<?xpacket end=\"w\"?>"
        };

        let mut out = String::with_capacity(
            PACKET_HEADER.len() + self.body.len() + 1 + options.padding + trailer.len(),
        );
        out.push_str(PACKET_HEADER);
        out.push_str(&self.body);
        out.push('\n');

        let padding = match options.exact_packet_length {
            Some(exact) => {
                let minimum = out.len() + trailer.len();
                if exact < minimum {
                    return Err(SerializeError::new(format!(
                        "can't fit into specified packet size: need {minimum} bytes, have {exact}"
                    )));
                }
                exact - minimum
            }
            None => options.padding,
        };

        for i in 1..=padding {
            out.push(if i % PADDING_LINE == 0 { '\n' } else { ' ' });
        }
        out.push_str(trailer);

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about=""/></rdf:RDF></x:xmpmeta>"#;

    // ── parse ────────────────────────────────────────────────────────

    #[test]
    fn parse_bare_body() {
        let packet = XmpPacket::parse(BODY).unwrap();
        assert_eq!(packet.body(), BODY);
    }

    #[test]
    fn parse_strips_wrapper_and_padding() {
        let text = format!(
            "\u{FEFF}<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n{BODY}\n      \n   <?xpacket end=\"w\"?>"
        );
        let packet: XmpPacket = text.parse().unwrap();
        assert_eq!(packet.body(), BODY);
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            XmpPacket::parse("  \n "),
            Err(XmpError::InvalidPacket(_))
        ));
    }

    #[test]
    fn parse_rejects_non_xmp() {
        assert!(XmpPacket::parse("<html><body/></html>").is_err());
    }

    #[test]
    fn parse_rejects_unterminated_header() {
        assert!(XmpPacket::parse("<?xpacket begin=\"\" <x:xmpmeta/>").is_err());
    }

    #[test]
    fn from_bytes_rejects_invalid_utf8() {
        assert!(XmpPacket::from_bytes(&[0xFF, 0xFE, 0x00]).is_err());
    }

    // ── serialize ────────────────────────────────────────────────────

    #[test]
    fn serialize_default_wraps_and_pads() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let bytes = packet.serialize(&SerializeOptions::default()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert!(text.starts_with(PACKET_HEADER));
        assert!(text.ends_with("<?xpacket end=\"w\"?>"));
        assert!(text.contains(BODY));
        assert_eq!(
            bytes.len(),
            PACKET_HEADER.len() + BODY.len() + 1 + 2048 + "<?xpacket end=\"w\"?>".len()
        );
    }

    #[test]
    fn serialize_is_deterministic() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions::default();
        assert_eq!(packet.serialize(&opts).unwrap(), packet.serialize(&opts).unwrap());
    }

    #[test]
    fn padding_breaks_lines_every_hundred_bytes() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            padding: 250,
            ..Default::default()
        };
        let text = String::from_utf8(packet.serialize(&opts).unwrap()).unwrap();
        let start = PACKET_HEADER.len() + BODY.len() + 1;
        let padding = &text[start..start + 250];
        assert_eq!(padding.matches('\n').count(), 2);
        assert_eq!(padding.as_bytes()[99], b'\n');
        assert!(padding.trim().is_empty());
    }

    #[test]
    fn serialize_read_only_trailer() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            read_only: true,
            padding: 0,
            ..Default::default()
        };
        let text = String::from_utf8(packet.serialize(&opts).unwrap()).unwrap();
        assert!(text.ends_with("\n<?xpacket end=\"r\"?>"));
    }

    #[test]
    fn serialize_exact_length() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            exact_packet_length: Some(4096),
            ..Default::default()
        };
        assert_eq!(packet.serialize(&opts).unwrap().len(), 4096);
    }

    #[test]
    fn serialize_exact_length_too_small_fails() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            exact_packet_length: Some(16),
            ..Default::default()
        };
        let err = packet.serialize(&opts).unwrap_err();
        assert!(err.to_string().contains("can't fit"));
    }

    #[test]
    fn serialize_without_wrapper() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            omit_packet_wrapper: true,
            ..Default::default()
        };
        assert_eq!(packet.serialize(&opts).unwrap(), BODY.as_bytes());
    }

    #[test]
    fn omit_wrapper_with_exact_length_is_inconsistent() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let opts = SerializeOptions {
            omit_packet_wrapper: true,
            exact_packet_length: Some(4096),
            ..Default::default()
        };
        assert!(packet.serialize(&opts).is_err());
    }

    #[test]
    fn serialized_packet_parses_back() {
        let packet = XmpPacket::parse(BODY).unwrap();
        let bytes = packet.serialize(&SerializeOptions::default()).unwrap();
        assert_eq!(XmpPacket::from_bytes(&bytes).unwrap(), packet);
    }
}
