//! Hand-built JPEG files for the integration tests.

#![allow(dead_code)]

use jpeg_xmp_writer::xmp::{XMP_PREAMBLE, XmpPacket};

pub const BODY: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title><rdf:Alt><rdf:li xml:lang="x-default">Harbour at dusk</rdf:li></rdf:Alt></dc:title></rdf:Description></rdf:RDF></x:xmpmeta>"#;

pub const MICROSOFT_XMP: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="uuid:faf5bdd5-ba3d-11da-ad31-d33d75182f1b" xmlns:MicrosoftPhoto="http://ns.microsoft.com/photo/1.0/"><MicrosoftPhoto:Rating>50</MicrosoftPhoto:Rating></rdf:Description></rdf:RDF></x:xmpmeta>"#;

pub fn packet() -> XmpPacket {
    XmpPacket::parse(BODY).unwrap()
}

pub fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn app0() -> Vec<u8> {
    segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0")
}

pub fn exif() -> Vec<u8> {
    segment(0xE1, b"Exif\0\0MM\0*\0\0\0\x08\0\0\0\0\0\0")
}

pub fn xmp(body: &str) -> Vec<u8> {
    let mut payload = XMP_PREAMBLE.to_vec();
    payload.extend_from_slice(body.as_bytes());
    segment(0xE1, &payload)
}

fn dqt() -> Vec<u8> {
    let mut table = vec![0x00];
    table.extend(1..=64u8);
    segment(0xDB, &table)
}

fn sof0() -> Vec<u8> {
    segment(0xC0, &[0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00])
}

fn scan() -> Vec<u8> {
    let mut out = segment(0xDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    // Entropy-coded data with a stuffed 0xFF.
    out.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56, 0x78]);
    out
}

/// SOI, the given header segments, then DQT, SOF0, SOS with scan data and EOI.
pub fn jpeg(headers: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    for h in headers {
        out.extend_from_slice(h);
    }
    out.extend_from_slice(&dqt());
    out.extend_from_slice(&sof0());
    out.extend_from_slice(&scan());
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}
