//! # jpeg-xmp-writer
//!
//! Insert or replace the XMP packet of a JPEG file without disturbing any
//! other byte of the file.
//!
//! ## Quick Start
//!
//! The pipeline module handles the full read → splice → write flow:
//!
//! ```rust,no_run
//! use jpeg_xmp_writer::config::Config;
//! use jpeg_xmp_writer::pipeline::{collect_images, process_image};
//! use jpeg_xmp_writer::xmp::XmpPacket;
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let packet = XmpPacket::parse(&std::fs::read_to_string("metadata.xmp")?)?;
//!
//!     for path in collect_images(&[PathBuf::from("./photos")]) {
//!         let result = process_image(&path, &packet, &config);
//!         match result.error {
//!             Some(err) => eprintln!("Error processing {}: {err}", path.display()),
//!             None => println!("{}: XMP {:?}", path.display(), result.action),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Fragment-Level Usage
//!
//! The splice itself works on an in-memory fragment sequence and never
//! mutates its input:
//!
//! ```rust
//! use jpeg_xmp_writer::jpeg::{Fragment, SegmentType};
//! use jpeg_xmp_writer::xmp::{self, XmpPacket};
//!
//! let packet = XmpPacket::parse(r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"/>"#).unwrap();
//! let fragments = vec![
//!     Fragment::segment(SegmentType::Soi, Vec::<u8>::new()),
//!     Fragment::segment(SegmentType::App0, b"JFIF\0".to_vec()),
//!     Fragment::segment(SegmentType::Dqt, vec![0u8; 65]),
//! ];
//!
//! let updated = xmp::update(&fragments, &packet).unwrap();
//! assert_eq!(updated.len(), 4);
//! assert_eq!(updated[2].as_segment().unwrap().segment_type, SegmentType::App1);
//! ```
//!
//! ## Modules
//!
//! - [`jpeg`]: fragment model and the img-parts file adapter
//! - [`xmp`]: payload codec, packet document, and the splice scan
//! - [`config`]: configuration types and loading/saving
//! - [`pipeline`]: image collection and per-file processing

pub mod config;
mod error;
pub mod jpeg;
pub mod pipeline;
pub mod xmp;

pub use error::{Result, SerializeError, XmpError};
