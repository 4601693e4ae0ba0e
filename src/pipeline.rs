use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::XmpError;
use crate::jpeg;
use crate::xmp::{MetadataObject, MetadataWriter, SplicePoint, XmpPacket, XmpWriter};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// What happened to the XMP segment of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// An existing XMP segment was overwritten.
    Replaced,
    /// A new XMP segment was added.
    Inserted,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Replaced => "replaced",
            WriteAction::Inserted => "inserted",
        }
    }
}

impl From<SplicePoint> for WriteAction {
    fn from(point: SplicePoint) -> Self {
        match point {
            SplicePoint::Replace(_) => WriteAction::Replaced,
            SplicePoint::Insert(_) => WriteAction::Inserted,
        }
    }
}

/// The result of writing XMP into a single image.
///
/// Errors are captured here rather than returned, so one bad file does not
/// stop a batch.
///
/// # Example
///
/// ```rust,no_run
/// # use jpeg_xmp_writer::pipeline::process_image;
/// # use jpeg_xmp_writer::config::Config;
/// # use jpeg_xmp_writer::xmp::XmpPacket;
/// # fn example(packet: &XmpPacket) {
/// let result = process_image("photo.jpg".as_ref(), packet, &Config::default());
///
/// if result.error.is_none() {
///     println!("XMP {:?} at segment {:?}", result.action, result.segment_index);
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub action: Option<WriteAction>,
    /// Index into the file's segment list (SOI not counted).
    pub segment_index: Option<usize>,
    /// Where the original was copied before being overwritten.
    pub backup_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            action: None,
            segment_index: None,
            backup_path: None,
            error: None,
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only `.jpg` / `.jpeg` files are included.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// The backup location for `path`: the same name with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write `packet` into one image, honouring dry run and backup settings.
pub fn process_image(path: &Path, packet: &XmpPacket, config: &Config) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    match write_image(path, packet, config) {
        Ok((point, backup)) => {
            result.action = Some(point.into());
            result.segment_index = Some(point.index());
            result.backup_path = backup;
        }
        Err(e) => {
            log::debug!("{}: {e:#}", path.display());
            result.error = Some(format!("{e:#}"));
        }
    }

    result
}

fn write_image(
    path: &Path,
    packet: &XmpPacket,
    config: &Config,
) -> Result<(SplicePoint, Option<PathBuf>)> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    let (output, point) = jpeg::write_xmp(bytes, packet, &config.xmp)
        .context("Failed to write XMP metadata")?;

    if config.output.dry_run {
        return Ok((point, None));
    }

    let backup = save(path, &output, config)?;
    Ok((point, backup))
}

/// Write every metadata object into the image at `path`.
///
/// Each object goes to the first registered writer that accepts it; an object
/// no writer accepts fails the whole call before the file is touched.
pub fn write_metadata(
    path: &Path,
    objects: &[&dyn MetadataObject],
    config: &Config,
) -> Result<Vec<SplicePoint>> {
    let writers: Vec<Box<dyn MetadataWriter>> =
        vec![Box::new(XmpWriter::with_options(config.xmp.clone()))];

    let bytes = std::fs::read(path).context("Failed to read image file")?;
    let mut image = jpeg::parse_jpeg(bytes)?;

    let mut points = Vec::with_capacity(objects.len());
    for &object in objects {
        let writer = writers
            .iter()
            .find(|w| w.accepts(object))
            .ok_or_else(|| XmpError::InvalidMetadataType {
                found: object.type_name().to_string(),
            })?;
        let point = jpeg::apply_writer(&mut image, &**writer, object)
            .with_context(|| format!("{} writer failed", writer.name()))?;
        points.push(point);
    }

    if !config.output.dry_run {
        save(path, &image.encoder().bytes(), config)?;
    }
    Ok(points)
}

/// Back up the original if configured, then overwrite it with `output`.
fn save(path: &Path, output: &[u8], config: &Config) -> Result<Option<PathBuf>> {
    let backup = if config.output.backup_originals {
        Some(backup_file(path)?)
    } else {
        None
    };

    std::fs::write(path, output).context("Failed to write JPEG file")?;
    Ok(backup)
}

/// Copy `path` to its backup location unless a backup already exists.
///
/// An existing backup holds the bytes from before the first run and is
/// never overwritten.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);

    if !backup.exists() {
        std::fs::copy(path, &backup).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup.display());
    }

    Ok(backup)
}
