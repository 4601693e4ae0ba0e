use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use jpeg_xmp_writer::jpeg::{self, Fragment, SegmentType};
use jpeg_xmp_writer::xmp::XmpPacket;
use jpeg_xmp_writer::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "jpeg-xmp-writer",
    version,
    about = "Insert or replace the XMP packet of JPEG files without touching any other byte"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// XMP packet to write (an x:xmpmeta document, with or without xpacket wrapper)
    #[arg(short = 'x', long, value_name = "FILE")]
    xmp: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Display the segment layout and existing XMP packet and exit
    #[arg(long = "show-xmp")]
    show_xmp: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle --init
    if cli.init {
        init_logging(cli.verbose, None)?;
        let config = config::Config::default();
        let save_path = config::Config::resolve(cli.config.as_deref())?;
        config.save(Some(&save_path))?;
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // The log target comes from the config, so it is read before the logger
    // exists and a missing file is reported afterwards.
    let config_path = config::Config::resolve(cli.config.as_deref())?;
    let loaded = config::Config::read(&config_path)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    init_logging(cli.verbose, config.output.log_file.as_deref())?;
    if !found {
        log::warn!(
            "Config file not found at {}. Using defaults.",
            config_path.display()
        );
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-xmp
    if cli.show_xmp {
        for image_path in &images {
            if let Err(e) = print_xmp(image_path) {
                log::error!("Failed to read {}: {e:#}", image_path.display());
            }
        }
        return Ok(());
    }

    let xmp_path = cli
        .xmp
        .as_deref()
        .context("No XMP file specified. Use --xmp FILE.")?;
    let text = std::fs::read_to_string(xmp_path)
        .with_context(|| format!("Failed to read XMP file {}", xmp_path.display()))?;
    let packet = XmpPacket::parse(&text).context("Failed to parse XMP file")?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.output.dry_run = true;
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }

    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        let result = pipeline::process_image(image_path, &packet, &config);

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else {
            if let (Some(action), Some(index)) = (result.action, result.segment_index) {
                let verb = if config.output.dry_run { "Would write" } else { "Wrote" };
                log::info!("  {verb}: XMP {} at segment {index}", action.as_str());
            }
            if let Some(ref backup) = result.backup_path {
                log::info!("  Backup: {}", backup.display());
            }
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "action": r.action.map(|a| a.as_str()),
                    "segment_index": r.segment_index,
                    "backup_path": r.backup_path.as_ref().map(|p| p.display().to_string()),
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&str>) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    builder.format_timestamp(None);

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the segment layout and the XMP packet of one file.
fn print_xmp(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    let image = jpeg::parse_jpeg(bytes)?;

    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    println!("  {BOLD}Segments{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(70));
    for fragment in jpeg::segment_fragments(&image) {
        if let Fragment::Segment(segment) = fragment {
            println!(
                "  {:<10} {:>8} bytes",
                segment_label(segment.segment_type, &segment.payload),
                segment.payload.len()
            );
        }
    }
    println!();

    println!("  {BOLD}XMP{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(70));
    match jpeg::read_xmp(&image)? {
        Some(packet) => {
            for line in packet.body().lines() {
                println!("  {line}");
            }
        }
        None => println!("  {DIM}(no XMP packet found){RESET}"),
    }
    println!();

    Ok(())
}

/// Short display name for a segment, e.g. `APP1/XMP`.
fn segment_label(segment_type: SegmentType, payload: &[u8]) -> String {
    match segment_type {
        SegmentType::App1 if jpeg_xmp_writer::xmp::has_xmp_preamble(payload) => "APP1/XMP".into(),
        SegmentType::App1 if payload.starts_with(b"Exif\0\0") => "APP1/EXIF".into(),
        SegmentType::Sof(n) => format!("SOF{n}"),
        SegmentType::Rst(n) => format!("RST{n}"),
        SegmentType::Other(b) => format!("0x{b:02X}"),
        other => format!("{other:?}").to_uppercase(),
    }
}
