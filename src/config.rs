use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::xmp::SerializeOptions;

/// Top-level configuration for the jpeg-xmp-writer library.
///
/// Controls how XMP packets are serialized and how files are written
/// (dry run, backups).
///
/// # Loading
///
/// ```rust,no_run
/// use jpeg_xmp_writer::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.xmp.padding = 4096;
/// config.output.backup_originals = false;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Packet serialization (wrapper, padding, read-only flag).
    pub xmp: SerializeOptions,
    /// Output behavior (dry run, backups, logging).
    pub output: OutputConfig,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would be written without modifying any files.
    pub dry_run: bool,
    /// If `true`, create a `.bak` backup before modifying an image.
    pub backup_originals: bool,
    /// Optional path to a log file.
    pub log_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_originals: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Resolve the config file path: `config.json` next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve(path)?;

        match Self::read(&config_path)? {
            Some(config) => Ok(config),
            None => {
                log::warn!(
                    "Config file not found at {}. Using defaults.",
                    config_path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Read the config at `path`, or `None` if there is no file there.
    ///
    /// Unlike [`Config::load`] this does not log, so it can run before a
    /// logger is installed.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(Some(config))
    }

    /// The given path, or the default location.
    pub fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = Self::resolve(path)?;

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.xmp, SerializeOptions::default());
        assert!(!config.output.dry_run);
        assert!(config.output.backup_originals);
        assert!(config.output.log_file.is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.xmp.padding = 100;
        config.xmp.read_only = true;
        config.output.dry_run = true;
        config.output.log_file = Some("run.log".into());
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.xmp, config.xmp);
        assert!(loaded.output.dry_run);
        assert_eq!(loaded.output.log_file.as_deref(), Some("run.log"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.xmp.padding, 2048);
    }

    #[test]
    fn read_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::read(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output": {"log_file": "run.log"}}"#).unwrap();

        let config = Config::read(&path).unwrap().unwrap();
        assert_eq!(config.output.log_file.as_deref(), Some("run.log"));
    }

    #[test]
    fn resolve_prefers_given_path() {
        let path = Path::new("/tmp/custom.json");
        assert_eq!(Config::resolve(Some(path)).unwrap(), path);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output": {"dry_run": true}}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.output.dry_run);
        assert!(config.output.backup_originals);
        assert_eq!(config.xmp, SerializeOptions::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
