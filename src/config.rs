//! # Configuration Module
//!
//! Resolves where the dataset lives and the default query sizes.
//!
//! ## Source Location
//!
//! The source must be configured explicitly, in order of precedence:
//!
//! 1. `--source <PATH>` or the `MIXGRAPH_SOURCE` environment variable
//! 2. the `source` key of the config file
//!
//! Starting without a configured source is an error; there is no built-in
//! fallback location.
//!
//! ## Config File
//!
//! An optional JSON file in the platform configuration directory:
//! - Linux: `~/.config/mixgraph/config.json`
//! - macOS: `~/Library/Application Support/mixgraph/config.json`
//! - Windows: `%APPDATA%\mixgraph\config.json`
//!
//! ```json
//! {
//!   "source": "/data/spotify.db",
//!   "table": "spotify_dataset",
//!   "top_n": 15,
//!   "sample_size": 5000,
//!   "top_k": 30,
//!   "user_limit": 20
//! }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE: &str = "spotify_dataset";
pub const DEFAULT_TOP_N: usize = 15;
pub const DEFAULT_SAMPLE_SIZE: usize = 5000;
pub const DEFAULT_TOP_K: usize = 30;
pub const DEFAULT_USER_LIMIT: usize = 20;

/// Accepted number of network artists, the same bounds `--top-k` enforces.
pub const TOP_K_RANGE: RangeInclusive<usize> = 5..=50;

/// Storage format of the configured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sqlite,
    Documents,
}

impl SourceKind {
    /// Infer the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "db" | "db3" | "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "json" | "jsonl" | "ndjson" => Ok(Self::Documents),
            _ => bail!(
                "Cannot tell the format of {}. Use a .db/.db3/.sqlite/.sqlite3 SQLite file \
                 or a .json/.jsonl/.ndjson document export.",
                path.display()
            ),
        }
    }
}

/// Where and how to read the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub location: PathBuf,
    /// Table name, only meaningful for SQLite.
    pub table: String,
}

impl SourceConfig {
    /// Build a source configuration for `location`, absolutizing the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the format cannot be inferred or the path cannot be
    /// made absolute.
    pub fn from_location(location: &Path, table: &str) -> Result<Self> {
        let kind = SourceKind::from_path(location)?;
        let location = location
            .absolutize()
            .with_context(|| format!("Failed to absolutize {}", location.display()))?
            .into_owned();

        Ok(Self {
            kind,
            location,
            table: table.to_string(),
        })
    }
}

/// Contents of the optional config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub source: Option<PathBuf>,
    pub table: Option<String>,
    pub top_n: Option<usize>,
    pub sample_size: Option<usize>,
    pub top_k: Option<usize>,
    pub user_limit: Option<usize>,
}

impl FileSettings {
    /// Read settings from `path`. A missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Returns the platform-appropriate config file path.
///
/// # Errors
///
/// Returns an error if the system configuration directory cannot be determined.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow!("Could not determine system config directory. Pass --source or set MIXGRAPH_SOURCE instead.")
    })?;

    Ok(config_dir.join("mixgraph").join("config.json"))
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub source: SourceConfig,
    pub top_n: usize,
    pub sample_size: usize,
    pub top_k: usize,
    pub user_limit: usize,
}

impl RuntimeConfig {
    /// Merge command-line values over file settings.
    ///
    /// `source` and `table` come from the command line (or their environment
    /// variables); when absent, the file settings are consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if no source is configured anywhere, its format is
    /// unknown, or the file's `top_k` is outside [`TOP_K_RANGE`].
    pub fn resolve(source: Option<&Path>, table: Option<&str>, file: &FileSettings) -> Result<Self> {
        let location = source
            .map(Path::to_path_buf)
            .or_else(|| file.source.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No data source configured. Pass --source <PATH>, set MIXGRAPH_SOURCE, \
                     or add \"source\" to the config file."
                )
            })?;

        let table = table
            .map(str::to_string)
            .or_else(|| file.table.clone())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        let top_k = file.top_k.unwrap_or(DEFAULT_TOP_K);
        if !TOP_K_RANGE.contains(&top_k) {
            bail!(
                "Invalid top_k {top_k} in config file; expected {}..={}",
                TOP_K_RANGE.start(),
                TOP_K_RANGE.end()
            );
        }

        Ok(Self {
            source: SourceConfig::from_location(&location, &table)?,
            top_n: file.top_n.unwrap_or(DEFAULT_TOP_N),
            sample_size: file.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
            top_k,
            user_limit: file.user_limit.unwrap_or(DEFAULT_USER_LIMIT),
        })
    }

    /// Load the config file from its standard location and merge.
    ///
    /// # Errors
    ///
    /// See [`RuntimeConfig::resolve`] and [`FileSettings::load`].
    pub fn load(source: Option<&Path>, table: Option<&str>) -> Result<Self> {
        let file = match get_config_path() {
            Ok(path) => FileSettings::load(&path)?,
            Err(err) => {
                debug!("Skipping config file: {err}");
                FileSettings::default()
            }
        };

        Self::resolve(source, table, &file)
    }
}
