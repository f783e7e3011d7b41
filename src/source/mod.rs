//! # Data Sources
//!
//! Everything the dashboard knows about the dataset comes through the
//! [`DataSource`] trait. Two backends exist:
//!
//! - [`SqliteSource`]: a SQLite table imported from the playlist CSV. Column
//!   names are whatever the import produced.
//! - [`DocumentSource`]: a JSON export of the document collection (a JSON
//!   array or one document per line).
//!
//! Sources report failures as plain `anyhow` errors. Turning those into
//! user-facing "source unavailable" results is the job of
//! [`crate::dashboard::Analytics`].

pub mod documents;
pub mod sqlite;

pub use documents::DocumentSource;
pub use sqlite::SqliteSource;

use crate::aggregate::RankedCount;
use crate::config::{SourceConfig, SourceKind};
use crate::record::Sample;
use crate::schema::FieldRole;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// How a sample is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Uniformly random records.
    #[default]
    Random,
    /// The first records in storage order.
    Head,
}

/// Dimension a ranked count is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[value(name = "artists")]
    Artist,
    #[value(name = "playlists")]
    Playlist,
    #[value(name = "users")]
    User,
}

impl Dimension {
    #[must_use]
    pub const fn role(self) -> FieldRole {
        match self {
            Self::Artist => FieldRole::Artist,
            Self::Playlist => FieldRole::Playlist,
            Self::User => FieldRole::User,
        }
    }
}

/// Dataset-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetTotals {
    pub records: u64,
    pub artists: u64,
    pub tracks: u64,
    pub playlists: u64,
}

/// User activity summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_users: u64,
    pub top_users: Vec<RankedCount>,
}

/// Read access to the playlist dataset.
pub trait DataSource {
    /// Short human readable description, used in log and error messages.
    fn describe(&self) -> String;

    /// Check that the source can be reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or queried.
    fn ping(&self) -> Result<()>;

    /// Draw up to `limit` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn fetch_sample(&self, limit: usize, mode: SampleMode) -> Result<Sample>;

    /// The `limit` most frequent values of `dimension`, most frequent first.
    /// Records without a value for the dimension are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn fetch_top_counts(&self, dimension: Dimension, limit: usize) -> Result<Vec<RankedCount>>;

    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn fetch_dataset_totals(&self) -> Result<DatasetTotals>;

    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn fetch_user_stats(&self, limit: usize) -> Result<UserStats>;
}

/// Open the backend described by `config`.
#[must_use]
pub fn open_source(config: &SourceConfig) -> Box<dyn DataSource> {
    match config.kind {
        SourceKind::Sqlite => Box::new(SqliteSource::new(&config.location, &config.table)),
        SourceKind::Documents => Box::new(DocumentSource::new(&config.location)),
    }
}
