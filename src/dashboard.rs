//! # Analytics Facade
//!
//! The one place where data source failures are absorbed. Every query comes
//! back as a [`Fetch`], which tells "the source answered but had nothing"
//! apart from "the source could not be reached", so callers can word their
//! messages accordingly.

use crate::aggregate::RankedCount;
use crate::network::{self, NetworkConfig, NetworkOutcome};
use crate::record::Sample;
use crate::source::{DataSource, DatasetTotals, Dimension, SampleMode, UserStats};
use anyhow::Result;
use log::{debug, warn};

/// Outcome of a query against the data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    /// The source answered with data.
    Ready(T),
    /// The source answered, but with nothing to show.
    NoData,
    /// The source failed; the message is suitable for display.
    SourceUnavailable(String),
}

impl<T> Fetch<T> {
    /// Classify a query result. `is_empty` decides between `Ready` and `NoData`.
    pub fn from_query(result: Result<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(value) if is_empty(&value) => Self::NoData,
            Ok(value) => Self::Ready(value),
            Err(err) => {
                warn!("Data source unavailable: {err:#}");
                Self::SourceUnavailable(format!("{err:#}"))
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Self::Ready(value) => Fetch::Ready(f(value)),
            Self::NoData => Fetch::NoData,
            Self::SourceUnavailable(reason) => Fetch::SourceUnavailable(reason),
        }
    }

    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NoData | Self::SourceUnavailable(_) => None,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Read-only analytics over one data source.
pub struct Analytics {
    source: Box<dyn DataSource>,
}

impl Analytics {
    #[must_use]
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Check connectivity. `NoData` never occurs.
    #[must_use]
    pub fn ping(&self) -> Fetch<()> {
        Fetch::from_query(self.source.ping(), |_| false)
    }

    #[must_use]
    pub fn sample(&self, limit: usize, mode: SampleMode) -> Fetch<Sample> {
        Fetch::from_query(self.source.fetch_sample(limit, mode), Sample::is_empty)
    }

    #[must_use]
    pub fn top_counts(&self, dimension: Dimension, limit: usize) -> Fetch<Vec<RankedCount>> {
        Fetch::from_query(self.source.fetch_top_counts(dimension, limit), Vec::is_empty)
    }

    #[must_use]
    pub fn totals(&self) -> Fetch<DatasetTotals> {
        Fetch::from_query(self.source.fetch_dataset_totals(), |totals| totals.records == 0)
    }

    #[must_use]
    pub fn user_stats(&self, limit: usize) -> Fetch<UserStats> {
        Fetch::from_query(self.source.fetch_user_stats(limit), |stats| {
            stats.total_users == 0 && stats.top_users.is_empty()
        })
    }

    /// Draw a random sample of `sample_size` records and build the artist
    /// network from it.
    #[must_use]
    pub fn artist_network(&self, sample_size: usize, mode: SampleMode, config: &NetworkConfig) -> Fetch<NetworkOutcome> {
        self.sample(sample_size, mode).map(|sample| {
            debug!("Building artist network from {} records (top_k={})", sample.len(), config.top_k);
            network::build_artist_network(&sample, config)
        })
    }
}
