//! JSON document backend.
//!
//! Reads an export of the playlist collection, either as a single JSON array
//! or as one document per line (the format `mongoexport` writes). The export
//! is re-read for every query and all aggregation happens in memory.

use super::{DataSource, DatasetTotals, Dimension, SampleMode, UserStats};
use crate::aggregate::{self, RankedCount};
use crate::record::{Record, Sample};
use crate::schema::{self, DatasetFields, FieldRole};
use anyhow::{Context, Result};
use log::{debug, warn};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DocumentSource {
    path: PathBuf,
}

impl DocumentSource {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn load(&self) -> Result<Sample> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read document export {}", self.path.display()))?;

        let records = parse_documents(&content)
            .with_context(|| format!("Failed to parse document export {}", self.path.display()))?;
        debug!("Loaded {} documents from {}", records.len(), self.path.display());

        Ok(Sample::new(records))
    }
}

/// Parse a JSON array or JSON lines into records, skipping documents that are
/// not objects.
fn parse_documents(content: &str) -> Result<Vec<Record>> {
    let documents: Vec<Value> = if content.trim_start().starts_with('[') {
        serde_json::from_str(content).context("Invalid JSON array")?
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Value>(line)
                    .with_context(|| format!("Invalid JSON document on line {}", i + 1))
            })
            .collect::<Result<_>>()?
    };

    let mut records = Vec::with_capacity(documents.len());
    for (i, document) in documents.iter().enumerate() {
        match Record::from_json(document) {
            Some(record) => records.push(record),
            None => warn!("Skipping document #{} (not a JSON object)", i + 1),
        }
    }

    Ok(records)
}

/// Non-blank values of `field`, in record order.
fn values_of<'a>(sample: &'a Sample, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    sample
        .records()
        .iter()
        .filter_map(move |record| record.get_non_empty(field))
}

impl DataSource for DocumentSource {
    fn describe(&self) -> String {
        format!("documents:{}", self.path.display())
    }

    fn ping(&self) -> Result<()> {
        self.load().map(|_| ())
    }

    fn fetch_sample(&self, limit: usize, mode: SampleMode) -> Result<Sample> {
        let all = self.load()?;

        let records: Vec<Record> = match mode {
            SampleMode::Random => all
                .records()
                .choose_multiple(&mut rand::thread_rng(), limit)
                .cloned()
                .collect(),
            SampleMode::Head => all.records().iter().take(limit).cloned().collect(),
        };

        Ok(Sample::new(records))
    }

    fn fetch_top_counts(&self, dimension: Dimension, limit: usize) -> Result<Vec<RankedCount>> {
        let all = self.load()?;
        let field = schema::resolve_or_default(&all.attribute_names(), dimension.role());
        debug!("Ranking {dimension:?} by attribute `{field}`");

        Ok(aggregate::rank_counts(values_of(&all, &field), limit))
    }

    fn fetch_dataset_totals(&self) -> Result<DatasetTotals> {
        let all = self.load()?;
        let fields = DatasetFields::resolve(&all.attribute_names());
        debug!("Dataset fields: {fields:?}");

        Ok(DatasetTotals {
            records: all.len() as u64,
            artists: aggregate::count_distinct(values_of(&all, &fields.artist)),
            tracks: aggregate::count_distinct(values_of(&all, &fields.track)),
            playlists: aggregate::count_distinct(values_of(&all, &fields.playlist)),
        })
    }

    fn fetch_user_stats(&self, limit: usize) -> Result<UserStats> {
        let all = self.load()?;
        let field = schema::resolve_or_default(&all.attribute_names(), FieldRole::User);

        let top_users = aggregate::rank_counts(values_of(&all, &field), limit);

        Ok(UserStats {
            total_users: aggregate::count_distinct(values_of(&all, &field)),
            top_users,
        })
    }
}
