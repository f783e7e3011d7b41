//! Group-count-sort-limit helpers shared by the in-memory data sources and the
//! reports.

use serde::Serialize;
use std::collections::HashMap;

/// One row of a ranked count table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    pub key: String,
    pub count: u64,
}

impl RankedCount {
    #[must_use]
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Count occurrences of each value and return the `limit` most frequent.
///
/// Sorting is stable, so values with equal counts keep the order in which they
/// first appeared.
#[must_use]
pub fn rank_counts<'a, I>(values: I, limit: usize) -> Vec<RankedCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    counts.sort_by(|(_, a), (_, b)| b.cmp(a));
    counts
        .into_iter()
        .take(limit)
        .map(|(key, count)| RankedCount::new(key, count))
        .collect()
}

/// Keep the first `head` rows and fold the rest into a single `label` row.
///
/// The folded row is only appended when the remainder adds up to something.
#[must_use]
pub fn collapse_tail(counts: &[RankedCount], head: usize, label: &str) -> Vec<RankedCount> {
    let split = head.min(counts.len());
    let (kept, rest) = counts.split_at(split);
    let remainder: u64 = rest.iter().map(|row| row.count).sum();

    let mut collapsed = kept.to_vec();
    if remainder > 0 {
        collapsed.push(RankedCount::new(label, remainder));
    }
    collapsed
}

/// Number of distinct values.
#[must_use]
pub fn count_distinct<'a, I>(values: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: std::collections::HashSet<&str> = values.into_iter().collect();
    distinct.len() as u64
}
