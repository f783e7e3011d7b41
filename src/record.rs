//! # Record Model
//!
//! A dataset row is a bag of attributes whose names are only known at runtime.
//! Depending on how the dataset was imported, the artist column may be called
//! `artistname`, `_artistname`, `Artist Name` and so on. Records keep their
//! attributes in the order the source delivered them, because field resolution
//! picks the first matching attribute.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// One listening/association entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    attributes: Vec<(String, String)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` to `value`, replacing an earlier value in place.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Value of the attribute called exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`Record::get`], but empty strings count as missing.
    #[must_use]
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Convert a JSON document into a record.
    ///
    /// Strings are kept as-is, numbers and booleans are stringified. Nulls,
    /// nested objects and arrays are dropped since no aggregation can group on
    /// them. Returns `None` when `doc` is not an object.
    #[must_use]
    pub fn from_json(doc: &Value) -> Option<Self> {
        let object = doc.as_object()?;
        let mut record = Self::new();

        for (name, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => continue,
            };
            record.attributes.push((name.clone(), text));
        }

        Some(record)
    }
}

/// Bounded, ordered collection of records loaded for one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sample {
    records: Vec<Record>,
}

impl Sample {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Attribute names across all records, in first-seen order.
    ///
    /// Records of a document store do not have to agree on their shape, so
    /// the union is taken rather than trusting the first record.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for name in self.records.iter().flat_map(Record::attribute_names) {
            if seen.insert(name) {
                names.push(name.to_string());
            }
        }

        names
    }
}

impl From<Vec<Record>> for Sample {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for Sample {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
