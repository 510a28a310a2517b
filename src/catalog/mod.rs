//! Summary catalog
//!
//! The catalog is the durable description of every resource: a JSON object
//! keyed by resource id (as a string) whose values are
//! `{"title": ..., "keywords": [...], "brief": ...}`.
//!
//! Records are kept as raw JSON so that a partially written or hand-edited
//! catalog still loads; [`Catalog::record`] only hands out records that pass
//! the completeness check, and everything else is regenerated by the summary
//! engine.

/// Authoritative title index.
pub mod index;
/// Catalog persistence.
pub mod store;

pub use index::TitleIndex;
pub use store::{CatalogStore, JsonFileStore};

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured description of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    pub keywords: Vec<String>,
    pub brief: String,
}

impl SummaryRecord {
    /// Whether a raw catalog value is a complete record.
    ///
    /// Complete means: `title` is a string, `keywords` is a non-empty array
    /// whose entries are all strings, and `brief` is a non-empty string.
    pub fn is_complete(value: &Value) -> bool {
        let title_ok = value.get("title").is_some_and(Value::is_string);
        let keywords_ok = value
            .get("keywords")
            .and_then(Value::as_array)
            .is_some_and(|kw| !kw.is_empty() && kw.iter().all(Value::is_string));
        let brief_ok = value
            .get("brief")
            .and_then(Value::as_str)
            .is_some_and(|b| !b.trim().is_empty());

        title_ok && keywords_ok && brief_ok
    }

    /// Parse a raw value, returning `None` unless it is complete.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !Self::is_complete(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// The per-resource catalog, keyed by resource id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Map<String, Value>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, complete or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The complete record for `id`, if there is one.
    pub fn record(&self, id: u32) -> Option<SummaryRecord> {
        self.entries
            .get(&id.to_string())
            .and_then(SummaryRecord::from_value)
    }

    pub fn is_complete(&self, id: u32) -> bool {
        self.entries
            .get(&id.to_string())
            .is_some_and(SummaryRecord::is_complete)
    }

    /// Ids in `ids` whose record is missing or incomplete, in ascending order.
    pub fn incomplete_ids(&self, ids: impl IntoIterator<Item = u32>) -> Vec<u32> {
        ids.into_iter().filter(|id| !self.is_complete(*id)).collect()
    }

    /// Insert or replace the record for `id`.
    pub fn insert(&mut self, id: u32, record: SummaryRecord) -> Result<()> {
        let value = serde_json::to_value(&record)
            .map_err(|e| AppError::Catalog(format!("Failed to encode record {}: {}", id, e)))?;
        self.entries.insert(id.to_string(), value);
        Ok(())
    }

    /// Insert a raw, possibly incomplete value. Mostly useful to seed tests
    /// and migrations.
    pub fn insert_raw(&mut self, id: impl Into<String>, value: Value) {
        self.entries.insert(id.into(), value);
    }

    /// Every record for `ids`, failing on the first missing or incomplete one.
    pub fn complete_records(
        &self,
        ids: impl IntoIterator<Item = u32>,
    ) -> Result<Vec<(u32, SummaryRecord)>> {
        ids.into_iter()
            .map(|id| {
                self.record(id)
                    .map(|record| (id, record))
                    .ok_or_else(|| {
                        AppError::Catalog(format!("Summary for resource {} is missing or incomplete", id))
                    })
            })
            .collect()
    }
}
