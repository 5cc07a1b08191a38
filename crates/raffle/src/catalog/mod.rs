//! Catalog of candidate entries.
//!
//! When a caller asks to draw from "everything available" instead of supplying
//! names, candidates come from a [`CatalogSource`]. The source performs its own
//! shuffle and truncation before handing names to the draw manager, which then
//! shuffles again. Composing two uniform shuffles is still uniform, so the two
//! steps need no coordination.

use crate::{Error, RangeSource, Result, Shuffler, ThreadRandom};
use core::future::Future;
use std::collections::HashSet;

/// A catalog record.
///
/// Only `name` takes part in draws; the rest is carried for callers that want
/// the full record back from [`CatalogSource::sample`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CatalogEntry {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rating: f64,
    /// External place identifier; unique within a catalog.
    #[cfg_attr(feature = "serde", serde(default))]
    pub place_id: String,
    /// Search area the record was collected from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: String,
}

/// Supplies randomized, bounded candidate lists.
pub trait CatalogSource: Send + Sync {
    /// Returns at most `max_count` randomly selected records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogEmpty`] if the catalog holds nothing, or
    /// [`Error::CatalogUnavailable`] if it cannot be read.
    fn sample(&self, max_count: usize) -> impl Future<Output = Result<Vec<CatalogEntry>>> + Send;

    /// Returns the names of at most `max_count` randomly selected records.
    fn fetch_candidates(&self, max_count: usize) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move {
            let entries = self.sample(max_count).await?;
            Ok(entries.into_iter().map(|entry| entry.name).collect())
        }
    }
}

/// A [`CatalogSource`] holding its records in memory.
///
/// Records sharing a `place_id` are collapsed on construction, keeping the
/// first occurrence. Records with an empty `place_id` are always kept.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog<R = ThreadRandom>
where
    R: RangeSource,
{
    entries: Vec<CatalogEntry>,
    shuffler: Shuffler<R>,
}

impl MemoryCatalog<ThreadRandom> {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self::with_rng(entries, ThreadRandom)
    }
}

impl<R> MemoryCatalog<R>
where
    R: RangeSource,
{
    pub fn with_rng(entries: Vec<CatalogEntry>, rng: R) -> Self {
        let mut seen = HashSet::new();
        let entries: Vec<CatalogEntry> = entries
            .into_iter()
            .filter(|entry| entry.place_id.is_empty() || seen.insert(entry.place_id.clone()))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(count = entries.len(), "catalog loaded");

        Self {
            entries,
            shuffler: Shuffler::new(rng),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl<R> CatalogSource for MemoryCatalog<R>
where
    R: RangeSource + Send + Sync,
{
    async fn sample(&self, max_count: usize) -> Result<Vec<CatalogEntry>> {
        if self.entries.is_empty() {
            return Err(Error::CatalogEmpty);
        }
        let mut selected = self.shuffler.shuffle(self.entries.clone());
        selected.truncate(max_count);
        Ok(selected)
    }
}
