// Retrieval over the persisted corpus
// Loads the index/record artifacts read-only, embeds the query resume with
// the same model used at build time, and returns the closest records.


use std::path::Path;

use tracing::{debug, warn};

use crate::embeddings::Embedder;
use crate::index::{self, FlatIndex};
use crate::{PolishError, Result};

/// Read-only view over the persisted (index, records) pair. Loaded fresh
/// per request; callers that want caching can hold on to one instance.
pub struct Retriever<'a, E: Embedder> {
    index: FlatIndex,
    records: Vec<String>,
    embedder: &'a E,
}

impl<'a, E: Embedder> Retriever<'a, E> {
    /// Load both artifacts and re-check the row/record correspondence.
    #[inline]
    pub fn load(
        index_path: &Path,
        records_path: &Path,
        configured_model: &str,
        embedder: &'a E,
    ) -> Result<Self> {
        let index = FlatIndex::load(index_path, configured_model)?;
        let records = index::load_records(records_path)?;

        if index.row_count() != records.len() {
            return Err(PolishError::Other(anyhow::anyhow!(
                "Index has {} rows but record list has {} entries; rebuild the corpus",
                index.row_count(),
                records.len()
            )));
        }

        debug!("Loaded corpus with {} records", records.len());
        Ok(Self {
            index,
            records,
            embedder,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the `k` records most similar to the query text, ascending by
    /// distance. `k` larger than the corpus is clamped; an empty corpus
    /// yields no results rather than an error.
    #[inline]
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<String>> {
        if self.records.is_empty() {
            warn!("Corpus is empty; retrieval returns no examples");
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(query_text)?;
        if query.len() != self.index.dimension() {
            return Err(PolishError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: query.len(),
            });
        }

        let neighbors = self.index.search(&query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|(row, _distance)| self.records[row].clone())
            .collect())
    }
}
