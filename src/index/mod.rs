// Flat vector index
// Brute-force squared-Euclidean nearest-neighbor search over the corpus
// embeddings, persisted as two sibling JSON artifacts: `<base>.index` for
// the vectors and `<base>.records` for the parallel record texts. Row i of
// the index embeds record i; the two files are always written together.


use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{PolishError, Result};

/// Flat (exhaustive) L2 index. The embedding model name and dimension are
/// stored with the vectors so a stale index built with a different model
/// fails loudly at load time instead of misbehaving at search time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatIndex {
    model: String,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    #[inline]
    pub fn new(model: &str, dimension: usize) -> Self {
        Self {
            model: model.to_string(),
            dimension,
            vectors: Vec::new(),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Insert a vector, returning its row id (insertion order).
    #[inline]
    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(PolishError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// Top-k rows by ascending squared-Euclidean distance to the query.
    /// Ties break by ascending row id for determinism. A `k` larger than
    /// the row count is clamped with a warning.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(PolishError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let k = if k > self.vectors.len() {
            warn!(
                "Requested {} neighbors but index has {} rows; clamping",
                k,
                self.vectors.len()
            );
            self.vectors.len()
        } else {
            k
        };

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, squared_l2(query, vector)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!("Search returned {} of {} rows", scored.len(), self.row_count());
        Ok(scored)
    }

    /// Load the index artifact, verifying it was built with the configured
    /// embedding model.
    #[inline]
    pub fn load(index_path: &Path, configured_model: &str) -> Result<Self> {
        if !index_path.exists() {
            return Err(PolishError::IndexNotFound(index_path.to_path_buf()));
        }

        let content = fs::read_to_string(index_path)?;
        let index: FlatIndex = serde_json::from_str(&content).map_err(|e| {
            PolishError::Other(anyhow::anyhow!(
                "Failed to parse index artifact {}: {}",
                index_path.display(),
                e
            ))
        })?;

        if index.model != configured_model {
            return Err(PolishError::ModelMismatch {
                indexed: index.model,
                configured: configured_model.to_string(),
            });
        }

        Ok(index)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Persist the index and the parallel record list together. Both artifacts
/// are rebuilt as a unit so the row/record correspondence never drifts.
#[inline]
pub fn save_artifacts(
    index_path: &Path,
    records_path: &Path,
    index: &FlatIndex,
    records: &[String],
) -> Result<()> {
    debug_assert_eq!(index.row_count(), records.len());

    if let Some(parent) = index_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Some(parent) = records_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(index_path, serde_json::to_string(index).map_err(|e| {
        PolishError::Other(anyhow::anyhow!("Failed to serialize index: {}", e))
    })?)?;
    fs::write(records_path, serde_json::to_string(records).map_err(|e| {
        PolishError::Other(anyhow::anyhow!("Failed to serialize records: {}", e))
    })?)?;

    Ok(())
}

/// Load the record list artifact.
#[inline]
pub fn load_records(records_path: &Path) -> Result<Vec<String>> {
    if !records_path.exists() {
        return Err(PolishError::RecordsNotFound(records_path.to_path_buf()));
    }

    let content = fs::read_to_string(records_path)?;
    serde_json::from_str(&content).map_err(|e| {
        PolishError::Other(anyhow::anyhow!(
            "Failed to parse records artifact {}: {}",
            records_path.display(),
            e
        ))
    })
}
