// Embeddings module
// The Embedder trait is the injection seam between the pipeline and the
// embedding service; OllamaClient is the production implementation.

pub mod ollama;

pub use ollama::OllamaClient;

use crate::Result;

/// Deterministic text-to-vector boundary. The same implementation (and the
/// same underlying model) must serve both corpus builds and queries.
pub trait Embedder {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed an ordered batch of texts; the output order matches the input.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
