use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolishError>;

#[derive(Error, Debug)]
pub enum PolishError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Template document not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("Embedding dimension mismatch: index has {expected}, query produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index not found at {0}; run `resume-polish build` first")]
    IndexNotFound(PathBuf),

    #[error("Record list not found at {0}; run `resume-polish build` first")]
    RecordsNotFound(PathBuf),

    #[error(
        "Index was built with embedding model '{indexed}' but '{configured}' is configured; rebuild the corpus"
    )]
    ModelMismatch { indexed: String, configured: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod extract;
pub mod generation;
pub mod index;
pub mod prompt;
pub mod retriever;
