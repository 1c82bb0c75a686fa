use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::corpus::{self, PairingReport};
use crate::embeddings::{Embedder, OllamaClient};
use crate::extract;
use crate::generation::{CompletionClient, Rewriter};
use crate::index::{self, FlatIndex};
use crate::retriever::Retriever;

/// Build the corpus artifacts from the configured data directory.
#[inline]
pub fn build(config: &Config, dump: Option<&Path>) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    embedder
        .ping()
        .context("Embedding server is not reachable")?;

    let template = corpus::load_template(&config.template_path())
        .context("Failed to load the shared template")?;
    let pairing = corpus::pair_documents(&config.paths.data_dir)
        .context("Failed to scan the data directory")?;

    info!(
        "Found {} matched pairs and {} unmatched before files",
        pairing.pairs.len(),
        pairing.unmatched_before.len()
    );

    let progress = ProgressBar::new(pairing.pairs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );

    let mut records: Vec<String> = Vec::with_capacity(pairing.pairs.len());
    let mut skipped: Vec<(String, String)> = Vec::new();
    for pair in &pairing.pairs {
        progress.set_message(pair.key.clone());
        match corpus::extract_pair(&template, pair) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping pair '{}': {}", pair.key, e);
                skipped.push((pair.key.clone(), e.to_string()));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let index = embed_records(config, &embedder, &records)?;

    index::save_artifacts(
        &config.index_path(),
        &config.records_path(),
        &index,
        &records,
    )
    .context("Failed to persist corpus artifacts")?;

    if let Some(dump_path) = dump {
        corpus::dump_records(dump_path, &records).context("Failed to write record dump")?;
        println!("📝 Dumped records to {}", dump_path.display());
    }

    print_build_summary(&pairing, &skipped, records.len(), config);

    Ok(())
}

/// Embed the full record sequence in one ordered batch. An empty corpus is
/// guarded explicitly: no embedding call is made and an empty index with the
/// configured dimension is persisted.
fn embed_records(
    config: &Config,
    embedder: &impl Embedder,
    records: &[String],
) -> Result<FlatIndex> {
    if records.is_empty() {
        warn!("No matched pairs; persisting an empty index");
        return Ok(FlatIndex::new(
            &config.ollama.model,
            config.ollama.embedding_dimension as usize,
        ));
    }

    let embeddings = embedder
        .embed_batch(records)
        .context("Failed to embed records")?;

    // Dimension is taken from the first encoded vector.
    let dimension = embeddings
        .first()
        .map(Vec::len)
        .context("Embedding service returned no vectors")?;

    let mut index = FlatIndex::new(&config.ollama.model, dimension);
    for embedding in embeddings {
        index.add(embedding)?;
    }

    Ok(index)
}

fn print_build_summary(
    pairing: &PairingReport,
    skipped: &[(String, String)],
    record_count: usize,
    config: &Config,
) {
    for miss in &pairing.unmatched_before {
        println!("❌ No after match for: {miss}");
    }
    for (key, reason) in skipped {
        println!("⚠️  Skipped pair '{key}': {reason}");
    }

    println!("✅ Embedded {record_count} examples");
    println!("   Index: {}", config.index_path().display());
    println!("   Records: {}", config.records_path().display());

    if record_count == 0 {
        println!("   (empty corpus; add before/after pairs and rebuild)");
    }
}

/// Debug helper: show the top-k stored records for an input resume.
#[inline]
pub fn search(config: &Config, input: &str, k: usize) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let retriever = Retriever::load(
        &config.index_path(),
        &config.records_path(),
        &config.ollama.model,
        &embedder,
    )?;

    let query = read_input(input)?;
    let results = retriever.search(&query, k)?;

    if results.is_empty() {
        println!("No records in the corpus.");
        return Ok(());
    }

    for (i, record) in results.iter().enumerate() {
        println!("--- Match {} ---", i + 1);
        println!("{record}");
        println!();
    }

    Ok(())
}

/// Rewrite a resume and print (or save) the generated text.
#[inline]
pub fn rewrite(config: &Config, input: &str, k: usize, output: Option<&Path>) -> Result<()> {
    let embedder = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let completion =
        CompletionClient::from_env(&config.openai).context("Failed to create completion client")?;

    let raw = read_input(input)?;
    let rewriter = Rewriter::new(config, &embedder, &completion);
    let rewritten = rewriter.rewrite(&raw, k)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rewritten)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            println!("✅ Rewritten resume saved to {}", path.display());
        }
        None => println!("{rewritten}"),
    }

    Ok(())
}

/// Print the active configuration and where it lives.
#[inline]
pub fn show_config(config: &Config, config_dir: &Path) -> Result<()> {
    println!("Configuration directory: {}", config_dir.display());
    println!();
    println!(
        "{}",
        toml::to_string_pretty(config).context("Failed to render configuration")?
    );
    Ok(())
}

/// Read resume text from a document path, or from stdin when the input
/// is `-`. Files go through the same three-format extraction contract as
/// the corpus builder.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        Ok(buf)
    } else {
        Ok(extract::extract_text(&PathBuf::from(input))?)
    }
}
