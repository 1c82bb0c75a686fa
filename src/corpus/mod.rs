// Corpus building
// Pairs "before"/"after" resume documents by normalized filename key and
// turns each matched pair plus the shared template into one embeddable
// record.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::{debug, warn};

use crate::extract::extract_text;
use crate::{PolishError, Result};

static PAIR_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(resume)?[\s_-]*(before|after)").expect("pair token pattern is valid")
});

/// A matched before/after document pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePair {
    pub key: String,
    pub before: PathBuf,
    pub after: PathBuf,
}

/// Outcome of scanning a data directory: matched pairs in a stable order,
/// plus the "before" files that found no "after" counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingReport {
    pub pairs: Vec<ResumePair>,
    pub unmatched_before: Vec<String>,
}

/// Reduce a filename to the pairing key: strip the extension, case-fold,
/// remove "resume"/"before"/"after" tokens with their surrounding
/// separators, then drop every character outside `[a-z0-9]`.
///
/// Deliberately permissive: `janedoe_resume_before.docx` and
/// `janedoe_after.pdf` collapse to the same key, but so can genuinely
/// unrelated names. Collisions are a documented limitation of the matching
/// policy, pinned by tests rather than fixed.
#[inline]
pub fn normalize_pair_key(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(filename);

    let stripped = PAIR_TOKEN_PATTERN.replace_all(stem, "");

    stripped
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Scan the data directory and match before/after documents by normalized
/// key. Only files with a supported extension whose name contains "before"
/// or "after" participate. Unmatched "before" files are reported, never
/// fatal.
#[inline]
pub fn pair_documents(data_dir: &Path) -> Result<PairingReport> {
    let mut candidates: Vec<String> = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && crate::extract::is_supported(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                candidates.push(name.to_string());
            }
        }
    }
    candidates.sort();

    let before_files: Vec<&String> = candidates
        .iter()
        .filter(|name| name.to_lowercase().contains("before"))
        .collect();
    let after_map: HashMap<String, &String> = candidates
        .iter()
        .filter(|name| name.to_lowercase().contains("after"))
        .map(|name| (normalize_pair_key(name), name))
        .collect();

    let mut report = PairingReport::default();
    for before in before_files {
        let key = normalize_pair_key(before);
        match after_map.get(&key) {
            Some(after) => {
                debug!("Paired '{}' with '{}' (key: {})", before, after, key);
                report.pairs.push(ResumePair {
                    key,
                    before: data_dir.join(before),
                    after: data_dir.join(after.as_str()),
                });
            }
            None => {
                warn!("No after match for: {}", before);
                report.unmatched_before.push(before.clone());
            }
        }
    }

    Ok(report)
}

/// Load and extract the shared template document. A missing template aborts
/// the whole build.
#[inline]
pub fn load_template(template_path: &Path) -> Result<String> {
    if !template_path.exists() {
        return Err(PolishError::MissingTemplate(template_path.to_path_buf()));
    }
    Ok(extract_text(template_path)?.trim().to_string())
}

/// One record: three fenced segments labeled `template`, `before`, `after`,
/// in that order. The labels and fences are what lets the language model
/// discern structure, so the layout is contract.
#[inline]
pub fn format_record(template: &str, before: &str, after: &str) -> String {
    format!(
        "template:\n```text\n{template}\n```\n\nbefore:\n```text\n{before}\n```\n\nafter:\n```text\n{after}\n```"
    )
}

/// Extract both documents of a pair and format the record. Extraction
/// failures are returned to the caller, which skips the pair and reports it
/// in the build summary.
#[inline]
pub fn extract_pair(template: &str, pair: &ResumePair) -> Result<String> {
    let before = extract_text(&pair.before)?;
    let after = extract_text(&pair.after)?;
    Ok(format_record(template, before.trim(), after.trim()))
}

/// Write a human-readable dump of every record for manual inspection.
/// Not required for correctness.
#[inline]
pub fn dump_records(path: &Path, records: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    for (i, record) in records.iter().enumerate() {
        writeln!(file, "=== Example {} ===\n{}\n", i + 1, record)?;
    }
    Ok(())
}
