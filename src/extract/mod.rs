// Document text extraction
// Narrow three-format contract shared by the corpus builder and the CLI
// rewrite input: PDF, DOCX, and plain text.


use std::fs;
use std::path::Path;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::debug;

use crate::{PolishError, Result};

/// Extensions accepted by the extraction contract, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// Returns true when the file's extension is one of the supported formats.
/// Extension matching is case-insensitive.
#[inline]
pub fn is_supported(path: &Path) -> bool {
    normalized_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Extract the text of a document, dispatching on its extension.
/// Any extension outside the supported set is an `UnsupportedFormat` error.
#[inline]
pub fn extract_text(path: &Path) -> Result<String> {
    let ext = normalized_extension(path)
        .ok_or_else(|| PolishError::UnsupportedFormat(path.to_path_buf()))?;

    match ext.as_str() {
        "pdf" => read_pdf(path),
        "docx" => read_docx(path),
        "txt" => read_txt(path),
        _ => Err(PolishError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// PDF: per-page text joined with blank lines; pages without extractable
/// text are skipped.
fn read_pdf(path: &Path) -> Result<String> {
    let raw = pdf_extract::extract_text(path).map_err(|e| {
        PolishError::Other(anyhow::anyhow!(
            "Failed to extract PDF text from {}: {}",
            path.display(),
            e
        ))
    })?;

    // pdf-extract already concatenates pages; normalize its output into
    // non-empty blank-line-separated blocks.
    let blocks: Vec<&str> = raw
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect();

    debug!("Extracted {} text blocks from {}", blocks.len(), path.display());
    Ok(blocks.join("\n\n"))
}

/// DOCX: non-empty paragraph texts in document order, then non-empty table
/// cell texts deduplicated against the collected paragraphs, one per line.
/// Tables carry name/title/contact details often enough to matter.
fn read_docx(path: &Path) -> Result<String> {
    let buf = fs::read(path)?;
    let docx = docx_rs::read_docx(&buf).map_err(|e| {
        PolishError::Other(anyhow::anyhow!(
            "Failed to parse DOCX document {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut parts: Vec<String> = Vec::new();

    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let text = paragraph_text(paragraph);
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    for child in &docx.document.children {
        if let DocumentChild::Table(table) = child {
            for row in &table.rows {
                let TableChild::TableRow(row) = row;
                for cell in &row.cells {
                    let TableRowChild::TableCell(cell) = cell;
                    for content in &cell.children {
                        if let TableCellContent::Paragraph(paragraph) = content {
                            let text = paragraph_text(paragraph);
                            let text = text.trim();
                            if !text.is_empty() && !parts.iter().any(|p| p == text) {
                                parts.push(text.to_string());
                            }
                        }
                    }
                }
            }
        }
    }

    debug!("Extracted {} segments from {}", parts.len(), path.display());
    Ok(parts.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    collect_paragraph_children(&paragraph.children, &mut out);
    out
}

fn collect_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    if let RunChild::Text(text) = run_child {
                        out.push_str(&text.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => {
                collect_paragraph_children(&link.children, out);
            }
            _ => {}
        }
    }
}

/// Plain text: read verbatim as UTF-8.
fn read_txt(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
