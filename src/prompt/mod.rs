// Prompt composition
// Deterministic assembly of the generation prompt from the rule set, the
// retrieved examples, and the raw input. The section order and labels are
// contract: the model's output quality depends on consistent framing, so
// changing them is a behavior change, not a refactor.


use std::fs;
use std::path::Path;

use crate::Result;

/// Fixed system role for the completion call.
pub const SYSTEM_PROMPT: &str = "You are a resume rewriting assistant that strictly follows \
formatting instructions to produce structured SDR resumes.";

/// Read the rewrite rules: one instruction per line, blank lines ignored.
/// Re-read on every rewrite so the rule set can change without rebuilding
/// the corpus.
#[inline]
pub fn load_rules(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Compose the full generation prompt. Pure function of its inputs.
///
/// Four fixed sections in order: role framing plus the bulleted rules, the
/// retrieved examples (1-based labels), the resume to rewrite, and the
/// output marker cueing the model to begin its answer.
#[inline]
pub fn build_prompt(rules: &[String], examples: &[String], raw_input: &str) -> String {
    let instructions = rules
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n");

    let rendered_examples = examples
        .iter()
        .enumerate()
        .map(|(i, text)| format!("--- Example {} ---\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a career coach who helps people land SDR (Sales Development Representative) \
         roles by helping them rewrite their resumes.\n\
         \n\
         Follow these rewriting instructions:\n\
         {instructions}\n\
         \n\
         Reference the examples below to understand how to rewrite resumes effectively. Use \
         the provided examples as a guide for structure, content, and style.\n\
         {rendered_examples}\n\
         \n\
         --- Resume to Rewrite ---\n\
         {raw_input}\n\
         \n\
         --- Rewritten SDR Resume ---\n"
    )
}
