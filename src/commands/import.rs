use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::ImportArgs;
use crate::deck;
use crate::store::VocabStore;

/// Surrounding lines captured as context for one imported entry.
const CONTEXT_LINE_RADIUS: usize = 2;
const CONTEXT_CHAR_CAP: usize = 240;

pub fn run(args: ImportArgs) -> Result<()> {
    if !args.deck_file.exists() {
        bail!("deck file not found: {}", args.deck_file.display());
    }

    let entries = deck::read_deck(&args.deck_file)?;
    if entries.is_empty() {
        bail!("no entries found in {}", args.deck_file.display());
    }

    let source = args.source.clone().unwrap_or_else(|| {
        args.deck_file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("deck")
            .to_string()
    });

    let raw_text = match &args.raw {
        Some(path) => Some(fs::read_to_string(path).with_context(|| {
            format!("failed to read raw OCR text: {}", path.display())
        })?),
        None => None,
    };

    let mut store = VocabStore::open(&args.db_path)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for entry in &entries {
        let context = raw_text
            .as_deref()
            .and_then(|raw| find_context(&entry.headword, raw));
        if store.insert_if_absent(
            entry,
            &args.from_lang,
            &args.to_lang,
            &source,
            context.as_deref(),
        )? {
            imported += 1;
        } else {
            skipped += 1;
        }
    }

    info!(
        imported,
        skipped,
        source = %source,
        db = %args.db_path.display(),
        "import complete"
    );
    Ok(())
}

/// Lines around the first occurrence of the headword in the raw OCR text.
/// Falls back to the headword's first token when the full phrase is absent.
fn find_context(headword: &str, raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let position = find_line(&lines, headword).or_else(|| {
        headword
            .split_whitespace()
            .next()
            .and_then(|first| find_line(&lines, first))
    })?;

    let start = position.saturating_sub(CONTEXT_LINE_RADIUS);
    let end = (position + CONTEXT_LINE_RADIUS + 1).min(lines.len());
    let snippet = lines[start..end].join("\n");
    Some(snippet.chars().take(CONTEXT_CHAR_CAP).collect())
}

fn find_line(lines: &[&str], needle: &str) -> Option<usize> {
    let folded = needle.to_lowercase();
    lines
        .iter()
        .position(|line| line.to_lowercase().contains(&folded))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "Unit 1\npersonality [ann]\nPersönlichkeit\nI have a strong personality.\n123";

    #[test]
    fn context_includes_surrounding_lines() {
        let context = find_context("personality", RAW).expect("context found");
        assert!(context.contains("Unit 1"));
        assert!(context.contains("Persönlichkeit"));
    }

    #[test]
    fn context_falls_back_to_first_token() {
        let context = find_context("personality traits", RAW).expect("context found");
        assert!(context.contains("personality [ann]"));
    }

    #[test]
    fn context_is_none_when_word_absent() {
        assert!(find_context("missing", RAW).is_none());
    }
}
