use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Entry;

/// Lines opening with this marker carry header fields, not cards.
pub const HEADER_MARKER: char = '#';

const MIN_FIELD_CHARS: usize = 2;

/// Header block of a flashcard import file: field separator, HTML flag, deck
/// name and note type.
#[derive(Debug, Clone)]
pub struct DeckHeader {
    pub deck_name: String,
    pub note_type: String,
    pub html: bool,
}

impl DeckHeader {
    pub fn new(deck_name: impl Into<String>, note_type: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
            note_type: note_type.into(),
            html: false,
        }
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }
}

/// Renders the header block plus one tab-separated line per entry.
/// Duplicate (headword, translation) pairs and underlength fields are
/// dropped. Returns the rendered text and the card count.
pub fn render_deck(header: &DeckHeader, entries: &[Entry]) -> (String, usize) {
    let mut out = String::new();
    out.push_str("#separator:Tab\n");
    out.push_str(&format!(
        "#html:{}\n",
        if header.html { "true" } else { "false" }
    ));
    out.push_str(&format!("#deck:{}\n", header.deck_name));
    out.push_str(&format!("#notetype:{}\n", header.note_type));

    let mut seen = HashSet::new();
    let mut written = 0usize;
    for entry in entries {
        let front = entry.headword.trim();
        let back = entry.translation.trim();
        if front.chars().count() < MIN_FIELD_CHARS || back.chars().count() < MIN_FIELD_CHARS {
            continue;
        }
        if !seen.insert((front.to_lowercase(), back.to_lowercase())) {
            continue;
        }
        out.push_str(front);
        out.push('\t');
        out.push_str(back);
        out.push('\n');
        written += 1;
    }

    (out, written)
}

pub fn write_deck(path: &Path, header: &DeckHeader, entries: &[Entry]) -> Result<usize> {
    let (rendered, written) = render_deck(header, entries);
    fs::write(path, rendered)
        .with_context(|| format!("failed to write deck file: {}", path.display()))?;
    Ok(written)
}

/// Re-parses deck text into entries: header lines and blanks are excluded,
/// card lines split on the first tab.
pub fn parse_deck(text: &str) -> Vec<Entry> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with(HEADER_MARKER) {
                return None;
            }
            let (front, back) = line.split_once('\t')?;
            if front.is_empty() || back.is_empty() {
                return None;
            }
            Some(Entry::new(front, back))
        })
        .collect()
}

pub fn read_deck(path: &Path) -> Result<Vec<Entry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;
    Ok(parse_deck(&raw))
}

/// Bare tab-separated rows without a header block, for store exports.
pub fn render_rows(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.headword);
        out.push('\t');
        out.push_str(&entry.translation);
        out.push('\n');
    }
    out
}
