use serde::{Deserialize, Serialize};

/// A single (headword, translation) pair reconstructed from the OCR line
/// stream. Entries are never mutated in place; the filter drops them and the
/// validation pass replaces them with enriched copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub headword: String,
    pub translation: String,
}

impl Entry {
    pub fn new(headword: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            headword: headword.into(),
            translation: translation.into(),
        }
    }
}

/// Per-line tag computed during a scan. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Headword,
    Annotation,
    Translation,
    Continuation,
    ExampleSentence,
    Noise,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Headword => "headword",
            Self::Annotation => "annotation",
            Self::Translation => "translation",
            Self::Continuation => "continuation",
            Self::ExampleSentence => "example_sentence",
            Self::Noise => "noise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationVerdict {
    Valid,
    Suspicious,
    Error,
}

/// Outcome of checking one entry against an independent translation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub headword: String,
    pub ocr_translation: String,
    pub translator_result: Option<String>,
    pub sequence_similarity: f64,
    pub token_overlap: f64,
    pub combined_score: f64,
    pub verdict: ValidationVerdict,
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn too_short(entry: &Entry) -> Self {
        Self {
            headword: entry.headword.clone(),
            ocr_translation: entry.translation.clone(),
            translator_result: None,
            sequence_similarity: 0.0,
            token_overlap: 0.0,
            combined_score: 0.0,
            verdict: ValidationVerdict::Suspicious,
            reason: Some("entry too short".to_string()),
        }
    }

    pub fn error(entry: &Entry, reason: &str) -> Self {
        Self {
            headword: entry.headword.clone(),
            ocr_translation: entry.translation.clone(),
            translator_result: None,
            sequence_similarity: 0.0,
            token_overlap: 0.0,
            combined_score: 0.0,
            verdict: ValidationVerdict::Error,
            reason: Some(reason.to_string()),
        }
    }
}

/// Lifecycle state of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Valid,
    Suspicious,
    Corrected,
    Deleted,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Suspicious => "suspicious",
            Self::Corrected => "corrected",
            Self::Deleted => "deleted",
        }
    }
}

/// Per-rule drop counters from the entry filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub kept: usize,
    pub too_short: usize,
    pub target_headword: usize,
    pub column_swap: usize,
    pub identity_pair: usize,
    pub sentence_headword: usize,
    pub example_leak: usize,
    pub paraphrase: usize,
    pub sentence_tail: usize,
    pub known_bad: usize,
    pub duplicate: usize,
}

impl FilterCounts {
    pub fn dropped_total(&self) -> usize {
        self.too_short
            + self.target_headword
            + self.column_swap
            + self.identity_pair
            + self.sentence_headword
            + self.example_leak
            + self.paraphrase
            + self.sentence_tail
            + self.known_bad
            + self.duplicate
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub filename: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractCounts {
    pub input_count: usize,
    pub failed_input_count: usize,
    pub line_count: usize,
    pub segmented_entry_count: usize,
    pub exported_card_count: usize,
    pub filter: FilterCounts,
}

/// JSON manifest written next to each extracted deck.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub deck_name: String,
    pub deck_path: String,
    pub counts: ExtractCounts,
    pub sources: Vec<SourceFile>,
    pub warnings: Vec<String>,
}
