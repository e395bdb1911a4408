use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::EntryStatus;
use crate::score;

#[derive(Parser, Debug)]
#[command(
    name = "vocabmine",
    version,
    about = "Textbook vocabulary extraction and flashcard tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Validate(ValidateArgs),
    Import(ImportArgs),
    List(ListArgs),
    Correct(CorrectArgs),
    Export(ExportArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Folder of OCR line dumps, one text file per page image.
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "output")]
    pub output: PathBuf,

    /// Deck name; derived from the input folder when omitted.
    #[arg(long)]
    pub deck: Option<String>,

    #[arg(long, default_value = "Einfach (beide Richtungen)")]
    pub notetype: String,

    /// JSON lexicon overriding the builtin English-German profile.
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Also write the raw extracted lines next to the deck.
    #[arg(long, default_value_t = false)]
    pub raw: bool,

    /// Overwrite existing output files.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Delete all files in the output folder before running.
    #[arg(long, default_value_t = false)]
    pub reset: bool,

    /// Log the classification of every line at debug level.
    #[arg(long, default_value_t = false)]
    pub trace_lines: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long)]
    pub deck_file: PathBuf,

    /// Tab-separated glossary backing the offline translator.
    #[arg(long)]
    pub glossary: PathBuf,

    #[arg(long, default_value = "en")]
    pub from_lang: String,

    #[arg(long, default_value = "de")]
    pub to_lang: String,

    #[arg(long, default_value_t = score::DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Pause between translator calls, respecting external rate limits.
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,

    /// Report and enriched-deck folder; defaults to the deck file's folder.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Record verdicts onto matching store entries.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub lexicon: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long)]
    pub deck_file: PathBuf,

    #[arg(long, default_value = ".cache/vocabmine/vocabulary.sqlite")]
    pub db_path: PathBuf,

    /// Source label; derived from the deck filename when omitted.
    #[arg(long)]
    pub source: Option<String>,

    /// Raw OCR text used to attach context snippets to entries.
    #[arg(long)]
    pub raw: Option<PathBuf>,

    #[arg(long, default_value = "en")]
    pub from_lang: String,

    #[arg(long, default_value = "de")]
    pub to_lang: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value = ".cache/vocabmine/vocabulary.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, value_enum)]
    pub status: Option<StatusFilter>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CorrectArgs {
    #[arg(long, default_value = ".cache/vocabmine/vocabulary.sqlite")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub translation: String,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long, default_value = ".cache/vocabmine/vocabulary.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "output/exported_vocabulary.txt")]
    pub output: PathBuf,

    /// Statuses to export; everything when omitted.
    #[arg(long = "status", value_enum)]
    pub statuses: Vec<StatusFilter>,

    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/vocabmine/vocabulary.sqlite")]
    pub db_path: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusFilter {
    Pending,
    Valid,
    Suspicious,
    Corrected,
    Deleted,
}

impl StatusFilter {
    pub fn to_status(self) -> EntryStatus {
        match self {
            Self::Pending => EntryStatus::Pending,
            Self::Valid => EntryStatus::Valid,
            Self::Suspicious => EntryStatus::Suspicious,
            Self::Corrected => EntryStatus::Corrected,
            Self::Deleted => EntryStatus::Deleted,
        }
    }
}
