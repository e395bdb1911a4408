use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::ValidateArgs;
use crate::deck::{self, DeckHeader};
use crate::lexicon::Lexicon;
use crate::model::{Entry, EntryStatus, ValidationOutcome, ValidationVerdict};
use crate::score;
use crate::store::VocabStore;
use crate::translate::{GlossaryTranslator, Translator};
use crate::util::{ensure_directory, write_json_pretty};

const MIN_SCORED_CHARS: usize = 2;
/// Differing alternatives are appended to suspicious cards in this form.
const ALTERNATIVE_PREFIX: &str = "[alt: ";

pub fn run(args: ValidateArgs) -> Result<()> {
    if !args.deck_file.exists() {
        bail!("deck file not found: {}", args.deck_file.display());
    }

    let entries = deck::read_deck(&args.deck_file)?;
    if entries.is_empty() {
        bail!("no entries found in {}", args.deck_file.display());
    }
    info!(entries = entries.len(), deck = %args.deck_file.display(), "loaded deck entries");

    let lexicon = Lexicon::load(args.lexicon.as_deref())?;
    let mut translator = GlossaryTranslator::from_path(&args.glossary)?;
    if translator.is_empty() {
        warn!(glossary = %args.glossary.display(), "glossary is empty, every entry will error");
    }
    info!(glossary_entries = translator.len(), "loaded glossary");

    let outcomes = run_validation(
        &lexicon,
        &mut translator,
        &entries,
        &args.from_lang,
        &args.to_lang,
        args.threshold,
        Duration::from_millis(args.delay_ms),
    );

    let valid = count_verdict(&outcomes, ValidationVerdict::Valid);
    let suspicious = count_verdict(&outcomes, ValidationVerdict::Suspicious);
    let errors = count_verdict(&outcomes, ValidationVerdict::Error);
    info!(valid, suspicious, errors, "validation complete");

    let output_folder = args
        .output
        .clone()
        .or_else(|| args.deck_file.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    ensure_directory(&output_folder)?;

    let stem = deck_stem(&args.deck_file);
    let report_path = output_folder.join(format!("validation_report_{stem}.md"));
    fs::write(&report_path, render_report(&outcomes))
        .with_context(|| format!("failed to write report: {}", report_path.display()))?;
    info!(path = %report_path.display(), "wrote validation report");

    let results_path = output_folder.join(format!("validation_results_{stem}.json"));
    write_json_pretty(&results_path, &outcomes)?;
    info!(path = %results_path.display(), "wrote validation results");

    let enriched_path = output_folder.join(format!("validated_{stem}.txt"));
    let enriched = enrich_entries(&entries, &outcomes);
    let header = DeckHeader::new(stem.replace('_', " "), "Einfach (beide Richtungen)").with_html(true);
    let written = deck::write_deck(&enriched_path, &header, &enriched)?;
    info!(path = %enriched_path.display(), cards = written, "wrote enriched deck");

    if let Some(db_path) = &args.db_path {
        record_outcomes(db_path, &stem, &outcomes)?;
    }

    Ok(())
}

/// Strictly sequential loop over the entries: one translator call per entry
/// with a fixed pause in between. A failed call is recorded as an error
/// outcome and the loop continues. Output order matches input order.
pub fn run_validation(
    lexicon: &Lexicon,
    translator: &mut dyn Translator,
    entries: &[Entry],
    from_lang: &str,
    to_lang: &str,
    threshold: f64,
    delay: Duration,
) -> Vec<ValidationOutcome> {
    let mut outcomes = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        if entry.headword.chars().count() < MIN_SCORED_CHARS
            || entry.translation.chars().count() < MIN_SCORED_CHARS
        {
            outcomes.push(ValidationOutcome::too_short(entry));
            continue;
        }

        let outcome = match translator.translate(&entry.headword, from_lang, to_lang) {
            Ok(Some(result)) => score::evaluate(lexicon, entry, &result, threshold),
            Ok(None) => {
                warn!(headword = %entry.headword, "translator returned no result");
                ValidationOutcome::error(entry, "translator returned no result")
            }
            Err(error) => {
                warn!(headword = %entry.headword, error = %error, "translation call failed");
                ValidationOutcome::error(entry, &format!("translation call failed: {error}"))
            }
        };
        debug!(
            headword = %outcome.headword,
            sequence = outcome.sequence_similarity,
            overlap = outcome.token_overlap,
            combined = outcome.combined_score,
            verdict = ?outcome.verdict,
            "entry scored"
        );
        outcomes.push(outcome);
    }

    outcomes
}

/// Suspicious entries whose independent translation differs get it appended
/// as an alternative; everything else passes through unchanged.
pub fn enrich_entries(entries: &[Entry], outcomes: &[ValidationOutcome]) -> Vec<Entry> {
    entries
        .iter()
        .zip(outcomes)
        .map(|(entry, outcome)| {
            if outcome.verdict != ValidationVerdict::Suspicious {
                return entry.clone();
            }
            match &outcome.translator_result {
                Some(alternative)
                    if alternative.trim().to_lowercase()
                        != entry.translation.trim().to_lowercase() =>
                {
                    Entry::new(
                        entry.headword.clone(),
                        format!("{} {ALTERNATIVE_PREFIX}{alternative}]", entry.translation),
                    )
                }
                _ => entry.clone(),
            }
        })
        .collect()
}

fn render_report(outcomes: &[ValidationOutcome]) -> String {
    let valid = count_verdict(outcomes, ValidationVerdict::Valid);
    let suspicious = count_verdict(outcomes, ValidationVerdict::Suspicious);
    let errors = count_verdict(outcomes, ValidationVerdict::Error);

    let mut report = String::new();
    let _ = writeln!(report, "# Vocabulary Validation Report");
    let _ = writeln!(report);
    let _ = writeln!(report, "**Total entries:** {}", outcomes.len());
    let _ = writeln!(report, "**Valid:** {valid}");
    let _ = writeln!(report, "**Suspicious:** {suspicious}");
    let _ = writeln!(report, "**Errors:** {errors}");
    let _ = writeln!(report);

    if suspicious > 0 {
        let _ = writeln!(report, "## Suspicious Entries (Manual Review Needed)");
        let _ = writeln!(report);
        let _ = writeln!(
            report,
            "| # | Headword | OCR Translation | Translator Result | Similarity |"
        );
        let _ = writeln!(report, "|---|----------|-----------------|-------------------|------------|");
        for (index, outcome) in outcomes
            .iter()
            .filter(|outcome| outcome.verdict == ValidationVerdict::Suspicious)
            .enumerate()
        {
            let _ = writeln!(
                report,
                "| {} | {} | {} | {} | {:.2} |",
                index + 1,
                outcome.headword,
                outcome.ocr_translation,
                outcome.translator_result.as_deref().unwrap_or("N/A"),
                outcome.combined_score
            );
        }
        let _ = writeln!(report);
    }

    if errors > 0 {
        let _ = writeln!(report, "## Errors");
        let _ = writeln!(report);
        for outcome in outcomes
            .iter()
            .filter(|outcome| outcome.verdict == ValidationVerdict::Error)
        {
            let _ = writeln!(
                report,
                "- **{}**: {}",
                outcome.headword,
                outcome.reason.as_deref().unwrap_or("unknown error")
            );
        }
        let _ = writeln!(report);
    }

    let _ = writeln!(report, "## Valid Entries");
    let _ = writeln!(report);
    let _ = writeln!(report, "{valid} entries passed validation.");

    report
}

fn record_outcomes(db_path: &Path, source: &str, outcomes: &[ValidationOutcome]) -> Result<()> {
    let mut store = VocabStore::open(db_path)?;
    let mut recorded = 0usize;
    let mut unmatched = 0usize;

    for outcome in outcomes {
        let status = match outcome.verdict {
            ValidationVerdict::Valid => EntryStatus::Valid,
            ValidationVerdict::Suspicious => EntryStatus::Suspicious,
            ValidationVerdict::Error => continue,
        };

        match store.find_id(&outcome.headword, source)? {
            Some(id) => {
                store.record_validation(
                    id,
                    outcome.translator_result.as_deref(),
                    outcome.combined_score,
                    status,
                )?;
                recorded += 1;
            }
            None => unmatched += 1,
        }
    }

    info!(recorded, unmatched, source, "recorded validation results");
    Ok(())
}

fn count_verdict(outcomes: &[ValidationOutcome], verdict: ValidationVerdict) -> usize {
    outcomes
        .iter()
        .filter(|outcome| outcome.verdict == verdict)
        .count()
}

fn deck_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("deck")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;

    use super::*;

    struct FakeTranslator {
        known: HashMap<String, String>,
        failing: Vec<String>,
    }

    impl Translator for FakeTranslator {
        fn translate(
            &mut self,
            text: &str,
            _from_lang: &str,
            _to_lang: &str,
        ) -> Result<Option<String>> {
            if self.failing.iter().any(|word| word == text) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.known.get(text).cloned())
        }
    }

    fn fake_translator() -> FakeTranslator {
        let mut known = HashMap::new();
        known.insert("house".to_string(), "Haus".to_string());
        known.insert("dog".to_string(), "Hund".to_string());
        FakeTranslator {
            known,
            failing: vec!["career".to_string()],
        }
    }

    #[test]
    fn one_failed_call_does_not_abort_the_run() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![
            Entry::new("house", "Haus"),
            Entry::new("career", "die Karriere"),
            Entry::new("dog", "Hund"),
        ];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].verdict, ValidationVerdict::Valid);
        assert_eq!(outcomes[1].verdict, ValidationVerdict::Error);
        assert_eq!(outcomes[2].verdict, ValidationVerdict::Valid);
    }

    #[test]
    fn missing_translation_is_a_recoverable_error() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![Entry::new("unknown", "Wort")];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );

        assert_eq!(outcomes[0].verdict, ValidationVerdict::Error);
        assert_eq!(
            outcomes[0].reason.as_deref(),
            Some("translator returned no result")
        );
    }

    #[test]
    fn short_entries_are_flagged_before_any_call() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![Entry::new("a", "Haus")];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );

        assert_eq!(outcomes[0].verdict, ValidationVerdict::Suspicious);
        assert_eq!(outcomes[0].reason.as_deref(), Some("entry too short"));
    }

    #[test]
    fn suspicious_entries_get_the_alternative_appended() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![Entry::new("dog", "die Leine")];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );
        assert_eq!(outcomes[0].verdict, ValidationVerdict::Suspicious);

        let enriched = enrich_entries(&entries, &outcomes);
        assert_eq!(enriched[0].translation, "die Leine [alt: Hund]");
    }

    #[test]
    fn valid_entries_pass_through_enrichment_unchanged() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![Entry::new("house", "Haus")];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );
        let enriched = enrich_entries(&entries, &outcomes);
        assert_eq!(enriched, entries);
    }

    #[test]
    fn report_counts_all_verdicts() {
        let lexicon = Lexicon::builtin_english_german();
        let entries = vec![
            Entry::new("house", "Haus"),
            Entry::new("career", "die Karriere"),
            Entry::new("dog", "die Leine"),
        ];

        let outcomes = run_validation(
            &lexicon,
            &mut fake_translator(),
            &entries,
            "en",
            "de",
            score::DEFAULT_THRESHOLD,
            Duration::ZERO,
        );
        let report = render_report(&outcomes);

        assert!(report.contains("**Total entries:** 3"));
        assert!(report.contains("**Valid:** 1"));
        assert!(report.contains("**Suspicious:** 1"));
        assert!(report.contains("**Errors:** 1"));
        assert!(report.contains("| 1 | dog | die Leine | Hund |"));
    }
}
