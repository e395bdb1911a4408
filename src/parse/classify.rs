use anyhow::{Context, Result};
use regex::Regex;

use crate::lexicon::Lexicon;
use crate::model::LineKind;

/// Upper char bound for a capitalized line still taken as a translation.
const CAPITALIZED_TRANSLATION_CAP: usize = 40;
/// Upper char bound for lowercase translation/continuation candidates.
const CONTINUATION_CAP: usize = 50;
const SINGLE_TOKEN_CAP: usize = 25;
const EXAMPLE_SENTENCE_MIN: usize = 30;

/// Pure per-line predicates and extractors over trimmed OCR lines. All
/// methods are total: unrecognized input yields a negative verdict, never an
/// error. Regexes are compiled once at construction.
pub struct LineClassifier<'a> {
    lexicon: &'a Lexicon,
    section_headers: Vec<Regex>,
    skip_lines: Vec<Regex>,
    annotated_full: Regex,
    annotated_pair: Regex,
    annotated_prefix: Regex,
    annotation_body: Regex,
    annotation_lead: Regex,
    annotation_only: Regex,
    inline_translation: Regex,
    plural_variant: Regex,
    multi_headword: Regex,
    bare_headword: Regex,
    trailing_qualifier: Regex,
    reflexive_phrase: Regex,
    single_token: Regex,
    infinitive_lead: Regex,
}

impl<'a> LineClassifier<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Result<Self> {
        let section_headers = lexicon
            .section_header_patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("(?i){pattern}"))
                    .with_context(|| format!("invalid section header pattern: {pattern}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        let skip_lines = lexicon
            .skip_line_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("invalid skip pattern: {pattern}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        Ok(Self {
            lexicon,
            section_headers,
            skip_lines,
            annotated_full: Regex::new(
                r#"^[*"\d\s]*([a-zA-Z][a-zA-Z\s'()./+,?!-]+?)\s*\[([^\]]+)\]\]?(?:\s*\((?:pl|sing)\.?\))?$"#,
            )
            .context("failed to compile annotated headword regex")?,
            annotated_pair: Regex::new(
                r#"^[*"\d\s]*([a-zA-Z][a-zA-Z\s',-]+?)\s*\[[^\]]+\]\]?(?:,\s*\w+\s*\[[^\]]+\]\]?)?\s*(?:\((?:pl|sing)\.?\))?$"#,
            )
            .context("failed to compile annotated headword pair regex")?,
            annotated_prefix: Regex::new(
                r#"^[*"\d\s]*[a-zA-Z][a-zA-Z\s'()./+,?!-]+?\s*\[[^\]]+\]"#,
            )
            .context("failed to compile annotated prefix regex")?,
            annotation_body: Regex::new(r"\[([^\]]+)\]")
                .context("failed to compile annotation body regex")?,
            annotation_lead: Regex::new(r"^\[[^\]]*\]")
                .context("failed to compile annotation lead regex")?,
            annotation_only: Regex::new(r"^\[[^\]]+\]$")
                .context("failed to compile annotation only regex")?,
            inline_translation: Regex::new(
                r#"^[*"\d\s]*([a-zA-Z][a-zA-Z\s'-]+?)\s*\[[^\]]+\]\s+([a-zA-ZäöüßÄÖÜ][a-zA-ZäöüßÄÖÜ\s/-]+)$"#,
            )
            .context("failed to compile inline translation regex")?,
            plural_variant: Regex::new(
                r#"^[*"\d\s]*([a-zA-Z][a-zA-Z\s'-]+?)\s*\[[^\]]+\],\s*\w+\s*\(pl\)$"#,
            )
            .context("failed to compile plural variant regex")?,
            multi_headword: Regex::new(r"([a-zA-Z][a-zA-Z-]+)\s*\[[^\]]+\]")
                .context("failed to compile multi headword regex")?,
            bare_headword: Regex::new(
                r#"^[*"\d\s']*([a-zA-Z][a-zA-Z\s'()./+,?!-]+?)(?:\s*\((?:AE|BE|no pl|pl)\))?$"#,
            )
            .context("failed to compile bare headword regex")?,
            trailing_qualifier: Regex::new(r"\((AE|BE|no pl)\)$")
                .context("failed to compile trailing qualifier regex")?,
            reflexive_phrase: Regex::new(
                r"(?i)^to \w+ (?:oneself|yourself|himself|herself|themselves|ourselves)$",
            )
            .context("failed to compile reflexive phrase regex")?,
            single_token: Regex::new(r#"^[*"\d\s']*([a-zA-Z][a-zA-Z-]+)$"#)
                .context("failed to compile single token regex")?,
            infinitive_lead: Regex::new(r"^to [a-z]+")
                .context("failed to compile infinitive lead regex")?,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.lexicon
    }

    /// Chapter furniture dropped before any pattern is attempted.
    pub fn is_section_header(&self, line: &str) -> bool {
        self.section_headers.iter().any(|regex| regex.is_match(line))
    }

    /// Lines that can never contribute to an entry: etymology, derivations,
    /// synonym/antonym notes, pagination, annotation-only fragments.
    pub fn should_skip(&self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        if self
            .lexicon
            .skip_substrings
            .iter()
            .any(|substring| line.contains(substring.as_str()))
        {
            return true;
        }
        self.skip_lines.iter().any(|regex| regex.is_match(line))
    }

    /// Headword with a bracketed phonetic annotation on the same line.
    /// Returns the headword and the annotation body; fails when no closing
    /// bracket exists on the line.
    pub fn headword_with_annotation(&self, line: &str) -> Option<(String, String)> {
        if let Some(captures) = self.annotated_full.captures(line) {
            let word = captures.get(1)?.as_str().trim().to_string();
            let annotation = captures.get(2)?.as_str().trim().to_string();
            return Some((word, annotation));
        }

        let captures = self.annotated_pair.captures(line)?;
        let word = captures.get(1)?.as_str().trim().to_string();
        let annotation = self
            .annotation_body
            .captures(line)
            .and_then(|body| body.get(1))
            .map(|body| body.as_str().trim().to_string())?;
        Some((word, annotation))
    }

    /// True when the line opens another annotated vocabulary entry; used as a
    /// stop condition by the collection loops.
    pub fn starts_annotated_entry(&self, line: &str) -> bool {
        self.annotated_prefix.is_match(line)
    }

    /// The entire line is a bracketed phonetic annotation.
    pub fn is_annotation_only(&self, line: &str) -> bool {
        self.annotation_only.is_match(line)
    }

    /// The line opens with a bracketed annotation; tolerates trailing OCR
    /// debris after the closing bracket.
    pub fn starts_with_annotation(&self, line: &str) -> bool {
        self.annotation_lead.is_match(line)
    }

    /// Several comma-separated headwords, each with its own annotation.
    pub fn multi_headwords(&self, line: &str) -> Vec<String> {
        self.multi_headword
            .captures_iter(line)
            .filter_map(|captures| captures.get(1))
            .map(|word| word.as_str().trim().to_string())
            .collect()
    }

    /// Headword with annotation followed by target text on the same line.
    pub fn inline_translation(&self, line: &str) -> Option<(String, String)> {
        let captures = self.inline_translation.captures(line)?;
        let word = captures.get(1)?.as_str().trim().to_string();
        let translation = captures.get(2)?.as_str().trim().to_string();
        if word.chars().count() < 2 || translation.is_empty() {
            return None;
        }
        Some((word, translation))
    }

    /// Headword with annotation plus a plural variant, e.g.
    /// `knife [naif], knives (pl)`.
    pub fn plural_variant_headword(&self, line: &str) -> Option<String> {
        let captures = self.plural_variant.captures(line)?;
        Some(captures.get(1)?.as_str().trim().to_string())
    }

    /// Headword phrase without any annotation, with an optional regional or
    /// plural qualifier reattached.
    pub fn bare_headword(&self, line: &str) -> Option<String> {
        let captures = self.bare_headword.captures(line)?;
        let mut word = captures.get(1)?.as_str().trim().to_string();
        if let Some(qualifier) = self
            .trailing_qualifier
            .captures(line)
            .and_then(|captures| captures.get(1))
        {
            word = format!("{word} ({})", qualifier.as_str());
        }
        Some(word)
    }

    /// Reflexive or compound verb phrase, e.g. `to push oneself`.
    pub fn reflexive_phrase(&self, line: &str) -> Option<String> {
        if self.reflexive_phrase.is_match(line) {
            Some(line.to_string())
        } else {
            None
        }
    }

    /// A lone alphabetic token, candidate for the bare headword pattern.
    pub fn single_token_headword(&self, line: &str) -> Option<String> {
        let captures = self.single_token.captures(line)?;
        Some(captures.get(1)?.as_str().to_string())
    }

    /// Does this line look like target-language translation text?
    pub fn is_translation_line(&self, line: &str) -> bool {
        let chars = line.chars().count();
        if chars < 2 {
            return false;
        }
        if self.should_skip(line) {
            return false;
        }
        if self.lexicon.contains_target_marker(line) {
            return true;
        }
        if self.lexicon.starts_with_target_starter(line) {
            return true;
        }
        if self.infinitive_lead.is_match(line) {
            return false;
        }

        let first = line.chars().next().unwrap_or(' ');
        if first.is_uppercase()
            && chars < CAPITALIZED_TRANSLATION_CAP
            && !self.lexicon.starts_with_sentence_starter(line)
        {
            return true;
        }
        if first.is_lowercase() && chars < CONTINUATION_CAP && (line.contains(';') || line.contains('/'))
        {
            return true;
        }
        if first.is_lowercase() && chars < SINGLE_TOKEN_CAP && line.split_whitespace().count() == 1 {
            let folded = line.to_lowercase();
            if self.lexicon.has_target_suffix(&folded) || self.lexicon.is_target_common_word(&folded)
            {
                return true;
            }
        }

        false
    }

    /// Long line opening with a source-language sentence starter.
    pub fn is_example_sentence(&self, line: &str) -> bool {
        line.chars().count() > EXAMPLE_SENTENCE_MIN
            && self.lexicon.starts_with_sentence_starter(line)
    }

    /// Short fragment extending a previous translation line.
    pub fn is_continuation_line(&self, line: &str) -> bool {
        let chars = line.chars().count();
        if chars < 2 {
            return false;
        }
        if self.should_skip(line) {
            return false;
        }
        if self.infinitive_lead.is_match(line) {
            return false;
        }

        let first = line.chars().next().unwrap_or(' ');
        (first.is_lowercase() || self.lexicon.contains_target_marker(line))
            && chars < CONTINUATION_CAP
            && !self.is_example_sentence(line)
    }

    /// Precedence-ordered per-line tag, used for trace logging.
    pub fn classify(&self, line: &str) -> LineKind {
        if line.is_empty() {
            return LineKind::Noise;
        }
        if self.starts_annotated_entry(line) {
            return LineKind::Headword;
        }
        if self.starts_with_annotation(line) {
            return LineKind::Annotation;
        }
        if self.is_section_header(line) || self.should_skip(line) {
            return LineKind::Noise;
        }
        if self.is_example_sentence(line) {
            return LineKind::ExampleSentence;
        }
        if self.is_translation_line(line) {
            return LineKind::Translation;
        }
        if self.is_continuation_line(line) {
            return LineKind::Continuation;
        }
        LineKind::Noise
    }
}
