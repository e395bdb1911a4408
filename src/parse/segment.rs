use crate::model::Entry;
use crate::util::squeeze_whitespace;

use super::classify::LineClassifier;

/// Lines searched past the headword for a detached annotation.
const ANNOTATION_LOOKAHEAD: usize = 3;
/// Collection window after a detached annotation line.
const SPLIT_COLLECT_WINDOW: usize = 12;
/// Collection window after an annotated headword line.
const FALLBACK_COLLECT_WINDOW: usize = 10;
/// Collection window after a reflexive verb phrase.
const REFLEXIVE_WINDOW: usize = 5;
/// Lines checked for a nearby annotation before the bare-pair pattern fires.
const BARE_PAIR_GUARD_WINDOW: usize = 5;

const MIN_HEADWORD_CHARS: usize = 2;
const MAX_HEADWORD_CHARS: usize = 45;
const MIN_MULTI_HEADWORD_CHARS: usize = 3;
const MIN_SINGLE_TOKEN_CHARS: usize = 4;
const MAX_SINGLE_TOKEN_CHARS: usize = 25;
const MIN_BARE_TRANSLATION_CHARS: usize = 3;
const MAX_BARE_TRANSLATION_CHARS: usize = 40;
const BARE_TRANSLATION_MARKER_CAP: usize = 30;

/// Outcome of one pattern attempt at the cursor position: an optional entry
/// plus how many lines the pattern consumed.
struct PatternMatch {
    entry: Option<Entry>,
    advance: usize,
}

impl PatternMatch {
    fn entry(entry: Entry, advance: usize) -> Self {
        Self {
            entry: Some(entry),
            advance,
        }
    }

    fn empty(advance: usize) -> Self {
        Self {
            entry: None,
            advance,
        }
    }
}

/// Forward scanner over the OCR line stream. One cursor, no backtracking
/// across the outer loop; each cursor position tries the pattern cascade in
/// precedence order and the first match wins. Holds no state between runs.
pub struct SegmentationEngine<'a> {
    classifier: &'a LineClassifier<'a>,
}

impl<'a> SegmentationEngine<'a> {
    pub fn new(classifier: &'a LineClassifier<'a>) -> Self {
        Self { classifier }
    }

    pub fn segment(&self, lines: &[String]) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut cursor = 0usize;

        while cursor < lines.len() {
            let line = lines[cursor].trim();

            if line.is_empty() || self.classifier.is_section_header(line) {
                cursor += 1;
                continue;
            }

            match self.match_at(lines, cursor, line) {
                Some(matched) => {
                    if let Some(entry) = matched.entry {
                        entries.push(entry);
                    }
                    cursor += matched.advance.max(1);
                }
                None => cursor += 1,
            }
        }

        entries
    }

    /// The precedence cascade. Order is load-bearing: several patterns
    /// overlap and the first match wins.
    fn match_at(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        self.try_multi_headword(lines, cursor, line)
            .or_else(|| self.try_inline_translation(line))
            .or_else(|| self.try_plural_variant(lines, cursor, line))
            .or_else(|| self.try_split_annotation(lines, cursor, line))
            .or_else(|| self.try_reflexive_phrase(lines, cursor, line))
            .or_else(|| self.try_bare_pair(lines, cursor, line))
            .or_else(|| self.try_annotated_fallback(lines, cursor, line))
    }

    /// Several annotated headwords on one line: keep the first and pair it
    /// with the next line when that line reads as a translation.
    fn try_multi_headword(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let words = self.classifier.multi_headwords(line);
        let first = words.first()?;
        if first.chars().count() < MIN_MULTI_HEADWORD_CHARS {
            return None;
        }

        let next = lines.get(cursor + 1)?.trim();
        if !self.classifier.is_translation_line(next) || self.classifier.should_skip(next) {
            return None;
        }

        Some(PatternMatch::entry(Entry::new(first.clone(), next), 2))
    }

    /// Annotation bracket followed directly by target text on the same line.
    fn try_inline_translation(&self, line: &str) -> Option<PatternMatch> {
        let (word, translation) = self.classifier.inline_translation(line)?;
        Some(PatternMatch::entry(Entry::new(word, translation), 1))
    }

    /// Headword + annotation + plural variant marker, translation collected
    /// from the following lines.
    fn try_plural_variant(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let word = self.classifier.plural_variant_headword(line)?;
        Some(self.collect_entry(lines, cursor, word, FALLBACK_COLLECT_WINDOW))
    }

    /// Headword on one line, annotation on a later line inside the lookahead
    /// window. Translation text is collected both between headword and
    /// annotation and after the annotation.
    fn try_split_annotation(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let annotation_index = self.find_detached_annotation(lines, cursor)?;

        let word = self.classifier.bare_headword(line)?;
        let chars = word.chars().count();
        if chars < MIN_HEADWORD_CHARS || chars >= MAX_HEADWORD_CHARS {
            return None;
        }

        let mut collector = TranslationCollector::new(self.classifier);
        for candidate in &lines[cursor + 1..annotation_index] {
            collector.take_between(candidate.trim());
        }

        let end = (annotation_index + SPLIT_COLLECT_WINDOW).min(lines.len());
        for candidate in &lines[annotation_index + 1..end] {
            if collector.feed(candidate.trim()) == Feed::Done {
                break;
            }
        }

        let entry = collector
            .finish()
            .map(|translation| Entry::new(word, translation));
        Some(PatternMatch {
            entry,
            advance: 2,
        })
    }

    fn find_detached_annotation(&self, lines: &[String], cursor: usize) -> Option<usize> {
        let end = (cursor + 1 + ANNOTATION_LOOKAHEAD).min(lines.len());
        for index in cursor + 1..end {
            let candidate = lines[index].trim();
            if self.classifier.starts_with_annotation(candidate) {
                return Some(index);
            }
            if candidate.is_empty() || self.classifier.should_skip(candidate) {
                continue;
            }
            if self.classifier.starts_annotated_entry(candidate) {
                return None;
            }
        }
        None
    }

    /// Reflexive verb phrase with no annotation, translation on the next
    /// lines.
    fn try_reflexive_phrase(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let word = self.classifier.reflexive_phrase(line)?;

        let mut parts = Vec::new();
        let end = (cursor + REFLEXIVE_WINDOW).min(lines.len());
        for candidate in &lines[cursor + 1..end] {
            let candidate = candidate.trim();
            if candidate.is_empty() || self.classifier.should_skip(candidate) {
                continue;
            }
            if self.classifier.is_translation_line(candidate)
                || self.classifier.is_continuation_line(candidate)
            {
                let cleaned = clean_fragment(candidate);
                if cleaned.chars().count() > 1 {
                    let done = !cleaned.ends_with('-');
                    parts.push(cleaned);
                    if done {
                        break;
                    }
                }
            }
        }

        if parts.is_empty() {
            return None;
        }
        let translation = join_fragments(&parts);
        Some(PatternMatch::entry(Entry::new(word, translation), 1))
    }

    /// Bare single-token headword immediately followed by a clearly
    /// target-shaped line, with no annotation anywhere nearby.
    fn try_bare_pair(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let word = self.classifier.single_token_headword(line)?;
        let chars = word.chars().count();
        if chars < MIN_SINGLE_TOKEN_CHARS || chars >= MAX_SINGLE_TOKEN_CHARS {
            return None;
        }

        let guard_end = (cursor + BARE_PAIR_GUARD_WINDOW).min(lines.len());
        if lines[cursor + 1..guard_end]
            .iter()
            .any(|candidate| candidate.trim().starts_with('['))
        {
            return None;
        }

        let next = lines.get(cursor + 1)?.trim();
        let next_chars = next.chars().count();
        let marker_shaped = self.classifier.lexicon().contains_target_marker(next)
            || (next.chars().next().is_some_and(char::is_lowercase)
                && (next.contains(';') || next.contains('/'))
                && next_chars < BARE_TRANSLATION_MARKER_CAP);
        let target_shaped = marker_shaped || self.classifier.is_translation_line(next);

        if !target_shaped
            || next_chars < MIN_BARE_TRANSLATION_CHARS
            || next_chars >= MAX_BARE_TRANSLATION_CHARS
            || self.classifier.is_example_sentence(next)
            || self.classifier.should_skip(next)
        {
            return None;
        }

        Some(PatternMatch::entry(Entry::new(word, next), 2))
    }

    /// Any annotated headword not caught above, with the shared multi-line
    /// translation collection.
    fn try_annotated_fallback(&self, lines: &[String], cursor: usize, line: &str) -> Option<PatternMatch> {
        let (word, _annotation) = self.classifier.headword_with_annotation(line)?;
        if word.chars().count() < MIN_HEADWORD_CHARS {
            return Some(PatternMatch::empty(1));
        }
        Some(self.collect_entry(lines, cursor, word, FALLBACK_COLLECT_WINDOW))
    }

    fn collect_entry(
        &self,
        lines: &[String],
        cursor: usize,
        word: String,
        window: usize,
    ) -> PatternMatch {
        let mut collector = TranslationCollector::new(self.classifier);
        let end = (cursor + window).min(lines.len());
        for candidate in &lines[cursor + 1..end] {
            if collector.feed(candidate.trim()) == Feed::Done {
                break;
            }
        }

        let entry = collector
            .finish()
            .map(|translation| Entry::new(word, translation));
        PatternMatch { entry, advance: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    Continue,
    Done,
}

/// Collection state while the scanner sits between a matched headword and the
/// end of its translation. Joins fragments with a semicolon separator,
/// concatenates hyphen-continued fragments, and keeps reading past fragments
/// whose trailing word signals an unfinished phrase.
struct TranslationCollector<'a> {
    classifier: &'a LineClassifier<'a>,
    parts: Vec<String>,
}

impl<'a> TranslationCollector<'a> {
    fn new(classifier: &'a LineClassifier<'a>) -> Self {
        Self {
            classifier,
            parts: Vec::new(),
        }
    }

    /// Lines between a headword and its detached annotation: only clear
    /// translation lines are taken, nothing terminates the window.
    fn take_between(&mut self, line: &str) {
        if line.is_empty()
            || self.classifier.should_skip(line)
            || self.classifier.is_example_sentence(line)
        {
            return;
        }
        if self.classifier.is_translation_line(line) {
            let cleaned = clean_fragment(line);
            if cleaned.chars().count() > 1 {
                self.parts.push(cleaned);
            }
        }
    }

    fn feed(&mut self, line: &str) -> Feed {
        if self.classifier.starts_annotated_entry(line) || self.classifier.is_annotation_only(line)
        {
            return Feed::Done;
        }
        if line.is_empty()
            || self.classifier.should_skip(line)
            || self.classifier.is_example_sentence(line)
        {
            return Feed::Continue;
        }

        if self.classifier.is_translation_line(line) {
            let cleaned = clean_fragment(line);
            if cleaned.chars().count() > 1 {
                let done = self.translation_complete(&cleaned);
                self.push_fragment(cleaned);
                if done {
                    return Feed::Done;
                }
            }
            return Feed::Continue;
        }

        if self.classifier.is_continuation_line(line) {
            let cleaned = clean_fragment(line);
            if cleaned.chars().count() > 1 {
                let ends_closed = cleaned.ends_with(')');
                let ends_open = cleaned.ends_with('-');
                self.push_fragment(cleaned);
                if ends_closed || (self.parts.len() >= 2 && !ends_open) {
                    return Feed::Done;
                }
            }
        }

        Feed::Continue
    }

    /// A fragment ending in a hyphen continues the previous one with the
    /// hyphen stripped; anything else starts a new fragment.
    fn push_fragment(&mut self, cleaned: String) {
        if let Some(last) = self.parts.last_mut() {
            if last.ends_with('-') {
                last.pop();
                last.push_str(&cleaned);
                return;
            }
        }
        self.parts.push(cleaned);
    }

    fn translation_complete(&self, cleaned: &str) -> bool {
        if cleaned.ends_with('-') {
            return false;
        }
        let last_word = cleaned
            .split_whitespace()
            .next_back()
            .map(|word| word.trim_end_matches(')').to_lowercase())
            .unwrap_or_default();
        let incomplete = self.classifier.lexicon().is_incomplete_tail(&last_word)
            && !cleaned.ends_with(')');
        !incomplete
    }

    fn finish(self) -> Option<String> {
        if self.parts.is_empty() {
            return None;
        }
        let translation = join_fragments(&self.parts);
        if translation.chars().count() > 1 {
            Some(translation)
        } else {
            None
        }
    }
}

fn clean_fragment(line: &str) -> String {
    line.trim_end_matches(';').trim().to_string()
}

fn join_fragments(parts: &[String]) -> String {
    let joined = squeeze_whitespace(&parts.join("; "));
    let collapsed = joined.replace("; ;", ";").replace(";;", ";");
    collapsed.trim_matches(|character| character == ';' || character == ' ').to_string()
}
