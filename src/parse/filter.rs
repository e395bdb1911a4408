use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;

use crate::lexicon::Lexicon;
use crate::model::{Entry, FilterCounts};

const MIN_ENTRY_CHARS: usize = 2;
const COMPOUND_HEADWORD_MIN_CHARS: usize = 8;
const SENTENCE_MIN_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectRule {
    TooShort,
    TargetHeadword,
    ColumnSwap,
    IdentityPair,
    SentenceHeadword,
    ExampleLeak,
    Paraphrase,
    SentenceTail,
    KnownBad,
}

/// Post-pass over the raw entry list: rejects malformed pairs and keeps the
/// first occurrence per case-folded headword. Single pass, order preserving.
pub struct EntryFilter<'a> {
    lexicon: &'a Lexicon,
    example_clause: Regex,
    sentence_tail: Regex,
}

impl<'a> EntryFilter<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Result<Self> {
        Ok(Self {
            lexicon,
            example_clause: Regex::new(r"\b(Nobody|Jack|I|We|They|He|She)\s+(was|were|am|is|are)\b")
                .context("failed to compile example clause regex")?,
            sentence_tail: Regex::new(r"[A-Z][a-z]+\s+[a-z]+\s+[a-z]+\.?$")
                .context("failed to compile sentence tail regex")?,
        })
    }

    pub fn clean(&self, entries: Vec<Entry>) -> (Vec<Entry>, FilterCounts) {
        let mut counts = FilterCounts::default();
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for entry in entries {
            if let Some(rule) = self.rejection(&entry) {
                bump(&mut counts, rule);
                continue;
            }

            let key = entry.headword.trim().to_lowercase();
            if !seen.insert(key) {
                counts.duplicate += 1;
                continue;
            }

            counts.kept += 1;
            kept.push(entry);
        }

        (kept, counts)
    }

    fn rejection(&self, entry: &Entry) -> Option<RejectRule> {
        let headword = entry.headword.trim();
        let translation = entry.translation.trim();
        let headword_chars = headword.chars().count();
        let translation_chars = translation.chars().count();

        if headword_chars < MIN_ENTRY_CHARS || translation_chars < MIN_ENTRY_CHARS {
            return Some(RejectRule::TooShort);
        }

        if self.looks_like_target_text(headword) {
            return Some(RejectRule::TargetHeadword);
        }

        if self.is_swapped_compound(headword, headword_chars) {
            return Some(RejectRule::ColumnSwap);
        }

        if headword.to_lowercase() == translation.to_lowercase()
            && !self.lexicon.is_loanword(headword)
        {
            return Some(RejectRule::IdentityPair);
        }

        if headword.chars().next().is_some_and(char::is_uppercase)
            && headword.contains('.')
            && headword_chars > SENTENCE_MIN_CHARS
        {
            return Some(RejectRule::SentenceHeadword);
        }

        if self.example_clause.is_match(translation) {
            return Some(RejectRule::ExampleLeak);
        }

        if translation.starts_with("to ")
            && translation.contains(" - ")
            && translation.matches('-').count() == 1
        {
            return Some(RejectRule::Paraphrase);
        }

        if translation_chars > SENTENCE_MIN_CHARS && self.sentence_tail.is_match(translation) {
            return Some(RejectRule::SentenceTail);
        }

        let headword_folded = headword.to_lowercase();
        let translation_folded = translation.to_lowercase();
        for pair in &self.lexicon.known_bad_pairs {
            if headword_folded.contains(&pair.headword_fragment.to_lowercase())
                && translation_folded.contains(&pair.translation_fragment.to_lowercase())
            {
                return Some(RejectRule::KnownBad);
            }
        }

        None
    }

    /// Target diacritics, or nothing but target function words: the headword
    /// column picked up translation text.
    fn looks_like_target_text(&self, text: &str) -> bool {
        if self.lexicon.contains_target_marker(text) {
            return true;
        }
        let folded = text.to_lowercase();
        let mut tokens = folded.split_whitespace();
        let Some(first) = tokens.next() else {
            return false;
        };
        self.lexicon.is_target_function_word(first)
            && tokens.all(|token| self.lexicon.is_target_function_word(token))
    }

    /// Long, capitalized, single alphabetic token carrying a known
    /// target-language compound fragment: OCR swapped the columns.
    fn is_swapped_compound(&self, headword: &str, chars: usize) -> bool {
        if chars <= COMPOUND_HEADWORD_MIN_CHARS || headword.contains(' ') {
            return false;
        }
        if !headword.chars().next().is_some_and(char::is_uppercase) {
            return false;
        }
        if !headword.chars().all(char::is_alphabetic) {
            return false;
        }
        let folded = headword.to_lowercase();
        self.lexicon
            .compound_fragments
            .iter()
            .any(|fragment| folded.contains(fragment.as_str()))
    }
}

fn bump(counts: &mut FilterCounts, rule: RejectRule) {
    match rule {
        RejectRule::TooShort => counts.too_short += 1,
        RejectRule::TargetHeadword => counts.target_headword += 1,
        RejectRule::ColumnSwap => counts.column_swap += 1,
        RejectRule::IdentityPair => counts.identity_pair += 1,
        RejectRule::SentenceHeadword => counts.sentence_headword += 1,
        RejectRule::ExampleLeak => counts.example_leak += 1,
        RejectRule::Paraphrase => counts.paraphrase += 1,
        RejectRule::SentenceTail => counts.sentence_tail += 1,
        RejectRule::KnownBad => counts.known_bad += 1,
    }
}
