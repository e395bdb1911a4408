use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Word lists and patterns that drive line classification and entry
/// filtering. The builtin profile targets English-headword textbooks with
/// German translations; loading a JSON file swaps in another textbook's
/// vocabulary signals without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub version: u32,
    /// Section headers, pagination lines and chapter furniture dropped before
    /// any pattern runs. Anchored regexes, matched case-insensitively.
    pub section_header_patterns: Vec<String>,
    /// Start-anchored regexes that disqualify a line outright: etymology
    /// markers, derivation arrows, synonym/antonym notes, page numbers,
    /// annotation-only lines, sentence fragments from the example column.
    pub skip_line_patterns: Vec<String>,
    /// Substrings that disqualify a line wherever they appear.
    pub skip_substrings: Vec<String>,
    /// Characters that only occur in the target language's script.
    pub target_marker_chars: Vec<char>,
    /// Grammatical markers a target-language line may open with: articles,
    /// object-pronoun abbreviations, reflexive markers.
    pub target_starters: Vec<String>,
    /// Case-sensitive openers of source-language example sentences.
    pub source_sentence_starters: Vec<String>,
    /// Morphological fragments common in target-language word forms.
    pub target_suffix_patterns: Vec<String>,
    /// Closed list of frequent target-language words accepted as bare
    /// single-token translations.
    pub target_common_words: Vec<String>,
    /// Closed list of target-language function words; a headword made up of
    /// nothing else is a column-swap artifact.
    pub target_function_words: Vec<String>,
    /// Trailing words that signal an unfinished translation fragment.
    pub incomplete_tail_words: Vec<String>,
    /// Leading articles stripped from both sides before similarity scoring.
    pub leading_articles: Vec<String>,
    /// Tokens ignored by the token-overlap score.
    pub stop_words: Vec<String>,
    /// Loanwords legitimately spelled the same in both languages.
    pub loanwords: Vec<String>,
    /// Compound-noun fragments that betray a target-language word captured as
    /// a headword.
    pub compound_fragments: Vec<String>,
    /// Literal fragments of known-bad pairs, matched by containment on both
    /// sides.
    pub known_bad_pairs: Vec<KnownBadPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownBadPair {
    pub headword_fragment: String,
    pub translation_fragment: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin_english_german()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Lexicon {
    pub fn builtin_english_german() -> Self {
        Self {
            version: 1,
            section_header_patterns: strings(&[
                r"^\d+$",
                r"^one hundred",
                r"^two hundred",
                r"^three hundred",
                r"^Unit \d+",
                r"^Check-in$",
                r"^Vocabulary$",
                r"^Media collocations$",
                r"^Media$",
                r"^Verb$",
                r"^Collocations$",
                r"^Translation$",
                r"^print media$",
                r"^TV$",
                r"^radio$",
                r"^online media$",
                r"^social media$",
                r"^Describing developments$",
                r"^Adjective collocations$",
                r"^Nouns and adjectives$",
                r"^Nouns and verbs with the same form$",
                r"^Skills:",
                r"^Unit task:",
                r"^Story:",
                r"^Across cultures",
                r"^Focus \d+",
                r"^Station \d+",
            ]),
            skip_line_patterns: strings(&[
                r"^Fr\.",
                r"^Lat\.",
                r"^!",
                r"^->",
                r"^\w+ ->",
                r"^[a-z]+ = [a-z]+",
                r"^[a-z]+ «",
                r"^\d{3}$",
                r"^\[",
                r"^one hundred",
                r"^two hundred",
                r"^to me ",
                r"^to you ",
                r"^to him ",
                r"^to her ",
            ]),
            skip_substrings: strings(&["->", "«", "»", " = ", "] (pl)", "(pl.)", "(sing.)"]),
            target_marker_chars: vec!['ä', 'ö', 'ü', 'ß', 'Ä', 'Ö', 'Ü'],
            target_starters: strings(&[
                "der ", "die ", "das ", "ein ", "eine ", "etw.", "jdn.", "jdm.", "jmd.", "sich ",
                "(sich)", "(tun)", "(zu)", "(mit)", "(über)", "(auf)", "(an)", "anderen",
                "anderer", "Meinung", "nicht", "sein; ", "haben; ",
            ]),
            source_sentence_starters: strings(&[
                "I ", "I'm ", "I've ", "I'd ", "I'll ", "You ", "You're ", "You've ", "You'd ",
                "You'll ", "He ", "He's ", "He'd ", "He'll ", "She ", "She's ", "She'd ",
                "She'll ", "We ", "We're ", "We've ", "We'd ", "We'll ", "They ", "They're ",
                "They've ", "They'd ", "They'll ", "It ", "It's ", "It'd ", "It'll ", "Its ",
                "My ", "Your ", "His ", "Her ", "Our ", "Their ", "The ", "A ", "An ", "Some ",
                "Any ", "This ", "That ", "These ", "Those ", "If ", "When ", "Where ", "What ",
                "Why ", "How ", "Who ", "Are ", "Is ", "Was ", "Were ", "Do ", "Does ", "Did ",
                "Have ", "Has ", "Had ", "Can ", "Could ", "Will ", "Would ", "Should ",
                "Never ", "Always ", "Just ", "With ", "As ", "To ", "For ", "From ", "Arms ",
                "Sports ", "There ",
            ]),
            target_suffix_patterns: strings(&[
                "ss", "ck", "sch", "tzt", "ngen", "ung", "heit", "keit", "rden", "eich",
            ]),
            target_common_words: strings(&[
                "werden", "haben", "machen", "gehen", "kommen", "nehmen", "sehen", "geben",
                "wissen", "können", "müssen", "wollen", "sollen", "dürfen", "lassen", "bleiben",
                "finden", "denken", "vergleichbar", "digital", "blond",
            ]),
            target_function_words: strings(&[
                "sein", "haben", "nicht", "und", "oder", "mit", "sich",
            ]),
            incomplete_tail_words: strings(&[
                "nicht", "und", "oder", "bei", "von", "für", "das", "der", "die",
            ]),
            leading_articles: strings(&[
                "der ", "die ", "das ", "ein ", "eine ", "etw. ", "jdn. ", "jdm. ",
            ]),
            stop_words: strings(&[
                "der", "die", "das", "ein", "eine", "und", "oder", "zu", "sich", "etw.", "jdn.",
                "jdm.",
            ]),
            loanwords: strings(&[
                "digital", "cover", "image", "college", "trainer", "content", "communication",
                "blond", "argument", "international", "normal", "social", "personal", "original",
                "formal", "central", "natural", "total", "final", "global", "local", "legal",
                "vital", "mental", "dental", "fatal", "brutal", "neutral", "tribal",
            ]),
            compound_fragments: strings(&[
                "familie", "schule", "haus", "zeit", "wort", "tag", "buch",
            ]),
            known_bad_pairs: vec![
                KnownBadPair {
                    headword_fragment: "so".to_string(),
                    translation_fragment: "gewöhnt".to_string(),
                },
                KnownBadPair {
                    headword_fragment: "/".to_string(),
                    translation_fragment: "books".to_string(),
                },
                KnownBadPair {
                    headword_fragment: "/".to_string(),
                    translation_fragment: "comics".to_string(),
                },
            ],
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw =
            fs::read(path).with_context(|| format!("failed to read lexicon: {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse lexicon: {}", path.display()))
    }

    /// Builtin profile unless an override file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin_english_german()),
        }
    }

    pub fn contains_target_marker(&self, text: &str) -> bool {
        text.chars()
            .any(|character| self.target_marker_chars.contains(&character))
    }

    pub fn starts_with_target_starter(&self, text: &str) -> bool {
        self.target_starters
            .iter()
            .any(|starter| text.starts_with(starter.as_str()))
    }

    pub fn starts_with_sentence_starter(&self, text: &str) -> bool {
        self.source_sentence_starters
            .iter()
            .any(|starter| text.starts_with(starter.as_str()))
    }

    pub fn is_target_common_word(&self, word: &str) -> bool {
        self.target_common_words
            .iter()
            .any(|candidate| candidate == word)
    }

    pub fn is_target_function_word(&self, word: &str) -> bool {
        self.target_function_words
            .iter()
            .any(|candidate| candidate == word)
    }

    pub fn has_target_suffix(&self, word: &str) -> bool {
        self.target_suffix_patterns
            .iter()
            .any(|pattern| word.contains(pattern.as_str()))
    }

    pub fn is_incomplete_tail(&self, word: &str) -> bool {
        self.incomplete_tail_words
            .iter()
            .any(|candidate| candidate == word)
    }

    pub fn is_loanword(&self, word: &str) -> bool {
        let folded = word.to_lowercase();
        self.loanwords.iter().any(|candidate| *candidate == folded)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.iter().any(|candidate| candidate == word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_detects_target_signals() {
        let lexicon = Lexicon::builtin_english_german();

        assert!(lexicon.contains_target_marker("Persönlichkeit"));
        assert!(!lexicon.contains_target_marker("personality"));
        assert!(lexicon.starts_with_target_starter("die Zeitung"));
        assert!(lexicon.starts_with_sentence_starter("They were late"));
        assert!(lexicon.has_target_suffix("missverstanden"));
        assert!(lexicon.is_loanword("Digital"));
        assert!(lexicon.is_incomplete_tail("und"));
    }

    #[test]
    fn lexicon_round_trips_through_json() {
        let lexicon = Lexicon::builtin_english_german();
        let encoded = serde_json::to_string(&lexicon).expect("serialize lexicon");
        let decoded: Lexicon = serde_json::from_str(&encoded).expect("parse lexicon");

        assert_eq!(decoded.version, lexicon.version);
        assert_eq!(decoded.loanwords, lexicon.loanwords);
        assert_eq!(decoded.known_bad_pairs.len(), lexicon.known_bad_pairs.len());
    }

    #[test]
    fn partial_lexicon_json_falls_back_to_defaults() {
        let decoded: Lexicon =
            serde_json::from_str(r#"{"version": 2, "loanwords": ["hobby"]}"#).expect("parse");

        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.loanwords, vec!["hobby".to_string()]);
        assert!(!decoded.target_starters.is_empty());
    }
}
