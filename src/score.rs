use std::collections::HashSet;

use crate::lexicon::Lexicon;
use crate::model::{Entry, ValidationOutcome, ValidationVerdict};

pub const SEQUENCE_WEIGHT: f64 = 0.6;
pub const OVERLAP_WEIGHT: f64 = 0.4;
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Normalized edit-distance ratio in [0, 1] between two translations, after
/// case folding and stripping leading articles from both sides.
pub fn sequence_similarity(lexicon: &Lexicon, left: &str, right: &str) -> f64 {
    if left.trim().is_empty() || right.trim().is_empty() {
        return 0.0;
    }

    let left_folded = left.to_lowercase();
    let right_folded = right.to_lowercase();
    let left = strip_leading_articles(lexicon, left_folded.trim());
    let right = strip_leading_articles(lexicon, right_folded.trim());

    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    let longest = left_chars.len().max(right_chars.len());
    if longest == 0 {
        return 1.0;
    }

    let distance = levenshtein(&left_chars, &right_chars);
    1.0 - distance as f64 / longest as f64
}

fn strip_leading_articles<'t>(lexicon: &Lexicon, text: &'t str) -> &'t str {
    let mut remainder = text;
    for article in &lexicon.leading_articles {
        if let Some(stripped) = remainder.strip_prefix(article.as_str()) {
            remainder = stripped;
        }
    }
    remainder
}

fn levenshtein(left: &[char], right: &[char]) -> usize {
    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0usize; right.len() + 1];

    for (row, left_char) in left.iter().enumerate() {
        current[0] = row + 1;
        for (col, right_char) in right.iter().enumerate() {
            let substitution = previous[col] + usize::from(left_char != right_char);
            current[col + 1] = substitution
                .min(previous[col + 1] + 1)
                .min(current[col] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

/// Jaccard index over case-folded whitespace tokens with stop words removed
/// from both sides; zero when either side has no tokens left.
pub fn token_overlap(lexicon: &Lexicon, left: &str, right: &str) -> f64 {
    let left_tokens = content_tokens(lexicon, left);
    let right_tokens = content_tokens(lexicon, right);
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }

    let intersection = left_tokens.intersection(&right_tokens).count();
    let union = left_tokens.union(&right_tokens).count();
    intersection as f64 / union as f64
}

fn content_tokens(lexicon: &Lexicon, text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| !lexicon.is_stop_word(token))
        .map(|token| token.to_string())
        .collect()
}

pub fn combined_score(lexicon: &Lexicon, left: &str, right: &str) -> (f64, f64, f64) {
    let sequence = sequence_similarity(lexicon, left, right);
    let overlap = token_overlap(lexicon, left, right);
    let combined = SEQUENCE_WEIGHT * sequence + OVERLAP_WEIGHT * overlap;
    (sequence, overlap, combined)
}

/// Scores one entry against the translator's independent result.
pub fn evaluate(
    lexicon: &Lexicon,
    entry: &Entry,
    translator_result: &str,
    threshold: f64,
) -> ValidationOutcome {
    let (sequence, overlap, combined) =
        combined_score(lexicon, &entry.translation, translator_result);

    let (verdict, reason) = if combined >= threshold {
        (ValidationVerdict::Valid, None)
    } else {
        (
            ValidationVerdict::Suspicious,
            Some(format!("low similarity ({combined:.2})")),
        )
    };

    ValidationOutcome {
        headword: entry.headword.clone(),
        ocr_translation: entry.translation.clone(),
        translator_result: Some(translator_result.to_string()),
        sequence_similarity: sequence,
        token_overlap: overlap,
        combined_score: combined,
        verdict,
        reason,
    }
}
