use crate::lexicon::Lexicon;
use crate::model::{Entry, FilterCounts, LineKind};

use super::classify::LineClassifier;
use super::filter::EntryFilter;
use super::segment::SegmentationEngine;

fn lines(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn segment(values: &[&str]) -> Vec<Entry> {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");
    let engine = SegmentationEngine::new(&classifier);
    engine.segment(&lines(values))
}

fn clean(entries: Vec<Entry>) -> (Vec<Entry>, FilterCounts) {
    let lexicon = Lexicon::builtin_english_german();
    let filter = EntryFilter::new(&lexicon).expect("build filter");
    filter.clean(entries)
}

fn entry(headword: &str, translation: &str) -> Entry {
    Entry::new(headword, translation)
}

#[test]
fn annotated_headword_extracts_word_and_annotation() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    let (word, annotation) = classifier
        .headword_with_annotation("personality [,p3:sn'æloti]")
        .expect("headword matched");
    assert_eq!(word, "personality");
    assert_eq!(annotation, ",p3:sn'æloti");

    let (word, _) = classifier
        .headword_with_annotation("self [self], selves [selvz] (pl)")
        .expect("pair form matched");
    assert_eq!(word, "self");
}

#[test]
fn annotated_headword_requires_closing_bracket_on_the_line() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert!(classifier.headword_with_annotation("word [broken").is_none());
    assert!(classifier.headword_with_annotation("plain text line").is_none());
}

#[test]
fn annotation_only_lines_are_recognized() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert!(classifier.is_annotation_only("['komprema?z]"));
    assert!(classifier.starts_with_annotation("['gɪv ʌp] debris"));
    assert!(!classifier.is_annotation_only("word ['komprema?z]"));
}

#[test]
fn translation_lines_match_on_script_starters_and_morphology() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    // diacritics
    assert!(classifier.is_translation_line("Persönlichkeit"));
    // grammatical markers
    assert!(classifier.is_translation_line("die Zeitung"));
    assert!(classifier.is_translation_line("etw. vergleichen"));
    // short capitalized, no sentence starter
    assert!(classifier.is_translation_line("Hund"));
    // single lowercase token with target morphology
    assert!(classifier.is_translation_line("missverstanden"));
    assert!(classifier.is_translation_line("werden"));

    // source-language infinitives and sentences are not translations
    assert!(!classifier.is_translation_line("to imagine"));
    assert!(!classifier.is_translation_line("The newspapers arrived late today"));
}

#[test]
fn skip_lines_disqualify_translation_candidates() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert!(classifier.should_skip("Fr. imagination"));
    assert!(classifier.should_skip("Lat. fenestra"));
    assert!(classifier.should_skip("imagination -> to imagine"));
    assert!(classifier.should_skip("smart = clever"));
    assert!(classifier.should_skip("127"));
    assert!(classifier.should_skip("[selvz]"));
    assert!(!classifier.should_skip("die Zeitung"));

    assert!(!classifier.is_translation_line("smart = clever"));
    assert!(!classifier.is_translation_line("127"));
}

#[test]
fn example_sentences_need_length_and_a_starter() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert!(classifier.is_example_sentence("I have never seen such a mess before."));
    assert!(!classifier.is_example_sentence("I am tired."));
    assert!(!classifier.is_example_sentence("ganz im Gegenteil, das stimmt doch gar nicht"));
}

#[test]
fn continuations_are_short_lowercase_fragments() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert!(classifier.is_continuation_line("weiter so"));
    assert!(classifier.is_continuation_line("ärgern"));
    assert!(!classifier.is_continuation_line("to relax"));
    assert!(!classifier.is_continuation_line("imagination -> to imagine"));
}

#[test]
fn classify_applies_verdicts_in_precedence_order() {
    let lexicon = Lexicon::builtin_english_german();
    let classifier = LineClassifier::new(&lexicon).expect("build classifier");

    assert_eq!(classifier.classify("cat [kæt]"), LineKind::Headword);
    assert_eq!(classifier.classify("[kæt]"), LineKind::Annotation);
    assert_eq!(
        classifier.classify("I have never seen such a mess before."),
        LineKind::ExampleSentence
    );
    assert_eq!(classifier.classify("der Hund"), LineKind::Translation);
    assert_eq!(classifier.classify("weiter so"), LineKind::Continuation);
    assert_eq!(classifier.classify("123"), LineKind::Noise);
    assert_eq!(classifier.classify(""), LineKind::Noise);
}

// --- segmentation scenarios ---

#[test]
fn headword_with_annotation_pairs_with_following_translation() {
    let entries = segment(&["personality [,p3:sn'æloti]", "Persönlichkeit"]);
    assert_eq!(entries, vec![entry("personality", "Persönlichkeit")]);
}

#[test]
fn headword_and_annotation_split_across_lines_still_pair() {
    let entries = segment(&["to compromise", "['komprema?z]", "Kompromisse eingehen"]);
    assert_eq!(entries, vec![entry("to compromise", "Kompromisse eingehen")]);
}

#[test]
fn bare_headword_pairs_with_target_shaped_neighbor() {
    let entries = segment(&["misunderstood", "missverstanden"]);
    assert_eq!(entries, vec![entry("misunderstood", "missverstanden")]);
}

#[test]
fn derivation_lines_produce_no_entries() {
    let entries = segment(&["Fr. imagination -> to imagine"]);
    assert!(entries.is_empty());
}

#[test]
fn multi_headword_line_takes_the_first_word() {
    let entries = segment(&["active ['æktɪv], angry, clear, difficult, extinct", "wütend"]);
    assert_eq!(entries, vec![entry("active", "wütend")]);
}

#[test]
fn inline_translation_on_the_annotation_line_is_extracted() {
    let entries = segment(&["indirect [,ɪndɪ'rekt] indirekt"]);
    assert_eq!(entries, vec![entry("indirect", "indirekt")]);
}

#[test]
fn reflexive_phrase_without_annotation_pairs_with_translation() {
    let entries = segment(&["to push oneself", "sich anstrengen"]);
    assert_eq!(entries, vec![entry("to push oneself", "sich anstrengen")]);
}

#[test]
fn translation_fragments_between_and_after_annotation_join_with_semicolon() {
    let entries = segment(&["to tear", "reißen", "['teə]", "kaputt machen"]);
    assert_eq!(entries, vec![entry("to tear", "reißen; kaputt machen")]);
}

#[test]
fn hyphen_ended_fragments_concatenate_without_separator() {
    let entries = segment(&["homesick ['həʊmsɪk]", "heimweh-", "krank"]);
    assert_eq!(entries, vec![entry("homesick", "heimwehkrank")]);
}

#[test]
fn fragment_ending_in_function_word_keeps_collecting() {
    let entries = segment(&["to give up", "['gɪv ʌp]", "etw. aufgeben und", "vergessen"]);
    assert_eq!(entries, vec![entry("to give up", "etw. aufgeben und; vergessen")]);
}

#[test]
fn collection_stops_at_the_next_annotated_headword() {
    let entries = segment(&[
        "answer ['a:nsə]",
        "I can answer the question now easily.",
        "question ['kwestʃən]",
        "die Frage",
    ]);
    // "answer" finds no translation before the next entry begins.
    assert_eq!(entries, vec![entry("question", "die Frage")]);
}

#[test]
fn section_headers_and_page_numbers_are_ignored() {
    let entries = segment(&["Unit 3", "Vocabulary", "137", "cat [kæt]", "die Katze"]);
    assert_eq!(entries, vec![entry("cat", "die Katze")]);
}

#[test]
fn consecutive_entries_do_not_bleed_into_each_other() {
    let entries = segment(&["cat [kæt]", "die Katze", "dog [dɒg]", "der Hund"]);
    assert_eq!(
        entries,
        vec![entry("cat", "die Katze"), entry("dog", "der Hund")]
    );
}

#[test]
fn segmentation_is_idempotent_over_the_same_stream() {
    let corpus = [
        "Unit 3",
        "Vocabulary",
        "personality [,p3:sn'æloti]",
        "Persönlichkeit",
        "to compromise",
        "['komprema?z]",
        "Kompromisse eingehen",
        "Fr. imagination -> to imagine",
        "misunderstood",
        "missverstanden",
        "137",
        "cat [kæt]",
        "die Katze",
    ];

    let first = segment(&corpus);
    let second = segment(&corpus);
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

// --- filter scenarios ---

#[test]
fn target_looking_headwords_are_dropped() {
    let (kept, counts) = clean(vec![
        entry("über", "over"),
        entry("mit sich", "with oneself"),
        entry("career", "die Karriere"),
    ]);

    assert_eq!(kept, vec![entry("career", "die Karriere")]);
    assert_eq!(counts.target_headword, 2);
}

#[test]
fn swapped_compound_headwords_are_dropped() {
    let (kept, counts) = clean(vec![
        entry("Gastfamilie", "host family"),
        entry("classroom", "das Klassenzimmer"),
    ]);

    assert_eq!(kept, vec![entry("classroom", "das Klassenzimmer")]);
    assert_eq!(counts.column_swap, 1);
}

#[test]
fn identity_pairs_survive_only_on_the_loanword_list() {
    let (kept, counts) = clean(vec![
        entry("digital", "digital"),
        entry("cover", "cover"),
        entry("happy", "happy"),
    ]);

    assert_eq!(kept, vec![entry("digital", "digital"), entry("cover", "cover")]);
    assert_eq!(counts.identity_pair, 1);
}

#[test]
fn sentence_shaped_headwords_are_dropped() {
    let (kept, counts) = clean(vec![entry(
        "Nobody expected the rain. It came again.",
        "der Regen",
    )]);

    assert!(kept.is_empty());
    assert_eq!(counts.sentence_headword, 1);
}

#[test]
fn example_clauses_leaking_into_translations_are_dropped() {
    let (kept, counts) = clean(vec![entry("tired", "Jack was very tired")]);

    assert!(kept.is_empty());
    assert_eq!(counts.example_leak, 1);
}

#[test]
fn paraphrase_notes_are_not_translations() {
    let (kept, counts) = clean(vec![entry("to chill out", "to chill out - to relax")]);

    assert!(kept.is_empty());
    assert_eq!(counts.paraphrase, 1);
}

#[test]
fn long_translations_with_sentence_tails_are_dropped() {
    let (kept, counts) = clean(vec![entry(
        "career",
        "die Karriere aufbauen können Nobody wants stress.",
    )]);

    assert!(kept.is_empty());
    assert_eq!(counts.sentence_tail, 1);
}

#[test]
fn known_bad_literal_pairs_are_dropped() {
    let (kept, counts) = clean(vec![entry("so", "daran gewöhnt sein")]);

    assert!(kept.is_empty());
    assert_eq!(counts.known_bad, 1);
}

#[test]
fn deduplication_keeps_the_first_occurrence_per_folded_headword() {
    let (kept, counts) = clean(vec![
        entry("book", "das Buch"),
        entry("Book", "ein anderes Buch"),
        entry("dog", "der Hund"),
    ]);

    assert_eq!(kept, vec![entry("book", "das Buch"), entry("dog", "der Hund")]);
    assert_eq!(counts.duplicate, 1);
    assert_eq!(counts.kept, 2);
}

#[test]
fn cleaned_entries_always_have_both_sides_of_length_two_or_more() {
    let (kept, counts) = clean(vec![
        entry("a", "zu kurz"),
        entry("word", "x"),
        entry("cat", "die Katze"),
    ]);

    assert_eq!(counts.too_short, 2);
    for entry in &kept {
        assert!(entry.headword.chars().count() >= 2);
        assert!(entry.translation.chars().count() >= 2);
    }
}

#[test]
fn pipeline_output_is_clean_and_ordered() {
    let corpus = [
        "Unit 3",
        "personality [,p3:sn'æloti]",
        "Persönlichkeit",
        "personality [,p3:sn'æloti]",
        "Persönlichkeit",
        "digital ['dɪdʒɪtl]",
        "digital",
        "misunderstood",
        "missverstanden",
    ];

    let (kept, counts) = clean(segment(&corpus));

    assert_eq!(
        kept,
        vec![
            entry("personality", "Persönlichkeit"),
            entry("digital", "digital"),
            entry("misunderstood", "missverstanden"),
        ]
    );
    assert_eq!(counts.duplicate, 1);
}
