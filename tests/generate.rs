//! Integration tests for question generation over whole transcripts.

use rand::rngs::StdRng;
use rand::SeedableRng;
use transcript_mcq::annotator::{PartOfSpeech, Sentence, Token};
use transcript_mcq::mcq::{BLANK, CHOICE_COUNT};
use transcript_mcq::{generate, generate_with_policy, Annotator, DistractorPolicy, RuleBasedAnnotator};

const LECTURE: &str = "The river carries water from the mountains to the sea. \
    Farmers use the water of the river to grow wheat and rice in the valley. \
    In spring the snow on the mountains melts and the river floods the fields. \
    The flood leaves mud on the fields, and the mud feeds the crops. \
    Cities were built near the river because the river gave people water and food. \
    Trade moved along the river on boats that carried grain, cloth and pottery. \
    It was cold. \
    Thank you for watching";

fn sentences(text: &str) -> Vec<String> {
    RuleBasedAnnotator::new()
        .segment_sentences(text)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[test]
fn test_two_sentence_scenario() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(1);
    let text = "The cat sat on the mat. The dog chased the cat.";

    let items = generate(&annotator, text, 2, &mut rng);
    assert_eq!(items.len(), 2);

    let first = items
        .iter()
        .find(|item| item.stem() == format!("The {} sat on the mat.", BLANK))
        .expect("question from the first sentence");
    assert_eq!(first.answer(), "cat");
    assert!(first.choices().iter().all(|c| c == "cat" || c == "mat"));

    let second = items
        .iter()
        .find(|item| item.stem() == format!("The {} chased the cat.", BLANK))
        .expect("question from the second sentence");
    assert_eq!(second.answer(), "dog");
    assert!(second.choices().iter().all(|c| c == "dog" || c == "cat"));
}

#[test]
fn test_zero_count_yields_nothing() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(2);

    assert!(generate(&annotator, LECTURE, 0, &mut rng).is_empty());
}

#[test]
fn test_empty_text_yields_nothing() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(3);

    for count in [0, 1, 5, 100] {
        assert!(generate(&annotator, "", count, &mut rng).is_empty());
        assert!(generate(&annotator, "  \n ", count, &mut rng).is_empty());
    }
}

#[test]
fn test_single_noun_sentence_is_skipped() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(4);

    assert!(generate(&annotator, "The cat sat.", 5, &mut rng).is_empty());
    assert!(generate(&annotator, "It was cold.", 5, &mut rng).is_empty());
}

#[test]
fn test_count_larger_than_sentences_uses_all() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(5);
    let text = "The cat sat on the mat. The dog chased the cat. It was cold.";

    let items = generate(&annotator, text, 50, &mut rng);
    assert_eq!(items.len(), 2);
}

#[test]
fn test_items_hold_invariants() {
    let annotator = RuleBasedAnnotator::new();
    let originals = sentences(LECTURE);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let items = generate(&annotator, LECTURE, 8, &mut rng);
        assert!(!items.is_empty());

        for item in &items {
            assert_eq!(item.choices().len(), CHOICE_COUNT);
            assert!(('A'..='D').contains(&item.correct_label()));
            assert_eq!(item.choices()[item.correct_index()], item.answer());

            // The answer appears exactly once among the choices
            let answer_slots = item.choices().iter().filter(|c| *c == item.answer()).count();
            assert_eq!(answer_slots, 1);

            // The blank stands for a whole word
            let stem = item.stem();
            let at = stem.find(BLANK).expect("stem holds the blank");
            let before = stem[..at].chars().next_back();
            let after = stem[at + BLANK.len()..].chars().next();
            assert!(!before.map_or(false, char::is_alphanumeric), "{}", stem);
            assert!(!after.map_or(false, char::is_alphanumeric), "{}", stem);

            // Putting the answer back rebuilds the source sentence
            let rebuilt = stem.replacen(BLANK, item.answer(), 1);
            assert!(originals.contains(&rebuilt), "{}", rebuilt);
        }
    }
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let annotator = RuleBasedAnnotator::new();

    let first = generate(&annotator, LECTURE, 5, &mut StdRng::seed_from_u64(99));
    let second = generate(&annotator, LECTURE, 5, &mut StdRng::seed_from_u64(99));

    assert_eq!(first, second);
}

#[test]
fn test_answer_is_most_frequent_noun() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(6);
    let text = "The flood leaves mud on the fields, and the mud feeds the crops.";

    let items = generate(&annotator, text, 1, &mut rng);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].answer(), "mud");
    assert_eq!(
        items[0].stem(),
        format!("The flood leaves {} on the fields, and the mud feeds the crops.", BLANK)
    );
}

#[test]
fn test_blank_replaces_whole_word_not_substring() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(7);
    let text = "Education about the cat helps the cat and the dog.";

    let items = generate(&annotator, text, 1, &mut rng);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].answer(), "cat");
    assert_eq!(
        items[0].stem(),
        format!("Education about the {} helps the cat and the dog.", BLANK)
    );
}

#[test]
fn test_title_abbreviation_stays_in_its_sentence() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(9);
    let text = "Mr. Smith bought the car and the house.";

    let items = generate(&annotator, text, 5, &mut rng);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].answer(), "car");
    assert_eq!(
        items[0].stem(),
        format!("Mr. Smith bought the {} and the house.", BLANK)
    );
}

#[test]
fn test_unpunctuated_captions_give_one_question_per_line() {
    let annotator = RuleBasedAnnotator::new();
    let text = "the farmers use the water of the river\n\
                the snow on the mountains melts in spring\n\
                the flood leaves mud on the fields";

    let items = generate(&annotator, text, 10, &mut StdRng::seed_from_u64(10));
    assert_eq!(items.len(), 3);
    for item in &items {
        assert!(!item.stem().contains('\n'), "{}", item.stem());
    }
}

#[test]
fn test_stem_collapses_line_breaks() {
    let annotator = RuleBasedAnnotator::new();
    let mut rng = StdRng::seed_from_u64(11);
    let text = "The dog\nchased the cat.";

    let items = generate(&annotator, text, 1, &mut rng);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].stem(), format!("The {} chased the cat.", BLANK));
}

#[test]
fn test_require_distinct_distractors() {
    let annotator = RuleBasedAnnotator::new();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let items = generate_with_policy(
            &annotator,
            LECTURE,
            8,
            DistractorPolicy::RequireDistinct,
            &mut rng,
        );

        for item in &items {
            let mut choices = item.choices().to_vec();
            choices.sort();
            choices.dedup();
            assert_eq!(choices.len(), CHOICE_COUNT);
        }
    }
}

/// Splits on `|` and treats capitalized words as nouns.
struct PipeAnnotator;

impl Annotator for PipeAnnotator {
    fn segment_sentences(&self, text: &str) -> Vec<Sentence> {
        let mut offset = 0;
        let mut sentences = Vec::new();
        for part in text.split('|') {
            if !part.is_empty() {
                sentences.push(Sentence {
                    text: part.to_string(),
                    start: offset,
                    end: offset + part.len(),
                });
            }
            offset += part.len() + 1;
        }
        sentences
    }

    fn tag_tokens(&self, sentence: &str) -> Vec<Token> {
        sentence
            .split_whitespace()
            .map(|word| Token {
                text: word.to_string(),
                pos: if word.starts_with(char::is_uppercase) {
                    PartOfSpeech::Noun
                } else {
                    PartOfSpeech::Other
                },
            })
            .collect()
    }
}

#[test]
fn test_custom_annotator() {
    let mut rng = StdRng::seed_from_u64(8);
    let text = "see Bee and Tree and Bee|only Sky here|Rain Rain";

    let items = generate(&PipeAnnotator, text, 3, &mut rng);

    // "only Sky here" has one noun; "Rain Rain" has no distractor candidate
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].answer(), "Bee");
    assert_eq!(items[0].stem(), format!("see {} and Tree and Bee", BLANK));
    assert_eq!(items[0].choices().iter().filter(|c| *c == "Tree").count(), 3);
}
