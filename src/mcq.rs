//! Multiple-choice question generation from transcript text.
//!
//! Each question is built from one randomly sampled sentence: its most
//! frequent noun is blanked out of the sentence and offered alongside three
//! other nouns from the same sentence.
//!
//! # Algorithm
//!
//! 1. Segment the text into sentences with the [`Annotator`]
//! 2. Sample `min(count, sentences)` sentences without replacement
//! 3. For each sentence, collect noun tokens (duplicates kept); skip the
//!    sentence if there are fewer than two
//! 4. The most frequent noun is the answer (ties go to the noun seen first)
//! 5. Blank the first whole-word occurrence of the answer to form the stem
//! 6. Draw three distractors from the sentence's other nouns, shuffle them in
//!    with the answer and record the answer's letter
//!
//! The random source is supplied by the caller, so a seeded rng gives
//! reproducible questions.

use crate::annotator::{Annotator, PartOfSpeech};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Marker that replaces the answer noun in a question stem.
pub const BLANK: &str = "__________";

/// Number of choices offered per question.
pub const CHOICE_COUNT: usize = 4;

const DISTRACTOR_COUNT: usize = CHOICE_COUNT - 1;

/// Sentences with fewer noun tokens than this produce no question.
const MIN_NOUNS: usize = 2;

/// A generated multiple-choice question.
///
/// Fields are read-only so the label always points into `choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqItem {
    stem: String,
    choices: [String; CHOICE_COUNT],
    correct_label: char,
}

impl McqItem {
    /// Builds an item whose answer is `choices[correct_index]`.
    ///
    /// Returns `None` when `correct_index` is not a valid choice position.
    pub fn new(
        stem: impl Into<String>,
        choices: [String; CHOICE_COUNT],
        correct_index: usize,
    ) -> Option<Self> {
        if correct_index >= CHOICE_COUNT {
            return None;
        }
        Some(Self {
            stem: stem.into(),
            choices,
            correct_label: label_for(correct_index),
        })
    }

    /// The sentence with the answer noun replaced by [`BLANK`].
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Answer and distractors in shuffled order.
    pub fn choices(&self) -> &[String; CHOICE_COUNT] {
        &self.choices
    }

    /// Letter (`A`..=`D`) of the correct choice.
    pub fn correct_label(&self) -> char {
        self.correct_label
    }

    /// Position of the correct choice within `choices`.
    pub fn correct_index(&self) -> usize {
        // `new` only stores labels produced by `label_for`
        (self.correct_label as usize).saturating_sub('A' as usize)
    }

    /// Text of the correct choice.
    pub fn answer(&self) -> &str {
        &self.choices[self.correct_index()]
    }

    /// Choices paired with their letters.
    pub fn labeled_choices(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| (label_for(i), choice.as_str()))
    }
}

/// What to do when a sentence has few nouns besides the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistractorPolicy {
    /// Draw each distractor independently, so one noun may fill several
    /// slots. Sentences with no noun other than the answer are skipped.
    #[default]
    AllowRepeats,
    /// Require three distinct distractors; sentences with fewer candidates
    /// are skipped.
    RequireDistinct,
}

/// Letter for a choice position (0 → `A`).
pub fn label_for(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Generates up to `count` questions from `text` with the default
/// [`DistractorPolicy`].
pub fn generate<A, R>(annotator: &A, text: &str, count: usize, rng: &mut R) -> Vec<McqItem>
where
    A: Annotator + ?Sized,
    R: Rng + ?Sized,
{
    generate_with_policy(annotator, text, count, DistractorPolicy::default(), rng)
}

/// Generates up to `count` questions from `text`.
///
/// Returns items in the order their sentences were sampled. An empty result
/// means no sampled sentence was usable; it is not an error.
pub fn generate_with_policy<A, R>(
    annotator: &A,
    text: &str,
    count: usize,
    policy: DistractorPolicy,
    rng: &mut R,
) -> Vec<McqItem>
where
    A: Annotator + ?Sized,
    R: Rng + ?Sized,
{
    let sentences = annotator.segment_sentences(text);
    let amount = count.min(sentences.len());
    if amount == 0 {
        return Vec::new();
    }

    // index::sample returns the picks in random order
    let selected = index::sample(rng, sentences.len(), amount);

    let items: Vec<McqItem> = selected
        .into_iter()
        .filter_map(|i| {
            // Sentences may span caption lines
            let sentence = sentences[i].text.split_whitespace().collect::<Vec<_>>().join(" ");
            build_item(annotator, &sentence, policy, rng)
        })
        .collect();

    debug!(
        sentences = sentences.len(),
        sampled = amount,
        generated = items.len(),
        "Generated questions"
    );

    items
}

fn build_item<A, R>(
    annotator: &A,
    sentence: &str,
    policy: DistractorPolicy,
    rng: &mut R,
) -> Option<McqItem>
where
    A: Annotator + ?Sized,
    R: Rng + ?Sized,
{
    let nouns: Vec<String> = annotator
        .tag_tokens(sentence)
        .into_iter()
        .filter(|token| token.pos == PartOfSpeech::Noun)
        .map(|token| token.text)
        .collect();

    if nouns.len() < MIN_NOUNS {
        debug!(sentence, nouns = nouns.len(), "Skipping sentence with too few nouns");
        return None;
    }

    let answer = most_frequent(&nouns)?;
    let Some(stem) = blank_first_word(sentence, answer) else {
        debug!(sentence, answer, "Skipping sentence where the answer is not a whole word");
        return None;
    };

    let candidates = distractor_candidates(&nouns, answer);

    let distractors: Vec<&str> = match policy {
        DistractorPolicy::AllowRepeats => {
            if candidates.is_empty() {
                debug!(sentence, answer, "Skipping sentence with no distractor candidates");
                return None;
            }
            (0..DISTRACTOR_COUNT)
                .map(|_| candidates.choose(rng).copied())
                .collect::<Option<Vec<_>>>()?
        }
        DistractorPolicy::RequireDistinct => {
            if candidates.len() < DISTRACTOR_COUNT {
                debug!(
                    sentence,
                    answer,
                    candidates = candidates.len(),
                    "Skipping sentence with too few distinct distractors"
                );
                return None;
            }
            candidates
                .choose_multiple(rng, DISTRACTOR_COUNT)
                .copied()
                .collect()
        }
    };

    let mut choices: Vec<String> = Vec::with_capacity(CHOICE_COUNT);
    choices.push(answer.to_string());
    choices.extend(distractors.into_iter().map(str::to_string));
    choices.shuffle(rng);

    // Distractors never equal the answer, so the position is unique
    let correct_index = choices.iter().position(|choice| choice == answer)?;
    let choices: [String; CHOICE_COUNT] = choices.try_into().ok()?;

    McqItem::new(stem, choices, correct_index)
}

/// Replaces the first whole-word occurrence of `word` with [`BLANK`].
///
/// "cat" in "Education about the cat" matches the second word, not the
/// inside of "Education".
fn blank_first_word(sentence: &str, word: &str) -> Option<String> {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let leading = if word.starts_with(is_word_char) { r"\b" } else { "" };
    let trailing = if word.ends_with(is_word_char) { r"\b" } else { "" };

    let pattern = Regex::new(&format!("{}{}{}", leading, regex::escape(word), trailing)).ok()?;
    let found = pattern.find(sentence)?;

    Some(format!(
        "{}{}{}",
        &sentence[..found.start()],
        BLANK,
        &sentence[found.end()..]
    ))
}

/// Most frequent noun; ties go to the noun encountered first.
fn most_frequent(nouns: &[String]) -> Option<&str> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for noun in nouns {
        let count = counts.entry(noun.as_str()).or_insert(0);
        if *count == 0 {
            order.push(noun.as_str());
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for noun in order {
        let count = counts[noun];
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((noun, count));
        }
    }
    best.map(|(noun, _)| noun)
}

/// Distinct nouns other than the answer, in encounter order.
fn distractor_candidates<'a>(nouns: &'a [String], answer: &str) -> Vec<&'a str> {
    let mut candidates: Vec<&str> = Vec::new();
    for noun in nouns {
        if noun != answer && !candidates.contains(&noun.as_str()) {
            candidates.push(noun.as_str());
        }
    }
    candidates
}
