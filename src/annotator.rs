//! Sentence segmentation and part-of-speech tagging.
//!
//! The question generator only needs two things from an NLP pipeline: where the
//! sentences are, and which tokens are nouns. [`Annotator`] is that seam, and
//! [`RuleBasedAnnotator`] is a lexicon-and-context tagger for English that is
//! built once at startup and shared by reference afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// Matches: `. ! ?` followed by whitespace or end of string
static SENTENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("Invalid sentence regex pattern"));

// Abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "e.g", "i.e", "fig", "approx",
    "dept", "mt",
];

// Words (with inner hyphens), contraction suffixes, then single symbols
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:-[\p{L}\p{N}]+)*|['’]\p{L}+|[^\s\p{L}\p{N}]")
        .expect("Invalid token regex pattern")
});

/// Coarse part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Adposition,
    Conjunction,
    Numeral,
    Particle,
    Punctuation,
    Other,
}

/// One sentence of the source text.
///
/// `start` and `end` are byte offsets into the text that was segmented, and
/// `text` is exactly `source[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A token as it appears in the sentence, with its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub pos: PartOfSpeech,
}

/// A run of proper nouns and how often it is mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub mentions: usize,
}

/// Sentence segmentation and token tagging.
pub trait Annotator {
    /// Splits text into sentences. Empty or whitespace-only text yields none.
    fn segment_sentences(&self, text: &str) -> Vec<Sentence>;

    /// Tags every token of a single sentence, preserving the token's text.
    fn tag_tokens(&self, sentence: &str) -> Vec<Token>;

    /// Collects named entities (runs of proper nouns) across the text.
    ///
    /// Ordered by mention count, most frequent first; ties keep the order of
    /// first appearance.
    fn named_entities(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for sentence in self.segment_sentences(text) {
            let mut run: Vec<String> = Vec::new();
            for token in self.tag_tokens(&sentence.text) {
                if token.pos == PartOfSpeech::ProperNoun {
                    run.push(token.text);
                } else {
                    record_entity(&mut entities, &mut seen, &mut run);
                }
            }
            record_entity(&mut entities, &mut seen, &mut run);
        }

        entities.sort_by(|a, b| b.mentions.cmp(&a.mentions));
        entities
    }
}

fn record_entity(
    entities: &mut Vec<Entity>,
    seen: &mut HashMap<String, usize>,
    run: &mut Vec<String>,
) {
    if run.is_empty() {
        return;
    }
    let text = run.join(" ");
    run.clear();

    match seen.get(&text) {
        Some(&i) => entities[i].mentions += 1,
        None => {
            seen.insert(text.clone(), entities.len());
            entities.push(Entity { text, mentions: 1 });
        }
    }
}

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "every", "each", "some", "any", "no",
    "all", "both", "another", "either", "neither", "such", "my", "your", "his", "her", "its",
    "our", "their", "whose", "what", "which", "much", "many", "several", "few", "more", "most",
    "less", "least", "enough",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "mine", "yours",
    "hers", "ours", "theirs", "myself", "yourself", "himself", "herself", "itself", "ourselves",
    "yourselves", "themselves", "who", "whom", "something", "anything", "nothing", "everything",
    "someone", "anyone", "everyone", "nobody", "somebody", "anybody", "everybody", "none",
];

const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from", "up", "down",
    "over", "under", "around", "among", "across", "behind", "beyond", "near", "off", "onto",
    "upon", "within", "without", "toward", "towards", "like", "than", "via", "per", "since",
    "until", "despite", "inside", "outside", "along", "beside", "besides", "except", "throughout", "past",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "if", "although", "though", "while",
    "whereas", "unless", "whether", "as", "when", "where", "once", "whenever", "wherever",
];

const AUXILIARIES: &[&str] = &[
    "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "don", "doesn", "didn", "isn", "aren", "wasn", "weren", "won", "wouldn", "couldn",
    "shouldn", "hasn", "haven", "hadn", "cannot",
];

const ADVERBS: &[&str] = &[
    "not", "very", "really", "just", "also", "too", "quite", "then", "there", "here", "now",
    "always", "never", "often", "sometimes", "already", "still", "even", "only", "again",
    "soon", "ever", "almost", "perhaps", "maybe", "how", "why", "well", "yes", "instead",
    "rather", "else", "away", "back", "together", "anyway", "actually", "today", "tomorrow",
    "yesterday", "later", "ago", "somewhere", "everywhere", "nowhere", "anywhere",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "big", "small", "new", "old", "great", "little", "long", "short", "high",
    "low", "large", "young", "important", "different", "same", "other", "first", "last",
    "next", "own", "right", "left", "whole", "real", "best", "better", "worse", "worst", "sure",
    "free", "full", "easy", "hard", "true", "false", "early", "late", "able", "main",
    "happy", "sad", "hot", "cold", "warm", "cool", "nice", "fine", "red", "blue", "green",
    "black", "white", "yellow", "dark", "strong", "weak", "fast", "slow", "clear",
    "simple", "certain", "possible", "likely", "open", "ready", "huge", "tiny",
];

const NUMERALS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand", "million", "billion",
];

const OTHER: &[&str] = &["oh", "uh", "um", "uhm", "yeah", "okay", "ok", "hey", "wow", "hello", "hi"];

const VERBS: &[&str] = &[
    "go", "goes", "went", "gone", "make", "makes", "made", "take", "takes", "took", "taken",
    "get", "gets", "got", "see", "sees", "saw", "seen", "know", "knows", "knew", "known",
    "think", "thinks", "thought", "come", "comes", "came", "give", "gives", "gave", "given",
    "find", "finds", "found", "tell", "tells", "told", "become", "becomes", "became", "leave",
    "leaves", "feel", "feels", "felt", "bring", "brings", "brought", "begin", "begins", "began",
    "keep", "keeps", "kept", "hold", "holds", "held", "write", "writes", "wrote", "stand",
    "stands", "stood", "hear", "hears", "heard", "let", "lets", "mean", "means", "meant", "set",
    "meet", "meets", "met", "run", "runs", "ran", "pay", "pays", "paid", "sit", "sits", "sat",
    "speak", "speaks", "spoke", "lie", "lies", "lay", "lead", "leads", "led", "read", "reads",
    "grow", "grows", "grew", "lose", "loses", "lost", "fall", "falls", "fell", "send", "sends",
    "sent", "build", "builds", "built", "understand", "understands", "understood", "draw",
    "draws", "drew", "break", "breaks", "broke", "spend", "spends", "spent", "cut", "cuts",
    "rise", "rises", "rose", "drive", "drives", "drove", "buy", "buys", "bought", "wear",
    "wears", "wore", "choose", "chooses", "chose", "say", "says", "said", "want", "wants",
    "use", "uses", "try", "tries", "ask", "asks", "need", "needs", "seem", "seems", "help",
    "helps", "talk", "talks", "turn", "turns", "start", "starts", "show", "shows", "play",
    "plays", "move", "moves", "live", "lives", "believe", "believes", "happen", "happens",
    "include", "includes", "continue", "continues", "learn", "learns", "change", "changes",
    "watch", "watches", "follow", "follows", "stop", "stops", "create", "creates", "walk",
    "walks", "win", "wins", "offer", "offers", "remember", "remembers", "love", "loves",
    "consider", "considers", "appear", "appears", "wait", "waits", "serve", "serves", "die",
    "dies", "expect", "expects", "stay", "stays", "suggest", "suggests", "raise", "raises",
    "pass", "passes", "sell", "sells", "sold", "require", "requires", "report", "reports",
    "decide", "decides", "pull", "pulls", "explain", "explains", "hope", "hopes", "develop",
    "develops", "carry", "carries", "look", "looks", "call", "calls", "work", "works", "put",
    "puts", "eat", "eats", "ate", "eaten", "drink", "drinks", "drank", "catch", "catches",
    "caught", "teach", "teaches", "taught", "fight", "fights", "fought", "fly", "flies",
    "flew", "swim", "swims", "swam", "sing", "sings", "sang", "chase", "chases", "jump",
    "jumps", "open", "opens", "close", "closes", "forget", "forgets", "forgot", "hide", "hides",
    "hid", "ride", "rides", "rode", "shake", "shakes", "shook", "throw", "throws", "threw",
];

// Words ending in -ly that are not adverbs
const LY_NOUNS: &[&str] = &[
    "family", "supply", "reply", "assembly", "anomaly", "ally", "belly", "bully", "jelly",
    "lily", "rally", "italy", "july", "butterfly", "monopoly", "fly",
];

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "hood", "ism", "ist", "dom",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "less", "ical", "ish",
];

const VERB_SUFFIXES: &[&str] = &["ize", "ise", "ify"];

/// Rule-based English tagger.
///
/// Closed-class words come from fixed lexicons; open-class words are decided
/// by capitalization, a small verb lexicon, suffixes and the tag of the
/// preceding token. Anything left undecided is a noun.
pub struct RuleBasedAnnotator {
    lexicon: HashMap<&'static str, PartOfSpeech>,
    verbs: HashSet<&'static str>,
}

impl RuleBasedAnnotator {
    pub fn new() -> Self {
        let groups: [(&[&str], PartOfSpeech); 9] = [
            (DETERMINERS, PartOfSpeech::Determiner),
            (PRONOUNS, PartOfSpeech::Pronoun),
            (ADPOSITIONS, PartOfSpeech::Adposition),
            (CONJUNCTIONS, PartOfSpeech::Conjunction),
            (AUXILIARIES, PartOfSpeech::Auxiliary),
            (ADVERBS, PartOfSpeech::Adverb),
            (ADJECTIVES, PartOfSpeech::Adjective),
            (NUMERALS, PartOfSpeech::Numeral),
            (OTHER, PartOfSpeech::Other),
        ];

        // Earlier groups win for words listed twice
        let mut lexicon = HashMap::new();
        for (words, pos) in groups {
            for word in words {
                lexicon.entry(*word).or_insert(pos);
            }
        }

        Self {
            lexicon,
            verbs: VERBS.iter().copied().collect(),
        }
    }

    fn is_open_class(&self, token: &str) -> bool {
        is_word(token)
            && !is_numeric(token)
            && !self.lexicon.contains_key(token.to_lowercase().as_str())
    }

    fn classify(
        &self,
        token: &str,
        prev: Option<PartOfSpeech>,
        next: Option<&str>,
        sentence_initial: bool,
    ) -> PartOfSpeech {
        if !is_word(token) {
            return classify_symbol(token);
        }
        if is_numeric(token) {
            return PartOfSpeech::Numeral;
        }

        let lower = token.to_lowercase();
        let listed = self.lexicon.get(lower.as_str()).copied();

        // Capitalized mid-sentence, or leading a capitalized run ("New York")
        if is_capitalized(token)
            && (!sentence_initial || next.is_some_and(is_capitalized))
            && matches!(listed, None | Some(PartOfSpeech::Adjective))
        {
            return PartOfSpeech::ProperNoun;
        }
        // Titles such as "Dr" in "Dr. Jones"
        if is_capitalized(token) && next == Some(".") && ABBREVIATIONS.contains(&lower.as_str()) {
            return PartOfSpeech::ProperNoun;
        }
        if let Some(pos) = listed {
            return pos;
        }
        if lower.len() > 3 && lower.ends_with("ly") && !LY_NOUNS.contains(&lower.as_str()) {
            return PartOfSpeech::Adverb;
        }

        let noun_slot = matches!(
            prev,
            Some(PartOfSpeech::Determiner | PartOfSpeech::Adjective | PartOfSpeech::Numeral)
        );
        let next_open = next.is_some_and(|n| self.is_open_class(n));

        if self.verbs.contains(lower.as_str()) {
            return if noun_slot {
                PartOfSpeech::Noun
            } else {
                PartOfSpeech::Verb
            };
        }
        if has_suffix(&lower, NOUN_SUFFIXES) {
            return PartOfSpeech::Noun;
        }
        if has_suffix(&lower, ADJECTIVE_SUFFIXES) {
            return PartOfSpeech::Adjective;
        }
        if has_suffix(&lower, &["ed", "ing"]) || has_suffix(&lower, VERB_SUFFIXES) {
            return match (noun_slot, next_open) {
                (true, true) => PartOfSpeech::Adjective,
                (true, false) => PartOfSpeech::Noun,
                _ => PartOfSpeech::Verb,
            };
        }
        if matches!(prev, Some(PartOfSpeech::Pronoun | PartOfSpeech::Auxiliary)) {
            return PartOfSpeech::Verb;
        }

        // "the sun warms the ocean": a noun, then an -s form, then an object
        let next_listed = next.and_then(|n| self.lexicon.get(n.to_lowercase().as_str()).copied());
        if matches!(prev, Some(PartOfSpeech::Noun | PartOfSpeech::ProperNoun))
            && lower.ends_with('s')
            && !lower.ends_with("ss")
            && matches!(
                next_listed,
                Some(PartOfSpeech::Determiner | PartOfSpeech::Pronoun | PartOfSpeech::Adposition)
            )
        {
            return PartOfSpeech::Verb;
        }

        PartOfSpeech::Noun
    }
}

impl Default for RuleBasedAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for RuleBasedAnnotator {
    fn segment_sentences(&self, text: &str) -> Vec<Sentence> {
        // Unpunctuated captions: each line is a sentence
        if !text.contains(['.', '!', '?']) {
            return segment_lines(text);
        }

        let mut sentences = Vec::new();
        let mut last_end = 0;

        for mat in SENTENCE_PATTERN.find_iter(text) {
            let is_period = mat.as_str().trim_end() == ".";
            if is_period && ends_with_abbreviation(&text[last_end..mat.start()]) {
                continue;
            }
            push_sentence(&mut sentences, text, last_end, mat.end());
            last_end = mat.end();
        }

        // Trailing text without terminal punctuation
        if last_end < text.len() {
            push_sentence(&mut sentences, text, last_end, text.len());
        }

        sentences
    }

    fn tag_tokens(&self, sentence: &str) -> Vec<Token> {
        let words: Vec<&str> = TOKEN_PATTERN
            .find_iter(sentence)
            .map(|m| m.as_str())
            .collect();
        let first_word = words.iter().position(|w| is_word(w));

        let mut tokens: Vec<Token> = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            let prev = tokens.last().map(|t| t.pos);
            let next = words.get(i + 1).copied();
            let pos = self.classify(word, prev, next, first_word == Some(i));
            tokens.push(Token {
                text: (*word).to_string(),
                pos,
            });
        }

        tokens
    }
}

fn segment_lines(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut from = 0;
    for line in text.split('\n') {
        let to = from + line.len();
        push_sentence(&mut sentences, text, from, to);
        from = to + 1;
    }
    sentences
}

/// Whether `text` ends in a title, a listed abbreviation or an initial.
fn ends_with_abbreviation(text: &str) -> bool {
    let Some(word) = text.split_whitespace().next_back() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut chars = word.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        return first.is_uppercase();
    }
    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

fn push_sentence(sentences: &mut Vec<Sentence>, text: &str, from: usize, to: usize) {
    let raw = &text[from..to];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = from + (raw.len() - raw.trim_start().len());
    sentences.push(Sentence {
        text: trimmed.to_string(),
        start,
        end: start + trimmed.len(),
    });
}

fn classify_symbol(token: &str) -> PartOfSpeech {
    let suffix = token.trim_start_matches(['\'', '’']);
    if suffix.len() == token.len() {
        return PartOfSpeech::Punctuation;
    }
    match suffix.to_lowercase().as_str() {
        "re" | "ve" | "ll" | "m" | "d" => PartOfSpeech::Auxiliary,
        "" => PartOfSpeech::Punctuation,
        _ => PartOfSpeech::Particle,
    }
}

fn is_word(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphanumeric)
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(char::is_numeric)
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

fn has_suffix(word: &str, suffixes: &[&str]) -> bool {
    // Require a stem of at least three characters so "bed" or "thing" stay put
    suffixes
        .iter()
        .any(|s| word.len() >= s.len() + 3 && word.ends_with(s))
}
