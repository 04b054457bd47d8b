// Part-of-speech annotation behind a trait, with a lexicon and suffix-rule default.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AnnotationError;
use crate::lexicon::{self, Lexicon};
use crate::sentence_detector::SentenceDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Pronoun,
    Preposition,
    Conjunction,
    Numeral,
    Punctuation,
    Other,
}

impl PartOfSpeech {
    pub fn is_noun(self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    /// Index of the sentence this token belongs to
    pub sentence: usize,
    pub gerund: bool,
}

impl Token {
    /// Purely alphabetic tokens are the ones every class count is based on
    pub fn is_alpha(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub tokens: Vec<Token>,
    /// Normalized sentence texts, indexed by `Token::sentence`
    pub sentences: Vec<String>,
}

pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError>;
}

const GERUND_ENDINGS: &[&str] = &["ando", "endo", "indo", "ondo"];
const INFINITIVE_ENDINGS: &[&str] = &["ar", "er", "ir"];
const FINITE_ENDINGS: &[&str] = &["aram", "eram", "iram", "avam", "ava", "ou", "iu"];

/// Tokens of one sentence: words (inner hyphens kept) and single punctuation marks
fn split_tokens(sentence: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut iter = sentence.char_indices().peekable();

    while let Some((i, ch)) = iter.next() {
        let inner_hyphen = ch == '-'
            && word_start.is_some()
            && iter.peek().is_some_and(|&(_, n)| n.is_alphanumeric());
        if ch.is_alphanumeric() || inner_hyphen {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push(&sentence[start..i]);
        }
        if !ch.is_whitespace() {
            tokens.push(&sentence[i..i + ch.len_utf8()]);
        }
    }
    if let Some(start) = word_start {
        tokens.push(&sentence[start..]);
    }
    tokens
}

/// Lexicon lookups first, then capitalization, then suffix rules
pub struct HeuristicAnnotator {
    lexicon: Arc<Lexicon>,
    detector: SentenceDetector,
}

impl HeuristicAnnotator {
    pub fn new(lexicon: Arc<Lexicon>) -> Result<Self, AnnotationError> {
        Ok(Self {
            lexicon,
            detector: SentenceDetector::with_default_rules()?,
        })
    }

    fn has_ending(word: &str, endings: &[&str], min_stem: usize) -> bool {
        endings.iter().any(|e| {
            word.ends_with(e) && word.chars().count() >= e.chars().count() + min_stem
        })
    }

    fn tag(&self, surface: &str, lower: &str, sentence_initial: bool) -> (PartOfSpeech, bool) {
        use PartOfSpeech::*;
        let lex = &*self.lexicon;

        if surface.chars().all(|c| c.is_ascii_digit()) {
            return (Numeral, false);
        }
        if !surface.chars().any(char::is_alphanumeric) {
            return (Punctuation, false);
        }
        if lex.contains(lexicon::DETERMINERS, lower) {
            return (Determiner, false);
        }
        if lex.contains(lexicon::PRONOUNS, lower) {
            return (Pronoun, false);
        }
        if lex.contains(lexicon::PREPOSITIONS, lower) {
            return (Preposition, false);
        }
        if lex.contains(lexicon::CONJUNCTIONS, lower) {
            return (Conjunction, false);
        }
        if lex.contains(lexicon::VERBS, lower)
            || lex.contains(lexicon::WEAK_VERBS, lower)
            || lex.contains(lexicon::STRONG_VERBS, lower)
        {
            return (Verb, false);
        }
        if lex.contains(lexicon::ADVERBS, lower) || Self::has_ending(lower, &["mente"], 2) {
            return (Adverb, false);
        }
        if lex.contains(lexicon::ADJECTIVES, lower) {
            return (Adjective, false);
        }
        let capitalized = surface.chars().next().is_some_and(char::is_uppercase);
        if capitalized && !sentence_initial {
            return (ProperNoun, false);
        }
        if lex.contains(lexicon::ABSTRACT_LEMMAS, lower) {
            return (Noun, false);
        }
        if Self::has_ending(lower, GERUND_ENDINGS, 2) {
            return (Verb, true);
        }
        if Self::has_ending(lower, INFINITIVE_ENDINGS, 3) || Self::has_ending(lower, FINITE_ENDINGS, 2) {
            return (Verb, false);
        }
        if lex.has_suffix(lexicon::ADJECTIVE_SUFFIXES, lower) && lower.chars().count() > 4 {
            return (Adjective, false);
        }
        if surface.chars().all(char::is_alphabetic) {
            return (Noun, false);
        }
        (Other, false)
    }

    fn lemma(&self, lower: &str, gerund: bool) -> String {
        let mapped = self.lexicon.lemma_of(lower);
        if mapped != lower {
            return mapped.to_string();
        }
        if gerund {
            if let Some(stem) = lower.strip_suffix("ndo") {
                return format!("{stem}r");
            }
        }
        lower.to_string()
    }
}

impl Annotator for HeuristicAnnotator {
    fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError> {
        let detected = self.detector.detect(text);
        let mut annotation = Annotation {
            tokens: Vec::new(),
            sentences: Vec::with_capacity(detected.len()),
        };

        for sentence in &detected {
            let mut first_word = true;
            for surface in split_tokens(sentence.raw()) {
                let lower = surface.to_lowercase();
                let is_word = surface.chars().any(char::is_alphanumeric);
                let (pos, gerund) = self.tag(surface, &lower, first_word);
                if is_word {
                    first_word = false;
                }
                let lemma = self.lemma(&lower, gerund);
                annotation.tokens.push(Token {
                    text: surface.to_string(),
                    lemma,
                    pos,
                    sentence: sentence.index,
                    gerund,
                });
            }
            annotation.sentences.push(sentence.normalize());
        }
        Ok(annotation)
    }
}
