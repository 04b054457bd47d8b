// Phoneme transcription behind a trait, with an orthographic approximation
// for Brazilian Portuguese.

use crate::error::AnnotationError;

pub trait Phonemizer: Send + Sync {
    /// Phonemes of a single word, in order; empty when nothing is pronounceable
    fn phonemes(&self, word: &str) -> Result<Vec<String>, AnnotationError>;

    fn first_phoneme(&self, word: &str) -> Result<Option<String>, AnnotationError> {
        Ok(self.phonemes(word)?.into_iter().next())
    }
}

const VOWELS: &str = "aeiouáéíóúâêîôûãõàü";

fn is_vowel(ch: char) -> bool {
    VOWELS.contains(ch)
}

fn is_front_vowel(ch: Option<&char>) -> bool {
    matches!(ch, Some('e' | 'i' | 'é' | 'í' | 'ê'))
}

/// First vowel letter of the word, accents preserved
pub fn principal_vowel(word: &str) -> Option<char> {
    word.chars().flat_map(char::to_lowercase).find(|&c| is_vowel(c))
}

/// Spelling-driven transcription: digraphs (ch, lh, nh, rr, ss, qu/gu before
/// front vowels), soft c and g, silent h, initial r, intervocalic s
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthographicPhonemizer;

impl OrthographicPhonemizer {
    fn transcribe(word: &str) -> Vec<String> {
        let chars: Vec<char> = word
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphabetic())
            .collect();
        let mut out: Vec<String> = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1);
            let after = chars.get(i + 2);
            let prev = if i > 0 { chars.get(i - 1) } else { None };

            let (phoneme, consumed): (Option<&str>, usize) = match ch {
                'c' if next == Some(&'h') => (Some("ʃ"), 2),
                'l' if next == Some(&'h') => (Some("ʎ"), 2),
                'n' if next == Some(&'h') => (Some("ɲ"), 2),
                'q' if next == Some(&'u') && is_front_vowel(after) => (Some("k"), 2),
                'g' if next == Some(&'u') && is_front_vowel(after) => (Some("g"), 2),
                'r' if next == Some(&'r') => (Some("x"), 2),
                's' if next == Some(&'s') => (Some("s"), 2),
                'c' if is_front_vowel(next) => (Some("s"), 1),
                'c' | 'k' | 'q' => (Some("k"), 1),
                'ç' => (Some("s"), 1),
                'g' if is_front_vowel(next) => (Some("ʒ"), 1),
                'j' => (Some("ʒ"), 1),
                'h' => (None, 1),
                'r' if i == 0 => (Some("x"), 1),
                's' if prev.is_some_and(|&p| is_vowel(p)) && next.is_some_and(|&n| is_vowel(n)) => {
                    (Some("z"), 1)
                }
                'x' => (Some("ʃ"), 1),
                'z' => (Some("z"), 1),
                'á' | 'à' | 'â' => (Some("a"), 1),
                'ã' => (Some("ɐ̃"), 1),
                'é' => (Some("ɛ"), 1),
                'ê' => (Some("e"), 1),
                'í' => (Some("i"), 1),
                'ó' => (Some("ɔ"), 1),
                'ô' => (Some("o"), 1),
                'õ' => (Some("õ"), 1),
                'ú' | 'ü' => (Some("u"), 1),
                _ => (None, 0),
            };

            match (phoneme, consumed) {
                (Some(p), n) => {
                    out.push(p.to_string());
                    i += n;
                }
                (None, 0) => {
                    out.push(ch.to_string());
                    i += 1;
                }
                (None, n) => i += n,
            }
        }
        out
    }
}

impl Phonemizer for OrthographicPhonemizer {
    fn phonemes(&self, word: &str) -> Result<Vec<String>, AnnotationError> {
        Ok(Self::transcribe(word))
    }
}
