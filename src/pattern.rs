// Case-normalized, word-boundary phrase matching over normalized text.

use regex_automata::meta::Regex;
use tracing::debug;

use crate::error::{CadenceError, Result};

/// Lowercase and collapse every whitespace run to a single space
pub fn normalize_for_matching(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Lowercased runs of word characters (letters, digits, underscore)
pub fn word_tokens(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Strip leading and trailing non-alphanumeric characters from a whitespace unit
pub fn trim_word(unit: &str) -> &str {
    unit.trim_matches(|c: char| !c.is_alphanumeric())
}

struct CompiledPattern {
    phrase: String,
    regex: Regex,
}

/// A fixed list of phrases, each matched independently on word boundaries.
/// Overlapping phrases ("daí" and "e daí") are counted separately.
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for phrase in phrases {
            let phrase = normalize_for_matching(phrase.as_ref());
            if phrase.is_empty() || patterns.iter().any(|p: &CompiledPattern| p.phrase == phrase) {
                continue;
            }
            let source = format!(r"\b{}\b", regex_syntax::escape(&phrase).replace(' ', r"\s+"));
            let regex = Regex::new(&source).map_err(|e| CadenceError::Config {
                path: "<pattern list>".into(),
                message: format!("cannot compile pattern '{phrase}': {e}"),
            })?;
            patterns.push(CompiledPattern { phrase, regex });
        }
        debug!("Compiled {} word-boundary patterns", patterns.len());
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.phrase.as_str())
    }

    /// Per-phrase match counts, in list order. `haystack` must already be normalized.
    pub fn count_each_normalized(&self, haystack: &str) -> Vec<(String, usize)> {
        self.patterns
            .iter()
            .map(|p| (p.phrase.clone(), p.regex.find_iter(haystack).count()))
            .collect()
    }

    /// Unit index of the first word of every match, sorted ascending. Units are the
    /// single-space-separated words of the normalized `haystack`.
    pub fn match_start_units(&self, haystack: &str) -> Vec<usize> {
        let spaces: Vec<usize> = haystack
            .bytes()
            .enumerate()
            .filter(|&(_, b)| b == b' ')
            .map(|(i, _)| i)
            .collect();
        let mut starts: Vec<usize> = self
            .patterns
            .iter()
            .flat_map(|p| p.regex.find_iter(haystack))
            .map(|m| spaces.partition_point(|&i| i < m.start()))
            .collect();
        starts.sort_unstable();
        starts
    }

    /// Total matches over every phrase in raw text
    pub fn count(&self, text: &str) -> usize {
        let haystack = normalize_for_matching(text);
        self.count_normalized(&haystack)
    }

    pub fn count_normalized(&self, haystack: &str) -> usize {
        self.patterns
            .iter()
            .map(|p| p.regex.find_iter(haystack).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_whole_words_only() {
        let set = PatternSet::new(["bem", "aí"]).unwrap();
        // "também" and "saída" contain the phrases as substrings and must not count
        assert_eq!(set.count("Também saí da saída. Bem, aí sim. BEM!"), 3);
    }

    #[test]
    fn test_multiword_phrases_span_line_breaks() {
        let set = PatternSet::new(["tipo assim", "de repente"]).unwrap();
        assert_eq!(set.count("Era, tipo\nassim, estranho. De   repente caiu."), 2);
    }

    #[test]
    fn test_overlapping_phrases_count_independently() {
        let set = PatternSet::new(["daí", "e daí"]).unwrap();
        let counts = set.count_each_normalized(&normalize_for_matching("E daí? Daí nada."));
        assert_eq!(counts, vec![("daí".to_string(), 2), ("e daí".to_string(), 1)]);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let set = PatternSet::new(["tornar-se", "a.b"]).unwrap();
        assert_eq!(set.count("Ele quis tornar-se outro. axb a.b"), 2);
    }

    #[test]
    fn test_match_starts_map_to_first_word() {
        let set = PatternSet::new(["de repente", "então"]).unwrap();
        let haystack = normalize_for_matching("a b c De\nrepente x \"então\" y");
        assert_eq!(set.match_start_units(&haystack), vec![3, 6]);
    }

    #[test]
    fn test_duplicates_and_blanks_are_ignored() {
        let set = PatternSet::new(["Né", "né", "  "]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(PatternSet::new(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_word_tokens_lowercase_and_split_on_punctuation() {
        assert_eq!(
            word_tokens("Olá, Mundo! São_Paulo 42."),
            vec!["olá", "mundo", "são_paulo", "42"]
        );
        assert_eq!(trim_word("\"Kaelin,\""), "Kaelin");
    }
}
