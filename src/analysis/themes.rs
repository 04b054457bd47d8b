// Thematic keywords: the most frequent content words of a text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ThemesConfig;
use crate::lexicon::{self, Lexicon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
    /// Share of the analyzed (filtered) tokens, in percent
    pub pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeReport {
    /// Every token of the cleaned text
    pub total_tokens: usize,
    /// Tokens left after stopword and length filtering
    pub analyzed_tokens: usize,
    pub distinct_words: usize,
    pub keywords: Vec<Keyword>,
}

/// Lowercase, keep letters, whitespace and hyphens, split on whitespace
fn clean_tokens(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || *c == '-')
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

pub fn keyword_report(text: &str, lexicon: &Lexicon, config: &ThemesConfig) -> ThemeReport {
    let tokens = clean_tokens(text);
    let excluded: BTreeSet<String> = config.exclude.iter().map(|w| w.to_lowercase()).collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut analyzed = 0;
    for token in &tokens {
        let keep = token.chars().count() >= config.min_word_length
            && token.chars().any(char::is_alphabetic)
            && !lexicon.contains(lexicon::STOPWORDS, token)
            && !excluded.contains(token);
        if keep {
            analyzed += 1;
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let distinct_words = ranked.len();
    let keywords = ranked
        .into_iter()
        .take(config.top_n)
        .map(|(word, count)| Keyword {
            word: word.to_string(),
            count,
            pct: count as f64 / analyzed as f64 * 100.0,
        })
        .collect();

    ThemeReport {
        total_tokens: tokens.len(),
        analyzed_tokens: analyzed,
        distinct_words,
        keywords,
    }
}
