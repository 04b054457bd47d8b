// Lexical richness (TTR, MTLD, HD-D) behind a trait.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::AnnotationError;
use crate::pattern::word_tokens;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Richness {
    pub ttr: f64,
    pub mtld: f64,
    pub hdd: f64,
}

pub trait RichnessScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Richness, AnnotationError>;
}

/// Word-token diversity measures computed directly from lowercased tokens
#[derive(Debug, Clone, Copy)]
pub struct DiversityScorer {
    pub mtld_threshold: f64,
    pub hdd_draws: usize,
}

impl Default for DiversityScorer {
    fn default() -> Self {
        Self {
            mtld_threshold: 0.72,
            hdd_draws: 42,
        }
    }
}

/// Types over tokens, 0.0 for no tokens
pub fn type_token_ratio<S: AsRef<str>>(words: &[S]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let types: HashSet<&str> = words.iter().map(|w| w.as_ref()).collect();
    types.len() as f64 / words.len() as f64
}

fn mtld_pass<'a, I>(words: I, total: usize, threshold: f64) -> f64
where
    I: Iterator<Item = &'a str>,
{
    let mut factors = 0.0;
    let mut types: HashSet<&str> = HashSet::new();
    let mut tokens = 0usize;
    let mut ttr = 1.0;

    for word in words {
        types.insert(word);
        tokens += 1;
        ttr = types.len() as f64 / tokens as f64;
        if ttr <= threshold {
            factors += 1.0;
            types.clear();
            tokens = 0;
            ttr = 1.0;
        }
    }
    if tokens > 0 {
        factors += (1.0 - ttr) / (1.0 - threshold);
    }

    if factors == 0.0 {
        // Every token distinct and no factor completed
        total as f64
    } else {
        total as f64 / factors
    }
}

/// Mean of forward and backward MTLD passes
pub fn mtld(words: &[String], threshold: f64) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let forward = mtld_pass(words.iter().map(String::as_str), words.len(), threshold);
    let backward = mtld_pass(words.iter().rev().map(String::as_str), words.len(), threshold);
    (forward + backward) / 2.0
}

/// Hypergeometric diversity: for each type, the probability of drawing it at
/// least once in `draws` tokens, divided by `draws`, summed over types
pub fn hdd(words: &[String], draws: usize) -> f64 {
    let total = words.len();
    if total == 0 || draws == 0 {
        return 0.0;
    }
    let draws = draws.min(total);

    // Summed in key order so the float result is reproducible
    let mut frequencies: BTreeMap<&str, usize> = BTreeMap::new();
    for word in words {
        *frequencies.entry(word.as_str()).or_insert(0) += 1;
    }

    frequencies
        .values()
        .map(|&count| {
            let miss = probability_of_no_hit(total, count, draws);
            (1.0 - miss) / draws as f64
        })
        .sum()
}

/// P(X = 0) for X ~ Hypergeometric(population, successes, draws)
fn probability_of_no_hit(population: usize, successes: usize, draws: usize) -> f64 {
    let failures = population - successes;
    if failures < draws {
        return 0.0;
    }
    (0..draws).fold(1.0, |p, i| p * (failures - i) as f64 / (population - i) as f64)
}

impl RichnessScorer for DiversityScorer {
    fn score(&self, text: &str) -> Result<Richness, AnnotationError> {
        let words = word_tokens(text);
        Ok(Richness {
            ttr: type_token_ratio(&words),
            mtld: mtld(&words, self.mtld_threshold),
            hdd: hdd(&words, self.hdd_draws),
        })
    }
}
