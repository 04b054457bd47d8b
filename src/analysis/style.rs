// Style score: sentence lengths, verb strength, -mente adverbs, lexical
// richness and repetition, combined into a clamped score and diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::classify::Score;
use crate::config::StyleConfig;
use crate::error::AnnotationError;
use crate::lexicon::{self, Lexicon};
use crate::pattern::{trim_word, word_tokens};
use crate::richness::{type_token_ratio, Richness, RichnessScorer};
use crate::sentence_detector::SentenceDetector;

/// Diagnostic shown instead of the rule table when a text has no words
pub const NO_WORDS_MESSAGE: &str = "No meaningful metrics: the text has no words.";

const ADVERB_SUFFIX: &str = "mente";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleReport {
    pub words: usize,
    pub sentences: usize,
    pub mean_sentence_length: f64,
    pub max_sentence_length: usize,
    pub min_sentence_length: usize,
    pub top_words: Vec<(String, usize)>,
    pub adverbs: usize,
    pub weak_verbs: usize,
    pub strong_verbs: usize,
    /// strong / (weak + strong)
    pub strong_verb_ratio: f64,
    pub richness: Richness,
    /// Mean TTR over full blocks only
    pub lexical_density: f64,
    /// 1 - types / tokens
    pub repetition: f64,
    /// Every metric the score card and diagnostics can refer to
    pub metrics: BTreeMap<String, f64>,
    pub score: Score,
    pub diagnostics: Vec<String>,
    /// Numbered sentences with weak verbs, strong verbs or -mente adverbs marked
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Weak,
    Strong,
    Adverb,
}

/// Verb lists hold infinitives; a known inflection is matched through its lemma
fn mark_of(word: &str, lexicon: &Lexicon) -> Option<Mark> {
    let in_list = |category: &str| {
        lexicon.contains(category, word) || lexicon.contains(category, lexicon.lemma_of(word))
    };
    if in_list(lexicon::WEAK_VERBS) {
        Some(Mark::Weak)
    } else if in_list(lexicon::STRONG_VERBS) {
        Some(Mark::Strong)
    } else if word.ends_with(ADVERB_SUFFIX) {
        Some(Mark::Adverb)
    } else {
        None
    }
}

/// Mean TTR over consecutive full blocks of `block` words; a trailing partial block is ignored
pub fn lexical_density(words: &[String], block: usize) -> f64 {
    if block == 0 {
        return 0.0;
    }
    let ttrs: Vec<f64> = words.chunks_exact(block).map(type_token_ratio).collect();
    if ttrs.is_empty() {
        0.0
    } else {
        ttrs.iter().sum::<f64>() / ttrs.len() as f64
    }
}

pub fn repetition_index(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let types: HashSet<&String> = words.iter().collect();
    1.0 - types.len() as f64 / words.len() as f64
}

fn highlight(sentence: &str, lexicon: &Lexicon) -> Option<String> {
    let mut marked = false;
    let parts: Vec<String> = sentence
        .split_whitespace()
        .map(|unit| match mark_of(&trim_word(unit).to_lowercase(), lexicon) {
            Some(mark) => {
                marked = true;
                let tag = match mark {
                    Mark::Weak => "WEAK",
                    Mark::Strong => "STRONG",
                    Mark::Adverb => "ADV",
                };
                format!("[{tag}:{unit}]")
            }
            None => unit.to_string(),
        })
        .collect();
    marked.then(|| parts.join(" "))
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn style_report(
    text: &str,
    detector: &SentenceDetector,
    lexicon: &Lexicon,
    richness: &dyn RichnessScorer,
    config: &StyleConfig,
) -> Result<StyleReport, AnnotationError> {
    let words = word_tokens(text);
    let sentences = detector.detect(text);
    let lengths: Vec<usize> = sentences.iter().map(|s| s.word_count()).collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let (mut adverbs, mut weak, mut strong) = (0, 0, 0);
    for word in &words {
        match mark_of(word, lexicon) {
            Some(Mark::Weak) => weak += 1,
            Some(Mark::Strong) => strong += 1,
            Some(Mark::Adverb) => adverbs += 1,
            None => {}
        }
        if !lexicon.contains(lexicon::STOPWORDS, word) {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
    }
    let mut top_words: Vec<(String, usize)> = counts.into_iter().map(|(w, c)| (w.to_string(), c)).collect();
    top_words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_words.truncate(config.top_words);

    let scores = richness.score(text)?;
    let mean_sentence_length = ratio(lengths.iter().sum(), lengths.len());
    let strong_verb_ratio = ratio(strong, weak + strong);
    let density = lexical_density(&words, config.density_block);
    let repetition = repetition_index(&words);

    let metrics: BTreeMap<String, f64> = [
        ("words", words.len() as f64),
        ("sentences", sentences.len() as f64),
        ("mean_sentence_length", mean_sentence_length),
        ("adverbs", adverbs as f64),
        ("adverb_rate", ratio(adverbs, words.len())),
        ("weak_verbs", weak as f64),
        ("strong_verbs", strong as f64),
        ("lexicon_verbs", (weak + strong) as f64),
        ("weak_verb_rate", ratio(weak, words.len())),
        ("strong_verb_ratio", strong_verb_ratio),
        ("ttr", scores.ttr),
        ("mtld", scores.mtld),
        ("hdd", scores.hdd),
        ("lexical_density", density),
        ("repetition", repetition),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let score = config.score.score(&metrics);
    let diagnostics = if words.is_empty() {
        vec![NO_WORDS_MESSAGE.to_string()]
    } else {
        config.diagnostics.evaluate(&metrics)
    };
    let highlights = sentences
        .iter()
        .filter_map(|s| highlight(&s.normalize(), lexicon).map(|h| format!("{}. {}", s.index + 1, h)))
        .collect();
    debug!(
        "Style: {} words, {} sentences, score {:.1}",
        words.len(),
        sentences.len(),
        score.value
    );

    Ok(StyleReport {
        words: words.len(),
        sentences: sentences.len(),
        mean_sentence_length,
        max_sentence_length: lengths.iter().copied().max().unwrap_or(0),
        min_sentence_length: lengths.iter().copied().min().unwrap_or(0),
        top_words,
        adverbs,
        weak_verbs: weak,
        strong_verbs: strong,
        strong_verb_ratio,
        richness: scores,
        lexical_density: density,
        repetition,
        metrics,
        score,
        diagnostics,
        highlights,
    })
}
