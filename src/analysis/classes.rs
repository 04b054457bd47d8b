// Morphosyntactic class ratios per segment, folded into global stats.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{AggregateStats, Aggregator, RatioSpec};
use crate::annotate::{Annotation, Annotator, PartOfSpeech, Token};
use crate::classify::Classification;
use crate::config::ClassesConfig;
use crate::error::{CadenceError, Result};
use crate::lexicon::{self, Lexicon};
use crate::metrics::MetricRecord;
use crate::segment::Segment;

pub const TOKENS: &str = "tokens";
pub const NOUNS: &str = "nouns";
pub const ABSTRACT_NOUNS: &str = "abstract_nouns";
pub const CONCRETE_NOUNS: &str = "concrete_nouns";
pub const ADJECTIVES: &str = "adjectives";
pub const VERBS: &str = "verbs";
pub const GERUNDS: &str = "gerunds";
pub const NOMINALIZATIONS: &str = "nominalizations";

/// Alert shown instead of the rule table when a text has no countable words
pub const NO_METRICS_MESSAGE: &str = "No meaningful metrics: the text has no analyzable words.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentClasses {
    pub title: String,
    pub order_index: usize,
    pub stats: AggregateStats,
    pub pace: Classification,
    pub adjectivation: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassesReport {
    pub segments: Vec<SegmentClasses>,
    pub global: AggregateStats,
    pub pace: Classification,
    pub adjectivation: Classification,
    pub alerts: Vec<String>,
}

pub fn classes_aggregator() -> Aggregator {
    Aggregator::new(vec![
        RatioSpec::new("n_v", &[NOUNS], &[VERBS], 1.0),
        RatioSpec::new("adj_n", &[ADJECTIVES], &[NOUNS], 1.0),
        RatioSpec::new("verb_density_pct", &[VERBS], &[TOKENS], 100.0),
        RatioSpec::new("adj_per_1000", &[ADJECTIVES], &[TOKENS], 1000.0),
        RatioSpec::new("abstract_pct", &[ABSTRACT_NOUNS], &[NOUNS], 100.0),
        RatioSpec::new("concrete_pct", &[CONCRETE_NOUNS], &[NOUNS], 100.0),
        RatioSpec::new("gerund_pct", &[GERUNDS], &[VERBS], 100.0),
        RatioSpec::new("nominalizations_per_10k", &[NOMINALIZATIONS], &[TOKENS], 10_000.0),
    ])
}

fn is_abstract(token: &Token, lexicon: &Lexicon) -> bool {
    lexicon.contains(lexicon::ABSTRACT_LEMMAS, &token.lemma)
        || lexicon.has_suffix(lexicon::ABSTRACT_SUFFIXES, &token.lemma)
}

/// Nominalizing verb, then within `lookahead` tokens a determiner directly
/// followed by a deverbal or abstract noun ("fazer uma caminhada"). At most
/// one construction is counted per verb.
fn count_nominalizations(tokens: &[Token], lexicon: &Lexicon, lookahead: usize) -> u64 {
    let mut count = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.pos != PartOfSpeech::Verb || !lexicon.contains(lexicon::NOMINALIZING_VERBS, &token.lemma) {
            continue;
        }
        let end = (i + lookahead).min(tokens.len().saturating_sub(1));
        let found = (i + 1..=end).any(|j| {
            tokens[j].pos == PartOfSpeech::Determiner
                && tokens.get(j + 1).is_some_and(|noun| {
                    noun.pos == PartOfSpeech::Noun
                        && (lexicon.has_suffix(lexicon::DEVERBAL_SUFFIXES, &noun.lemma)
                            || lexicon.has_suffix(lexicon::ABSTRACT_SUFFIXES, &noun.lemma))
                })
        });
        if found {
            count += 1;
        }
    }
    count
}

/// Class counts of one annotated text, as a record carrying the alphabetic token count
pub fn class_counts(
    annotation: &Annotation,
    lexicon: &Lexicon,
    lookahead: usize,
    order_index: usize,
) -> MetricRecord {
    let (mut tokens, mut nouns, mut abstract_nouns, mut adjectives, mut verbs, mut gerunds) =
        (0u64, 0u64, 0u64, 0u64, 0u64, 0u64);

    for token in annotation.tokens.iter().filter(|t| t.is_alpha()) {
        tokens += 1;
        match token.pos {
            pos if pos.is_noun() => {
                nouns += 1;
                if is_abstract(token, lexicon) {
                    abstract_nouns += 1;
                }
            }
            PartOfSpeech::Adjective => adjectives += 1,
            PartOfSpeech::Verb => {
                verbs += 1;
                if token.gerund {
                    gerunds += 1;
                }
            }
            _ => {}
        }
    }

    MetricRecord::new(order_index, tokens as usize)
        .with_count(TOKENS, tokens)
        .with_count(NOUNS, nouns)
        .with_count(ABSTRACT_NOUNS, abstract_nouns)
        .with_count(CONCRETE_NOUNS, nouns - abstract_nouns)
        .with_count(ADJECTIVES, adjectives)
        .with_count(VERBS, verbs)
        .with_count(GERUNDS, gerunds)
        .with_count(
            NOMINALIZATIONS,
            count_nominalizations(&annotation.tokens, lexicon, lookahead),
        )
}

/// Annotate each segment, classify it, then fold the segment stats into the global view
pub fn classes_report(
    segments: &[Segment],
    annotator: &dyn Annotator,
    lexicon: &Lexicon,
    config: &ClassesConfig,
) -> Result<ClassesReport> {
    let aggregator = classes_aggregator();
    let mut per_segment = Vec::with_capacity(segments.len());

    for segment in segments {
        let annotation = annotator
            .annotate(&segment.text)
            .map_err(|e| CadenceError::annotation(segment.title.as_str(), e))?;
        let record = class_counts(&annotation, lexicon, config.nominalization_lookahead, segment.order_index);
        let stats = aggregator.fold([&record]);
        debug!(
            "Segment '{}': {} tokens, {} nouns, {} verbs",
            segment.title,
            stats.count(TOKENS),
            stats.count(NOUNS),
            stats.count(VERBS)
        );
        per_segment.push(SegmentClasses {
            title: segment.title.clone(),
            order_index: segment.order_index,
            pace: config.pace_bands.classify(&stats),
            adjectivation: config.adjective_bands.classify(&stats),
            stats,
        });
    }

    let global = aggregator.combine(per_segment.iter().map(|s| &s.stats));
    let alerts = if global.count(TOKENS) == 0 {
        vec![NO_METRICS_MESSAGE.to_string()]
    } else {
        config.alerts.evaluate(&global)
    };
    info!(
        "Class analysis: {} segments, {} tokens, {} alerts",
        per_segment.len(),
        global.count(TOKENS),
        alerts.len()
    );

    Ok(ClassesReport {
        segments: per_segment,
        pace: config.pace_bands.classify(&global),
        adjectivation: config.adjective_bands.classify(&global),
        global,
        alerts,
    })
}
