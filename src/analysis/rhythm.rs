// Paragraph rhythm: sentence-length variation and monotony per paragraph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::aggregate::{AggregateStats, Aggregator, RatioSpec, RECORDS};
use crate::classify::Classification;
use crate::config::RhythmConfig;
use crate::metrics::MetricRecord;
use crate::segment::paragraphs;
use crate::sentence_detector::SentenceDetector;
use crate::turning::{detect_turning_points, TurningPoint};

pub const MONOTONOUS_BAND: &str = "Monotonous";
pub const MONOTONOUS_MARK: &str = "[MONOTONOUS] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentenceLength {
    Short,
    Medium,
    Long,
}

impl SentenceLength {
    pub fn of(words: usize, config: &RhythmConfig) -> Self {
        if words < config.short_below {
            SentenceLength::Short
        } else if words <= config.medium_max {
            SentenceLength::Medium
        } else {
            SentenceLength::Long
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRhythm {
    /// 1-based position among the non-empty paragraphs
    pub number: usize,
    pub sentence_lengths: Vec<usize>,
    /// Rhythm index: population standard deviation over mean of the sentence lengths
    pub ir: f64,
    /// Category switches between consecutive sentences
    pub sw: usize,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmReport {
    pub paragraphs: Vec<ParagraphRhythm>,
    pub stats: AggregateStats,
    pub classification: Classification,
    /// Abrupt changes of the rhythm index between consecutive paragraphs
    pub shifts: Vec<TurningPoint>,
    /// The text with monotonous paragraphs prefixed by a mark, paragraphs joined by blank lines
    pub marked_text: String,
}

/// `(ir, sw)` of a list of sentence lengths
fn rhythm_index(lengths: &[usize], config: &RhythmConfig) -> (f64, usize) {
    if lengths.is_empty() {
        return (0.0, 0);
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<usize>() as f64 / n;
    let variance = lengths
        .iter()
        .map(|&l| (l as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let ir = if mean == 0.0 { 0.0 } else { variance.sqrt() / mean };

    let sw = lengths
        .windows(2)
        .filter(|pair| SentenceLength::of(pair[0], config) != SentenceLength::of(pair[1], config))
        .count();
    (ir, sw)
}

fn rhythm_aggregator() -> Aggregator {
    Aggregator::new(vec![
        RatioSpec::new("monotonous_pct", &["monotonous"], &[RECORDS], 100.0),
        RatioSpec::new("mean_sentence_length", &["words"], &["sentences"], 1.0),
        RatioSpec::new("mean_ir", &["ir"], &[RECORDS], 1.0),
    ])
}

pub fn rhythm_report(text: &str, detector: &SentenceDetector, config: &RhythmConfig) -> RhythmReport {
    let mut results = Vec::new();
    let mut records = Vec::new();
    let mut marked = Vec::new();

    for (i, paragraph) in paragraphs(text).into_iter().enumerate() {
        let lengths: Vec<usize> = detector.detect(paragraph).iter().map(|s| s.word_count()).collect();
        let (ir, sw) = rhythm_index(&lengths, config);
        let words: usize = lengths.iter().sum();

        let metrics: BTreeMap<String, f64> = [
            ("sentences", lengths.len() as f64),
            ("words", words as f64),
            ("ir", ir),
            ("sw", sw as f64),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let classification = config.paragraph_bands.classify(&metrics);
        let monotonous = classification.is_band(MONOTONOUS_BAND);

        marked.push(if monotonous {
            format!("{MONOTONOUS_MARK}{paragraph}")
        } else {
            paragraph.to_string()
        });
        records.push(
            MetricRecord::new(i, words)
                .with_count("sentences", lengths.len() as u64)
                .with_count("words", words as u64)
                .with_count("monotonous", u64::from(monotonous))
                .with_real("ir", ir),
        );
        results.push(ParagraphRhythm {
            number: i + 1,
            sentence_lengths: lengths,
            ir,
            sw,
            classification,
        });
    }

    let stats = rhythm_aggregator().fold(&records);
    let ir_series: Vec<f64> = results.iter().map(|p| p.ir).collect();
    let report = RhythmReport {
        classification: config.document_bands.classify(&stats),
        shifts: detect_turning_points(&ir_series, config.shift_threshold),
        paragraphs: results,
        stats,
        marked_text: marked.join("\n\n"),
    };
    info!(
        "Rhythm: {} paragraphs, {} monotonous",
        report.paragraphs.len(),
        report.stats.count("monotonous")
    );
    report
}
