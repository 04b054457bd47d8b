// Crutch (filler) phrases: whole-text counts, shares, and a per-window rate series.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{AggregateStats, Aggregator, RatioSpec, UNITS};
use crate::config::CrutchesConfig;
use crate::error::{AnnotationError, Result};
use crate::lexicon::{self, Lexicon};
use crate::metrics::{score_windows, PatternMetric};
use crate::pattern::{normalize_for_matching, PatternSet};
use crate::turning::{detect_turning_points, TurningPoint};
use crate::window::{whitespace_units, TailPolicy, Window, Windower};

pub const PER_1000: &str = "per_1000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseCount {
    pub phrase: String,
    pub count: usize,
    /// Share of all crutch matches, in percent
    pub share_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrutchWindow {
    #[serde(flatten)]
    pub window: Window,
    pub matches: u64,
    pub per_1000: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrutchReport {
    pub total_words: usize,
    pub total_matches: usize,
    /// Matches per 100 words of the whole text
    pub rate_pct: f64,
    /// Phrases found at least once, most frequent first
    pub phrases: Vec<PhraseCount>,
    pub windows: Vec<CrutchWindow>,
    pub stats: AggregateStats,
    pub turning_points: Vec<TurningPoint>,
}

/// The lexicon's filler list plus any configured extras
pub fn filler_patterns(lexicon: &Lexicon, config: &CrutchesConfig) -> Result<PatternSet> {
    PatternSet::new(
        lexicon
            .get(lexicon::FILLER_PHRASES)
            .iter()
            .map(String::as_str)
            .chain(config.extra_phrases.iter().map(String::as_str)),
    )
}

fn rate_aggregator() -> Aggregator {
    Aggregator::new(vec![RatioSpec::new(
        PER_1000,
        &[PatternMetric::MATCHES],
        &[UNITS],
        1000.0,
    )])
}

pub fn crutch_report(
    text: &str,
    patterns: &PatternSet,
    config: &CrutchesConfig,
    tail: TailPolicy,
    workers: usize,
) -> std::result::Result<CrutchReport, AnnotationError> {
    let haystack = normalize_for_matching(text);
    let units = whitespace_units(&haystack);

    let mut phrases: Vec<(String, usize)> = patterns
        .count_each_normalized(&haystack)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    phrases.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let metric = PatternMetric::new(patterns, &haystack);
    let total_matches = metric.total();
    let phrases = phrases
        .into_iter()
        .map(|(phrase, count)| PhraseCount {
            phrase,
            count,
            share_pct: count as f64 / total_matches as f64 * 100.0,
        })
        .collect();

    let windower = Windower::new(config.window_size, tail);
    let windows: Vec<Window> = windower.windows(units.len()).collect();
    let records = score_windows(&metric, &windows, &units, workers)?;

    let aggregator = rate_aggregator();
    let per_window: Vec<CrutchWindow> = records
        .iter()
        .zip(&windows)
        .map(|(record, &window)| CrutchWindow {
            window,
            matches: record.count(PatternMetric::MATCHES),
            per_1000: aggregator.fold([record]).ratio(PER_1000),
        })
        .collect();
    let rates: Vec<f64> = per_window.iter().map(|w| w.per_1000).collect();

    let report = CrutchReport {
        total_words: units.len(),
        total_matches,
        rate_pct: if units.is_empty() {
            0.0
        } else {
            total_matches as f64 / units.len() as f64 * 100.0
        },
        phrases,
        turning_points: detect_turning_points(&rates, config.rate_threshold),
        windows: per_window,
        stats: aggregator.fold(&records),
    };
    info!(
        "Crutch phrases: {} matches over {} words",
        report.total_matches, report.total_words
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> PatternSet {
        PatternSet::new(list.iter().copied()).unwrap()
    }

    fn config(window_size: usize) -> CrutchesConfig {
        CrutchesConfig {
            window_size,
            ..CrutchesConfig::default()
        }
    }

    #[test]
    fn test_counts_shares_and_rate() {
        let text = "De repente ele riu. De repente, chorou. Então saiu, então voltou. Repentino.";
        let set = patterns(&["de repente", "então", "na verdade"]);
        let report = crutch_report(text, &set, &config(1000), TailPolicy::Keep, 1).unwrap();

        assert_eq!(report.total_words, 12);
        assert_eq!(report.total_matches, 4);
        let found: Vec<_> = report.phrases.iter().map(|p| (p.phrase.as_str(), p.count)).collect();
        assert_eq!(found, vec![("de repente", 2), ("então", 2)]);
        assert_eq!(report.phrases[0].share_pct, 50.0);
        assert!((report.rate_pct - 4.0 / 12.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_rates_and_turning_points() {
        // 4 words per window: no filler, two fillers, none
        let text = "a b c d então x então y e f g h";
        let set = patterns(&["então"]);
        let report = crutch_report(text, &set, &config(4), TailPolicy::Keep, 2).unwrap();

        let rates: Vec<_> = report.windows.iter().map(|w| w.per_1000).collect();
        assert_eq!(rates, vec![0.0, 500.0, 0.0]);
        assert_eq!(report.turning_points.len(), 2);
        assert_eq!(report.turning_points[0].to_window_index, 1);
        assert!((report.stats.ratio(PER_1000) - 2000.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_phrase_crossing_window_boundary_is_counted_once() {
        let set = patterns(&["de repente"]);
        let report = crutch_report("a b c de repente x y z", &set, &config(4), TailPolicy::Keep, 1).unwrap();

        assert_eq!(report.total_matches, 1);
        let per_window: Vec<_> = report.windows.iter().map(|w| w.matches).collect();
        assert_eq!(per_window, vec![1, 0]);
        assert_eq!(report.stats.count(PatternMetric::MATCHES), 1);
        assert!((report.stats.ratio(PER_1000) - 125.0).abs() < 1e-9);
        assert!((report.rate_pct - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_window_counts_sum_to_total() {
        let text = "Na verdade, de repente ele saiu. Então, de\nrepente, voltou e na verdade ficou. Enfim.";
        let set = patterns(&["de repente", "na verdade", "então", "enfim"]);
        for size in [1, 2, 3, 5, 7] {
            let report = crutch_report(text, &set, &config(size), TailPolicy::Keep, 2).unwrap();
            let summed: u64 = report.windows.iter().map(|w| w.matches).sum();
            assert_eq!(summed as usize, report.total_matches, "window size {size}");
            assert_eq!(report.total_matches, 6);
        }
    }

    #[test]
    fn test_empty_text() {
        let report = crutch_report("", &patterns(&["então"]), &config(10), TailPolicy::Keep, 1).unwrap();
        assert_eq!(report.total_matches, 0);
        assert_eq!(report.rate_pct, 0.0);
        assert!(report.windows.is_empty());
        assert!(report.stats.is_empty());
    }

    #[test]
    fn test_filler_list_includes_configured_extras() {
        let lexicon = Lexicon::builtin().unwrap();
        let config = CrutchesConfig {
            extra_phrases: vec!["tipo assim".into()],
            ..CrutchesConfig::default()
        };
        let set = filler_patterns(&lexicon, &config).unwrap();
        assert!(set.phrases().any(|p| p == "tipo assim"));
        assert!(set.len() > 1);
    }
}
