// Sentiment arc: per-window compound polarity and the turning points between windows.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{AggregateStats, Aggregator, RatioSpec, RECORDS};
use crate::classify::{BandTable, Classification};
use crate::error::AnnotationError;
use crate::metrics::{score_windows, SentimentMetric};
use crate::sentiment::SentimentScorer;
use crate::turning::{detect_turning_points, series, TurningPoint};
use crate::window::{whitespace_units, Window, Windower};

pub const MEAN_COMPOUND: &str = "mean_compound";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcWindow {
    #[serde(flatten)]
    pub window: Window,
    pub compound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcReport {
    pub word_count: usize,
    pub window_size: usize,
    pub threshold: f64,
    pub windows: Vec<ArcWindow>,
    pub stats: AggregateStats,
    pub tone: Classification,
    pub turning_points: Vec<TurningPoint>,
}

impl ArcReport {
    pub fn is_insufficient(&self) -> bool {
        self.tone == Classification::InsufficientData
    }
}

fn arc_aggregator() -> Aggregator {
    Aggregator::new(vec![RatioSpec::new(
        MEAN_COMPOUND,
        &[SentimentMetric::COMPOUND],
        &[RECORDS],
        1.0,
    )])
}

/// Score every window of the text and report the jumps above `threshold`.
/// A text shorter than one window has no arc and is classified `InsufficientData`.
pub fn sentiment_arc(
    text: &str,
    windower: Windower,
    threshold: f64,
    tone_bands: &BandTable,
    scorer: &dyn SentimentScorer,
    workers: usize,
) -> Result<ArcReport, AnnotationError> {
    let units = whitespace_units(text);
    let mut report = ArcReport {
        word_count: units.len(),
        window_size: windower.size(),
        threshold,
        windows: Vec::new(),
        stats: AggregateStats::default(),
        tone: Classification::InsufficientData,
        turning_points: Vec::new(),
    };
    if units.len() < windower.size() || windower.size() == 0 {
        debug!(
            "Text has {} words, fewer than one window of {}",
            units.len(),
            windower.size()
        );
        return Ok(report);
    }

    let windows: Vec<Window> = windower.windows(units.len()).collect();
    let records = score_windows(&SentimentMetric::new(scorer), &windows, &units, workers)?;
    let values = series(&records, SentimentMetric::COMPOUND);

    report.turning_points = detect_turning_points(&values, threshold);
    report.windows = windows
        .iter()
        .zip(&values)
        .map(|(&window, &compound)| ArcWindow { window, compound })
        .collect();
    report.stats = arc_aggregator().fold(&records);
    report.tone = tone_bands.classify(&report.stats);
    info!(
        "Sentiment arc: {} windows, {} turning points",
        report.windows.len(),
        report.turning_points.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArcConfig;
    use crate::window::TailPolicy;

    /// Scores +1 for "sol", -1 for "chuva", averaged over the words
    struct WeatherScorer;

    impl SentimentScorer for WeatherScorer {
        fn compound(&self, text: &str) -> Result<f64, AnnotationError> {
            let words: Vec<_> = text.split_whitespace().collect();
            let sum: f64 = words
                .iter()
                .map(|w| match *w {
                    "sol" => 1.0,
                    "chuva" => -1.0,
                    _ => 0.0,
                })
                .sum();
            Ok(sum / words.len() as f64)
        }
    }

    fn arc(text: &str, size: usize) -> ArcReport {
        let bands = ArcConfig::default().tone_bands;
        sentiment_arc(text, Windower::new(size, TailPolicy::Keep), 0.4, &bands, &WeatherScorer, 2)
            .unwrap()
    }

    #[test]
    fn test_turning_point_between_windows() {
        let text = "sol sol sol sol chuva chuva chuva chuva sol sol";
        let report = arc(text, 4);
        let compounds: Vec<_> = report.windows.iter().map(|w| w.compound).collect();
        assert_eq!(compounds, vec![1.0, -1.0, 1.0]);
        assert_eq!(report.turning_points.len(), 2);
        assert_eq!(report.turning_points[0].to_window_index, 1);
        assert_eq!(report.turning_points[1].value, 1.0);
        assert_eq!(report.windows[2].window.token_count, 2);
        // mean over windows, not over words
        assert!((report.stats.ratio(MEAN_COMPOUND) - 1.0 / 3.0).abs() < 1e-12);
        assert!(report.tone.is_band("Positive"));
    }

    #[test]
    fn test_short_text_is_insufficient() {
        let report = arc("sol e chuva", 1000);
        assert!(report.is_insufficient());
        assert!(report.windows.is_empty());
        assert!(report.turning_points.is_empty());
        assert_eq!(report.word_count, 3);
    }

    #[test]
    fn test_scorer_failure_propagates() {
        struct Broken;
        impl SentimentScorer for Broken {
            fn compound(&self, _text: &str) -> Result<f64, AnnotationError> {
                Err(AnnotationError::Backend("offline".into()))
            }
        }
        let bands = ArcConfig::default().tone_bands;
        let result = sentiment_arc("a b c d", Windower::new(2, TailPolicy::Keep), 0.4, &bands, &Broken, 1);
        assert!(matches!(result, Err(AnnotationError::Backend(_))));
    }
}
