// Per-window metric records and the worker pool that computes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::AnnotationError;
use crate::pattern::PatternSet;
use crate::sentiment::SentimentScorer;
use crate::window::Window;

/// A single measured value: an integer count or a real-valued score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Real(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Count(n) => n as f64,
            MetricValue::Real(x) => x,
        }
    }
}

/// Named values measured over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub window_index: usize,
    pub token_count: usize,
    pub values: BTreeMap<String, MetricValue>,
}

impl MetricRecord {
    pub fn new(window_index: usize, token_count: usize) -> Self {
        Self {
            window_index,
            token_count,
            values: BTreeMap::new(),
        }
    }

    /// Record for a window, pre-sized from the window itself
    pub fn for_window(window: &Window) -> Self {
        Self::new(window.window_index, window.token_count)
    }

    pub fn with_count(mut self, name: &str, count: u64) -> Self {
        self.values.insert(name.to_string(), MetricValue::Count(count));
        self
    }

    pub fn with_real(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), MetricValue::Real(value));
        self
    }

    pub fn insert_count(&mut self, name: &str, count: u64) {
        self.values.insert(name.to_string(), MetricValue::Count(count));
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied()
    }

    /// Integer count, zero when absent or real-valued
    pub fn count(&self, name: &str) -> u64 {
        match self.values.get(name) {
            Some(MetricValue::Count(n)) => *n,
            _ => 0,
        }
    }

    /// Any value as f64, zero when absent
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).map(MetricValue::as_f64).unwrap_or(0.0)
    }
}

/// A pure function from window content to a metric record
pub trait WindowMetric: Send + Sync {
    fn measure(&self, window: &Window, units: &[&str]) -> Result<MetricRecord, AnnotationError>;
}

/// Resolve a configured worker count; zero means one per logical CPU
pub fn resolve_workers(configured: usize) -> usize {
    if configured == 0 {
        num_cpus::get().max(1)
    } else {
        configured
    }
}

/// Measure every window, possibly on several threads. The returned records are
/// always ordered by `window_index`. The first failing window (in window order)
/// aborts the whole batch.
pub fn score_windows<M: WindowMetric + ?Sized>(
    metric: &M,
    windows: &[Window],
    units: &[&str],
    workers: usize,
) -> Result<Vec<MetricRecord>, AnnotationError> {
    if windows.is_empty() {
        return Ok(Vec::new());
    }

    let workers = resolve_workers(workers).min(windows.len());
    let chunk_size = windows.len().div_ceil(workers);
    debug!(
        "Scoring {} windows on {} workers ({} per chunk)",
        windows.len(),
        workers,
        chunk_size
    );

    let chunk_results: Vec<Result<Vec<MetricRecord>, (usize, AnnotationError)>> =
        std::thread::scope(|scope| {
            let handles: Vec<_> = windows
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|w| {
                                metric
                                    .measure(w, w.slice(units))
                                    .map_err(|e| (w.window_index, e))
                            })
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(result) => result,
                    Err(_) => Err((
                        usize::MAX,
                        AnnotationError::Backend("window scoring worker panicked".to_string()),
                    )),
                })
                .collect()
        });

    let mut records = Vec::with_capacity(windows.len());
    let mut first_error: Option<(usize, AnnotationError)> = None;
    for result in chunk_results {
        match result {
            Ok(chunk) => records.extend(chunk),
            Err((index, error)) => {
                if first_error.as_ref().map_or(true, |(seen, _)| index < *seen) {
                    first_error = Some((index, error));
                }
            }
        }
    }
    if let Some((_, error)) = first_error {
        return Err(error);
    }

    records.sort_by_key(|r| r.window_index);
    Ok(records)
}

/// Compound sentiment polarity of the window text, under the name `compound`
pub struct SentimentMetric<'a> {
    scorer: &'a dyn SentimentScorer,
}

impl<'a> SentimentMetric<'a> {
    pub const COMPOUND: &'static str = "compound";

    pub fn new(scorer: &'a dyn SentimentScorer) -> Self {
        Self { scorer }
    }
}

impl WindowMetric for SentimentMetric<'_> {
    fn measure(&self, window: &Window, units: &[&str]) -> Result<MetricRecord, AnnotationError> {
        let compound = if units.is_empty() {
            0.0
        } else {
            self.scorer.compound(&units.join(" "))?
        };
        Ok(MetricRecord::for_window(window).with_real(Self::COMPOUND, compound))
    }
}

/// Word-boundary matches of a phrase list, under the name `matches`. Matches are
/// found once over the whole normalized text and each one belongs to the window
/// holding its first word, so phrases crossing a window boundary still count.
pub struct PatternMetric {
    starts: Vec<usize>,
}

impl PatternMetric {
    pub const MATCHES: &'static str = "matches";

    /// `haystack` must be normalized; windows are over its whitespace units
    pub fn new(patterns: &PatternSet, haystack: &str) -> Self {
        Self {
            starts: patterns.match_start_units(haystack),
        }
    }

    pub fn total(&self) -> usize {
        self.starts.len()
    }
}

impl WindowMetric for PatternMetric {
    fn measure(&self, window: &Window, _units: &[&str]) -> Result<MetricRecord, AnnotationError> {
        let end = window.start_offset + window.token_count;
        let from = self.starts.partition_point(|&i| i < window.start_offset);
        let to = self.starts.partition_point(|&i| i < end);
        Ok(MetricRecord::for_window(window).with_count(Self::MATCHES, (to - from) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::normalize_for_matching;
    use crate::window::{whitespace_units, TailPolicy, Windower};

    struct LengthMetric;

    impl WindowMetric for LengthMetric {
        fn measure(&self, window: &Window, units: &[&str]) -> Result<MetricRecord, AnnotationError> {
            let chars: usize = units.iter().map(|u| u.chars().count()).sum();
            Ok(MetricRecord::for_window(window).with_count("chars", chars as u64))
        }
    }

    struct FailOn(usize);

    impl WindowMetric for FailOn {
        fn measure(&self, window: &Window, _units: &[&str]) -> Result<MetricRecord, AnnotationError> {
            if window.window_index >= self.0 {
                Err(AnnotationError::Backend(format!("window {}", window.window_index)))
            } else {
                Ok(MetricRecord::for_window(window))
            }
        }
    }

    fn sample_windows(size: usize) -> (Vec<Window>, Vec<&'static str>) {
        let units = whitespace_units("a bb ccc dddd eeeee ffffff g hh iii jjjj kkkkk");
        let windows = Windower::new(size, TailPolicy::Keep).windows(units.len()).collect();
        (windows, units)
    }

    #[test]
    fn test_parallel_results_are_ordered_by_window() {
        let (windows, units) = sample_windows(2);
        for workers in [1, 2, 3, 8] {
            let records = score_windows(&LengthMetric, &windows, &units, workers).unwrap();
            let indices: Vec<_> = records.iter().map(|r| r.window_index).collect();
            assert_eq!(indices, (0..windows.len()).collect::<Vec<_>>());
            assert_eq!(records[0].count("chars"), 3);
            assert_eq!(records[5].token_count, 1);
        }
    }

    #[test]
    fn test_earliest_failure_is_reported() {
        let (windows, units) = sample_windows(1);
        let err = score_windows(&FailOn(4), &windows, &units, 4).unwrap_err();
        assert_eq!(err.to_string(), "annotator backend failed: window 4");
    }

    #[test]
    fn test_no_windows_no_records() {
        let records = score_windows(&LengthMetric, &[], &[], 0).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_pattern_metric_counts_word_boundaries() {
        let patterns = PatternSet::new(["né", "tipo assim"]).unwrap();
        let haystack = normalize_for_matching("Né? Ele era, tipo assim, pequeno né");
        let units = whitespace_units(&haystack);
        let window = Window {
            window_index: 0,
            start_offset: 0,
            token_count: units.len(),
        };
        let record = PatternMetric::new(&patterns, &haystack).measure(&window, &units).unwrap();
        assert_eq!(record.count(PatternMetric::MATCHES), 3);
    }

    #[test]
    fn test_phrase_across_window_boundary_counts_in_first_window() {
        let patterns = PatternSet::new(["de repente"]).unwrap();
        let haystack = normalize_for_matching("a b c de repente x y z");
        let units = whitespace_units(&haystack);
        let windows: Vec<_> = Windower::new(4, TailPolicy::Keep).windows(units.len()).collect();
        let metric = PatternMetric::new(&patterns, &haystack);

        let records = score_windows(&metric, &windows, &units, 2).unwrap();
        let counts: Vec<_> = records.iter().map(|r| r.count(PatternMetric::MATCHES)).collect();
        assert_eq!(counts, vec![1, 0]);
        assert_eq!(metric.total(), 1);
    }

    #[test]
    fn test_record_accessors_default_to_zero() {
        let record = MetricRecord::new(3, 10).with_real("compound", -0.5).with_count("hits", 2);
        assert_eq!(record.value("compound"), -0.5);
        assert_eq!(record.count("compound"), 0);
        assert_eq!(record.value("hits"), 2.0);
        assert_eq!(record.value("missing"), 0.0);
    }
}
