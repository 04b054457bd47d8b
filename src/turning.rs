// Change-point detection over an ordered per-window series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::MetricRecord;

/// A jump between adjacent windows larger than the threshold, anchored at the later window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    pub from_window_index: usize,
    pub to_window_index: usize,
    pub delta: f64,
    pub value: f64,
}

/// Single pass over `values`. A point is emitted for every adjacent pair whose
/// absolute difference strictly exceeds `threshold`; bursts are not merged.
pub fn detect_turning_points(values: &[f64], threshold: f64) -> Vec<TurningPoint> {
    let points: Vec<TurningPoint> = values
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let delta = (pair[1] - pair[0]).abs();
            (delta > threshold).then_some(TurningPoint {
                from_window_index: i,
                to_window_index: i + 1,
                delta,
                value: pair[1],
            })
        })
        .collect();
    debug!(
        "Found {} turning points over {} values (threshold {})",
        points.len(),
        values.len(),
        threshold
    );
    points
}

/// The ordered series of one metric, zero where a record lacks it
pub fn series(records: &[MetricRecord], metric: &str) -> Vec<f64> {
    records.iter().map(|r| r.value(metric)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict_and_anchored_at_later_window() {
        let points = detect_turning_points(&[0.0, 0.39, 0.81], 0.4);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].from_window_index, 1);
        assert_eq!(points[0].to_window_index, 2);
        assert!((points[0].delta - 0.42).abs() < 1e-9);
        assert_eq!(points[0].value, 0.81);
    }

    #[test]
    fn test_equal_delta_is_not_a_turning_point() {
        assert!(detect_turning_points(&[0.0, 0.5], 0.5).is_empty());
    }

    #[test]
    fn test_short_series_have_no_points() {
        assert!(detect_turning_points(&[], 0.1).is_empty());
        assert!(detect_turning_points(&[0.9], 0.1).is_empty());
    }

    #[test]
    fn test_volatile_bursts_are_not_merged() {
        let points = detect_turning_points(&[0.0, 0.9, -0.9, 0.9], 0.4);
        let anchors: Vec<_> = points.iter().map(|p| p.to_window_index).collect();
        assert_eq!(anchors, vec![1, 2, 3]);
        assert!(points[1].delta > 1.7);
    }

    #[test]
    fn test_series_reads_metric_in_record_order() {
        let records = vec![
            MetricRecord::new(0, 3).with_real("compound", 0.2),
            MetricRecord::new(1, 3),
            MetricRecord::new(2, 3).with_real("compound", -0.4),
        ];
        assert_eq!(series(&records, "compound"), vec![0.2, 0.0, -0.4]);
    }
}
