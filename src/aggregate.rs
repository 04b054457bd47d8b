// Folding per-window records into totals, then re-deriving ratios from the summed parts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::MetricSource;
use crate::metrics::{MetricRecord, MetricValue};

/// Pseudo-field: number of records folded in
pub const RECORDS: &str = "records";
/// Pseudo-field: number of units (tokens) covered by the folded records
pub const UNITS: &str = "units";

/// A ratio recomputed as `scale * Σnumerator / Σdenominator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSpec {
    pub name: String,
    pub numerator: Vec<String>,
    pub denominator: Vec<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl RatioSpec {
    pub fn new(name: &str, numerator: &[&str], denominator: &[&str], scale: f64) -> Self {
        Self {
            name: name.to_string(),
            numerator: numerator.iter().map(|s| s.to_string()).collect(),
            denominator: denominator.iter().map(|s| s.to_string()).collect(),
            scale,
        }
    }

    fn evaluate(&self, totals: &Totals) -> f64 {
        let num: f64 = self.numerator.iter().map(|f| totals.field(f)).sum();
        let den: f64 = self.denominator.iter().map(|f| totals.field(f)).sum();
        if den == 0.0 {
            0.0
        } else {
            self.scale * num / den
        }
    }
}

/// Summed components. Merging two `Totals` is associative and commutative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub counts: BTreeMap<String, u64>,
    pub sums: BTreeMap<String, f64>,
    pub records: u64,
    pub units: u64,
}

impl Totals {
    pub fn add_record(&mut self, record: &MetricRecord) {
        self.records += 1;
        self.units += record.token_count as u64;
        for (name, value) in &record.values {
            match *value {
                MetricValue::Count(n) => *self.counts.entry(name.clone()).or_insert(0) += n,
                MetricValue::Real(x) => *self.sums.entry(name.clone()).or_insert(0.0) += x,
            }
        }
    }

    pub fn merge(&mut self, other: &Totals) {
        self.records += other.records;
        self.units += other.units;
        for (name, n) in &other.counts {
            *self.counts.entry(name.clone()).or_insert(0) += n;
        }
        for (name, x) in &other.sums {
            *self.sums.entry(name.clone()).or_insert(0.0) += x;
        }
    }

    /// Summed value of a field (count, real sum or pseudo-field), zero when absent
    pub fn field(&self, name: &str) -> f64 {
        match name {
            RECORDS => self.records as f64,
            UNITS => self.units as f64,
            _ => self
                .counts
                .get(name)
                .map(|&n| n as f64)
                .or_else(|| self.sums.get(name).copied())
                .unwrap_or(0.0),
        }
    }
}

/// Totals plus the ratios derived from them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub totals: Totals,
    pub ratios: BTreeMap<String, f64>,
}

impl AggregateStats {
    pub fn count(&self, name: &str) -> u64 {
        match name {
            RECORDS => self.totals.records,
            UNITS => self.totals.units,
            _ => self.totals.counts.get(name).copied().unwrap_or(0),
        }
    }

    pub fn ratio(&self, name: &str) -> f64 {
        self.ratios.get(name).copied().unwrap_or(0.0)
    }

    /// A ratio if one is defined under `name`, else the summed field
    pub fn value(&self, name: &str) -> f64 {
        self.ratios
            .get(name)
            .copied()
            .unwrap_or_else(|| self.totals.field(name))
    }

    /// True when nothing was folded in
    pub fn is_empty(&self) -> bool {
        self.totals.records == 0
    }
}

impl MetricSource for AggregateStats {
    fn metric(&self, name: &str) -> Option<f64> {
        if let Some(r) = self.ratios.get(name) {
            return Some(*r);
        }
        match name {
            RECORDS | UNITS => Some(self.totals.field(name)),
            _ => self
                .totals
                .counts
                .get(name)
                .map(|&n| n as f64)
                .or_else(|| self.totals.sums.get(name).copied()),
        }
    }
}

/// The one place where "sum fields, then recompute ratios" lives
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    specs: Vec<RatioSpec>,
}

impl Aggregator {
    pub fn new(specs: Vec<RatioSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[RatioSpec] {
        &self.specs
    }

    /// Fold records (any order) into totals and derived ratios
    pub fn fold<'a, I>(&self, records: I) -> AggregateStats
    where
        I: IntoIterator<Item = &'a MetricRecord>,
    {
        let mut totals = Totals::default();
        for record in records {
            totals.add_record(record);
        }
        self.derive(totals)
    }

    pub fn derive(&self, totals: Totals) -> AggregateStats {
        let ratios = self
            .specs
            .iter()
            .map(|spec| (spec.name.clone(), spec.evaluate(&totals)))
            .collect();
        AggregateStats { totals, ratios }
    }

    /// Merge partial aggregates (e.g. per-chapter) and re-derive every ratio
    pub fn combine<'a, I>(&self, parts: I) -> AggregateStats
    where
        I: IntoIterator<Item = &'a AggregateStats>,
    {
        let mut totals = Totals::default();
        for part in parts {
            totals.merge(&part.totals);
        }
        self.derive(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, tokens: usize, hits: u64) -> MetricRecord {
        MetricRecord::new(index, tokens).with_count("hits", hits)
    }

    fn rate_aggregator() -> Aggregator {
        Aggregator::new(vec![RatioSpec::new("per_1000", &["hits"], &[UNITS], 1000.0)])
    }

    #[test]
    fn test_ratio_recomputed_from_sums_not_averaged() {
        // 10 hits in 1000 words and 1 hit in 10 words
        let records = [record(0, 1000, 10), record(1, 10, 1)];
        let stats = rate_aggregator().fold(&records);

        let expected = 1000.0 * 11.0 / 1010.0;
        assert!((stats.ratio("per_1000") - expected).abs() < 1e-9);

        let mean_of_rates = (10.0 + 100.0) / 2.0;
        assert!((stats.ratio("per_1000") - mean_of_rates).abs() > 1.0);
    }

    #[test]
    fn test_empty_fold_is_zero() {
        let stats = rate_aggregator().fold(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.count("hits"), 0);
        assert_eq!(stats.ratio("per_1000"), 0.0);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = rate_aggregator().fold(&[record(0, 100, 3)]);
        let b = rate_aggregator().fold(&[record(1, 50, 1), record(2, 50, 4)]);
        let c = rate_aggregator().fold(&[record(3, 7, 0)]);

        let left = rate_aggregator().combine([&a, &b, &c]);
        let right = rate_aggregator().combine([&c, &a, &b]);
        let flat = rate_aggregator().fold(&[
            record(0, 100, 3),
            record(1, 50, 1),
            record(2, 50, 4),
            record(3, 7, 0),
        ]);

        assert_eq!(left, right);
        assert_eq!(left, flat);
        assert_eq!(left.count(RECORDS), 4);
        assert_eq!(left.count(UNITS), 207);
    }

    #[test]
    fn test_real_fields_sum_and_average_over_records() {
        let aggregator = Aggregator::new(vec![RatioSpec::new("mean", &["compound"], &[RECORDS], 1.0)]);
        let records = [
            MetricRecord::new(0, 5).with_real("compound", 0.5),
            MetricRecord::new(1, 5).with_real("compound", -0.1),
        ];
        let stats = aggregator.fold(&records);
        assert!((stats.ratio("mean") - 0.2).abs() < 1e-12);
        assert_eq!(stats.metric("compound"), Some(0.4));
        assert_eq!(stats.metric("nothing"), None);
    }

    #[test]
    fn test_multi_field_numerators() {
        let aggregator = Aggregator::new(vec![RatioSpec::new("share", &["a", "b"], &["total"], 100.0)]);
        let records = [MetricRecord::new(0, 1)
            .with_count("a", 1)
            .with_count("b", 2)
            .with_count("total", 12)];
        assert_eq!(aggregator.fold(&records).ratio("share"), 25.0);
    }
}
