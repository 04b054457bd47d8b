// Rule tables as data: first-match band classification, additive score cards
// and independent alert tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Anything that can answer "what is the value of metric X"
pub trait MetricSource {
    fn metric(&self, name: &str) -> Option<f64>;
}

impl MetricSource for BTreeMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<S: MetricSource + ?Sized> MetricSource for &S {
    fn metric(&self, name: &str) -> Option<f64> {
        (**self).metric(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Eq => (left - right).abs() < f64::EPSILON,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
        }
    }
}

/// `metric op value`. A metric the source does not know never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: String,
    pub op: Comparison,
    pub value: f64,
}

impl Condition {
    pub fn new(metric: &str, op: Comparison, value: f64) -> Self {
        Self {
            metric: metric.to_string(),
            op,
            value,
        }
    }

    pub fn holds(&self, source: &dyn MetricSource) -> bool {
        source
            .metric(&self.metric)
            .is_some_and(|v| self.op.holds(v, self.value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.metric, self.op.symbol(), self.value)
    }
}

fn all_hold(conditions: &[Condition], source: &dyn MetricSource) -> bool {
    conditions.iter().all(|c| c.holds(source))
}

/// Outcome of a band table lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Classification {
    Band(String),
    InsufficientData,
    Unclassified,
}

impl Classification {
    pub fn label(&self) -> &str {
        match self {
            Classification::Band(label) => label,
            Classification::InsufficientData => "Insufficient data",
            Classification::Unclassified => "Unclassified",
        }
    }

    pub fn is_band(&self, label: &str) -> bool {
        matches!(self, Classification::Band(l) if l == label)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A band and the conjunction of conditions selecting it. No conditions = catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRule {
    pub label: String,
    #[serde(default)]
    pub when: Vec<Condition>,
}

impl BandRule {
    pub fn new(label: &str, when: Vec<Condition>) -> Self {
        Self {
            label: label.to_string(),
            when,
        }
    }
}

/// Ordered band rules, first match wins. When every guard condition holds the
/// result is `InsufficientData` regardless of the rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    #[serde(default)]
    pub guard: Vec<Condition>,
    #[serde(default)]
    pub rules: Vec<BandRule>,
}

impl BandTable {
    pub fn new(guard: Vec<Condition>, rules: Vec<BandRule>) -> Self {
        Self { guard, rules }
    }

    pub fn classify(&self, source: &dyn MetricSource) -> Classification {
        if !self.guard.is_empty() && all_hold(&self.guard, source) {
            return Classification::InsufficientData;
        }
        self.rules
            .iter()
            .find(|rule| all_hold(&rule.when, source))
            .map(|rule| Classification::Band(rule.label.clone()))
            .unwrap_or(Classification::Unclassified)
    }
}

/// An additive adjustment applied when every condition holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRule {
    pub name: String,
    pub when: Vec<Condition>,
    pub adjustment: f64,
}

impl ScoreRule {
    pub fn new(name: &str, when: Vec<Condition>, adjustment: f64) -> Self {
        Self {
            name: name.to_string(),
            when,
            adjustment,
        }
    }
}

/// Baseline plus independent adjustments, clamped into `[min, max]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub baseline: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    #[serde(default)]
    pub rules: Vec<ScoreRule>,
}

fn default_max() -> f64 {
    100.0
}

impl Default for ScoreCard {
    fn default() -> Self {
        Self {
            baseline: 50.0,
            min: 0.0,
            max: 100.0,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    /// Unclamped sum
    pub raw: f64,
    /// Names of the rules that fired, in table order
    pub applied: Vec<String>,
}

impl ScoreCard {
    pub fn score(&self, source: &dyn MetricSource) -> Score {
        let mut raw = self.baseline;
        let mut applied = Vec::new();
        for rule in &self.rules {
            if all_hold(&rule.when, source) {
                raw += rule.adjustment;
                applied.push(rule.name.clone());
            }
        }
        Score {
            value: raw.clamp(self.min, self.max),
            raw,
            applied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub when: Vec<Condition>,
    pub message: String,
}

impl AlertRule {
    pub fn new(when: Vec<Condition>, message: &str) -> Self {
        Self {
            when,
            message: message.to_string(),
        }
    }
}

/// Every matching rule contributes its message; no match yields the fallback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertTable {
    #[serde(default)]
    pub rules: Vec<AlertRule>,
    #[serde(default)]
    pub fallback: String,
}

impl AlertTable {
    pub fn evaluate(&self, source: &dyn MetricSource) -> Vec<String> {
        let messages: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| all_hold(&rule.when, source))
            .map(|rule| rule.message.clone())
            .collect();
        if messages.is_empty() && !self.fallback.is_empty() {
            vec![self.fallback.clone()]
        } else {
            messages
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Comparison::{Ge, Gt, Le, Lt};

    fn source(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn monotony_table() -> BandTable {
        BandTable::new(
            vec![Condition::new("sentences", Le, 0.0)],
            vec![
                BandRule::new("Monotonous", vec![Condition::new("ir", Lt, 0.15), Condition::new("sw", Le, 1.0)]),
                BandRule::new("Moderate", vec![Condition::new("ir", Lt, 0.30)]),
                BandRule::new("Varied", vec![Condition::new("ir", Lt, 0.55)]),
                BandRule::new("Irregular", vec![]),
            ],
        )
    }

    #[test]
    fn test_first_matching_band_wins() {
        let table = monotony_table();
        let low_ir_many_switches = source(&[("sentences", 4.0), ("ir", 0.1), ("sw", 3.0)]);
        assert_eq!(table.classify(&low_ir_many_switches), Classification::Band("Moderate".into()));

        let flat = source(&[("sentences", 4.0), ("ir", 0.1), ("sw", 0.0)]);
        assert!(table.classify(&flat).is_band("Monotonous"));

        let wild = source(&[("sentences", 4.0), ("ir", 0.9), ("sw", 2.0)]);
        assert!(table.classify(&wild).is_band("Irregular"));
    }

    #[test]
    fn test_guard_yields_insufficient_data() {
        let empty = source(&[("sentences", 0.0), ("ir", 0.0), ("sw", 0.0)]);
        assert_eq!(monotony_table().classify(&empty), Classification::InsufficientData);
    }

    #[test]
    fn test_no_match_is_unclassified_and_missing_metrics_never_match() {
        let table = BandTable::new(vec![], vec![BandRule::new("High", vec![Condition::new("x", Gt, 1.0)])]);
        assert_eq!(table.classify(&source(&[])), Classification::Unclassified);
        assert_eq!(table.classify(&source(&[("x", 1.0)])), Classification::Unclassified);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let stats = source(&[("sentences", 3.0), ("ir", 0.42), ("sw", 1.0)]);
        let table = monotony_table();
        let first = table.classify(&stats);
        for _ in 0..10 {
            assert_eq!(table.classify(&stats), first);
        }
    }

    #[test]
    fn test_score_is_clamped_both_ways() {
        let card = ScoreCard {
            rules: vec![
                ScoreRule::new("big bonus", vec![Condition::new("good", Ge, 1.0)], 65.0),
                ScoreRule::new("big penalty", vec![Condition::new("bad", Ge, 1.0)], -70.0),
            ],
            ..ScoreCard::default()
        };

        let high = card.score(&source(&[("good", 1.0)]));
        assert_eq!(high.raw, 115.0);
        assert_eq!(high.value, 100.0);
        assert_eq!(high.applied, vec!["big bonus".to_string()]);

        let low = card.score(&source(&[("bad", 1.0)]));
        assert_eq!(low.raw, -20.0);
        assert_eq!(low.value, 0.0);

        assert_eq!(card.score(&source(&[])).value, 50.0);
    }

    #[test]
    fn test_alerts_are_independent_with_fallback() {
        let table = AlertTable {
            rules: vec![
                AlertRule::new(vec![Condition::new("n_v", Lt, 0.8)], "too verbal"),
                AlertRule::new(vec![Condition::new("adj_n", Gt, 0.22)], "too ornate"),
            ],
            fallback: "balanced".into(),
        };
        assert_eq!(
            table.evaluate(&source(&[("n_v", 0.5), ("adj_n", 0.3)])),
            vec!["too verbal", "too ornate"]
        );
        assert_eq!(table.evaluate(&source(&[("n_v", 1.0), ("adj_n", 0.1)])), vec!["balanced"]);
    }

    #[test]
    fn test_tables_load_from_toml() {
        let table: BandTable = toml::from_str(
            r#"
            guard = [{ metric = "words", op = "le", value = 0 }]
            [[rules]]
            label = "Dense"
            when = [{ metric = "ratio", op = "ge", value = 2.5 }]
            [[rules]]
            label = "Sparse"
            "#,
        )
        .unwrap();
        assert!(table.classify(&source(&[("words", 9.0), ("ratio", 3.0)])).is_band("Dense"));
        assert!(table.classify(&source(&[("words", 9.0), ("ratio", 1.0)])).is_band("Sparse"));
        assert_eq!(table.guard[0].to_string(), "words <= 0");
    }
}
