// Proper-name spelling consistency: one base name written several ways.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::word_spans;
use crate::config::NamesConfig;
use crate::lexicon::{self, Lexicon};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVariant {
    pub spelling: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameGroup {
    /// Lowercase form shared by every variant
    pub base: String,
    pub total: usize,
    pub variants: Vec<NameVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameReport {
    pub min_occurrences: usize,
    /// Distinct base names considered
    pub candidates: usize,
    /// Groups with enough occurrences and more than one spelling, by base name
    pub inconsistencies: Vec<NameGroup>,
}

impl NameReport {
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Base names come from capitalized words at any position, minus stopwords and
/// short words. Every occurrence of a base, in any letter case, is then counted
/// under its exact spelling.
pub fn name_consistency(text: &str, lexicon: &Lexicon, config: &NamesConfig) -> NameReport {
    let spans = word_spans(text);

    let bases: BTreeSet<String> = spans
        .iter()
        .filter(|s| s.is_capitalized())
        .map(|s| s.text.to_lowercase())
        .filter(|base| base.chars().count() >= config.min_length)
        .filter(|base| !lexicon.contains(lexicon::STOPWORDS, base))
        .collect();

    let mut variants: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for span in &spans {
        let lower = span.text.to_lowercase();
        if let Some(base) = bases.get(&lower) {
            *variants
                .entry(base.as_str())
                .or_default()
                .entry(span.text)
                .or_insert(0) += 1;
        }
    }

    let inconsistencies: Vec<NameGroup> = variants
        .into_iter()
        .filter_map(|(base, spellings)| {
            let total: usize = spellings.values().sum();
            (total >= config.min_occurrences && spellings.len() > 1).then(|| NameGroup {
                base: base.to_string(),
                total,
                variants: spellings
                    .into_iter()
                    .map(|(spelling, count)| NameVariant {
                        spelling: spelling.to_string(),
                        count,
                    })
                    .collect(),
            })
        })
        .collect();
    debug!(
        "Name check: {} candidates, {} inconsistent",
        bases.len(),
        inconsistencies.len()
    );

    NameReport {
        min_occurrences: config.min_occurrences,
        candidates: bases.len(),
        inconsistencies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str, min_occurrences: usize) -> NameReport {
        let config = NamesConfig {
            min_occurrences,
            ..NamesConfig::default()
        };
        name_consistency(text, &Lexicon::builtin().unwrap(), &config)
    }

    #[test]
    fn test_only_frequent_multi_spelling_names_are_reported() {
        let mut text = String::new();
        for _ in 0..9 {
            text.push_str("Então Kaelin sorriu. ");
        }
        text.push_str("Ali estava kaelin outra vez. ");
        text.push_str("Viram Bryn. Viram Bryn. Viram Brynn.");

        let report = check(&text, 5);
        assert_eq!(report.inconsistencies.len(), 1);
        let group = &report.inconsistencies[0];
        assert_eq!(group.base, "kaelin");
        assert_eq!(group.total, 10);
        assert_eq!(
            group.variants,
            vec![
                NameVariant { spelling: "Kaelin".into(), count: 9 },
                NameVariant { spelling: "kaelin".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_names_opening_sentences_are_checked() {
        let mut text = "Kaelin sorriu. ".repeat(9);
        text.push_str("Depois kaelin saiu. Bryn correu. Bryn correu. Brynn correu.");

        let report = check(&text, 5);
        assert_eq!(report.inconsistencies.len(), 1);
        let group = &report.inconsistencies[0];
        assert_eq!(group.base, "kaelin");
        assert_eq!(group.total, 10);
        assert_eq!(group.variants.len(), 2);
    }

    #[test]
    fn test_capitalized_stopwords_are_not_names() {
        let report = check("Para casa. Para onde? Mesmo assim. para lá, mesmo.", 2);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_short_names_are_ignored() {
        let report = check("Viu Ana. Viu ana. Viu Ana. Viu ANA.", 1);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_groups_sorted_by_base() {
        let text = "Viu Zora e zora. Viu Alara e alara.";
        let report = check(text, 2);
        let bases: Vec<_> = report.inconsistencies.iter().map(|g| g.base.as_str()).collect();
        assert_eq!(bases, vec!["alara", "zora"]);
    }
}
