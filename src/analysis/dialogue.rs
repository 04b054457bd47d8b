// Dialogue distribution (who speaks) and character interactions (who appears near whom).

use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::{word_spans, WordSpan};
use crate::config::DialogueConfig;
use crate::error::{CadenceError, Result};
use crate::lexicon::{self, Lexicon};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerLines {
    pub name: String,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Alphabetically ordered pair
    pub pair: (String, String),
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueReport {
    pub interaction_window: usize,
    /// Candidate character names, sorted
    pub names: Vec<String>,
    /// Attributed speech lines per speaker, most talkative first
    pub speakers: Vec<SpeakerLines>,
    /// Speech spans with no candidate name close enough
    pub unattributed: usize,
    /// Strongest connections first, truncated to the configured top
    pub interactions: Vec<Interaction>,
}

fn quote_regex() -> Result<Regex> {
    Regex::new(r#""[^"\n]+"|“[^”\n]+”"#).map_err(|e| CadenceError::Config {
        path: "<dialogue quotes>".into(),
        message: e.to_string(),
    })
}

fn is_candidate(span: &WordSpan<'_>, names: &BTreeSet<&str>) -> bool {
    names.contains(span.text)
}

/// Count descending, ties by name ascending
fn ranked<K: Ord + Clone>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut items: Vec<(K, usize)> = counts.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

pub fn dialogue_report(text: &str, lexicon: &Lexicon, config: &DialogueConfig) -> Result<DialogueReport> {
    let spans = word_spans(text);
    let names: BTreeSet<&str> = spans
        .iter()
        .filter(|s| s.is_capitalized() && !s.sentence_initial)
        .map(|s| s.text)
        .filter(|w| w.chars().count() >= config.min_name_length)
        .filter(|w| !lexicon.contains(lexicon::STOPWORDS, &w.to_lowercase()))
        .collect();

    // Quoted speech: nearest name among the words just before the opening quote
    let mut speakers: Vec<Option<&str>> = Vec::new();
    for quote in quote_regex()?.find_iter(text) {
        let before = spans.partition_point(|s| s.start < quote.start());
        let from = before.saturating_sub(config.speaker_lookback + 1);
        speakers.push(
            spans[from..before]
                .iter()
                .rev()
                .find(|s| is_candidate(s, &names))
                .map(|s| s.text),
        );
    }

    // Dash-opened lines: first name on the line
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let line_end = line_start + line.len();
        if line.trim_start().starts_with('—') {
            let first = spans.partition_point(|s| s.start < line_start);
            speakers.push(
                spans[first..]
                    .iter()
                    .take_while(|s| s.start < line_end)
                    .find(|s| is_candidate(s, &names))
                    .map(|s| s.text),
            );
        }
        line_start = line_end;
    }

    let mut speech: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unattributed = 0;
    for speaker in speakers {
        match speaker {
            Some(name) => *speech.entry(name).or_insert(0) += 1,
            None => unattributed += 1,
        }
    }

    // Interactions: distinct names at most `interaction_window` words apart
    let occurrences: Vec<&WordSpan<'_>> = spans.iter().filter(|s| is_candidate(s, &names)).collect();
    let mut pairs: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (i, a) in occurrences.iter().enumerate() {
        for b in &occurrences[i + 1..] {
            if b.index - a.index > config.interaction_window {
                break;
            }
            if a.text != b.text {
                let key = if a.text < b.text {
                    (a.text.to_string(), b.text.to_string())
                } else {
                    (b.text.to_string(), a.text.to_string())
                };
                *pairs.entry(key).or_insert(0) += 1;
            }
        }
    }
    debug!(
        "Dialogue: {} names, {} speech lines, {} interacting pairs",
        names.len(),
        speech.values().sum::<usize>(),
        pairs.len()
    );

    Ok(DialogueReport {
        interaction_window: config.interaction_window,
        names: names.iter().map(|n| n.to_string()).collect(),
        speakers: ranked(speech)
            .into_iter()
            .map(|(name, lines)| SpeakerLines {
                name: name.to_string(),
                lines,
            })
            .collect(),
        unattributed,
        interactions: ranked(pairs)
            .into_iter()
            .take(config.top_pairs)
            .map(|(pair, count)| Interaction { pair, count })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(text: &str, config: &DialogueConfig) -> DialogueReport {
        dialogue_report(text, &Lexicon::builtin().unwrap(), config).unwrap()
    }

    const SCENE: &str = "Então Kaelin viu Alara na taverna. Disse Kaelin: \"Vamos sair daqui.\"\n\
        Depois Alara chamou Brynn. Perguntou Alara \"Você vem?\"\n\
        — Claro — respondeu Brynn, olhando para Kaelin.\n";

    #[test]
    fn test_speech_attribution() {
        let report = report(SCENE, &DialogueConfig::default());
        assert_eq!(report.names, vec!["Alara", "Brynn", "Kaelin"]);
        let speakers: Vec<_> = report.speakers.iter().map(|s| (s.name.as_str(), s.lines)).collect();
        assert_eq!(speakers, vec![("Alara", 1), ("Brynn", 1), ("Kaelin", 1)]);
        assert_eq!(report.unattributed, 0);
    }

    #[test]
    fn test_interactions_respect_window() {
        let config = DialogueConfig {
            interaction_window: 3,
            ..DialogueConfig::default()
        };
        let report = report("Viu Kaelin e Alara. Muito longe dali, muito tempo depois, Brynn.", &config);
        assert_eq!(
            report.interactions,
            vec![Interaction {
                pair: ("Alara".into(), "Kaelin".into()),
                count: 1
            }]
        );
    }

    #[test]
    fn test_self_pairs_ignored_and_top_pairs_truncated() {
        let config = DialogueConfig {
            top_pairs: 1,
            ..DialogueConfig::default()
        };
        let report = report("Viu Kaelin, Kaelin e Alara; viu Brynn e Alara e Brynn.", &config);
        assert_eq!(report.interactions.len(), 1);
        assert!(report.interactions.iter().all(|i| i.pair.0 != i.pair.1));
    }

    #[test]
    fn test_unattributed_speech() {
        let report = report("Ninguém sabia. \"Quem está aí?\"", &DialogueConfig::default());
        assert!(report.speakers.is_empty());
        assert_eq!(report.unattributed, 1);
    }
}
