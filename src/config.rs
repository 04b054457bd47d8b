// Analysis configuration: every threshold and rule table, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::aggregate::RECORDS;
use crate::classify::{
    AlertRule, AlertTable, BandRule, BandTable, Comparison,
    Comparison::{Ge, Gt, Le, Lt},
    Condition, ScoreCard, ScoreRule,
};
use crate::error::{CadenceError, Result};
use crate::window::TailPolicy;

pub const DEFAULT_CHAPTER_HEADING: &str = r"(?im)^[ \t]*cap[íi]tulo\b[^\n]*";

fn when(metric: &str, op: Comparison, value: f64) -> Vec<Condition> {
    vec![Condition::new(metric, op, value)]
}

/// Window layout shared by the windowed analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub size: usize,
    pub tail: TailPolicy,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            tail: TailPolicy::Keep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcConfig {
    /// Bands over the mean compound score of all windows
    pub tone_bands: BandTable,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            tone_bands: BandTable::new(
                when(RECORDS, Le, 0.0),
                vec![
                    BandRule::new("Positive", when("mean_compound", Ge, 0.05)),
                    BandRule::new("Negative", when("mean_compound", Le, -0.05)),
                    BandRule::new("Neutral", vec![]),
                ],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Minimum total occurrences before a name group is reported
    pub min_occurrences: usize,
    /// Base names shorter than this are ignored
    pub min_length: usize,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 5,
            min_length: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Two names within this many words of each other count as an interaction
    pub interaction_window: usize,
    /// Words before a quote searched for the speaker's name
    pub speaker_lookback: usize,
    pub min_name_length: usize,
    pub top_pairs: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            interaction_window: 50,
            speaker_lookback: 5,
            min_name_length: 4,
            top_pairs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemesConfig {
    pub min_word_length: usize,
    pub top_n: usize,
    /// Extra words excluded on top of the lexicon stopwords
    pub exclude: Vec<String>,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            min_word_length: 3,
            top_n: 50,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrutchesConfig {
    /// Phrases added to the lexicon's filler list
    pub extra_phrases: Vec<String>,
    /// Window size for the per-window rate series
    pub window_size: usize,
    /// Turning-point threshold on the per-1000-words rate series
    pub rate_threshold: f64,
}

impl Default for CrutchesConfig {
    fn default() -> Self {
        Self {
            extra_phrases: Vec::new(),
            window_size: 1000,
            rate_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassesConfig {
    /// Tokens searched after a nominalizing verb for determiner + deverbal noun
    pub nominalization_lookahead: usize,
    pub pace_bands: BandTable,
    pub adjective_bands: BandTable,
    pub alerts: AlertTable,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        let guard = when("tokens", Le, 0.0);
        Self {
            nominalization_lookahead: 4,
            pace_bands: BandTable::new(
                guard.clone(),
                vec![
                    BandRule::new("Verbal", when("n_v", Lt, 0.8)),
                    BandRule::new("Balanced", when("n_v", Le, 1.2)),
                    BandRule::new("Literary", when("n_v", Le, 1.8)),
                    BandRule::new("Static", vec![]),
                ],
            ),
            adjective_bands: BandTable::new(
                guard,
                vec![
                    BandRule::new("Economical", when("adj_n", Lt, 0.08)),
                    BandRule::new("Balanced", when("adj_n", Lt, 0.15)),
                    BandRule::new("Lyrical", when("adj_n", Le, 0.22)),
                    BandRule::new("Ornate", vec![]),
                ],
            ),
            alerts: AlertTable {
                rules: vec![
                    AlertRule::new(when("n_v", Lt, 0.8), "N/V below 0.8: fast, verb-driven narration."),
                    AlertRule::new(when("n_v", Gt, 1.8), "N/V above 1.8: noun-heavy, possibly over-descriptive prose."),
                    AlertRule::new(when("adj_n", Gt, 0.22), "ADJ/N above 0.22: heavy adjectivation."),
                    AlertRule::new(when("adj_n", Lt, 0.06), "ADJ/N below 0.06: dry or minimalist style."),
                    AlertRule::new(when("verb_density_pct", Lt, 10.0), "Few verbs: slow, contemplative narration."),
                    AlertRule::new(when("verb_density_pct", Gt, 22.0), "Many verbs: frantic or hurried narration."),
                    AlertRule::new(when("adj_per_1000", Gt, 120.0), "Adjectives per 1000 words above 120: florid prose."),
                    AlertRule::new(when("adj_per_1000", Lt, 50.0), "Adjectives per 1000 words below 50: very dry prose."),
                    AlertRule::new(when("abstract_pct", Gt, 60.0), "Over 60% of nouns look abstract: conceptual, essay-like text."),
                    AlertRule::new(when("abstract_pct", Lt, 25.0), "Under 25% of nouns look abstract: little abstraction."),
                    AlertRule::new(when("gerund_pct", Gt, 10.0), "High gerund use: sentences may drag."),
                    AlertRule::new(
                        when("nominalizations_per_10k", Gt, 30.0),
                        "Frequent nominalizations ('fazer uma caminhada' instead of 'caminhar').",
                    ),
                ],
                fallback: "Balanced distribution. Nothing critical detected.".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Sentences shorter than this many words are Short
    pub short_below: usize,
    /// Sentences up to this many words are Medium; longer ones are Long
    pub medium_max: usize,
    pub paragraph_bands: BandTable,
    /// Bands over the share of monotonous paragraphs
    pub document_bands: BandTable,
    /// Turning-point threshold on the per-paragraph rhythm index series
    pub shift_threshold: f64,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            short_below: 10,
            medium_max: 20,
            paragraph_bands: BandTable::new(
                when("sentences", Le, 0.0),
                vec![
                    BandRule::new(
                        "Monotonous",
                        vec![Condition::new("ir", Lt, 0.15), Condition::new("sw", Le, 1.0)],
                    ),
                    BandRule::new("Moderate", when("ir", Lt, 0.30)),
                    BandRule::new("Varied", when("ir", Lt, 0.55)),
                    BandRule::new("Irregular", vec![]),
                ],
            ),
            document_bands: BandTable::new(
                when(RECORDS, Le, 0.0),
                vec![
                    BandRule::new("Predominantly monotonous", when("monotonous_pct", Ge, 50.0)),
                    BandRule::new("Partly monotonous", when("monotonous_pct", Ge, 20.0)),
                    BandRule::new("Rhythmically varied", vec![]),
                ],
            ),
            shift_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Block size for lexical density; partial blocks are dropped
    pub density_block: usize,
    pub top_words: usize,
    /// Remove quoted speech and dash lines before analysis
    pub strip_dialogue: bool,
    pub score: ScoreCard,
    pub diagnostics: AlertTable,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let score = ScoreCard {
            baseline: 50.0,
            min: 0.0,
            max: 100.0,
            rules: vec![
                ScoreRule::new(
                    "ttr in 0.20..=0.40",
                    vec![Condition::new("ttr", Ge, 0.20), Condition::new("ttr", Le, 0.40)],
                    10.0,
                ),
                ScoreRule::new("ttr < 0.18", when("ttr", Lt, 0.18), -5.0),
                ScoreRule::new("ttr > 0.45", when("ttr", Gt, 0.45), -5.0),
                ScoreRule::new("mtld >= 50", when("mtld", Ge, 50.0), 10.0),
                ScoreRule::new("mtld < 30", when("mtld", Lt, 30.0), -5.0),
                ScoreRule::new("strong verbs >= 25%", when("strong_verb_ratio", Ge, 0.25), 10.0),
                ScoreRule::new(
                    "strong verbs < 10%",
                    vec![
                        Condition::new("strong_verb_ratio", Lt, 0.10),
                        Condition::new("lexicon_verbs", Gt, 0.0),
                    ],
                    -10.0,
                ),
                ScoreRule::new("-mente adverbs > 3%", when("adverb_rate", Gt, 0.03), -5.0),
                ScoreRule::new("repetition < 0.78", when("repetition", Lt, 0.78), 5.0),
                ScoreRule::new("repetition > 0.88", when("repetition", Gt, 0.88), -5.0),
                ScoreRule::new(
                    "mean sentence 12..=24 words",
                    vec![
                        Condition::new("mean_sentence_length", Ge, 12.0),
                        Condition::new("mean_sentence_length", Le, 24.0),
                    ],
                    5.0,
                ),
                ScoreRule::new("mean sentence > 32 words", when("mean_sentence_length", Gt, 32.0), -5.0),
                ScoreRule::new("mean sentence < 8 words", when("mean_sentence_length", Lt, 8.0), -5.0),
            ],
        };
        let diagnostics = AlertTable {
            rules: vec![
                AlertRule::new(when("ttr", Lt, 0.18), "Repetitive vocabulary (low TTR). Vary word choice."),
                AlertRule::new(when("ttr", Gt, 0.45), "Very high TTR. Watch for artificial-sounding prose."),
                AlertRule::new(when("adverbs", Gt, 25.0), "Heavy use of -mente adverbs."),
                AlertRule::new(when("weak_verb_rate", Gt, 0.06), "Many weak verbs. Narration may read as passive."),
                AlertRule::new(
                    when("mean_sentence_length", Gt, 28.0),
                    "Sentences are very long on average. Consider cuts and breaks.",
                ),
                AlertRule::new(
                    vec![
                        Condition::new("mean_sentence_length", Lt, 10.0),
                        Condition::new("mean_sentence_length", Gt, 0.0),
                    ],
                    "Sentences are very short on average. Risk of a telegraphic style.",
                ),
                AlertRule::new(when("repetition", Gt, 0.88), "High lexical repetition. The narrative may sag."),
                AlertRule::new(
                    vec![Condition::new("repetition", Lt, 0.75), Condition::new("words", Gt, 500.0)],
                    "Low repetition for a long text. Check for gratuitous variation.",
                ),
            ],
            fallback: "Stylistically healthy. No evident problem in the overall metrics.".to_string(),
        };
        Self {
            density_block: 100,
            top_words: 20,
            strip_dialogue: false,
            score,
            diagnostics,
        }
    }
}

/// Every tunable of a run. Missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Regex matching a chapter heading line
    pub chapter_heading: String,
    pub window: WindowConfig,
    /// Change-point threshold on the sentiment series; must be positive
    pub turning_point_threshold: f64,
    /// Worker threads for window scoring; 0 = one per CPU
    pub workers: usize,
    pub arc: ArcConfig,
    pub names: NamesConfig,
    pub dialogue: DialogueConfig,
    pub themes: ThemesConfig,
    pub crutches: CrutchesConfig,
    pub classes: ClassesConfig,
    pub rhythm: RhythmConfig,
    pub style: StyleConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chapter_heading: DEFAULT_CHAPTER_HEADING.to_string(),
            window: WindowConfig::default(),
            turning_point_threshold: 0.4,
            workers: 0,
            arc: ArcConfig::default(),
            names: NamesConfig::default(),
            dialogue: DialogueConfig::default(),
            themes: ThemesConfig::default(),
            crutches: CrutchesConfig::default(),
            classes: ClassesConfig::default(),
            rhythm: RhythmConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(contents).map_err(|e| CadenceError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CadenceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents, path)?;
        info!("Loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values no analysis can work with
    pub fn validate(&self, origin: &Path) -> Result<()> {
        let thresholds = [
            ("turning_point_threshold", self.turning_point_threshold),
            ("crutches.rate_threshold", self.crutches.rate_threshold),
            ("rhythm.shift_threshold", self.rhythm.shift_threshold),
        ];
        for (name, value) in thresholds {
            if !(value.is_finite() && value > 0.0) {
                return Err(CadenceError::Config {
                    path: origin.to_path_buf(),
                    message: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        if self.rhythm.short_below > self.rhythm.medium_max + 1 {
            return Err(CadenceError::Config {
                path: origin.to_path_buf(),
                message: format!(
                    "rhythm.short_below ({}) must not exceed rhythm.medium_max + 1 ({})",
                    self.rhythm.short_below,
                    self.rhythm.medium_max + 1
                ),
            });
        }
        Ok(())
    }
}
