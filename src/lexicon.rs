// Word lists as data: category name -> set of lowercase entries, plus an inflection table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CadenceError, Result};

pub const STOPWORDS: &str = "stopwords";
pub const WEAK_VERBS: &str = "weak_verbs";
pub const STRONG_VERBS: &str = "strong_verbs";
pub const FILLER_PHRASES: &str = "filler_phrases";
pub const ABSTRACT_LEMMAS: &str = "abstract_lemmas";
pub const ABSTRACT_SUFFIXES: &str = "abstract_suffixes";
pub const DEVERBAL_SUFFIXES: &str = "deverbal_suffixes";
pub const NOMINALIZING_VERBS: &str = "nominalizing_verbs";
pub const DETERMINERS: &str = "determiners";
pub const PRONOUNS: &str = "pronouns";
pub const PREPOSITIONS: &str = "prepositions";
pub const CONJUNCTIONS: &str = "conjunctions";
pub const ADVERBS: &str = "adverbs";
pub const ADJECTIVES: &str = "adjectives";
pub const ADJECTIVE_SUFFIXES: &str = "adjective_suffixes";
pub const VERBS: &str = "verbs";
pub const POSITIVE: &str = "positive";
pub const NEGATIVE: &str = "negative";
pub const BOOSTERS: &str = "boosters";
pub const NEGATORS: &str = "negators";

const BUILTIN_PT: &str = include_str!("../data/lexicon_pt.toml");

static EMPTY: BTreeSet<String> = BTreeSet::new();

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    #[serde(default)]
    categories: BTreeMap<String, BTreeSet<String>>,
    /// Surface form -> lemma, consulted by the heuristic annotator
    #[serde(default)]
    inflections: BTreeMap<String, String>,
}

impl Lexicon {
    /// The embedded Portuguese lexicon
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PT, Path::new("<builtin lexicon>"))
    }

    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self> {
        let raw: Lexicon = toml::from_str(contents).map_err(|e| CadenceError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(raw.normalized())
    }

    /// Load a lexicon file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CadenceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let lexicon = Self::from_toml_str(&contents, path)?;
        info!(
            "Loaded lexicon {} with {} categories",
            path.display(),
            lexicon.categories.len()
        );
        Ok(lexicon)
    }

    /// Add every entry of `other` to this lexicon
    pub fn merge(mut self, other: Lexicon) -> Self {
        for (category, words) in other.categories {
            debug!("Merging {} entries into category {}", words.len(), category);
            self.categories.entry(category).or_default().extend(words);
        }
        self.inflections.extend(other.inflections);
        self
    }

    pub fn extend<I, S>(&mut self, category: &str, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.categories.entry(category.to_string()).or_default();
        set.extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
    }

    pub fn get(&self, category: &str) -> &BTreeSet<String> {
        self.categories.get(category).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, category: &str, word: &str) -> bool {
        self.get(category).contains(word)
    }

    /// True when `word` ends with any entry of a suffix category
    pub fn has_suffix(&self, category: &str, word: &str) -> bool {
        self.get(category).iter().any(|suffix| word.ends_with(suffix.as_str()))
    }

    pub fn lemma_of<'a>(&'a self, word: &'a str) -> &'a str {
        self.inflections.get(word).map(String::as_str).unwrap_or(word)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    fn normalized(self) -> Self {
        let categories = self
            .categories
            .into_iter()
            .map(|(name, words)| {
                let words = words
                    .into_iter()
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (name, words)
            })
            .collect();
        let inflections = self
            .inflections
            .into_iter()
            .map(|(form, lemma)| (form.to_lowercase(), lemma.to_lowercase()))
            .collect();
        Self {
            categories,
            inflections,
        }
    }
}
