// Phonetic figures: alliteration (shared first phoneme) and assonance (shared
// principal vowel) across runs of consecutive words within a sentence.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AnnotationError;
use crate::phonetics::{principal_vowel, Phonemizer};
use crate::sentence_detector::SentenceDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureKind {
    Alliteration,
    Assonance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundFigure {
    pub kind: FigureKind,
    /// The phoneme or vowel the run shares
    pub key: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceFigures {
    /// 1-based position of the sentence in the text
    pub number: usize,
    pub sentence: String,
    pub figures: Vec<SoundFigure>,
}

impl SentenceFigures {
    pub fn of_kind(&self, kind: FigureKind) -> impl Iterator<Item = &SoundFigure> {
        self.figures.iter().filter(move |f| f.kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundReport {
    pub sentences: usize,
    pub alliterations: usize,
    pub assonances: usize,
    /// Only sentences with at least one figure
    pub figures: Vec<SentenceFigures>,
}

/// Maximal runs (length >= 2) of consecutive words sharing a non-empty key
fn runs(kind: FigureKind, words: &[&str], keys: &[Option<String>]) -> Vec<SoundFigure> {
    let mut figures = Vec::new();
    let mut start = 0;
    for i in 1..=words.len() {
        let continues = i < words.len() && keys[i].is_some() && keys[i] == keys[i - 1];
        if continues {
            continue;
        }
        if i - start > 1 {
            if let Some(key) = &keys[start] {
                figures.push(SoundFigure {
                    kind,
                    key: key.clone(),
                    words: words[start..i].iter().map(|w| w.to_string()).collect(),
                });
            }
        }
        start = i;
    }
    figures
}

pub fn sound_report(
    text: &str,
    detector: &SentenceDetector,
    phonemizer: &dyn Phonemizer,
) -> Result<SoundReport, AnnotationError> {
    let sentences = detector.detect(text);
    let mut report = SoundReport {
        sentences: sentences.len(),
        ..SoundReport::default()
    };

    for sentence in &sentences {
        let words: Vec<&str> = sentence
            .raw()
            .split_whitespace()
            .filter(|w| w.chars().any(char::is_alphabetic))
            .collect();
        if words.len() < 2 {
            continue;
        }

        let phonemes = words
            .iter()
            .map(|w| phonemizer.first_phoneme(&w.to_lowercase()))
            .collect::<Result<Vec<_>, _>>()?;
        let vowels: Vec<Option<String>> = words
            .iter()
            .map(|w| principal_vowel(w).map(String::from))
            .collect();

        let mut figures = runs(FigureKind::Alliteration, &words, &phonemes);
        figures.extend(runs(FigureKind::Assonance, &words, &vowels));
        if figures.is_empty() {
            continue;
        }
        report.alliterations += figures.iter().filter(|f| f.kind == FigureKind::Alliteration).count();
        report.assonances += figures.iter().filter(|f| f.kind == FigureKind::Assonance).count();
        report.figures.push(SentenceFigures {
            number: sentence.index + 1,
            sentence: sentence.normalize(),
            figures,
        });
    }
    info!(
        "Sound figures: {} alliterations, {} assonances in {} of {} sentences",
        report.alliterations,
        report.assonances,
        report.figures.len(),
        report.sentences
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::OrthographicPhonemizer;

    fn report(text: &str) -> SoundReport {
        let detector = SentenceDetector::with_default_rules().unwrap();
        sound_report(text, &detector, &OrthographicPhonemizer).unwrap()
    }

    #[test]
    fn test_alliteration_run() {
        let report = report("O rato roeu a roupa. Nada aqui.");
        assert_eq!(report.sentences, 2);
        let first = &report.figures[0];
        assert_eq!(first.number, 1);
        let alliterations: Vec<_> = first.of_kind(FigureKind::Alliteration).collect();
        assert_eq!(alliterations.len(), 1);
        assert_eq!(alliterations[0].words, vec!["rato", "roeu"]);
        assert_eq!(alliterations[0].key, "x");
    }

    #[test]
    fn test_assonance_and_sentence_numbering() {
        let report = report("Sol e luz. Casa, mala, faca.");
        assert_eq!(report.figures.len(), 1);
        let figures = &report.figures[0];
        assert_eq!(figures.number, 2);
        let assonance: Vec<_> = figures.of_kind(FigureKind::Assonance).collect();
        assert_eq!(assonance[0].words, vec!["Casa,", "mala,", "faca."]);
        assert_eq!(assonance[0].key, "a");
        assert_eq!(report.assonances, 1);
    }

    #[test]
    fn test_phonemizer_failure_propagates() {
        struct Mute;
        impl Phonemizer for Mute {
            fn phonemes(&self, _word: &str) -> Result<Vec<String>, AnnotationError> {
                Err(AnnotationError::Rejected("no voice".into()))
            }
        }
        let detector = SentenceDetector::with_default_rules().unwrap();
        assert!(sound_report("Duas palavras.", &detector, &Mute).is_err());
    }

    #[test]
    fn test_no_figures() {
        let report = report("Um cão.");
        assert!(report.figures.is_empty());
        assert_eq!(report.alliterations, 0);
    }
}
