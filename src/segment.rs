// Documents and their segments: chapter, paragraph or whole-text splits.

use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{CadenceError, Result};
use crate::sentence_detector::tidy_paragraph_breaks;

/// Title of the text before the first chapter heading
pub const PRELUDE_TITLE: &str = "Pré-texto";
/// Title of an unsplit text and of the concatenated global segment
pub const WHOLE_TEXT_TITLE: &str = "Texto completo";

/// The raw text of one run, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub title: String,
    pub text: String,
    pub order_index: usize,
}

impl Segment {
    pub fn new(title: impl Into<String>, text: impl Into<String>, order_index: usize) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            order_index,
        }
    }
}

/// Splits a text at chapter heading lines
pub struct ChapterSplitter {
    heading: Regex,
}

impl ChapterSplitter {
    pub fn new(pattern: &str) -> Result<Self> {
        let heading = Regex::new(pattern).map_err(|e| CadenceError::Config {
            path: PathBuf::from("chapter_heading"),
            message: format!("invalid chapter heading pattern '{pattern}': {e}"),
        })?;
        Ok(Self { heading })
    }

    /// One segment per chapter, with the heading line as title. Non-blank text
    /// before the first heading becomes a "Pré-texto" segment; a text without
    /// headings is one "Texto completo" segment.
    pub fn split(&self, text: &str) -> Vec<Segment> {
        let headings: Vec<_> = self.heading.find_iter(text).collect();
        if headings.is_empty() {
            return vec![Segment::new(WHOLE_TEXT_TITLE, text.trim(), 0)];
        }

        let mut segments = Vec::with_capacity(headings.len() + 1);
        let prelude = text[..headings[0].start()].trim();
        if !prelude.is_empty() {
            segments.push(Segment::new(PRELUDE_TITLE, prelude, 0));
        }
        for (i, heading) in headings.iter().enumerate() {
            let body_end = headings.get(i + 1).map_or(text.len(), |next| next.start());
            let title = text[heading.start()..heading.end()].trim();
            let body = text[heading.end()..body_end].trim();
            segments.push(Segment::new(title, body, segments.len()));
        }
        debug!("Split text into {} segments", segments.len());
        segments
    }
}

/// Non-empty trimmed lines
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// One segment per paragraph, titled by position
pub fn paragraph_segments(text: &str) -> Vec<Segment> {
    paragraphs(text)
        .into_iter()
        .enumerate()
        .map(|(i, p)| Segment::new(format!("§{}", i + 1), p, i))
        .collect()
}

/// Join segments into the global segment
pub fn concatenate(segments: &[Segment]) -> Segment {
    let text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    Segment::new(WHOLE_TEXT_TITLE, text, 0)
}

/// Normalize extracted text before splitting
pub fn clean_text(text: &str) -> String {
    tidy_paragraph_breaks(text)
}

/// Removes quoted speech and dash-opened dialogue lines, keeping the narration
pub struct DialogueStripper {
    quoted: Regex,
}

impl DialogueStripper {
    pub fn new() -> Result<Self> {
        let quoted = Regex::new(r#"["“”][^\n]*?["“”]"#).map_err(|e| CadenceError::Config {
            path: PathBuf::from("dialogue pattern"),
            message: e.to_string(),
        })?;
        Ok(Self { quoted })
    }

    pub fn strip(&self, text: &str) -> String {
        let mut unquoted = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.quoted.find_iter(text) {
            unquoted.push_str(&text[last..m.start()]);
            last = m.end();
        }
        unquoted.push_str(&text[last..]);

        unquoted
            .split('\n')
            .filter(|line| !line.trim_start().starts_with('—'))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CHAPTER_HEADING;

    fn splitter() -> ChapterSplitter {
        ChapterSplitter::new(DEFAULT_CHAPTER_HEADING).unwrap()
    }

    #[test]
    fn test_chapters_with_prelude() {
        let text = "Dedicatória.\n\nCAPÍTULO 1 - O início\nEra uma vez.\n\nCapitulo II\nFim.";
        let segments = splitter().split(text);
        let titles: Vec<_> = segments.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec![PRELUDE_TITLE, "CAPÍTULO 1 - O início", "Capitulo II"]);
        assert_eq!(segments[1].text, "Era uma vez.");
        assert_eq!(segments[2].text, "Fim.");
        let order: Vec<_> = segments.iter().map(|s| s.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_headings_gives_whole_text() {
        let segments = splitter().split("  Só um texto.\n");
        assert_eq!(segments, vec![Segment::new(WHOLE_TEXT_TITLE, "Só um texto.", 0)]);
    }

    #[test]
    fn test_heading_must_start_a_line() {
        let segments = splitter().split("Ele leu o capítulo 3 inteiro.\nCapítulos depois, nada.");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_invalid_heading_pattern_is_config_error() {
        assert!(matches!(ChapterSplitter::new("(unclosed"), Err(CadenceError::Config { .. })));
    }

    #[test]
    fn test_paragraphs_and_concatenation() {
        assert_eq!(paragraphs("um\n\n  dois  \n\t\ntrês"), vec!["um", "dois", "três"]);
        let joined = concatenate(&[Segment::new("a", "x", 0), Segment::new("b", "y", 1)]);
        assert_eq!(joined.text, "x\n\ny");
        assert_eq!(paragraph_segments("p1\np2")[1].title, "§2");
    }

    #[test]
    fn test_dialogue_is_stripped() {
        let text = "Ela disse “vamos embora” e saiu.\n— Espera! — gritou ele.\nA porta bateu.";
        let stripped = DialogueStripper::new().unwrap().strip(text);
        assert_eq!(stripped, "Ela disse  e saiu.\nA porta bateu.");
    }
}
