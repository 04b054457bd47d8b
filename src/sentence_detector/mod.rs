// Rule-based sentence boundary detection for narrative prose.
// Boundaries are end punctuation followed by whitespace and a sentence opener;
// blank lines are hard boundaries.

use regex_automata::meta::Regex;
use tracing::debug;

use crate::error::AnnotationError;

pub mod abbreviations;
pub mod normalization;

pub use abbreviations::AbbreviationChecker;
pub use normalization::{normalize_sentence, normalize_sentence_into, tidy_paragraph_breaks};

/// Configuration for sentence boundary detection rules
#[derive(Debug, Clone)]
pub struct SentenceBoundaryRules {
    /// End punctuation characters that can terminate a sentence
    pub end_punctuation: Vec<char>,
    /// Closing quotes or brackets allowed between end punctuation and the whitespace
    pub closing_marks: Vec<char>,
    /// Characters that may open the next sentence besides an uppercase letter
    pub sentence_openers: Vec<char>,
}

impl Default for SentenceBoundaryRules {
    fn default() -> Self {
        Self {
            end_punctuation: vec!['.', '?', '!', '\u{2026}'],
            closing_marks: vec!['"', '\'', '\u{201D}', '\u{2019}', ')', ']', '\u{BB}'],
            // Opening quotes, brackets and the dialogue dashes
            sentence_openers: vec![
                '"', '\'', '\u{201C}', '\u{2018}', '\u{AB}', '(', '[', '\u{2014}', '\u{2013}',
            ],
        }
    }
}

impl SentenceBoundaryRules {
    fn class(chars: &[char]) -> String {
        let mut class = String::from("[");
        for ch in chars {
            if matches!(ch, '\\' | ']' | '[' | '^' | '-' | '&' | '~') {
                class.push('\\');
            }
            class.push(*ch);
        }
        class.push(']');
        class
    }

    /// Pattern matching `<end punct>+<closing>*<space>+<opener>`
    fn boundary_pattern(&self) -> String {
        format!(
            r"{}+{}*\s+(?:\p{{Lu}}|{})",
            Self::class(&self.end_punctuation),
            Self::class(&self.closing_marks),
            Self::class(&self.sentence_openers),
        )
    }
}

/// A sentence borrowed from the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSentence<'a> {
    pub index: usize,
    /// Byte offset of the first character in the source text
    pub start: usize,
    pub raw_content: &'a str,
}

impl<'a> DetectedSentence<'a> {
    pub fn raw(&self) -> &'a str {
        self.raw_content
    }

    pub fn end(&self) -> usize {
        self.start + self.raw_content.len()
    }

    /// Whitespace-collapsed copy
    pub fn normalize(&self) -> String {
        normalize_sentence(self.raw_content)
    }

    pub fn normalize_into(&self, buffer: &mut String) {
        normalize_sentence_into(self.raw_content, buffer);
    }

    /// Number of whitespace-delimited words
    pub fn word_count(&self) -> usize {
        self.raw_content.split_whitespace().count()
    }
}

pub struct SentenceDetector {
    boundary: Regex,
    paragraph_break: Regex,
    abbreviations: AbbreviationChecker,
}

impl SentenceDetector {
    pub fn new(rules: SentenceBoundaryRules) -> Result<Self, AnnotationError> {
        let pattern = rules.boundary_pattern();
        let boundary = Regex::new(&pattern)
            .map_err(|e| AnnotationError::Backend(format!("sentence boundary pattern: {e}")))?;
        let paragraph_break = Regex::new(r"\n[ \t\r]*\n")
            .map_err(|e| AnnotationError::Backend(format!("paragraph break pattern: {e}")))?;
        debug!("Compiled sentence boundary pattern: {}", pattern);
        Ok(Self {
            boundary,
            paragraph_break,
            abbreviations: AbbreviationChecker::new(),
        })
    }

    pub fn with_default_rules() -> Result<Self, AnnotationError> {
        Self::new(SentenceBoundaryRules::default())
    }

    /// Split `text` into non-empty trimmed sentences, in order
    pub fn detect<'a>(&self, text: &'a str) -> Vec<DetectedSentence<'a>> {
        let mut sentences = Vec::new();
        let mut block_start = 0;
        for brk in self.paragraph_break.find_iter(text) {
            self.detect_in_block(text, block_start, brk.start(), &mut sentences);
            block_start = brk.end();
        }
        self.detect_in_block(text, block_start, text.len(), &mut sentences);
        sentences
    }

    /// Normalized sentence strings
    pub fn detect_normalized(&self, text: &str) -> Vec<String> {
        self.detect(text).iter().map(DetectedSentence::normalize).collect()
    }

    fn detect_in_block<'a>(
        &self,
        text: &'a str,
        start: usize,
        end: usize,
        out: &mut Vec<DetectedSentence<'a>>,
    ) {
        let block = &text[start..end];
        let mut sentence_start = 0;
        for m in self.boundary.find_iter(block) {
            // The opener is the last character of the match and starts the next sentence
            let next_start = block[..m.end()]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(m.end());
            let punct_end = block[m.start()..]
                .char_indices()
                .find(|(_, c)| c.is_whitespace())
                .map(|(i, _)| m.start() + i)
                .unwrap_or(m.end());
            let sentence = &block[sentence_start..punct_end];
            if self.abbreviations.ends_with_title_abbreviation(sentence) {
                continue;
            }
            Self::push_trimmed(text, start + sentence_start, sentence, out);
            sentence_start = next_start;
        }
        Self::push_trimmed(text, start + sentence_start, &block[sentence_start..], out);
    }

    fn push_trimmed<'a>(text: &'a str, offset: usize, raw: &str, out: &mut Vec<DetectedSentence<'a>>) {
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let begin = offset + leading;
        out.push(DetectedSentence {
            index: out.len(),
            start: begin,
            raw_content: &text[begin..begin + trimmed.len()],
        });
    }
}
