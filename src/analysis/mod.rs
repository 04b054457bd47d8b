// The individual analyses. Each one is a pure function from text (or annotated
// text) plus configuration to a serializable report section.

pub mod arc;
pub mod classes;
pub mod crutches;
pub mod dialogue;
pub mod names;
pub mod rhythm;
pub mod sound;
pub mod style;
pub mod themes;

pub use arc::{sentiment_arc, ArcReport, ArcWindow};
pub use classes::{class_counts, classes_report, ClassesReport, SegmentClasses};
pub use crutches::{crutch_report, filler_patterns, CrutchReport, CrutchWindow, PhraseCount};
pub use dialogue::{dialogue_report, DialogueReport, Interaction, SpeakerLines};
pub use names::{name_consistency, NameGroup, NameReport, NameVariant};
pub use rhythm::{rhythm_report, ParagraphRhythm, RhythmReport, SentenceLength};
pub use sound::{sound_report, FigureKind, SentenceFigures, SoundFigure, SoundReport};
pub use style::{style_report, StyleReport};
pub use themes::{keyword_report, Keyword, ThemeReport};

/// A word of the source text with its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordSpan<'a> {
    pub text: &'a str,
    /// Byte offset in the source text
    pub start: usize,
    /// Position among all words of the text
    pub index: usize,
    /// First word of the text or of a sentence
    pub sentence_initial: bool,
}

impl WordSpan<'_> {
    /// Starts with an uppercase letter followed only by lowercase letters
    pub fn is_capitalized(&self) -> bool {
        let mut chars = self.text.chars();
        chars.next().is_some_and(char::is_uppercase) && chars.all(char::is_lowercase)
    }
}

fn ends_sentence(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

fn opens_speech(ch: char) -> bool {
    matches!(ch, '"' | '“' | '«' | '—' | '–')
}

/// Runs of letters (inner hyphens and apostrophes kept), case preserved. A word
/// is sentence-initial when it opens the text, follows end punctuation, or
/// opens quoted or dashed speech.
pub(crate) fn word_spans(text: &str) -> Vec<WordSpan<'_>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut at_sentence_start = true;
    let mut iter = text.char_indices().peekable();

    while let Some((i, ch)) = iter.next() {
        let joiner = matches!(ch, '-' | '\'' | '’')
            && start.is_some()
            && iter.peek().is_some_and(|&(_, n)| n.is_alphabetic());
        if ch.is_alphabetic() || joiner {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            spans.push(WordSpan {
                text: &text[s..i],
                start: s,
                index: spans.len(),
                sentence_initial: at_sentence_start,
            });
            at_sentence_start = false;
        }
        if ends_sentence(ch) || opens_speech(ch) {
            at_sentence_start = true;
        } else if !(ch.is_whitespace() || matches!(ch, '”' | '»' | '-' | '(')) {
            at_sentence_start = false;
        }
    }
    if let Some(s) = start {
        spans.push(WordSpan {
            text: &text[s..],
            start: s,
            index: spans.len(),
            sentence_initial: at_sentence_start,
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_spans_track_sentence_starts() {
        let spans = word_spans("Kaelin viu Alara. — Vamos? disse d'Ávila, guarda-costas.");
        let words: Vec<_> = spans.iter().map(|s| (s.text, s.sentence_initial)).collect();
        assert_eq!(
            words,
            vec![
                ("Kaelin", true),
                ("viu", false),
                ("Alara", false),
                ("Vamos", true),
                ("disse", true),
                ("d'Ávila", false),
                ("guarda-costas", false),
            ]
        );
        assert_eq!(spans[2].start, 11);
        assert_eq!(spans[6].index, 6);
    }

    #[test]
    fn test_capitalized() {
        let spans = word_spans("Bryn ONU kaelin McAllister");
        let caps: Vec<_> = spans.iter().map(|s| s.is_capitalized()).collect();
        assert_eq!(caps, vec![true, false, false, false]);
    }
}
