// Title abbreviations that precede a capitalized name and must not end a sentence.

use std::collections::HashSet;

/// Forms of address and titles ("Sr. Almeida", "Dra. Souza")
pub const TITLE_ABBREVIATIONS: &[&str] = &[
    "Sr.", "Sra.", "Srta.", "Dr.", "Dra.", "Prof.", "Profa.", "D.", "Exmo.", "Exma.", "Pe.",
    "Fr.", "Cap.", "Cel.", "Gen.", "Ten.", "Sto.", "Sta.", "Mr.", "Mrs.", "Ms.", "Jr.",
];

const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '(', '\u{AB}'];

pub struct AbbreviationChecker {
    titles: HashSet<&'static str>,
}

impl AbbreviationChecker {
    pub fn new() -> Self {
        Self {
            titles: TITLE_ABBREVIATIONS.iter().copied().collect(),
        }
    }

    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.titles.contains(word)
    }

    /// True when the last word of `text`, quotes stripped, is a title abbreviation
    pub fn ends_with_title_abbreviation(&self, text: &str) -> bool {
        text.split_whitespace()
            .last()
            .map(|word| self.is_title_abbreviation(word.trim_matches(QUOTES)))
            .unwrap_or(false)
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}
