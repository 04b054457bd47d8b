// Sentiment polarity scoring behind a trait, with a lexicon-driven default.

use std::collections::HashSet;

use crate::error::AnnotationError;
use crate::lexicon::{self, Lexicon};
use crate::pattern::word_tokens;

/// Compound polarity of a text in [-1, 1]; 0.0 when nothing is scoreable
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> Result<f64, AnnotationError>;
}

/// Normalization constant of the compound score
const ALPHA: f64 = 15.0;
/// Valence added by a booster word right before a hit
const BOOSTER_INCREMENT: f64 = 0.293;
/// Multiplier applied when a negator precedes a hit
const NEGATION_SCALAR: f64 = -0.74;
/// How many preceding tokens are searched for a negator
const NEGATION_SCOPE: usize = 3;

/// Map an unbounded valence sum into [-1, 1]
pub fn normalize_compound(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Valence-lexicon scorer: ±1 per hit, boosted by an adjacent intensifier and
/// flipped (damped) by a negator in the three preceding tokens
pub struct LexiconSentiment {
    positive: HashSet<String>,
    negative: HashSet<String>,
    boosters: HashSet<String>,
    negators: HashSet<String>,
}

impl LexiconSentiment {
    pub fn new(lexicon: &Lexicon) -> Self {
        let set = |category: &str| lexicon.get(category).iter().cloned().collect::<HashSet<_>>();
        Self {
            positive: set(lexicon::POSITIVE),
            negative: set(lexicon::NEGATIVE),
            boosters: set(lexicon::BOOSTERS),
            negators: set(lexicon::NEGATORS),
        }
    }

    fn valence_sum(&self, words: &[String]) -> f64 {
        let mut sum = 0.0;
        for (i, word) in words.iter().enumerate() {
            let mut valence = if self.positive.contains(word) {
                1.0
            } else if self.negative.contains(word) {
                -1.0
            } else {
                continue;
            };

            if i > 0 && self.boosters.contains(&words[i - 1]) {
                valence += BOOSTER_INCREMENT * f64::signum(valence);
            }
            let scope_start = i.saturating_sub(NEGATION_SCOPE);
            if words[scope_start..i].iter().any(|w| self.negators.contains(w)) {
                valence *= NEGATION_SCALAR;
            }
            sum += valence;
        }
        sum
    }
}

impl SentimentScorer for LexiconSentiment {
    fn compound(&self, text: &str) -> Result<f64, AnnotationError> {
        let words = word_tokens(text);
        Ok(normalize_compound(self.valence_sum(&words)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LexiconSentiment {
        LexiconSentiment::new(&Lexicon::builtin().unwrap())
    }

    #[test]
    fn test_polarity_signs() {
        let s = scorer();
        assert!(s.compound("Uma alegria imensa, paz e amor.").unwrap() > 0.5);
        assert!(s.compound("Guerra, morte e desespero.").unwrap() < -0.5);
        assert_eq!(s.compound("A mesa estava na sala.").unwrap(), 0.0);
        assert_eq!(s.compound("").unwrap(), 0.0);
    }

    #[test]
    fn test_negation_flips_and_damps() {
        let s = scorer();
        let plain = s.compound("ele estava feliz").unwrap();
        let negated = s.compound("ele não estava feliz").unwrap();
        assert!(plain > 0.0);
        assert!(negated < 0.0);
        assert!(negated.abs() < plain.abs());
    }

    #[test]
    fn test_booster_intensifies() {
        let s = scorer();
        assert!(s.compound("muito triste").unwrap() < s.compound("triste").unwrap());
    }

    #[test]
    fn test_compound_stays_bounded() {
        let long = "alegria ".repeat(500);
        let value = scorer().compound(&long).unwrap();
        assert!(value <= 1.0 && value > 0.99);
        assert!((normalize_compound(1.0) - 1.0 / 16f64.sqrt()).abs() < 1e-12);
    }
}
