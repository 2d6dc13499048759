use std::collections::HashMap;

use async_trait::async_trait;

use crate::analyze::classifier::{ClassId, ClassifierError, SentimentClassifier};

const BUNDLED_LEXICON: &str = include_str!("../sentiment_lexicon.json");

/// Offline three-class classifier over a word lexicon (English + French).
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    lexicon: HashMap<String, i32>,
}

impl LexiconClassifier {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: HashMap<String, i32> = serde_json::from_str(raw)?;
        let lexicon = parsed
            .into_iter()
            .map(|(w, s)| (w.to_lowercase(), s))
            .collect();
        Ok(Self { lexicon })
    }

    /// Lexicon shipped with the crate.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_LEXICON)
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *self.lexicon.get(w).unwrap_or(&0)
    }

    /// Returns (score, token count).
    /// Negation: a negator within the previous 1..=3 tokens flips the word's sign.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }

    pub fn class_of(&self, text: &str) -> ClassId {
        match self.score_text(text).0 {
            s if s < 0 => ClassId::Negative,
            0 => ClassId::Neutral,
            _ => ClassId::Positive,
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassId, ClassifierError> {
        Ok(self.class_of(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens, lower-cased (Unicode-aware for accented French words).
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "cannot"
            | "without"
            // tail of "isn't", "don't", ... once split on the apostrophe
            | "t"
            | "ne"
            | "n"
            | "pas"
            | "jamais"
            | "sans"
            | "aucun"
            | "aucune"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> LexiconClassifier {
        LexiconClassifier::from_json(r#"{"great": 2, "recall": -2, "succès": 2}"#).unwrap()
    }

    #[test]
    fn scores_and_counts_tokens() {
        let (score, n) = lex().score_text("A great car, great launch");
        assert_eq!(score, 4);
        assert_eq!(n, 5);
    }

    #[test]
    fn negation_flips_sign() {
        assert_eq!(lex().score_text("it is not great").0, -2);
        assert_eq!(lex().score_text("this isn't great").0, -2);
        assert_eq!(lex().score_text("ce n'est pas un succès").0, -2);
    }

    #[test]
    fn classes_follow_score_sign() {
        let l = lex();
        assert_eq!(l.class_of("great"), ClassId::Positive);
        assert_eq!(l.class_of("recall announced"), ClassId::Negative);
        assert_eq!(l.class_of("the car"), ClassId::Neutral);
        assert_eq!(l.class_of(""), ClassId::Neutral);
    }

    #[test]
    fn bundled_lexicon_parses() {
        let l = LexiconClassifier::bundled().expect("bundled lexicon is valid JSON");
        assert_eq!(l.class_of("excellent succès"), ClassId::Positive);
    }
}
