use serde::{Deserialize, Serialize};

use crate::lexicon::emoji;

/// One suggested replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub word: String,
    /// Cosine similarity to the target, rounded to 4 decimals, in [-1, 1].
    pub score: f64,
}

impl Candidate {
    pub fn new(word: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            score: round_score(score),
        }
    }
}

/// Outcome of one morph call. An empty `candidates` list is a valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphResult {
    pub original: String,
    pub vibe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_vibe: Option<String>,
    pub candidates: Vec<Candidate>,
}

impl MorphResult {
    pub fn empty(original: &str, vibe: &str, source_vibe: Option<&str>) -> Self {
        Self {
            original: original.to_string(),
            vibe: vibe.to_string(),
            source_vibe: source_vibe.map(str::to_string),
            candidates: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate words in rank order.
    pub fn words(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.word.as_str()).collect()
    }
}

/// A unit of input text: an ordinary word or a single pictographic glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Glyph(char),
}

impl Token {
    /// Classify `text`. A single supported pictograph (optionally followed
    /// by U+FE0F) is a glyph; anything else is a word.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if emoji::is_glyph(trimmed) {
            if let Some(glyph) = trimmed.chars().next() {
                return Token::Glyph(glyph);
            }
        }
        Token::Word(trimmed.to_string())
    }
}

fn round_score(score: f32) -> f64 {
    let clamped = f64::from(score).clamp(-1.0, 1.0);
    (clamped * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rounding_and_clamping() {
        assert_eq!(Candidate::new("a", 0.123_456).score, 0.1235);
        assert_eq!(Candidate::new("a", 1.000_01).score, 1.0);
        assert_eq!(Candidate::new("a", -1.2).score, -1.0);
        assert_eq!(Candidate::new("a", -0.000_04).score, -0.0);
    }

    #[test]
    fn test_token_parse() {
        assert_eq!(Token::parse("warm"), Token::Word("warm".to_string()));
        assert_eq!(Token::parse(" dread "), Token::Word("dread".to_string()));
        assert_eq!(Token::parse("🔥"), Token::Glyph('🔥'));
        assert_eq!(Token::parse("☀\u{FE0F}"), Token::Glyph('☀'));
        assert_eq!(Token::parse("é"), Token::Word("é".to_string()));
    }

    #[test]
    fn test_result_serialization() {
        let mut result = MorphResult::empty("warm", "dread", None);
        result.candidates.push(Candidate::new("clammy", 0.99641));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "original": "warm",
                "vibe": "dread",
                "candidates": [{"word": "clammy", "score": 0.9964}]
            })
        );

        let back: MorphResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.words(), vec!["clammy"]);
    }
}
