//! Coarse part-of-speech classes and context-aware disambiguation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexicon::tagger::PosTagger;

/// Simplified grammatical category used for candidate filtering.
///
/// Tags outside these four classes map to `None` at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarsePos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl CoarsePos {
    pub const ALL: [CoarsePos; 4] = [Self::Noun, Self::Verb, Self::Adj, Self::Adv];

    /// Derive the coarse class from a Penn Treebank tag by prefix.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.starts_with("NN") {
            Some(Self::Noun)
        } else if tag.starts_with("VB") {
            Some(Self::Verb)
        } else if tag.starts_with("JJ") {
            Some(Self::Adj)
        } else if tag.starts_with("RB") {
            Some(Self::Adv)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adj => "adj",
            Self::Adv => "adv",
        }
    }
}

impl fmt::Display for CoarsePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags single words, using surrounding words when available.
#[derive(Clone)]
pub struct PosDisambiguator {
    tagger: Arc<dyn PosTagger>,
}

impl PosDisambiguator {
    pub fn new(tagger: Arc<dyn PosTagger>) -> Self {
        Self { tagger }
    }

    /// Fine-grained tag for `word`.
    ///
    /// With context, the whole context is tagged as one sequence and the tag
    /// at the first case-insensitive occurrence of `word` is used. Without
    /// context, or when `word` does not occur in it, the word is tagged on
    /// its own. Tagger failures yield `None`.
    pub fn tag(&self, word: &str, context: Option<&[String]>) -> Option<String> {
        let needle = word.to_lowercase();

        if let Some(context) = context.filter(|c| !c.is_empty()) {
            if let Some(position) = context.iter().position(|w| w.to_lowercase() == needle) {
                let tokens: Vec<&str> = context.iter().map(String::as_str).collect();
                match self.tagger.tag_tokens(&tokens) {
                    Ok(tags) => {
                        if let Some(tag) = tags.into_iter().nth(position) {
                            return Some(tag);
                        }
                    }
                    Err(e) => log::debug!("Context tagging failed for '{}': {}", word, e),
                }
            }
        }

        match self.tagger.tag_tokens(&[word]) {
            Ok(tags) => tags.into_iter().next(),
            Err(e) => {
                log::debug!("Tagging failed for '{}': {}", word, e);
                None
            }
        }
    }

    /// Coarse class of `word`, or `None` when untagged or outside the four classes.
    pub fn coarse(&self, word: &str, context: Option<&[String]>) -> Option<CoarsePos> {
        self.tag(word, context).as_deref().and_then(CoarsePos::from_tag)
    }
}
