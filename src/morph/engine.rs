//! Candidate generation, scoring and re-inflection.
//!
//! A morph call shifts a word toward a vibe in embedding space, then pulls
//! replacement candidates from two sources (dictionary synonyms and vector
//! neighbours), keeps those that can stand in the same grammatical slot,
//! ranks them against the shifted target and re-inflects them to match the
//! input word.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use rayon::prelude::*;
use regex::Regex;

use crate::lexicon::emoji::{self, EmojiIndex};
use crate::lexicon::embeddings::EmbeddingStore;
use crate::lexicon::inflect::Inflector;
use crate::lexicon::pos::{CoarsePos, PosDisambiguator};
use crate::lexicon::tagger::PosTagger;
use crate::lexicon::vector;
use crate::lexicon::wordnet::LexicalDictionary;
use crate::morph::types::{Candidate, MorphResult, Token};

/// Neighbours requested per wanted candidate, so enough survive filtering.
pub const DEFAULT_OVERSAMPLE: usize = 5;

static CLEAN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+$").expect("Failed to compile word regex"));

/// Word morphing over shared, read-only lexical resources.
pub struct MorphEngine {
    store: Arc<EmbeddingStore>,
    dictionary: Arc<dyn LexicalDictionary>,
    pos: PosDisambiguator,
    inflector: Arc<dyn Inflector>,
    emoji: OnceCell<EmojiIndex>,
    oversample: usize,
}

/// Everything the word path derives from its inputs before scoring.
struct Query {
    word: String,
    vibe: String,
    source: Option<String>,
    fine_tag: Option<String>,
    coarse: Option<CoarsePos>,
    lemma: String,
    target: Vec<f32>,
}

impl MorphEngine {
    pub fn new(
        store: Arc<EmbeddingStore>,
        dictionary: Arc<dyn LexicalDictionary>,
        tagger: Arc<dyn PosTagger>,
        inflector: Arc<dyn Inflector>,
    ) -> Self {
        Self {
            store,
            dictionary,
            pos: PosDisambiguator::new(tagger),
            inflector,
            emoji: OnceCell::new(),
            oversample: DEFAULT_OVERSAMPLE,
        }
    }

    pub fn with_oversample(mut self, oversample: usize) -> Self {
        self.oversample = oversample.max(1);
        self
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// Emoji index, built from the embedding space on first use.
    pub fn emoji_index(&self) -> &EmojiIndex {
        self.emoji.get_or_init(|| EmojiIndex::build(&self.store))
    }

    pub fn emoji_index_built(&self) -> bool {
        self.emoji.get().is_some()
    }

    /// Rank replacements for `word` shifted toward `vibe` (and away from
    /// `source_vibe`). `context` holds the surrounding words used to pick
    /// the part of speech.
    ///
    /// Vocabulary misses yield an empty candidate list, never an error.
    pub fn morph_word(
        &self,
        word: &str,
        vibe: &str,
        source_vibe: Option<&str>,
        context: Option<&[String]>,
        top_n: usize,
    ) -> MorphResult {
        let mut result = MorphResult::empty(word, vibe, source_vibe);

        let Some(query) = self.prepare(word, vibe, source_vibe, context) else {
            return result;
        };

        let pool = self.candidate_pool(&query, top_n);
        let ranked = self.score(&query, pool);
        result.candidates = self.inflect_ranked(&query, ranked, top_n);
        result
    }

    /// Morph several words toward the same vibe. `contexts` pairs with
    /// `words` by position; missing entries mean no context. Output order
    /// matches input order.
    pub fn morph_words(
        &self,
        words: &[String],
        vibe: &str,
        source_vibe: Option<&str>,
        contexts: Option<&[Vec<String>]>,
        top_n: usize,
    ) -> Vec<MorphResult> {
        words
            .par_iter()
            .enumerate()
            .map(|(i, word)| {
                let context = contexts.and_then(|c| c.get(i)).map(Vec::as_slice);
                self.morph_word(word, vibe, source_vibe, context, top_n)
            })
            .collect()
    }

    /// Rank other glyphs whose name-derived meaning is closest to `glyph`
    /// shifted toward `vibe`.
    pub fn morph_emoji(&self, glyph: &str, vibe: &str, top_n: usize) -> MorphResult {
        let mut result = MorphResult::empty(glyph, vibe, None);

        if !emoji::is_glyph(glyph) {
            return result;
        }

        let index = self.emoji_index();
        let Some(glyph_vector) = index.vector_for(glyph) else {
            return result;
        };
        let Ok(vibe_vector) = self.store.vector(vibe) else {
            return result;
        };

        let mut target = glyph_vector.to_vec();
        let vibe_norm = vector::l2_norm(vibe_vector);
        if vibe_norm > 0.0 {
            vector::add_scaled(&mut target, vibe_vector, 1.0 / vibe_norm);
        }
        vector::normalize(&mut target);

        let input = glyph.chars().next();
        let mut scored: Vec<(char, f32)> = index
            .iter()
            .filter(|(candidate, _)| Some(*candidate) != input)
            .map(|(candidate, v)| (candidate, vector::dot(v, &target)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_n);

        result.candidates = scored
            .into_iter()
            .map(|(candidate, score)| Candidate::new(candidate.to_string(), score))
            .collect();
        result
    }

    /// Dispatch on the token kind. Glyphs ignore the source vibe and context.
    pub fn morph_token(
        &self,
        token: &Token,
        vibe: &str,
        source_vibe: Option<&str>,
        context: Option<&[String]>,
        top_n: usize,
    ) -> MorphResult {
        match token {
            Token::Word(word) => self.morph_word(word, vibe, source_vibe, context, top_n),
            Token::Glyph(glyph) => self.morph_emoji(&glyph.to_string(), vibe, top_n),
        }
    }

    fn prepare(
        &self,
        word: &str,
        vibe: &str,
        source_vibe: Option<&str>,
        context: Option<&[String]>,
    ) -> Option<Query> {
        let word = word.to_lowercase();
        let vibe = vibe.to_lowercase();

        let word_vector = self.store.vector(&word).ok()?;
        let vibe_vector = self.store.vector(&vibe).ok()?;

        let source = source_vibe.map(str::to_lowercase).filter(|s| {
            let known = self.store.contains(s);
            if !known {
                log::debug!("Ignoring out-of-vocabulary source vibe '{}'", s);
            }
            known
        });

        let fine_tag = self.pos.tag(&word, context);
        let coarse = fine_tag.as_deref().and_then(CoarsePos::from_tag);
        let lemma = match coarse {
            Some(pos) => self.dictionary.lemmatize(&word, pos),
            None => word.clone(),
        };

        let mut target = word_vector.to_vec();
        vector::add_scaled(&mut target, vibe_vector, 1.0);
        if let Some(source_vector) = source.as_deref().and_then(|s| self.store.vector(s).ok()) {
            vector::add_scaled(&mut target, source_vector, -1.0);
        }
        vector::normalize(&mut target);

        log::debug!(
            "Morphing '{}' toward '{}' (tag {:?}, lemma '{}')",
            word,
            vibe,
            fine_tag,
            lemma
        );

        Some(Query {
            word,
            vibe,
            source,
            fine_tag,
            coarse,
            lemma,
            target,
        })
    }

    /// Base-form candidates from dictionary synonyms and vector neighbours.
    fn candidate_pool(&self, query: &Query, top_n: usize) -> BTreeSet<String> {
        let mut pool = BTreeSet::new();

        if let Some(pos) = query.coarse {
            // One-hop expansion can cross parts of speech; keep same-class entries.
            for synonym in self.dictionary.synonyms(&query.lemma, pos) {
                if self.pos.coarse(&synonym, None) == Some(pos) {
                    pool.insert(synonym);
                }
            }
        }

        let positive = [query.word.as_str(), query.vibe.as_str()];
        let negative: Vec<&str> = query.source.as_deref().into_iter().collect();
        let neighbours = match self.store.nearest(
            &positive,
            &negative,
            top_n.saturating_mul(self.oversample),
        ) {
            Ok(neighbours) => neighbours,
            Err(e) => {
                log::debug!("Neighbour search failed for '{}': {}", query.word, e);
                Vec::new()
            }
        };

        for (neighbour, _) in neighbours {
            let neighbour = neighbour.to_lowercase();
            if neighbour == query.word || neighbour == query.vibe || neighbour == query.lemma {
                continue;
            }
            if !CLEAN_WORD.is_match(&neighbour) {
                continue;
            }
            match query.coarse {
                Some(pos) => {
                    if self.pos.coarse(&neighbour, None) != Some(pos) {
                        continue;
                    }
                    pool.insert(self.dictionary.lemmatize(&neighbour, pos));
                }
                None => {
                    pool.insert(neighbour);
                }
            }
        }

        pool
    }

    /// Cosine-score the pool against the target, best first.
    fn score(&self, query: &Query, pool: BTreeSet<String>) -> Vec<(String, f32)> {
        let mut scored: Vec<(String, f32)> = pool
            .into_iter()
            .filter_map(|candidate| {
                let candidate_vector = self.store.vector(&candidate).ok()?;
                if let Some(pos) = query.coarse {
                    if !self.dictionary.can_serve_pos(&candidate, pos) {
                        return None;
                    }
                }
                let score = vector::cosine_to_unit(candidate_vector, &query.target);
                Some((candidate, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    fn inflect_ranked(
        &self,
        query: &Query,
        ranked: Vec<(String, f32)>,
        top_n: usize,
    ) -> Vec<Candidate> {
        let mut seen: HashSet<String> = HashSet::from([query.word.clone()]);
        let mut candidates = Vec::with_capacity(top_n);

        for (base, score) in ranked {
            if candidates.len() >= top_n {
                break;
            }
            let surface = match query.fine_tag.as_deref() {
                Some(tag) => self.inflector.inflect(&base, tag),
                None => base,
            };
            if seen.insert(surface.to_lowercase()) {
                candidates.push(Candidate::new(surface, score));
            }
        }

        candidates
    }
}
