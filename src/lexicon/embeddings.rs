//! Pretrained word-embedding space.
//!
//! Provides the vocabulary/vector/nearest-neighbour contract the morph
//! engine relies on:
//! - Parses word2vec/GloVe text files (optionally with a `count dims` header)
//! - Case-insensitive vocabulary membership
//! - Vector arithmetic nearest-neighbour search with cosine ranking

use std::collections::HashMap;
use std::io::BufRead;

use rayon::prelude::*;

use crate::lexicon::vector;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Word not in vocabulary: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid embedding file at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Embedding space is empty")]
    Empty,
}

/// Upper bound on rows reserved up front from a declared count.
const MAX_PREALLOCATED_ROWS: usize = 1 << 20;
/// Upper bound on vector components reserved up front.
const MAX_PREALLOCATED_COMPONENTS: usize = 1 << 26;

/// In-memory embedding space.
///
/// Vectors are stored row-major in one contiguous buffer, with their L2
/// norms precomputed so cosine scoring over the whole vocabulary only costs
/// one dot product per row.
pub struct EmbeddingStore {
    name: String,
    dimensions: usize,
    words: Vec<String>,
    lookup: HashMap<String, usize>,
    vectors: Vec<f32>,
    norms: Vec<f32>,
}

impl EmbeddingStore {
    /// Create an empty store for vectors of the given dimensionality.
    ///
    /// `capacity` is a hint; the reservation is capped so a bogus declared
    /// count cannot exhaust memory before any row is read.
    pub fn with_capacity(name: &str, dimensions: usize, capacity: usize) -> Self {
        let rows = capacity.min(MAX_PREALLOCATED_ROWS);
        let components = rows
            .saturating_mul(dimensions)
            .min(MAX_PREALLOCATED_COMPONENTS);
        Self {
            name: name.to_string(),
            dimensions,
            words: Vec::with_capacity(rows),
            lookup: HashMap::with_capacity(rows),
            vectors: Vec::with_capacity(components),
            norms: Vec::with_capacity(rows),
        }
    }

    /// Build a store from `(word, vector)` pairs.
    pub fn from_entries<I>(name: &str, dimensions: usize, entries: I) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut store = Self::with_capacity(name, dimensions, 0);
        for (word, embedding) in entries {
            store.push(&word, &embedding)?;
        }
        Ok(store)
    }

    /// Parse a word2vec/GloVe text stream.
    ///
    /// Each line is `word v1 v2 ... vd`. A leading `count dims` line is
    /// accepted and used to validate the remaining rows; otherwise the
    /// dimensionality is taken from the first row.
    pub fn from_text<R: BufRead>(name: &str, reader: R) -> Result<Self, EmbeddingError> {
        let mut store: Option<Self> = None;
        let mut declared_dimensions: Option<usize> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            if line_no == 0 && tokens.len() == 2 {
                if let (Ok(count), Ok(dims)) = (tokens[0].parse::<usize>(), tokens[1].parse::<usize>()) {
                    if dims == 0 || count.checked_mul(dims).is_none() {
                        return Err(EmbeddingError::InvalidFormat {
                            line: 1,
                            message: format!("declared size {} x {} is out of range", count, dims),
                        });
                    }
                    declared_dimensions = Some(dims);
                    store = Some(Self::with_capacity(name, dims, count));
                    continue;
                }
            }

            let dims = match declared_dimensions {
                Some(dims) => dims,
                None => {
                    let dims = tokens.len() - 1;
                    if dims == 0 {
                        return Err(EmbeddingError::InvalidFormat {
                            line: line_no + 1,
                            message: "row has no vector components".to_string(),
                        });
                    }
                    declared_dimensions = Some(dims);
                    dims
                }
            };

            if tokens.len() < dims + 1 {
                return Err(EmbeddingError::InvalidFormat {
                    line: line_no + 1,
                    message: format!("expected {} components, found {}", dims, tokens.len() - 1),
                });
            }

            // Words may themselves contain spaces; the vector is always the tail.
            let split = tokens.len() - dims;
            let word = tokens[..split].join(" ");
            let embedding = tokens[split..]
                .iter()
                .map(|t| t.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| EmbeddingError::InvalidFormat {
                    line: line_no + 1,
                    message: e.to_string(),
                })?;

            store
                .get_or_insert_with(|| Self::with_capacity(name, dims, 0))
                .push(&word, &embedding)?;
        }

        let store = store.ok_or(EmbeddingError::Empty)?;
        if store.is_empty() {
            return Err(EmbeddingError::Empty);
        }

        log::debug!(
            "Parsed {} vectors ({} dimensions) for '{}'",
            store.len(),
            store.dimensions,
            name
        );
        Ok(store)
    }

    /// Append a vector. Words are lowercased; the first occurrence wins.
    pub(crate) fn push(&mut self, word: &str, embedding: &[f32]) -> Result<(), EmbeddingError> {
        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                got: embedding.len(),
            });
        }

        let word = word.to_lowercase();
        if self.lookup.contains_key(&word) {
            return Ok(());
        }

        self.lookup.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.vectors.extend_from_slice(embedding);
        self.norms.push(vector::l2_norm(embedding));
        Ok(())
    }

    /// Get the name of the embedding space (e.g. "glove-wiki-gigaword-100").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the vocabulary size.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Case-insensitive vocabulary membership.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains_key(&word.to_lowercase())
    }

    /// Vector for `word`, or `NotFound` if it is outside the vocabulary.
    pub fn vector(&self, word: &str) -> Result<&[f32], EmbeddingError> {
        let idx = self.index_of(word)?;
        Ok(self.row(idx))
    }

    /// Iterate over `(word, vector)` in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.words
            .iter()
            .enumerate()
            .map(|(idx, word)| (word.as_str(), self.row(idx)))
    }

    /// Vector arithmetic nearest-neighbour query.
    ///
    /// Sums the unit-normalized vectors of `positive`, subtracts those of
    /// `negative`, and ranks the rest of the vocabulary by cosine similarity
    /// to the result. Input words never appear in the output. Equal scores
    /// keep vocabulary order.
    pub fn nearest(
        &self,
        positive: &[&str],
        negative: &[&str],
        top_k: usize,
    ) -> Result<Vec<(String, f32)>, EmbeddingError> {
        let mut query = vec![0.0f32; self.dimensions];
        let mut excluded = Vec::with_capacity(positive.len() + negative.len());

        for (words, sign) in [(positive, 1.0f32), (negative, -1.0f32)] {
            for word in words {
                let idx = self.index_of(word)?;
                excluded.push(idx);
                let norm = self.norms[idx];
                if norm > 0.0 {
                    vector::add_scaled(&mut query, self.row(idx), sign / norm);
                }
            }
        }
        vector::normalize(&mut query);

        if top_k == 0 {
            return Ok(vec![]);
        }

        let mut scored: Vec<(usize, f32)> = (0..self.words.len())
            .into_par_iter()
            .filter(|idx| !excluded.contains(idx))
            .map(|idx| (idx, self.cosine_to_row(&query, idx)))
            .collect();

        let by_score = |a: &(usize, f32), b: &(usize, f32)| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        };

        if scored.len() > top_k {
            scored.select_nth_unstable_by(top_k, by_score);
            scored.truncate(top_k);
        }
        scored.sort_by(by_score);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| (self.words[idx].clone(), score))
            .collect())
    }

    fn index_of(&self, word: &str) -> Result<usize, EmbeddingError> {
        self.lookup
            .get(&word.to_lowercase())
            .copied()
            .ok_or_else(|| EmbeddingError::NotFound(word.to_string()))
    }

    fn row(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimensions;
        &self.vectors[start..start + self.dimensions]
    }

    fn cosine_to_row(&self, unit_query: &[f32], idx: usize) -> f32 {
        let norm = self.norms[idx];
        if norm < f32::EPSILON {
            return 0.0;
        }
        vector::dot(unit_query, self.row(idx)) / norm
    }
}
