//! Lexical resources behind the morph engine.
//!
//! # Architecture
//!
//! - `embeddings`: In-memory embedding space with nearest-neighbour search
//! - `storage`: Binary cache of a parsed embedding space
//! - `wordnet`: WordNet-backed synonyms, lemmatization and POS lookups
//! - `tagger`: Averaged-perceptron POS tagger
//! - `pos`: Coarse POS classes and context-aware tagging
//! - `inflect`: English inflection to a target tag
//! - `emoji`: Name-derived vectors for pictographic glyphs
//! - `acquire`: Download and cache of the underlying files
//! - `service`: Load-once access to an assembled engine

pub mod acquire;
pub mod embeddings;
pub mod emoji;
pub mod inflect;
pub mod pos;
pub mod service;
pub mod storage;
pub mod tagger;
pub mod vector;
pub mod wordnet;

pub use embeddings::{EmbeddingError, EmbeddingStore};
pub use emoji::EmojiIndex;
pub use inflect::{EnglishInflector, Inflector};
pub use pos::{CoarsePos, PosDisambiguator};
pub use service::{LexiconService, ResourceError, ServiceStatus};
pub use tagger::{PerceptronTagger, PosTagger, TaggerError, UnavailableTagger};
pub use wordnet::{LexicalDictionary, WordNet, WordNetError};
