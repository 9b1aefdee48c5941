//! Morph engine: word, batch and emoji paths over the lexicon.

pub mod engine;
pub mod types;

pub use engine::{MorphEngine, DEFAULT_OVERSAMPLE};
pub use types::{Candidate, MorphResult, Token};
