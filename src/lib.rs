//! Word morphing: replace a word with one shifted toward a mood while
//! keeping its part of speech and inflection.

pub mod config;
pub mod lexicon;
pub mod morph;
pub mod storage;

#[cfg(test)]
mod tests;
