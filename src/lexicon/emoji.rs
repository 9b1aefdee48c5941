//! Emoji semantic index.
//!
//! Pictographs have no native embeddings, so each glyph gets a vector
//! derived from its Unicode name: the content words of the name are looked
//! up in the embedding space and averaged, then scaled to unit length.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::lexicon::embeddings::EmbeddingStore;
use crate::lexicon::vector;

/// Code-point ranges scanned when building the index.
pub const GLYPH_RANGES: [(u32, u32); 7] = [
    (0x2600, 0x26FF),   // Miscellaneous Symbols
    (0x2700, 0x27BF),   // Dingbats
    (0x1F300, 0x1F5FF), // Miscellaneous Symbols and Pictographs
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F680, 0x1F6FF), // Transport and Map Symbols
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
    (0x1FA70, 0x1FAFF), // Symbols and Pictographs Extended-A
];

/// Name words that describe presentation rather than meaning.
const STOP_WORDS: [&str; 18] = [
    "face",
    "with",
    "sign",
    "symbol",
    "of",
    "and",
    "the",
    "a",
    "for",
    "emoji",
    "modifier",
    "fitzpatrick",
    "type",
    "skin",
    "tone",
    "light",
    "medium",
    "dark",
];

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Glyph to unit vector map, in code-point order.
pub struct EmojiIndex {
    entries: Vec<(char, Vec<f32>)>,
    lookup: HashMap<char, usize>,
}

impl EmojiIndex {
    /// Derive vectors for every named glyph in [`GLYPH_RANGES`] that has at
    /// least one in-vocabulary content word.
    pub fn build(store: &EmbeddingStore) -> Self {
        let code_points: Vec<u32> = GLYPH_RANGES
            .iter()
            .flat_map(|&(start, end)| start..=end)
            .collect();

        let entries: Vec<(char, Vec<f32>)> = code_points
            .into_par_iter()
            .filter_map(char::from_u32)
            .filter_map(|glyph| {
                let name = unicode_names2::name(glyph)?.to_string();
                glyph_vector(store, &name).map(|v| (glyph, v))
            })
            .collect();

        let lookup = entries
            .iter()
            .enumerate()
            .map(|(idx, (glyph, _))| (*glyph, idx))
            .collect();

        log::info!("Built emoji index with {} glyphs", entries.len());
        Self { entries, lookup }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derived vector for a glyph, ignoring a trailing emoji presentation selector.
    pub fn vector_for(&self, glyph: &str) -> Option<&[f32]> {
        let glyph = single_glyph(glyph)?;
        self.lookup
            .get(&glyph)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Iterate over `(glyph, unit vector)` in code-point order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[f32])> {
        self.entries.iter().map(|(glyph, v)| (*glyph, v.as_slice()))
    }
}

/// True if `text` is exactly one character from the supported ranges.
pub fn is_glyph(text: &str) -> bool {
    single_glyph(text).map_or(false, in_ranges)
}

fn in_ranges(c: char) -> bool {
    let cp = c as u32;
    GLYPH_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
}

fn single_glyph(text: &str) -> Option<char> {
    let text = text.strip_suffix(VARIATION_SELECTOR_16).unwrap_or(text);
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Lowercase alphabetic words of a Unicode name, minus stop words.
fn content_words(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

fn glyph_vector(store: &EmbeddingStore, name: &str) -> Option<Vec<f32>> {
    let mut sum = vec![0.0f32; store.dimensions()];
    let mut used = 0usize;

    for word in content_words(name) {
        if let Ok(v) = store.vector(&word) {
            vector::add_scaled(&mut sum, v, 1.0);
            used += 1;
        }
    }

    if used == 0 {
        return None;
    }

    sum.iter_mut().for_each(|x| *x /= used as f32);
    vector::normalize(&mut sum);
    Some(sum)
}
