//! End-to-end morph scenarios over the fixture lexicon.

use std::collections::HashSet;

use crate::lexicon::pos::CoarsePos;
use crate::lexicon::wordnet::LexicalDictionary;
use crate::morph::{MorphResult, Token};
use crate::tests::fixtures;

fn assert_well_formed(result: &MorphResult, top_n: usize) {
    assert!(result.candidates.len() <= top_n);

    let scores: Vec<f64> = result.candidates.iter().map(|c| c.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", scores);
    for score in &scores {
        assert!((-1.0..=1.0).contains(score));
        assert_eq!((score * 10_000.0).round() / 10_000.0, *score);
    }

    let original = result.original.to_lowercase();
    let mut seen = HashSet::new();
    for candidate in &result.candidates {
        let surface = candidate.word.to_lowercase();
        assert_ne!(surface, original);
        assert!(seen.insert(surface), "duplicate {}", candidate.word);
    }
}

#[test]
fn test_warm_toward_dread() {
    let (engine, _dir) = fixtures::engine();
    let result = engine.morph_word("warm", "dread", None, None, 8);

    assert_eq!(result.original, "warm");
    assert_eq!(result.vibe, "dread");
    assert_eq!(
        result.words(),
        vec!["clammy", "feverish", "tepid", "hot", "lukewarm", "cozy"]
    );
    assert_eq!(result.candidates[0].score, 0.9964);
    assert_eq!(result.candidates[1].score, 0.9875);
    assert_well_formed(&result, 8);

    let (wordnet, _wn) = fixtures::wordnet();
    for word in result.words() {
        assert!(wordnet.can_serve_pos(word, CoarsePos::Adj));
    }
}

#[test]
fn test_top_n_truncates() {
    let (engine, _dir) = fixtures::engine();
    let result = engine.morph_word("warm", "dread", None, None, 2);
    assert_eq!(result.words(), vec!["clammy", "feverish"]);
}

#[test]
fn test_source_vibe_shifts_scores() {
    let (engine, _dir) = fixtures::engine();
    let result = engine.morph_word("warm", "dread", Some("joy"), None, 8);

    assert_eq!(result.source_vibe.as_deref(), Some("joy"));
    assert_eq!(result.words()[0], "clammy");
    assert_eq!(result.candidates[0].score, 0.8871);
    assert!(result.candidates.last().map_or(false, |c| c.score < 0.0));
    assert_well_formed(&result, 8);
}

#[test]
fn test_unknown_source_vibe_is_ignored() {
    let (engine, _dir) = fixtures::engine();
    let with_unknown = engine.morph_word("warm", "dread", Some("xyzzyqq"), None, 8);
    let without = engine.morph_word("warm", "dread", None, None, 8);

    assert_eq!(with_unknown.candidates, without.candidates);
    assert_eq!(with_unknown.source_vibe.as_deref(), Some("xyzzyqq"));
}

#[test]
fn test_out_of_vocabulary_is_empty() {
    let (engine, _dir) = fixtures::engine();

    let result = engine.morph_word("xyzzyqq", "dread", None, None, 8);
    assert!(result.is_empty());
    assert_eq!(result.original, "xyzzyqq");

    assert!(engine.morph_word("warm", "xyzzyqq", None, None, 8).is_empty());
}

#[test]
fn test_case_insensitive_input() {
    let (engine, _dir) = fixtures::engine();
    let result = engine.morph_word("Warm", "DREAD", None, None, 8);

    assert_eq!(result.original, "Warm");
    assert_eq!(result.words()[0], "clammy");
    assert_well_formed(&result, 8);
}

#[test]
fn test_idempotent() {
    let (engine, _dir) = fixtures::engine();
    let first = engine.morph_word("home", "joy", None, None, 8);
    let second = engine.morph_word("home", "joy", None, None, 8);
    assert_eq!(first, second);
}

#[test]
fn test_verb_is_reinflected() {
    let (engine, _dir) = fixtures::engine();
    let context = fixtures::words(&["running", "fast"]);
    let result = engine.morph_word("running", "joy", None, Some(context.as_slice()), 8);

    assert_eq!(result.words(), vec!["jogging", "sprinting", "dashing"]);
    assert_well_formed(&result, 8);
}

#[test]
fn test_noun_candidates_need_a_noun_sense() {
    let (engine, _dir) = fixtures::engine();
    let context = fixtures::words(&["home", "alone"]);
    let result = engine.morph_word("home", "joy", None, Some(context.as_slice()), 8);

    assert_eq!(
        result.words(),
        vec!["house", "cat", "warmth", "race", "heat", "fear", "dread", "terror"]
    );
    // Close in embedding space, but WordNet has no noun sense for these.
    for word in ["heart", "sun", "fire"] {
        assert!(!result.words().contains(&word));
    }
}

#[test]
fn test_context_selects_verb_reading() {
    let (engine, _dir) = fixtures::engine();

    let context = fixtures::words(&["to", "race"]);
    let verb = engine.morph_word("race", "dread", None, Some(context.as_slice()), 8);
    assert_eq!(verb.words(), vec!["dash", "run", "sprint", "jog"]);

    let noun = engine.morph_word("race", "dread", None, None, 8);
    assert!(!noun.words().contains(&"sprint"));
    assert!(noun.words().contains(&"terror"));
}

#[test]
fn test_batch_preserves_order() {
    let (engine, _dir) = fixtures::engine();
    let words = fixtures::words(&["running", "home"]);
    let contexts = vec![
        fixtures::words(&["running", "fast"]),
        fixtures::words(&["home", "alone"]),
    ];

    let results = engine.morph_words(&words, "joy", None, Some(contexts.as_slice()), 8);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].original, "running");
    assert_eq!(results[1].original, "home");
    assert_eq!(results[0].words()[0], "jogging");
    assert_eq!(results[1].words()[0], "house");
}

#[test]
fn test_batch_with_misses_keeps_positions() {
    let (engine, _dir) = fixtures::engine();
    let words = fixtures::words(&["xyzzyqq", "warm", "qqq", "home"]);

    let results = engine.morph_words(&words, "dread", None, None, 3);

    let originals: Vec<&str> = results.iter().map(|r| r.original.as_str()).collect();
    assert_eq!(originals, vec!["xyzzyqq", "warm", "qqq", "home"]);
    assert!(results[0].is_empty());
    assert!(!results[1].is_empty());
    assert!(results[2].is_empty());
    for result in &results {
        assert_well_formed(result, 3);
    }
}

#[test]
fn test_batch_with_short_contexts() {
    let (engine, _dir) = fixtures::engine();
    let words = fixtures::words(&["warm", "home"]);
    let contexts = vec![fixtures::words(&["warm", "night"])];

    let results = engine.morph_words(&words, "dread", None, Some(contexts.as_slice()), 8);
    assert_eq!(results.len(), 2);
    assert_eq!(results[1], engine.morph_word("home", "dread", None, None, 8));
}

#[test]
fn test_emoji_excludes_input() {
    let (engine, _dir) = fixtures::engine();
    let result = engine.morph_emoji("🐈", "joy", 50);

    assert_eq!(result.original, "🐈");
    assert!(!result.is_empty());
    assert!(!result.words().contains(&"🐈"));
    // CAT FACE reduces to the same name word as CAT.
    assert!(result.words().contains(&"🐱"));
    assert_well_formed(&result, 50);
}

#[test]
fn test_emoji_with_presentation_selector() {
    let (engine, _dir) = fixtures::engine();
    let plain = engine.morph_emoji("☀", "joy", 3);
    let selected = engine.morph_emoji("☀\u{FE0F}", "joy", 3);

    assert!(!plain.is_empty());
    assert_eq!(plain.candidates, selected.candidates);
    assert!(!selected.words().contains(&"☀"));
}

#[test]
fn test_emoji_misses() {
    let (engine, _dir) = fixtures::engine();
    assert!(engine.morph_emoji("A", "joy", 5).is_empty());
    assert!(engine.morph_emoji("😀", "joy", 5).is_empty());
    assert!(engine.morph_emoji("🔥", "xyzzyqq", 5).is_empty());
}

#[test]
fn test_token_dispatch() {
    let (engine, _dir) = fixtures::engine();

    let word = engine.morph_token(&Token::parse("warm"), "dread", None, None, 2);
    assert_eq!(word.words(), vec!["clammy", "feverish"]);

    let glyph = engine.morph_token(&Token::parse("🔥"), "dread", Some("joy"), None, 2);
    assert_eq!(glyph.original, "🔥");
    assert_eq!(glyph.candidates.len(), 2);
    assert_eq!(glyph.source_vibe, None);
}
