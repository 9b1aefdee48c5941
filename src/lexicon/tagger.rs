//! Averaged-perceptron part-of-speech tagger producing Penn Treebank tags.
//!
//! Inference only. The model is the three-document JSON layout used by the
//! common English perceptron tagger distribution:
//! - `*.weights.json`: feature -> tag -> weight
//! - `*.tagdict.json`: unambiguous word -> tag
//! - `*.classes.json`: list of tags

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const START: [&str; 2] = ["-START-", "-START2-"];
const END: [&str; 2] = ["-END-", "-END2-"];

/// Errors raised by a tagger.
#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    #[error("No tagger model available")]
    Unavailable,

    #[error("Nothing to tag")]
    EmptyInput,

    #[error("Tagger model file missing: {0}")]
    MissingModelFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tagger model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sequence tagger: one fine-grained tag per input token.
pub trait PosTagger: Send + Sync {
    fn tag_tokens(&self, tokens: &[&str]) -> Result<Vec<String>, TaggerError>;
}

/// Stand-in used when no tagger model is installed. Every call fails, which
/// callers treat as "no tag available".
pub struct UnavailableTagger;

impl PosTagger for UnavailableTagger {
    fn tag_tokens(&self, _tokens: &[&str]) -> Result<Vec<String>, TaggerError> {
        Err(TaggerError::Unavailable)
    }
}

pub struct PerceptronTagger {
    weights: HashMap<String, HashMap<String, f64>>,
    tagdict: HashMap<String, String>,
    classes: Vec<String>,
}

impl PerceptronTagger {
    pub fn from_parts(
        weights: HashMap<String, HashMap<String, f64>>,
        tagdict: HashMap<String, String>,
        classes: Vec<String>,
    ) -> Self {
        Self {
            weights,
            tagdict,
            classes,
        }
    }

    /// Load the JSON model files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, TaggerError> {
        let weights = read_json(&find_model_file(dir, ".weights.json")?)?;
        let tagdict = read_json(&find_model_file(dir, ".tagdict.json")?)?;
        let classes = read_json(&find_model_file(dir, ".classes.json")?)?;

        let tagger = Self::from_parts(weights, tagdict, classes);
        log::info!(
            "Loaded POS tagger from {} ({} features, {} tags)",
            dir.display(),
            tagger.weights.len(),
            tagger.classes.len()
        );
        Ok(tagger)
    }

    fn predict(&self, features: &[String]) -> Option<&str> {
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for feature in features {
            if let Some(weights) = self.weights.get(feature) {
                for (label, weight) in weights {
                    *scores.entry(label.as_str()).or_insert(0.0) += weight;
                }
            }
        }

        let score = |label: &str| scores.get(label).copied().unwrap_or(0.0);
        self.classes
            .iter()
            .max_by(|a, b| {
                score(a)
                    .partial_cmp(&score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.cmp(b))
            })
            .map(String::as_str)
    }
}

impl PosTagger for PerceptronTagger {
    fn tag_tokens(&self, tokens: &[&str]) -> Result<Vec<String>, TaggerError> {
        if tokens.is_empty() {
            return Err(TaggerError::EmptyInput);
        }

        let context: Vec<String> = START
            .iter()
            .map(|s| s.to_string())
            .chain(tokens.iter().map(|w| normalize(w)))
            .chain(END.iter().map(|s| s.to_string()))
            .collect();

        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        let mut output = Vec::with_capacity(tokens.len());

        for (i, word) in tokens.iter().enumerate() {
            let tag = match self.tagdict.get(*word) {
                Some(tag) => tag.clone(),
                None => {
                    let features = features(i, word, &context, &prev, &prev2);
                    self.predict(&features)
                        .ok_or(TaggerError::Unavailable)?
                        .to_string()
                }
            };
            prev2 = std::mem::replace(&mut prev, tag.clone());
            output.push(tag);
        }

        Ok(output)
    }
}

/// Map a token to the form used in context features.
fn normalize(word: &str) -> String {
    let first = word.chars().next();
    if word.contains('-') && first != Some('-') {
        "!HYPHEN".to_string()
    } else if word.chars().count() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
        "!YEAR".to_string()
    } else if first.map_or(false, |c| c.is_ascii_digit()) {
        "!DIGITS".to_string()
    } else {
        word.to_lowercase()
    }
}

fn suffix(word: &str) -> String {
    let count = word.chars().count();
    word.chars().skip(count.saturating_sub(3)).collect()
}

fn features(i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> Vec<String> {
    let i = i + START.len();
    let first = word.chars().next().map(String::from).unwrap_or_default();

    vec![
        "bias".to_string(),
        format!("i suffix {}", suffix(word)),
        format!("i pref1 {}", first),
        format!("i-1 tag {}", prev),
        format!("i-2 tag {}", prev2),
        format!("i tag+i-2 tag {} {}", prev, prev2),
        format!("i word {}", context[i]),
        format!("i-1 tag+i word {} {}", prev, context[i]),
        format!("i-1 word {}", context[i - 1]),
        format!("i-1 suffix {}", suffix(&context[i - 1])),
        format!("i-2 word {}", context[i - 2]),
        format!("i+1 word {}", context[i + 1]),
        format!("i+1 suffix {}", suffix(&context[i + 1])),
        format!("i+2 word {}", context[i + 2]),
    ]
}

fn find_model_file(dir: &Path, suffix: &str) -> Result<PathBuf, TaggerError> {
    std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(suffix))
        })
        .ok_or_else(|| TaggerError::MissingModelFile(format!("{}/*{}", dir.display(), suffix)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TaggerError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(entries: &[(&str, &[(&str, f64)])]) -> HashMap<String, HashMap<String, f64>> {
        entries
            .iter()
            .map(|(feature, labels)| {
                (
                    feature.to_string(),
                    labels.iter().map(|(l, w)| (l.to_string(), *w)).collect(),
                )
            })
            .collect()
    }

    fn test_tagger() -> PerceptronTagger {
        let weights = weights(&[
            ("bias", &[("NN", 0.5)]),
            ("i suffix ing", &[("VBG", 2.0), ("NN", 0.5)]),
            ("i-1 word the", &[("NN", 3.0), ("VBG", -1.0)]),
            ("i suffix arm", &[("JJ", 1.0)]),
        ]);
        let tagdict = [("the", "DT")]
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .collect();
        let classes = ["DT", "JJ", "NN", "VBG"].iter().map(|s| s.to_string()).collect();
        PerceptronTagger::from_parts(weights, tagdict, classes)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("well-being"), "!HYPHEN");
        assert_eq!(normalize("-ish"), "-ish");
        assert_eq!(normalize("1999"), "!YEAR");
        assert_eq!(normalize("42nd"), "!DIGITS");
        assert_eq!(normalize("Warm"), "warm");
    }

    #[test]
    fn test_suffix_handles_short_and_multibyte_words() {
        assert_eq!(suffix("running"), "ing");
        assert_eq!(suffix("go"), "go");
        assert_eq!(suffix("naïve"), "ïve");
    }

    #[test]
    fn test_features_use_context_window() {
        let context: Vec<String> = ["-START-", "-START2-", "the", "dog", "-END-", "-END2-"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let features = features(1, "dog", &context, "DT", "-START-");

        assert!(features.contains(&"i word dog".to_string()));
        assert!(features.contains(&"i-1 word the".to_string()));
        assert!(features.contains(&"i-2 word -START2-".to_string()));
        assert!(features.contains(&"i+1 word -END-".to_string()));
        assert!(features.contains(&"i+2 word -END2-".to_string()));
        assert!(features.contains(&"i tag+i-2 tag DT -START-".to_string()));
    }

    #[test]
    fn test_tagdict_short_circuits() {
        let tagger = test_tagger();
        assert_eq!(tagger.tag_tokens(&["the"]).unwrap(), vec!["DT"]);
    }

    #[test]
    fn test_isolated_word_uses_suffix_weights() {
        let tagger = test_tagger();
        assert_eq!(tagger.tag_tokens(&["understanding"]).unwrap(), vec!["VBG"]);
    }

    #[test]
    fn test_context_changes_tag() {
        let tagger = test_tagger();
        let tags = tagger.tag_tokens(&["the", "understanding"]).unwrap();
        assert_eq!(tags, vec!["DT", "NN"]);
    }

    #[test]
    fn test_ties_prefer_largest_label() {
        let tagger = PerceptronTagger::from_parts(
            HashMap::new(),
            HashMap::new(),
            vec!["JJ".to_string(), "NN".to_string()],
        );
        assert_eq!(tagger.tag_tokens(&["zzz"]).unwrap(), vec!["NN"]);
    }

    #[test]
    fn test_empty_input_is_error() {
        let tagger = test_tagger();
        assert!(matches!(tagger.tag_tokens(&[]), Err(TaggerError::EmptyInput)));
    }

    #[test]
    fn test_unavailable_tagger() {
        assert!(matches!(
            UnavailableTagger.tag_tokens(&["word"]),
            Err(TaggerError::Unavailable)
        ));
    }

    #[test]
    fn test_load_from_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("averaged_perceptron_tagger_eng");
        std::fs::write(
            base.with_extension("weights.json"),
            r#"{"bias": {"NN": 1.0}}"#,
        )
        .unwrap();
        std::fs::write(base.with_extension("tagdict.json"), r#"{"a": "DT"}"#).unwrap();
        std::fs::write(base.with_extension("classes.json"), r#"["DT", "NN"]"#).unwrap();

        let tagger = PerceptronTagger::load(dir.path()).unwrap();
        assert_eq!(tagger.tag_tokens(&["a", "cat"]).unwrap(), vec!["DT", "NN"]);
    }

    #[test]
    fn test_load_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = PerceptronTagger::load(dir.path());
        assert!(matches!(result, Err(TaggerError::MissingModelFile(_))));
    }
}
