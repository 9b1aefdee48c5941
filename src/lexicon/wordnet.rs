//! Lexical dictionary backed by the WordNet database files.
//!
//! Reads the `index.*`, `data.*` and `*.exc` files of a WordNet 3.x `dict/`
//! directory into memory and answers:
//! - synonym lookups with one hop through hypernym/hyponym/similar-to links
//! - morphy-style lemmatization (exception lists, then suffix detachment)
//! - whether a word has any sense under a part of speech

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::lexicon::pos::CoarsePos;

/// Dictionary contract the morph engine consumes.
pub trait LexicalDictionary: Send + Sync {
    /// Single-word synonyms of `lemma`, plus one hop through related synsets.
    fn synonyms(&self, lemma: &str, pos: CoarsePos) -> BTreeSet<String>;

    /// Dictionary base form of `word`, or `word` unchanged if unknown.
    fn lemmatize(&self, word: &str, pos: CoarsePos) -> String;

    /// True if the dictionary records at least one sense of `word` under `pos`.
    fn can_serve_pos(&self, word: &str, pos: CoarsePos) -> bool;
}

/// Errors that can occur while loading WordNet.
#[derive(Debug, thiserror::Error)]
pub enum WordNetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WordNet file missing: {0}")]
    MissingFile(PathBuf),

    #[error("Malformed {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },
}

/// Pointer symbols followed when expanding synonyms: hypernym, instance
/// hypernym, hyponym, instance hyponym and similar-to.
const EXPANSION_POINTERS: [&str; 5] = ["@", "@i", "~", "~i", "&"];

#[derive(Debug, Clone)]
struct Pointer {
    offset: u64,
    pos: CoarsePos,
}

#[derive(Debug, Clone, Default)]
struct Synset {
    words: Vec<String>,
    pointers: Vec<Pointer>,
}

/// Everything WordNet stores for one part of speech.
#[derive(Debug, Default)]
struct PartIndex {
    lemmas: HashMap<String, Vec<u64>>,
    synsets: HashMap<u64, Synset>,
    exceptions: HashMap<String, Vec<String>>,
}

pub struct WordNet {
    parts: [PartIndex; 4],
}

impl WordNet {
    /// Load a WordNet `dict/` directory.
    pub fn load(dict_dir: &Path) -> Result<Self, WordNetError> {
        let mut parts: [PartIndex; 4] = Default::default();

        for pos in CoarsePos::ALL {
            let suffix = file_suffix(pos);
            let part = &mut parts[slot(pos)];

            let index_path = dict_dir.join(format!("index.{suffix}"));
            part.read_index(open(&index_path)?, &index_path)?;

            let data_path = dict_dir.join(format!("data.{suffix}"));
            part.read_data(open(&data_path)?, &data_path)?;

            // Adverbs ship without an exception list in some distributions.
            let exc_path = dict_dir.join(format!("{suffix}.exc"));
            if exc_path.exists() {
                part.read_exceptions(open(&exc_path)?)?;
            }
        }

        let wordnet = Self { parts };
        log::info!(
            "Loaded WordNet from {} ({} lemmas, {} synsets)",
            dict_dir.display(),
            wordnet.parts.iter().map(|p| p.lemmas.len()).sum::<usize>(),
            wordnet.parts.iter().map(|p| p.synsets.len()).sum::<usize>()
        );
        Ok(wordnet)
    }

    fn part(&self, pos: CoarsePos) -> &PartIndex {
        &self.parts[slot(pos)]
    }

    /// Candidate lemmas for `form`, following the morphy algorithm.
    pub fn morphy(&self, form: &str, pos: CoarsePos) -> Vec<String> {
        let part = self.part(pos);
        let form = form.to_lowercase();

        let known = |forms: Vec<String>| -> Vec<String> {
            let mut result: Vec<String> = Vec::new();
            for form in forms {
                if part.lemmas.contains_key(&form) && !result.contains(&form) {
                    result.push(form);
                }
            }
            result
        };

        if let Some(bases) = part.exceptions.get(&form) {
            let mut forms = vec![form.clone()];
            forms.extend(bases.iter().cloned());
            return known(forms);
        }

        let mut forms = detach_suffixes(&[form.clone()], pos);
        let mut candidates = vec![form];
        candidates.extend(forms.iter().cloned());
        let results = known(candidates);
        if !results.is_empty() {
            return results;
        }

        while !forms.is_empty() {
            forms = detach_suffixes(&forms, pos);
            let results = known(forms.clone());
            if !results.is_empty() {
                return results;
            }
        }

        vec![]
    }

    /// Synsets of `word` under `pos`, as (pos, offset) keys.
    fn synsets(&self, word: &str, pos: CoarsePos) -> Vec<(CoarsePos, u64)> {
        let part = self.part(pos);
        let mut keys = Vec::new();
        for lemma in self.morphy(word, pos) {
            for &offset in part.lemmas.get(&lemma).into_iter().flatten() {
                if !keys.contains(&(pos, offset)) {
                    keys.push((pos, offset));
                }
            }
        }
        keys
    }

    fn synset(&self, pos: CoarsePos, offset: u64) -> Option<&Synset> {
        self.part(pos).synsets.get(&offset)
    }
}

impl LexicalDictionary for WordNet {
    fn synonyms(&self, lemma: &str, pos: CoarsePos) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let add_words = |synset: &Synset, found: &mut BTreeSet<String>| {
            for word in &synset.words {
                if !word.contains('_') && !word.contains(' ') {
                    found.insert(word.clone());
                }
            }
        };

        for (synset_pos, offset) in self.synsets(lemma, pos) {
            let Some(synset) = self.synset(synset_pos, offset) else {
                continue;
            };
            add_words(synset, &mut found);

            for pointer in &synset.pointers {
                if let Some(related) = self.synset(pointer.pos, pointer.offset) {
                    add_words(related, &mut found);
                }
            }
        }

        found.remove(&lemma.to_lowercase());
        found
    }

    fn lemmatize(&self, word: &str, pos: CoarsePos) -> String {
        self.morphy(word, pos)
            .into_iter()
            .min_by_key(|lemma| lemma.len())
            .unwrap_or_else(|| word.to_string())
    }

    fn can_serve_pos(&self, word: &str, pos: CoarsePos) -> bool {
        !self.synsets(word, pos).is_empty()
    }
}

impl PartIndex {
    /// `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt offset...`
    fn read_index<R: BufRead>(&mut self, reader: R, path: &Path) -> Result<(), WordNetError> {
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with(' ') || line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let synset_cnt: usize = fields
                .get(2)
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| parse_error(path, line_no, "missing synset count"))?;
            if fields.len() < synset_cnt + 4 {
                return Err(parse_error(path, line_no, "truncated offset list"));
            }

            let offsets = fields[fields.len() - synset_cnt..]
                .iter()
                .map(|f| f.parse::<u64>())
                .collect::<Result<Vec<u64>, _>>()
                .map_err(|e| parse_error(path, line_no, &e.to_string()))?;

            self.lemmas.insert(fields[0].to_lowercase(), offsets);
        }
        Ok(())
    }

    /// `offset lex_filenum ss_type w_cnt word lex_id [...] p_cnt [ptr...] [frames] | gloss`
    fn read_data<R: BufRead>(&mut self, reader: R, path: &Path) -> Result<(), WordNetError> {
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with(' ') || line.trim().is_empty() {
                continue;
            }

            let record = line.split(" | ").next().unwrap_or_default();
            let fields: Vec<&str> = record.split_whitespace().collect();
            let field = |idx: usize| {
                fields
                    .get(idx)
                    .copied()
                    .ok_or_else(|| parse_error(path, line_no, "truncated record"))
            };

            let offset: u64 = field(0)?
                .parse()
                .map_err(|_| parse_error(path, line_no, "bad offset"))?;
            let word_count = usize::from_str_radix(field(3)?, 16)
                .map_err(|_| parse_error(path, line_no, "bad word count"))?;

            let mut words = Vec::with_capacity(word_count);
            for i in 0..word_count {
                words.push(clean_lemma(field(4 + 2 * i)?));
            }

            let pointer_start = 4 + 2 * word_count;
            let pointer_count: usize = field(pointer_start)?
                .parse()
                .map_err(|_| parse_error(path, line_no, "bad pointer count"))?;

            let mut pointers = Vec::new();
            for i in 0..pointer_count {
                let base = pointer_start + 1 + 4 * i;
                if !EXPANSION_POINTERS.contains(&field(base)?) {
                    continue;
                }
                let target: u64 = field(base + 1)?
                    .parse()
                    .map_err(|_| parse_error(path, line_no, "bad pointer offset"))?;
                let Some(target_pos) = pos_from_synset_type(field(base + 2)?) else {
                    continue;
                };
                pointers.push(Pointer {
                    offset: target,
                    pos: target_pos,
                });
            }

            self.synsets.insert(offset, Synset { words, pointers });
        }
        Ok(())
    }

    /// `inflected base [base...]`
    fn read_exceptions<R: BufRead>(&mut self, reader: R) -> Result<(), WordNetError> {
        for line in reader.lines() {
            let line = line?;
            let mut fields = line.split_whitespace();
            if let Some(inflected) = fields.next() {
                let bases: Vec<String> = fields.map(str::to_lowercase).collect();
                if !bases.is_empty() {
                    self.exceptions.insert(inflected.to_lowercase(), bases);
                }
            }
        }
        Ok(())
    }
}

/// Suffix detachment rules, tried in order.
fn substitutions(pos: CoarsePos) -> &'static [(&'static str, &'static str)] {
    match pos {
        CoarsePos::Noun => &[
            ("s", ""),
            ("ses", "s"),
            ("ves", "f"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        CoarsePos::Verb => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        CoarsePos::Adj => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
        CoarsePos::Adv => &[],
    }
}

fn detach_suffixes(forms: &[String], pos: CoarsePos) -> Vec<String> {
    let rules = substitutions(pos);
    forms
        .iter()
        .flat_map(|form| {
            rules
                .iter()
                .filter(move |(old, _)| form.ends_with(old))
                .map(move |(old, new)| format!("{}{}", &form[..form.len() - old.len()], new))
        })
        .collect()
}

/// Lowercase and drop adjective syntactic markers such as `(a)` or `(ip)`.
fn clean_lemma(raw: &str) -> String {
    let word = match raw.find('(') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    word.to_lowercase()
}

fn pos_from_synset_type(code: &str) -> Option<CoarsePos> {
    match code {
        "n" => Some(CoarsePos::Noun),
        "v" => Some(CoarsePos::Verb),
        "a" | "s" => Some(CoarsePos::Adj),
        "r" => Some(CoarsePos::Adv),
        _ => None,
    }
}

fn file_suffix(pos: CoarsePos) -> &'static str {
    match pos {
        CoarsePos::Noun => "noun",
        CoarsePos::Verb => "verb",
        CoarsePos::Adj => "adj",
        CoarsePos::Adv => "adv",
    }
}

fn slot(pos: CoarsePos) -> usize {
    match pos {
        CoarsePos::Noun => 0,
        CoarsePos::Verb => 1,
        CoarsePos::Adj => 2,
        CoarsePos::Adv => 3,
    }
}

fn open(path: &Path) -> Result<BufReader<File>, WordNetError> {
    if !path.exists() {
        return Err(WordNetError::MissingFile(path.to_path_buf()));
    }
    Ok(BufReader::new(File::open(path)?))
}

fn parse_error(path: &Path, line_no: usize, message: &str) -> WordNetError {
    WordNetError::Parse {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        line: line_no + 1,
        message: message.to_string(),
    }
}
