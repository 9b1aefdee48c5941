//! Fetching and caching the on-disk resources the lexicon is built from.
//!
//! Layout under the data dir:
//! - `embeddings/<name>.txt[.gz]`: downloaded source text
//! - `embeddings/<name>.bin`: parsed binary cache
//! - `wordnet/`: unpacked WordNet tarball (the `dict/` dir is searched for)
//! - `taggers/averaged_perceptron_tagger_eng/`: unpacked tagger JSON model

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use tar::Archive;

use crate::config::{Config, EmbeddingConfig, TaggerConfig, WordNetConfig};
use crate::lexicon::embeddings::{EmbeddingError, EmbeddingStore};
use crate::lexicon::storage::VectorStorage;
use crate::storage::DataDir;

const EMBEDDINGS_DIR: &str = "embeddings";
const WORDNET_DIR: &str = "wordnet";
const TAGGERS_DIR: &str = "taggers";
const TAGGER_NAME: &str = "averaged_perceptron_tagger_eng";

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Resolves resources into the data dir, downloading what is missing.
pub struct Acquirer {
    data: DataDir,
    timeout: Duration,
    show_progress: bool,
}

impl Acquirer {
    pub fn new(data: DataDir, config: &Config) -> Self {
        Self {
            data,
            timeout: Duration::from_secs(config.embedding.download_timeout_secs),
            show_progress: true,
        }
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Load the embedding space, preferring the binary cache.
    ///
    /// A stale or unreadable cache is rebuilt from the source text.
    pub fn embedding_store(&self, config: &EmbeddingConfig) -> Result<EmbeddingStore, AcquireError> {
        let dir = self.data.subdir(EMBEDDINGS_DIR)?;
        let cache = VectorStorage::new(dir.join(format!("{}.bin", config.name)));

        if cache.exists() {
            match cache.load(&config.name) {
                Ok(store) => {
                    log::info!(
                        "Loaded {} embeddings from cache {}",
                        store.len(),
                        cache.path().display()
                    );
                    return Ok(store);
                }
                Err(e) => log::warn!("Ignoring embedding cache {}: {}", cache.path().display(), e),
            }
        }

        let source = dir.join(source_file_name(&config.name, &config.url));
        if !source.exists() {
            self.download(&config.url, &source)?;
        }

        log::info!("Parsing embeddings from {}", source.display());
        let store = EmbeddingStore::from_text(&config.name, open_text(&source)?)?;
        log::info!("Parsed {} embeddings ({} dimensions)", store.len(), store.dimensions());

        if let Err(e) = cache.save(&store) {
            log::warn!("Could not write embedding cache: {}", e);
        }

        Ok(store)
    }

    /// Directory holding the WordNet `index.*`/`data.*` files.
    pub fn wordnet_dir(&self, config: &WordNetConfig) -> Result<PathBuf, AcquireError> {
        if let Some(path) = &config.path {
            return find_dict_dir(path).ok_or_else(|| {
                AcquireError::Archive(format!("no WordNet dictionary in {}", path.display()))
            });
        }

        let root = self.data.subdir(WORDNET_DIR)?;
        if let Some(dict) = find_dict_dir(&root) {
            return Ok(dict);
        }

        let tarball = self.data.path(&format!("{}.tar.gz", WORDNET_DIR));
        self.download(&config.url, &tarball)?;
        unpack_tarball(&tarball, &root)?;
        std::fs::remove_file(&tarball)?;

        find_dict_dir(&root).ok_or_else(|| {
            AcquireError::Archive(format!("no WordNet dictionary in {}", config.url))
        })
    }

    /// Directory holding the tagger JSON model.
    ///
    /// A configured path is used as is. Otherwise the model zip is
    /// downloaded (unless already present) and unpacked under `taggers/`.
    pub fn tagger_dir(&self, config: &TaggerConfig) -> Result<PathBuf, AcquireError> {
        if let Some(path) = &config.path {
            return Ok(path.clone());
        }

        let root = self.data.subdir(TAGGERS_DIR)?;
        let dir = root.join(TAGGER_NAME);
        if has_tagger_model(&dir) {
            return Ok(dir);
        }

        let archive = root.join(format!("{}.zip", TAGGER_NAME));
        if !archive.exists() {
            self.download(&config.url, &archive)?;
        }
        unpack_zip(&archive, &root)?;
        std::fs::remove_file(&archive)?;

        if has_tagger_model(&dir) {
            Ok(dir)
        } else {
            Err(AcquireError::Archive(format!(
                "no {} model in {}",
                TAGGER_NAME, config.url
            )))
        }
    }

    /// Stream `url` into `dest` through a temp file in the same directory.
    pub fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError> {
        log::info!("Downloading {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(url).send()?;

        if !response.status().is_success() {
            return Err(AcquireError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let progress = self.progress_bar(response.content_length());
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::copy(&mut progress.wrap_read(response), &mut temp)?;
        temp.persist(dest).map_err(|e| e.error)?;

        progress.finish_and_clear();
        log::info!("Saved {}", dest.display());
        Ok(())
    }

    fn progress_bar(&self, len: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match len {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})",
                ) {
                    bar.set_style(style);
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

fn source_file_name(name: &str, url: &str) -> String {
    if url.ends_with(".gz") {
        format!("{name}.txt.gz")
    } else {
        format!("{name}.txt")
    }
}

/// Open a text file, transparently gunzipping `.gz` files.
fn open_text(path: &Path) -> Result<Box<dyn BufRead>, AcquireError> {
    let file = File::open(path)?;
    let is_gzip = path.extension().map_or(false, |ext| ext == "gz");
    if is_gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn unpack_tarball(tarball: &Path, dest: &Path) -> Result<(), AcquireError> {
    let file = File::open(tarball)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest)
        .map_err(|e| AcquireError::Archive(format!("failed to unpack {}: {}", tarball.display(), e)))
}

fn unpack_zip(path: &Path, dest: &Path) -> Result<(), AcquireError> {
    let archive_error = |e: zip::result::ZipError| {
        AcquireError::Archive(format!("failed to unpack {}: {}", path.display(), e))
    };

    let mut archive = zip::ZipArchive::new(File::open(path)?).map_err(archive_error)?;
    archive.extract(dest).map_err(archive_error)
}

fn has_tagger_model(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|entry| entry.ok()).any(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| name.ends_with(".weights.json"))
            })
        })
        .unwrap_or(false)
}

/// `dir` itself or its first descendant (two levels deep) containing `index.noun`.
fn find_dict_dir(dir: &Path) -> Option<PathBuf> {
    if dir.join("index.noun").is_file() {
        return Some(dir.to_path_buf());
    }

    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();

    for child in &children {
        if child.join("index.noun").is_file() {
            return Some(child.clone());
        }
    }
    for child in &children {
        if let Ok(entries) = std::fs::read_dir(child) {
            let mut nested: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.join("index.noun").is_file())
                .collect();
            nested.sort();
            if let Some(found) = nested.into_iter().next() {
                return Some(found);
            }
        }
    }

    None
}
