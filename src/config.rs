use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::DataDir;

const CONFIG_FILE: &str = "config.yaml";

/// Default embedding space (GloVe, 400k words, 100 dimensions)
const DEFAULT_EMBEDDING_NAME: &str = "glove-wiki-gigaword-100";
const DEFAULT_EMBEDDING_URL: &str =
    "https://github.com/RaRe-Technologies/gensim-data/releases/download/glove-wiki-gigaword-100/glove-wiki-gigaword-100.gz";
/// Default resource download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_WORDNET_URL: &str = "https://wordnetcode.princeton.edu/wn3.1.dict.tar.gz";
const DEFAULT_TAGGER_URL: &str =
    "https://raw.githubusercontent.com/nltk/nltk_data/gh-pages/packages/taggers/averaged_perceptron_tagger_eng.zip";
const DEFAULT_TOP_N: usize = 8;
const DEFAULT_OVERSAMPLE: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Invalid(String),
}

/// Where the embedding space comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Name of the embedding space, also the cache file name
    #[serde(default = "default_embedding_name")]
    pub name: String,

    /// Download URL of the word2vec/GloVe text file (optionally gzipped)
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Timeout for resource downloads in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_EMBEDDING_NAME.to_string(),
            url: DEFAULT_EMBEDDING_URL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordNetConfig {
    /// Tarball containing a WordNet `dict/` directory
    #[serde(default = "default_wordnet_url")]
    pub url: String,

    /// Pre-installed `dict/` directory; skips the download when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for WordNetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WORDNET_URL.to_string(),
            path: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Zip archive with the perceptron tagger JSON model
    #[serde(default = "default_tagger_url")]
    pub url: String,

    /// Directory with the perceptron tagger JSON model; skips the download when set.
    /// Defaults to `<data>/taggers/averaged_perceptron_tagger_eng`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TAGGER_URL.to_string(),
            path: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Candidates returned per word when the caller does not say
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Embedding neighbours fetched per wanted candidate
    #[serde(default = "default_oversample")]
    pub oversample: usize,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            oversample: DEFAULT_OVERSAMPLE,
        }
    }
}

fn default_embedding_name() -> String {
    DEFAULT_EMBEDDING_NAME.to_string()
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_wordnet_url() -> String {
    DEFAULT_WORDNET_URL.to_string()
}

fn default_tagger_url() -> String {
    DEFAULT_TAGGER_URL.to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_oversample() -> usize {
    DEFAULT_OVERSAMPLE
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub wordnet: WordNetConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub morph: MorphConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "embedding.name must not be empty".to_string(),
            ));
        }

        if self.embedding.download_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "embedding.download_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.morph.top_n == 0 {
            return Err(ConfigError::Invalid(
                "morph.top_n must be greater than 0".to_string(),
            ));
        }

        if self.morph.oversample == 0 {
            return Err(ConfigError::Invalid(
                "morph.oversample must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load `config.yaml` from the data dir, creating it with defaults on
    /// first run.
    pub fn load_with(data: &DataDir) -> Result<Self, ConfigError> {
        // create new if does not exist
        if !data.exists(CONFIG_FILE) {
            data.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(data.read(CONFIG_FILE)?)?;
        let config: Self = serde_yml::from_str(&config_str)?;

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save(data)?;
        }

        Ok(config)
    }

    pub fn save(&self, data: &DataDir) -> Result<(), ConfigError> {
        let config_str = serde_yml::to_string(&self)?;
        data.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir() -> (DataDir, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (DataDir::new(dir.path()).unwrap(), dir)
    }

    #[test]
    fn test_creates_default_config() {
        let (data, _dir) = data_dir();
        let config = Config::load_with(&data).unwrap();

        assert_eq!(config, Config::default());
        assert!(data.exists(CONFIG_FILE));
        assert_eq!(config.embedding.name, "glove-wiki-gigaword-100");
        assert_eq!(config.morph.top_n, 8);
        assert_eq!(config.morph.oversample, 5);
    }

    #[test]
    fn test_fills_missing_fields_and_resaves() {
        let (data, _dir) = data_dir();
        data.write(CONFIG_FILE, b"morph:\n  top_n: 3\n").unwrap();

        let config = Config::load_with(&data).unwrap();
        assert_eq!(config.morph.top_n, 3);
        assert_eq!(config.morph.oversample, 5);
        assert_eq!(config.embedding.download_timeout_secs, 300);

        let saved = String::from_utf8(data.read(CONFIG_FILE).unwrap()).unwrap();
        assert!(saved.contains("oversample: 5"));
        assert!(saved.contains("glove-wiki-gigaword-100"));
    }

    #[test]
    fn test_optional_paths() {
        let (data, _dir) = data_dir();
        data.write(
            CONFIG_FILE,
            b"wordnet:\n  path: /opt/wordnet/dict\ntagger:\n  path: /opt/tagger\n",
        )
        .unwrap();

        let config = Config::load_with(&data).unwrap();
        assert_eq!(config.wordnet.path, Some(PathBuf::from("/opt/wordnet/dict")));
        assert_eq!(config.tagger.path, Some(PathBuf::from("/opt/tagger")));
        assert!(config.tagger.url.ends_with("averaged_perceptron_tagger_eng.zip"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let (data, _dir) = data_dir();
        data.write(CONFIG_FILE, b"embedding:\n  download_timeout_secs: 0\n")
            .unwrap();
        let result = Config::load_with(&data);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let mut config = Config::default();
        config.morph.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let (data, _dir) = data_dir();
        data.write(CONFIG_FILE, b"morph: [unclosed\n").unwrap();
        assert!(matches!(Config::load_with(&data), Err(ConfigError::Yaml(_))));
    }
}
