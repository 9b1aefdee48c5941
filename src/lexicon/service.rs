//! Process-wide, load-once access to the morph engine.
//!
//! Loading means downloading and parsing hundreds of megabytes, so it runs
//! at most once: concurrent first callers block on the same load, and
//! non-blocking callers can ask whether it has finished.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::{Config, TaggerConfig};
use crate::lexicon::acquire::{AcquireError, Acquirer};
use crate::lexicon::inflect::EnglishInflector;
use crate::lexicon::tagger::{PerceptronTagger, PosTagger, UnavailableTagger};
use crate::lexicon::wordnet::{WordNet, WordNetError};
use crate::morph::MorphEngine;
use crate::storage::DataDir;

/// The lexical resources could not be obtained. No morph call can proceed.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resources unavailable: {0}")]
    Acquire(#[from] AcquireError),

    #[error("Resources unavailable: {0}")]
    WordNet(#[from] WordNetError),

    #[error("Resources unavailable: {0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub ready: bool,
    pub error: Option<String>,
}

type Loader = dyn Fn(&Config, &DataDir) -> Result<MorphEngine, ResourceError> + Send + Sync;

pub struct LexiconService {
    config: Config,
    data: DataDir,
    loader: Box<Loader>,
    engine: OnceCell<Arc<MorphEngine>>,
    last_error: Mutex<Option<String>>,
}

impl LexiconService {
    pub fn new(config: Config, data: DataDir) -> Self {
        Self::with_loader(config, data, load_engine)
    }

    /// Service whose engine is produced by `loader` instead of the default
    /// download-and-parse path.
    pub fn with_loader<F>(config: Config, data: DataDir, loader: F) -> Self
    where
        F: Fn(&Config, &DataDir) -> Result<MorphEngine, ResourceError> + Send + Sync + 'static,
    {
        Self {
            config,
            data,
            loader: Box::new(loader),
            engine: OnceCell::new(),
            last_error: Mutex::new(None),
        }
    }

    /// The engine, loading it on first call. A failed load is recorded and
    /// retried by the next caller.
    pub fn engine(&self) -> Result<Arc<MorphEngine>, ResourceError> {
        let result = self.engine.get_or_try_init(|| {
            let _span = tracing::info_span!("load_lexicon").entered();
            log::info!("Loading lexical resources from {}", self.data.base_dir.display());
            (self.loader)(&self.config, &self.data).map(Arc::new)
        });

        let mut last_error = self
            .last_error
            .lock()
            .map_err(|e| ResourceError::Other(format!("Lock poisoned: {}", e)))?;

        match result {
            Ok(engine) => {
                *last_error = None;
                Ok(engine.clone())
            }
            Err(e) => {
                log::warn!("{}", e);
                *last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The engine if it has finished loading, without waiting.
    pub fn try_engine(&self) -> Option<Arc<MorphEngine>> {
        self.engine.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Start loading on a background thread.
    pub fn preload(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        std::thread::spawn(move || {
            if service.engine().is_ok() {
                log::info!("Lexical resources ready");
            }
        })
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            ready: self.is_loaded(),
            error: self
                .last_error
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
        }
    }
}

/// Acquire every resource and assemble the engine.
///
/// The tagger model is optional: if it cannot be fetched or parsed every
/// word goes untagged and POS filtering is skipped.
fn load_engine(config: &Config, data: &DataDir) -> Result<MorphEngine, ResourceError> {
    let acquirer = Acquirer::new(data.clone(), config);

    let store = acquirer.embedding_store(&config.embedding)?;
    let wordnet = WordNet::load(&acquirer.wordnet_dir(&config.wordnet)?)?;

    let tagger = load_tagger(&acquirer, &config.tagger);

    Ok(MorphEngine::new(
        Arc::new(store),
        Arc::new(wordnet),
        tagger,
        Arc::new(EnglishInflector),
    )
    .with_oversample(config.morph.oversample))
}

fn load_tagger(acquirer: &Acquirer, config: &TaggerConfig) -> Arc<dyn PosTagger> {
    let dir = match acquirer.tagger_dir(config) {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!("POS tagger unavailable ({}); part-of-speech filtering disabled", e);
            return Arc::new(UnavailableTagger);
        }
    };

    match PerceptronTagger::load(&dir) {
        Ok(tagger) => Arc::new(tagger),
        Err(e) => {
            log::warn!(
                "POS tagger unavailable at {} ({}); part-of-speech filtering disabled",
                dir.display(),
                e
            );
            Arc::new(UnavailableTagger)
        }
    }
}
