//! Load-once behaviour of the lexicon service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::lexicon::service::{LexiconService, ResourceError};
use crate::storage::DataDir;
use crate::tests::fixtures;

fn data_dir() -> (DataDir, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    (DataDir::new(dir.path()).unwrap(), dir)
}

fn counting_service(loads: Arc<AtomicUsize>, delay: Duration) -> (LexiconService, tempfile::TempDir) {
    let (data, dir) = data_dir();
    let service = LexiconService::with_loader(Config::default(), data, move |_, _| {
        loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(delay);
        Ok(fixtures::engine().0)
    });
    (service, dir)
}

#[test]
fn test_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let (service, _dir) = counting_service(loads.clone(), Duration::ZERO);

    assert!(!service.is_loaded());
    assert!(service.try_engine().is_none());

    let first = service.engine().unwrap();
    let second = service.engine().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(service.is_loaded());
    assert!(service.try_engine().is_some());
}

#[test]
fn test_concurrent_first_callers_share_one_load() {
    let loads = Arc::new(AtomicUsize::new(0));
    let (service, _dir) = counting_service(loads.clone(), Duration::from_millis(50));
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.engine().map(|e| e.store().len()))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_preload_in_background() {
    let loads = Arc::new(AtomicUsize::new(0));
    let (service, _dir) = counting_service(loads.clone(), Duration::from_millis(10));
    let service = Arc::new(service);

    service.preload().join().unwrap();

    assert!(service.is_loaded());
    assert_eq!(service.status().ready, true);
    assert_eq!(service.status().error, None);

    let result = service
        .try_engine()
        .unwrap()
        .morph_word("warm", "dread", None, None, 1);
    assert_eq!(result.words(), vec!["clammy"]);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_is_reported_and_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let (data, _dir) = data_dir();

    let service = LexiconService::with_loader(Config::default(), data, move |_, _| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ResourceError::Other("embedding download failed".to_string()))
        } else {
            Ok(fixtures::engine().0)
        }
    });

    let err = service.engine().err().unwrap();
    assert!(err.to_string().starts_with("Resources unavailable"));

    let status = service.status();
    assert!(!status.ready);
    assert!(status.error.unwrap().contains("embedding download failed"));

    assert!(service.engine().is_ok());
    assert_eq!(service.status().error, None);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_default_loader_reports_missing_resources() {
    let (data, _dir) = data_dir();
    let mut config = Config::default();
    config.embedding.url = "http://127.0.0.1:9/missing.txt".to_string();
    config.embedding.download_timeout_secs = 2;

    let service = LexiconService::new(config, data);
    assert!(matches!(service.engine(), Err(ResourceError::Acquire(_))));
    assert!(service.status().error.is_some());
}

#[test]
fn test_default_loader_with_local_resources() {
    let (data, _dir) = data_dir();
    let embeddings = data.subdir("embeddings").unwrap();
    std::fs::write(
        embeddings.join("fixture.txt"),
        "warm 1.0 0.0 0.2 0.0\ndread 0.0 1.0 -0.3 0.0\nclammy 0.6 0.7 -0.1 0.0\n",
    )
    .unwrap();
    let dict = data.subdir("wordnet/dict").unwrap();
    fixtures::write_wordnet(&dict);

    let mut config = Config::default();
    config.embedding.name = "fixture".to_string();
    config.embedding.url = "http://127.0.0.1:9/fixture.txt".to_string();
    config.tagger.url = "http://127.0.0.1:9/tagger.zip".to_string();

    // The tagger download fails, so words go untagged.
    let service = LexiconService::new(config, data);
    let engine = service.engine().unwrap();
    let result = engine.morph_word("warm", "dread", None, None, 8);
    assert_eq!(result.words(), vec!["clammy"]);
}

#[test]
fn test_default_loader_unpacks_tagger_archive() {
    let (data, _dir) = data_dir();
    fixtures::write_embeddings(&data.subdir("embeddings").unwrap().join("fixture.txt"));
    fixtures::write_wordnet(&data.subdir("wordnet/dict").unwrap());
    let taggers = data.subdir("taggers").unwrap();
    fixtures::write_tagger_archive(&taggers.join("averaged_perceptron_tagger_eng.zip"));

    let mut config = Config::default();
    config.embedding.name = "fixture".to_string();
    config.embedding.url = "http://127.0.0.1:9/fixture.txt".to_string();
    config.tagger.url = "http://127.0.0.1:9/tagger.zip".to_string();

    let service = LexiconService::new(config, data);
    let engine = service.engine().unwrap();

    let context = fixtures::words(&["running", "fast"]);
    let result = engine.morph_word("running", "joy", None, Some(context.as_slice()), 8);
    assert_eq!(result.words(), vec!["jogging", "sprinting", "dashing"]);
    assert!(taggers.join("averaged_perceptron_tagger_eng").is_dir());
}

#[test]
#[ignore = "requires resource download (~130MB)"]
fn test_real_resources() {
    let (data, _dir) = data_dir();
    let service = LexiconService::new(Config::default(), data);
    let engine = service.engine().unwrap();

    let result = engine.morph_word("warm", "dread", None, None, 8);
    assert!(!result.is_empty());
    assert!(result.candidates.len() <= 8);
}
