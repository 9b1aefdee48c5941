//! Binary cache for parsed embedding spaces.
//!
//! Parsing a multi-hundred-megabyte text file is the slow part of loading,
//! so the parsed store is written once and memcpy-loaded afterwards.
//!
//! File format: `<name>.bin`
//!
//! Header (47 bytes):
//! - version: u8 (1)
//! - model_id: [u8; 32] (SHA256 hash of embedding name)
//! - dimensions: u16 (little-endian)
//! - entry_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Entries (repeated):
//! - word_len: u16 (little-endian)
//! - word: [u8; word_len] (UTF-8)
//! - embedding: [f32; dimensions] (little-endian)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::lexicon::embeddings::{EmbeddingError, EmbeddingStore};

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: version(1) + model_id(32) + dimensions(2) + entry_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum VectorStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Model mismatch: file uses different embedding space")]
    ModelMismatch,

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Compute SHA256 hash of an embedding name for storage identification.
pub fn model_id_hash(name: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

/// Storage manager for a cached embedding space.
pub struct VectorStorage {
    path: PathBuf,
}

impl VectorStorage {
    /// Create a new storage manager for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the storage file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the embedding space written for `name`.
    pub fn load(&self, name: &str) -> Result<EmbeddingStore, VectorStorageError> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        let header = Self::read_header(&mut reader)?;
        if header.model_id != model_id_hash(name) {
            return Err(VectorStorageError::ModelMismatch);
        }

        let dimensions = header.dimensions as usize;
        let entry_count = usize::try_from(header.entry_count)
            .ok()
            .filter(|count| count.checked_mul(dimensions).is_some())
            .ok_or_else(|| {
                VectorStorageError::InvalidFormat(format!(
                    "entry count {} is out of range",
                    header.entry_count
                ))
            })?;
        let mut store = EmbeddingStore::with_capacity(name, dimensions, entry_count);

        let mut embedding = vec![0.0f32; dimensions];
        for _ in 0..header.entry_count {
            let word = Self::read_entry(&mut reader, &mut embedding)?;
            store.push(&word, &embedding)?;
        }

        Ok(store)
    }

    /// Save the embedding space.
    ///
    /// Uses atomic write: temp file -> fsync -> rename
    pub fn save(&self, store: &EmbeddingStore) -> Result<(), VectorStorageError> {
        let temp_path = self.path.with_extension("tmp");

        let result = Self::write_to_file(&temp_path, store);

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Delete the storage file if it exists.
    pub fn delete(&self) -> Result<(), VectorStorageError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn write_to_file(path: &Path, store: &EmbeddingStore) -> Result<(), VectorStorageError> {
        let dimensions = u16::try_from(store.dimensions()).map_err(|_| {
            VectorStorageError::InvalidFormat(format!(
                "{} dimensions do not fit the header",
                store.dimensions()
            ))
        })?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = Header {
            version: FORMAT_VERSION,
            model_id: model_id_hash(store.name()),
            dimensions,
            entry_count: store.len() as u64,
        };
        Self::write_header(&mut writer, &header)?;

        for (word, embedding) in store.iter() {
            Self::write_entry(&mut writer, word, embedding)?;
        }

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;

        Ok(())
    }

    fn read_header<R: Read>(reader: &mut R) -> Result<Header, VectorStorageError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;

        let version = header_bytes[0];
        if version != FORMAT_VERSION {
            return Err(VectorStorageError::VersionMismatch(version, FORMAT_VERSION));
        }

        let stored_checksum = u32::from_le_bytes([
            header_bytes[43],
            header_bytes[44],
            header_bytes[45],
            header_bytes[46],
        ]);
        if stored_checksum != crc32fast::hash(&header_bytes[0..43]) {
            return Err(VectorStorageError::ChecksumMismatch);
        }

        let mut model_id = [0u8; 32];
        model_id.copy_from_slice(&header_bytes[1..33]);

        let dimensions = u16::from_le_bytes([header_bytes[33], header_bytes[34]]);
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&header_bytes[35..43]);
        let entry_count = u64::from_le_bytes(count_bytes);

        if dimensions == 0 {
            return Err(VectorStorageError::InvalidFormat(
                "zero dimensions".to_string(),
            ));
        }

        Ok(Header {
            version,
            model_id,
            dimensions,
            entry_count,
        })
    }

    fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<(), VectorStorageError> {
        let mut header_bytes = [0u8; HEADER_SIZE];

        header_bytes[0] = header.version;
        header_bytes[1..33].copy_from_slice(&header.model_id);
        header_bytes[33..35].copy_from_slice(&header.dimensions.to_le_bytes());
        header_bytes[35..43].copy_from_slice(&header.entry_count.to_le_bytes());

        let checksum = crc32fast::hash(&header_bytes[0..43]);
        header_bytes[43..47].copy_from_slice(&checksum.to_le_bytes());

        writer.write_all(&header_bytes)?;
        Ok(())
    }

    /// Read one entry, filling `embedding` in place and returning the word.
    fn read_entry<R: Read>(
        reader: &mut R,
        embedding: &mut [f32],
    ) -> Result<String, VectorStorageError> {
        let mut len_bytes = [0u8; 2];
        reader.read_exact(&mut len_bytes)?;
        let word_len = u16::from_le_bytes(len_bytes) as usize;

        let mut word_bytes = vec![0u8; word_len];
        reader.read_exact(&mut word_bytes)?;
        let word = String::from_utf8(word_bytes)
            .map_err(|e| VectorStorageError::InvalidFormat(e.to_string()))?;

        for value in embedding.iter_mut() {
            let mut float_bytes = [0u8; 4];
            reader.read_exact(&mut float_bytes)?;
            *value = f32::from_le_bytes(float_bytes);
        }

        Ok(word)
    }

    fn write_entry<W: Write>(
        writer: &mut W,
        word: &str,
        embedding: &[f32],
    ) -> Result<(), VectorStorageError> {
        let word_len = u16::try_from(word.len())
            .map_err(|_| VectorStorageError::InvalidFormat(format!("word too long: {}", word.len())))?;

        writer.write_all(&word_len.to_le_bytes())?;
        writer.write_all(word.as_bytes())?;
        for &value in embedding {
            writer.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }
}

/// File header structure.
#[derive(Debug)]
struct Header {
    version: u8,
    model_id: [u8; 32],
    dimensions: u16,
    entry_count: u64,
}
