use std::io::Write;
use std::path::{Path, PathBuf};

use homedir::my_home;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GHOSTWRITER_DIR";

/// Root directory holding the config file and downloaded resources.
#[derive(Clone, Debug)]
pub struct DataDir {
    pub base_dir: PathBuf,
}

impl DataDir {
    pub fn new(base_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(DataDir { base_dir })
    }

    /// `$GHOSTWRITER_DIR`, else `~/.ghostwriter`.
    pub fn default_location() -> std::io::Result<Self> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return Self::new(dir);
        }

        let home = my_home()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "could not find home dir")
            })?;
        Self::new(home.join(".ghostwriter"))
    }

    pub fn path(&self, ident: &str) -> PathBuf {
        self.base_dir.join(ident)
    }

    /// Subdirectory of the data dir, created on demand.
    pub fn subdir(&self, name: &str) -> std::io::Result<PathBuf> {
        let path = self.path(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn exists(&self, ident: &str) -> bool {
        self.path(ident).exists()
    }

    pub fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path(ident))
    }

    /// Write through a temp file in the same directory, then rename into place.
    pub fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        let target = self.path(ident);
        let parent = target.parent().unwrap_or(&self.base_dir);
        write_atomic(parent, &target, data)
    }
}

pub(crate) fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
