use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;

use super::{KeyValueStore, StoreError};
use crate::config::StorageSettings;

/// One JSON document per key, stored as `<dir>/<key>.json`.
///
/// Reads take a shared lock and writes an exclusive one, so several
/// processes can share a directory. A lock still held elsewhere after
/// `LOCK_ATTEMPTS` tries fails the call.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `storage.directory` if set, else [`FileStore::default_dir`].
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.directory.clone().unwrap_or_else(Self::default_dir))
    }

    /// `mvu-runtime` under `dirs::data_dir()`, or the current directory if
    /// there is none.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mvu-runtime")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn read(path: &Path) -> std::io::Result<String> {
        let mut file = File::open(path)?;
        lock_with_retry(|| FileExt::try_lock_shared(&file))?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content);
        let _ = FileExt::unlock(&file);
        result.map(|_| content)
    }

    fn write(path: &Path, value: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        lock_with_retry(|| FileExt::try_lock_exclusive(&file))?;
        let result = file
            .set_len(0)
            .and_then(|_| file.write_all(value.as_bytes()))
            .and_then(|_| file.flush());
        let _ = FileExt::unlock(&file);
        result
    }
}

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

fn lock_with_retry(mut try_lock: impl FnMut() -> std::io::Result<()>) -> std::io::Result<()> {
    let contended = fs2::lock_contended_error().raw_os_error();
    let mut attempt = 1;
    loop {
        match try_lock() {
            Ok(()) => return Ok(()),
            Err(e) if e.raw_os_error() == contended && attempt < LOCK_ATTEMPTS => {
                attempt += 1;
                std::thread::sleep(LOCK_RETRY_DELAY);
            }
            Err(e) => return Err(e),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = match self.path_for(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(key, error = %e, "Refusing to read key");
                return None;
            }
        };

        match Self::read(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        Self::write(&path, value).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }
}
