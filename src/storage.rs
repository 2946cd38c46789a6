use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::config::{Config, StorageKind};
use crate::error::{StoreError, StoreResult};

pub const JOBS_KEY: &str = "jobs";
pub const RESUMES_KEY: &str = "resumes";

/// Whole-document key/value persistence. Implementations only move strings;
/// parsing and defaulting happen in [`load_document`] / [`save_document`].
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, contents: &str) -> Result<()>;
}

/// Reads and parses a document. Missing or malformed content yields `T::default()`;
/// only a failed read is an error.
pub fn load_document<T>(backend: &dyn Backend, key: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    let raw = backend
        .read(key)
        .map_err(|err| StoreError::storage(key, err))?;

    let Some(raw) = raw else {
        debug!(key, backend = backend.name(), "no stored document, using default");
        return Ok(T::default());
    };

    match serde_json::from_str(&raw) {
        Ok(doc) => Ok(doc),
        Err(err) => {
            warn!(key, backend = backend.name(), error = %err, "stored document is malformed, treating as empty");
            Ok(T::default())
        }
    }
}

pub fn save_document<T>(backend: &dyn Backend, key: &str, doc: &T) -> StoreResult<()>
where
    T: Serialize,
{
    let contents = serde_json::to_string_pretty(doc)
        .with_context(|| format!("Failed to serialize '{}'", key))
        .map_err(|err| StoreError::storage(key, err))?;
    backend
        .write(key, &contents)
        .map_err(|err| StoreError::storage(key, err))?;
    debug!(key, backend = backend.name(), bytes = contents.len(), "document saved");
    Ok(())
}

/// Picks the backend once, at startup.
pub fn open_backend(config: &Config) -> Arc<dyn Backend> {
    select_backend(config.storage, config.data_dir())
}

fn select_backend(kind: StorageKind, data_dir: Option<PathBuf>) -> Arc<dyn Backend> {
    match (kind, data_dir) {
        (StorageKind::File, Some(dir)) => {
            info!(dir = %dir.display(), "using file storage");
            Arc::new(FileBackend::new(dir))
        }
        (StorageKind::File, None) => {
            warn!("no data directory available, falling back to in-memory storage");
            Arc::new(MemoryBackend::new())
        }
        (StorageKind::Memory, _) => {
            info!("using in-memory storage");
            Arc::new(MemoryBackend::new())
        }
    }
}

// --- File backend ---

/// One `<key>.json` per document inside the per-user data directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        if let Err(err) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err).with_context(|| format!("Failed to replace {}", path.display()));
        }
        Ok(())
    }
}

// --- Memory backend ---

/// Process-local key/value fallback, used when no data directory can be resolved.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, contents: &str) -> Self {
        let backend = Self::new();
        if let Ok(mut entries) = backend.entries.lock() {
            entries.insert(key.to_string(), contents.to_string());
        }
        backend
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, JobStatus, ResumeDocument};
    use tempfile::tempdir;

    #[test]
    fn test_missing_document_is_default() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("not-yet-created"));

        let jobs: Vec<Job> = load_document(&backend, JOBS_KEY).unwrap();
        assert!(jobs.is_empty());

        let doc: ResumeDocument = load_document(&MemoryBackend::new(), RESUMES_KEY).unwrap();
        assert_eq!(doc, ResumeDocument::default());
    }

    #[test]
    fn test_malformed_document_is_default() {
        let backend = MemoryBackend::with_entry(JOBS_KEY, "{ this is not json");
        let jobs: Vec<Job> = load_document(&backend, JOBS_KEY).unwrap();
        assert!(jobs.is_empty());

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("resumes.json"), r#"{"resumes": 7}"#).unwrap();
        let backend = FileBackend::new(dir.path());
        let doc: ResumeDocument = load_document(&backend, RESUMES_KEY).unwrap();
        assert_eq!(doc, ResumeDocument::default());
    }

    #[test]
    fn test_file_backend_round_trip_creates_directory() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("data"));
        let jobs = vec![Job::new("Engineer", "", "", JobStatus::Applied, "").unwrap()];

        save_document(&backend, JOBS_KEY, &jobs).unwrap();
        assert!(backend.path_for(JOBS_KEY).exists());
        assert!(!backend.dir().join("jobs.json.tmp").exists());

        let loaded: Vec<Job> = load_document(&backend, JOBS_KEY).unwrap();
        assert_eq!(loaded, jobs);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be makes every write fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let backend = FileBackend::new(&blocker);

        let err = save_document(&backend, JOBS_KEY, &Vec::<Job>::new()).unwrap_err();
        assert!(matches!(err, StoreError::Storage { ref key, .. } if key == "jobs"));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let dir = tempdir().unwrap();
        // Reading a directory as a file fails with something other than NotFound.
        std::fs::create_dir(dir.path().join("jobs.json")).unwrap();
        let backend = FileBackend::new(dir.path());

        let result: StoreResult<Vec<Job>> = load_document(&backend, JOBS_KEY);
        assert!(matches!(result, Err(StoreError::Storage { .. })));
    }

    #[test]
    fn test_open_backend_honours_storage_kind() {
        let config = Config {
            data_dir: None,
            storage: StorageKind::Memory,
        };
        assert_eq!(open_backend(&config).name(), "memory");

        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            storage: StorageKind::File,
        };
        assert_eq!(open_backend(&config).name(), "file");
    }

    #[test]
    fn test_file_storage_without_data_dir_falls_back_to_memory() {
        let backend = select_backend(StorageKind::File, None);
        assert_eq!(backend.name(), "memory");

        backend.write(JOBS_KEY, "{}").unwrap();
        assert_eq!(backend.read(JOBS_KEY).unwrap().as_deref(), Some("{}"));
    }
}
