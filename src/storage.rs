use crate::errors::StorageError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, warn};

pub const STATE_KEY: &str = "hydropulse.static.v2";
pub const HISTORY_KEY: &str = "hydropulse.history.v2";

/// String blobs under string keys; the local store both records live in.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, value).await?;
        debug!(path = %path.display(), bytes = value.len(), "record written");
        Ok(())
    }
}

/// In-process store. Writes can be switched off to simulate a full or
/// disabled disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "storage quota exceeded",
            )));
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub enum Record<T> {
    Missing,
    Found(T),
    /// Present but unreadable or not valid for `T`.
    Corrupt,
}

pub async fn read_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Record<T> {
    match store.get(key).await {
        Ok(None) => Record::Missing,
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Record::Found(value),
            Err(err) => {
                warn!(key, "failed to parse stored record: {err}");
                Record::Corrupt
            }
        },
        Err(err) => {
            error!(key, "failed to read stored record: {err}");
            Record::Corrupt
        }
    }
}

pub async fn write_record<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let payload = serde_json::to_string(value)?;
    store.set(key, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert!(store.get(STATE_KEY).await.unwrap().is_none());

        store.set(STATE_KEY, r#"{"a":1}"#).await.unwrap();
        assert_eq!(store.get(STATE_KEY).await.unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(dir.path().join("nested/hydropulse.static.v2.json").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["../escape", "a/b", "", ".hidden"] {
            let err = store.set(key, "{}").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn read_record_distinguishes_missing_and_corrupt() {
        let store = MemoryStore::new();
        assert!(matches!(
            read_record::<Vec<u32>>(&store, HISTORY_KEY).await,
            Record::Missing
        ));

        store.set(HISTORY_KEY, "[1, 2").await.unwrap();
        assert!(matches!(
            read_record::<Vec<u32>>(&store, HISTORY_KEY).await,
            Record::Corrupt
        ));

        write_record(&store, HISTORY_KEY, &vec![1u32, 2]).await.unwrap();
        match read_record::<Vec<u32>>(&store, HISTORY_KEY).await {
            Record::Found(values) => assert_eq!(values, vec![1, 2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn memory_store_can_refuse_writes() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(store.set(STATE_KEY, "{}").await, Err(StorageError::Io(_))));
        assert!(store.get(STATE_KEY).await.unwrap().is_none());

        store.set_failing(false);
        store.set(STATE_KEY, "{}").await.unwrap();
    }
}
