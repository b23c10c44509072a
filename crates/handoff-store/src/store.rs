use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{to_writer_pretty, Value};
use tracing::{debug, warn};

use crate::errors::StoreError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Per-device data handed between pages
    Local,
    /// User settings
    Sync,
}

/// Asynchronous key-value store with last-writer-wins semantics per key.
#[async_trait]
pub trait HandoffStore: Send + Sync {
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<(StorageArea, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::default();
        for entry in self.entries.iter() {
            let (area, key) = entry.key();
            let target = match area {
                StorageArea::Local => &mut snapshot.local,
                StorageArea::Sync => &mut snapshot.sync,
            };
            target.insert(key.clone(), entry.value().clone());
        }
        snapshot
    }

    fn restore(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for (key, value) in snapshot.local {
            store.entries.insert((StorageArea::Local, key), value);
        }
        for (key, value) in snapshot.sync {
            store.entries.insert((StorageArea::Sync, key), value);
        }
        store
    }
}

#[async_trait]
impl HandoffStore for MemoryStore {
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .entries
            .get(&(area, key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert((area, key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StoreError> {
        self.entries.remove(&(area, key.to_string()));
        Ok(())
    }
}

#[derive(Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    local: BTreeMap<String, Value>,
    #[serde(default)]
    sync: BTreeMap<String, Value>,
}

/// JSON file backed store; every write rewrites the file atomically.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let snapshot: StoreSnapshot = serde_json::from_reader(reader)
                .map_err(|err| StoreError::Corrupt(format!("{}: {}", path.display(), err)))?;
            MemoryStore::restore(snapshot)
        } else {
            debug!(path = %path.display(), "store file absent, starting empty");
            MemoryStore::new()
        };
        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the store with one key changed, then applies the change in
    /// memory. A failed write leaves memory untouched.
    fn commit(&self, area: StorageArea, key: &str, value: Option<Value>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut staged = self.inner.snapshot();
        let target = match area {
            StorageArea::Local => &mut staged.local,
            StorageArea::Sync => &mut staged.sync,
        };
        match &value {
            Some(value) => {
                target.insert(key.to_string(), value.clone());
            }
            None => {
                target.remove(key);
            }
        }
        self.write(&staged)?;
        let entry = (area, key.to_string());
        match value {
            Some(value) => {
                self.inner.entries.insert(entry, value);
            }
            None => {
                self.inner.entries.remove(&entry);
            }
        }
        Ok(())
    }

    fn write(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path).map_err(|err| {
            warn!(path = %self.path.display(), "failed to replace store file: {}", err);
            let _ = fs::remove_file(&tmp);
            StoreError::Io(err)
        })
    }
}

#[async_trait]
impl HandoffStore for JsonFileStore {
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(area, key).await
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StoreError> {
        self.commit(area, key, Some(value))
    }

    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StoreError> {
        self.commit(area, key, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn areas_are_separate() {
        let store = MemoryStore::new();
        store
            .set(StorageArea::Local, "ebayTitle", json!("Widget"))
            .await
            .unwrap();
        assert!(store
            .get(StorageArea::Sync, "ebayTitle")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile").join("store.json");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .set(StorageArea::Local, "ebayPrice", json!("19.99"))
                .await
                .unwrap();
            store
                .set(StorageArea::Sync, "autoSkuEnabled", json!(true))
                .await
                .unwrap();
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(StorageArea::Local, "ebayPrice").await.unwrap(),
            Some(json!("19.99"))
        );
        assert_eq!(
            reopened.get(StorageArea::Sync, "autoSkuEnabled").await.unwrap(),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        store
            .set(StorageArea::Local, "ebayTitle", json!("Widget"))
            .await
            .unwrap();

        // A directory in the file's place makes the final rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store
            .set(StorageArea::Local, "ebayPrice", json!("19.99"))
            .await
            .is_err());
        assert!(store
            .remove(StorageArea::Local, "ebayTitle")
            .await
            .is_err());
        assert!(store
            .get(StorageArea::Local, "ebayPrice")
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store.get(StorageArea::Local, "ebayTitle").await.unwrap(),
            Some(json!("Widget"))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }
}
