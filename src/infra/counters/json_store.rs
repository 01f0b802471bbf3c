use crate::core::counters::{CounterStore, Namespace, StoreError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// JSON-file counter store. One file per namespace, shaped as a flat map:
/// { "user_id": record }
///
/// Every `set` rewrites the whole file while the write lock is held, so the
/// on-disk document always matches some consistent in-memory state.
pub struct JsonCounterStore<R> {
    path: PathBuf,
    cache: RwLock<BTreeMap<u64, R>>,
}

impl<R> JsonCounterStore<R>
where
    R: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    /// Open the document for `namespace` inside `dir`.
    pub fn open(dir: impl AsRef<Path>, namespace: Namespace) -> Self {
        Self::new(dir.as_ref().join(namespace.file_name()))
    }

    /// Load the store from `path`. A missing, unreadable or corrupt document
    /// starts the namespace fresh instead of failing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match Self::load(&path) {
            Ok(records) => records,
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Failed to load counter store, starting empty: {}",
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<u64, R>, StoreError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the whole document to a sibling file, then rename it over the
    /// real one. Readers only ever see a complete document.
    fn persist(&self, records: &BTreeMap<u64, R>) -> Result<(), StoreError> {
        let staging = self.path.with_extension("json.tmp");
        let file = File::create(&staging)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;

        if let Err(e) = std::fs::rename(&staging, &self.path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl<R> CounterStore<R> for JsonCounterStore<R>
where
    R: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    async fn get(&self, user_id: u64) -> Result<R, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.get(&user_id).cloned().unwrap_or_default())
    }

    async fn set(&self, user_id: u64, record: R) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(user_id, record);
        self.persist(&cache)
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let cache = self.cache.read().await;
        self.persist(&cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::leveling::LevelRecord;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_json_persistence_roundtrip() {
        let dir = tempdir().unwrap();

        let store: JsonCounterStore<LevelRecord> =
            JsonCounterStore::open(dir.path(), Namespace::Leveling);
        store
            .set(5, LevelRecord { xp: 40, level: 2 })
            .await
            .unwrap();

        // Reload from file
        let reloaded: JsonCounterStore<LevelRecord> =
            JsonCounterStore::open(dir.path(), Namespace::Leveling);
        assert_eq!(
            reloaded.get(5).await.unwrap(),
            LevelRecord { xp: 40, level: 2 }
        );
    }

    #[tokio::test]
    async fn get_does_not_create_an_entry() {
        let dir = tempdir().unwrap();
        let store: JsonCounterStore<u64> = JsonCounterStore::open(dir.path(), Namespace::Economy);

        assert_eq!(store.get(9).await.unwrap(), 0);
        assert!(!dir.path().join("economy.json").exists());
    }

    #[tokio::test]
    async fn document_is_keyed_by_user_id() {
        let dir = tempdir().unwrap();
        let store: JsonCounterStore<u64> = JsonCounterStore::open(dir.path(), Namespace::Economy);
        store.set(123, 300).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("economy.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["123"], 300);
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let dir = tempdir().unwrap();
        let levels: JsonCounterStore<LevelRecord> =
            JsonCounterStore::open(dir.path(), Namespace::Leveling);
        let wallets: JsonCounterStore<u64> = JsonCounterStore::open(dir.path(), Namespace::Economy);

        levels
            .set(7, LevelRecord { xp: 10, level: 0 })
            .await
            .unwrap();
        wallets.set(7, 100).await.unwrap();

        let levels: JsonCounterStore<LevelRecord> =
            JsonCounterStore::open(dir.path(), Namespace::Leveling);
        let wallets: JsonCounterStore<u64> = JsonCounterStore::open(dir.path(), Namespace::Economy);
        assert_eq!(
            levels.get(7).await.unwrap(),
            LevelRecord { xp: 10, level: 0 }
        );
        assert_eq!(wallets.get(7).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn corrupt_document_starts_fresh() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("levels.json"), "{ not json").unwrap();

        let store: JsonCounterStore<LevelRecord> =
            JsonCounterStore::open(dir.path(), Namespace::Leveling);
        assert_eq!(store.get(1).await.unwrap(), LevelRecord::default());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A directory where the document should be makes every write fail.
        let blocked = dir.path().join("economy.json");
        std::fs::create_dir(&blocked).unwrap();

        let store: JsonCounterStore<u64> = JsonCounterStore::new(&blocked);
        let result = store.set(1, 100).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!dir.path().join("economy.json.tmp").exists());
    }

    #[tokio::test]
    async fn rewrite_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let store: JsonCounterStore<u64> = JsonCounterStore::open(dir.path(), Namespace::Economy);
        store.set(1, 100).await.unwrap();
        store.set(2, 250).await.unwrap();
        store.set(1, 150).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("economy.json")]);

        let raw = std::fs::read_to_string(dir.path().join("economy.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "1": 150, "2": 250 }));
    }
}
