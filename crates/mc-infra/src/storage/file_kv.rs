//! File-based key-value store
//!
//! Persists a flat JSON object of string values to a single file in the
//! application data directory. Every write rewrites the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mc_core::ports::KeyValueStorePort;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const DEFAULT_STORAGE_FILE: &str = "storage.json";

type Entries = BTreeMap<String, String>;

pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<Entries> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse storage file: {e}"))
    }

    async fn persist(&self, entries: &Entries) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| anyhow::anyhow!("Failed to serialize storage: {e}"))?;

        let mut file = fs::File::create(&self.path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create storage file: {e}"))?;

        file.write_all(json.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write storage file: {e}"))?;

        file.sync_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sync storage file: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn get_returns_none_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("missing.json"));

        assert_eq!(store.get("accessToken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_creates_parent_dirs_and_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("nested/storage.json"));

        store.set("accessToken", "a".into()).await.unwrap();
        store.set("refreshToken", "r".into()).await.unwrap();
        store.set("accessToken", "b".into()).await.unwrap();

        assert_eq!(store.get("accessToken").await.unwrap().as_deref(), Some("b"));
        assert_eq!(store.get("refreshToken").await.unwrap().as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");

        FileKeyValueStore::new(path.clone())
            .set("user", "{}".into())
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(path);
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::with_defaults(temp_dir.path().to_path_buf());

        store.remove("stripeConnectStatus").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        fs::write(&path, "").await.unwrap();

        let store = FileKeyValueStore::new(path);
        assert_eq!(store.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_json_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.json");
        fs::write(&path, "{invalid json").await.unwrap();

        let store = FileKeyValueStore::new(path);
        let result = store.get("user").await;

        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[tokio::test]
    async fn with_defaults_uses_expected_path() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::with_defaults(temp_dir.path().to_path_buf());

        assert_eq!(store.path(), temp_dir.path().join(DEFAULT_STORAGE_FILE));
    }
}
