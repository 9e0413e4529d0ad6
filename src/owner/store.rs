//! Machine ID -> owner mapping with whole-file JSON snapshots.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Owner store error type
#[derive(Debug, Error)]
pub enum OwnerStoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for owner store operations
pub type OwnerStoreResult<T> = Result<T, OwnerStoreError>;

/// Concurrent machine ID -> owner name map.
///
/// Readers share the lock; upsert, delete and snapshot loads take it
/// exclusively. Empty keys and values are rejected by callers, not here.
#[derive(Debug, Default)]
pub struct OwnerStore {
    data: RwLock<HashMap<String, String>>,
    /// Held across snapshot + write so saves reach disk in call order
    save_lock: Mutex<()>,
}

impl OwnerStore {
    /// Create an empty owner store
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner for `id`, or an empty string when unmapped
    pub async fn get(&self, id: &str) -> String {
        self.data.read().await.get(id).cloned().unwrap_or_default()
    }

    /// Insert or overwrite an entry. Does not persist.
    pub async fn upsert(&self, id: impl Into<String>, owner: impl Into<String>) {
        self.data.write().await.insert(id.into(), owner.into());
    }

    /// Remove an entry if present. Does not persist.
    pub async fn delete(&self, id: &str) {
        self.data.write().await.remove(id);
    }

    /// Independent copy of the whole mapping
    pub async fn all(&self) -> HashMap<String, String> {
        self.data.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Replace the mapping with the snapshot at `path`.
    ///
    /// A missing or empty file leaves the current mapping untouched.
    pub async fn load_from_file(&self, path: impl AsRef<Path>) -> OwnerStoreResult<()> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Owner snapshot not found, keeping current mapping");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Ok(());
        }

        let loaded: HashMap<String, String> = serde_json::from_slice(&bytes)?;
        *self.data.write().await = loaded;

        Ok(())
    }

    /// Write the full mapping to `path`, replacing the previous snapshot.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> OwnerStoreResult<()> {
        let path = path.as_ref();
        let _guard = self.save_lock.lock().await;

        let bytes = {
            let data = self.data.read().await;
            serde_json::to_vec_pretty(&*data)?
        };

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Owner snapshot saved");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "owners.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_upsert_then_get() {
        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        assert_eq!(store.get("node-1").await, "Alice");

        store.upsert("node-1", "Bob").await;
        assert_eq!(store.get("node-1").await, "Bob");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_empty() {
        let store = OwnerStore::new();
        assert_eq!(store.get("missing").await, "");
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive() {
        let store = OwnerStore::new();
        store.upsert("Node-1", "Alice").await;
        assert_eq!(store.get("node-1").await, "");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        store.delete("node-1").await;
        assert_eq!(store.get("node-1").await, "");

        store.delete("node-1").await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_all_returns_independent_copy() {
        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;

        let mut copy = store.all().await;
        copy.insert("node-2".into(), "Mallory".into());
        copy.remove("node-1");

        assert_eq!(store.get("node-1").await, "Alice");
        assert_eq!(store.get("node-2").await, "");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_every_key() {
        let store = Arc::new(OwnerStore::new());
        let mut handles = Vec::new();

        for i in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert(format!("node-{i}"), format!("owner-{i}")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = store.all().await;
        assert_eq!(all.len(), 64);
        assert_eq!(all.get("node-17").map(String::as_str), Some("owner-17"));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        store.upsert("db-7", "张三").await;
        store.save_to_file(&path).await.unwrap();

        let fresh = OwnerStore::new();
        fresh.load_from_file(&path).await.unwrap();
        assert_eq!(fresh.all().await, store.all().await);
        assert!(!dir.path().join("owners.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        store.save_to_file(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"node-1\": \"Alice\"\n}");
    }

    #[tokio::test]
    async fn test_load_missing_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;

        store
            .load_from_file(dir.path().join("does-not-exist.json"))
            .await
            .unwrap();
        assert_eq!(store.get("node-1").await, "Alice");
    }

    #[tokio::test]
    async fn test_load_empty_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");
        std::fs::write(&path, b"").unwrap();

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        store.load_from_file(&path).await.unwrap();
        assert_eq!(store.get("node-1").await, "Alice");
    }

    #[tokio::test]
    async fn test_load_replaces_whole_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");
        std::fs::write(&path, br#"{"node-2":"Bob"}"#).unwrap();

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;
        store.load_from_file(&path).await.unwrap();

        assert_eq!(store.get("node-1").await, "");
        assert_eq!(store.get("node-2").await, "Bob");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_malformed_file_errors_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;

        let result = store.load_from_file(&path).await;
        assert!(matches!(result, Err(OwnerStoreError::Malformed(_))));
        assert_eq!(store.get("node-1").await, "Alice");
    }

    #[tokio::test]
    async fn test_load_rejects_non_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owners.json");
        std::fs::write(&path, br#"{"node-1": 42}"#).unwrap();

        let store = OwnerStore::new();
        assert!(matches!(
            store.load_from_file(&path).await,
            Err(OwnerStoreError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("owners.json");

        let store = OwnerStore::new();
        store.upsert("node-1", "Alice").await;

        assert!(matches!(
            store.save_to_file(&path).await,
            Err(OwnerStoreError::Io(_))
        ));
        // In-memory change is not rolled back
        assert_eq!(store.get("node-1").await, "Alice");
    }
}
