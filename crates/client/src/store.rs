//! Local key/value store with change broadcast.
//!
//! Values are strings (usually JSON). The store lives in memory and can
//! optionally mirror itself to a JSON file, rewritten on every mutation.
//! Each mutation sends a [`StorageEvent`] naming the changed key to every
//! subscriber.
//!
//! Read-modify-write through [`LocalStore::update_json`] happens under the
//! store's write lock, so concurrent writers to one key cannot drop each
//! other's updates.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::error::ClientResult;

pub const KEY_COMPETITIONS: &str = "competitions";
pub const KEY_REGISTRATIONS: &str = "modelRegistrations";
pub const KEY_NOTIFICATIONS: &str = "notifications";
pub const KEY_LAST_VOTES: &str = "lastVotes";

const EVENT_CAPACITY: usize = 256;

/// A key was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
}

/// Cheaply cloneable handle to a shared store.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

struct Inner {
    entries: RwLock<BTreeMap<String, String>>,
    path: Option<PathBuf>,
    events: broadcast::Sender<StorageEvent>,
}

impl LocalStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_entries(BTreeMap::new(), None)
    }

    /// Open a file-backed store, loading existing entries when the file
    /// exists.
    pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Local store opened");
        Ok(Self::with_entries(entries, Some(path)))
    }

    fn with_entries(entries: BTreeMap<String, String>, path: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(entries),
                path,
                events,
            }),
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        let mut entries = self.inner.entries.write().await;
        self.commit(&mut entries, key, Some(value)).await?;
        drop(entries);
        self.notify(key);
        Ok(())
    }

    /// Remove a key. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> ClientResult<bool> {
        let mut entries = self.inner.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(false);
        }
        self.commit(&mut entries, key, None).await?;
        drop(entries);
        self.notify(key);
        Ok(true)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> ClientResult<Option<T>> {
        match self.get(key).await {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        self.set(key, serde_json::to_string(value)?).await
    }

    /// Atomically read, modify and write back the JSON value at `key`.
    ///
    /// A missing key starts from `T::default()`. When `f` returns an error
    /// nothing is written and no event is sent.
    pub async fn update_json<T, R, F>(&self, key: &str, f: F) -> ClientResult<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> ClientResult<R>,
    {
        let mut entries = self.inner.entries.write().await;
        let mut value: T = match entries.get(key) {
            Some(raw) => serde_json::from_str(raw)?,
            None => T::default(),
        };
        let result = f(&mut value)?;

        let raw = serde_json::to_string(&value)?;
        self.commit(&mut entries, key, Some(raw)).await?;
        drop(entries);
        self.notify(key);
        Ok(result)
    }

    /// Apply one change and persist it. If the file write fails the previous
    /// entry is restored, so memory never holds unsaved values.
    async fn commit(
        &self,
        entries: &mut BTreeMap<String, String>,
        key: &str,
        value: Option<String>,
    ) -> ClientResult<()> {
        let previous = match value {
            Some(value) => entries.insert(key.to_string(), value),
            None => entries.remove(key),
        };
        if let Err(e) = self.persist(entries).await {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            tracing::warn!(key, error = %e, "Local store write failed; change rolled back");
            return Err(e);
        }
        Ok(())
    }

    /// Rewrite the backing file, if any, via a temporary file and rename.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    fn notify(&self, key: &str) {
        // No subscribers is fine.
        let _ = self.inner.events.send(StorageEvent {
            key: key.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn set_get_remove() {
        let store = LocalStore::in_memory();
        assert!(store.get("k").await.is_none());

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.as_deref(), Some("v"));

        assert!(store.remove("k").await.unwrap());
        assert!(!store.remove("k").await.unwrap());
    }

    #[tokio::test]
    async fn mutations_broadcast_key() {
        let store = LocalStore::in_memory();
        let mut rx = store.subscribe();

        store.set_json("competitions", &vec![1, 2]).await.unwrap();
        store.remove("competitions").await.unwrap();

        assert_eq!(rx.recv().await.unwrap().key, "competitions");
        assert_eq!(rx.recv().await.unwrap().key, "competitions");
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = LocalStore::open(&path).await.unwrap();
        store.set("k", "v1".to_string()).await.unwrap();
        let mut rx = store.subscribe();

        // Writes now fail: the parent directory is gone.
        tokio::fs::remove_dir_all(dir.path()).await.unwrap();

        assert_matches!(
            store.set("k", "v2".to_string()).await,
            Err(ClientError::Storage(_))
        );
        assert_matches!(
            store.set("fresh", "x".to_string()).await,
            Err(ClientError::Storage(_))
        );
        assert_matches!(store.remove("k").await, Err(ClientError::Storage(_)));
        assert_matches!(
            store
                .update_json("list", |list: &mut Vec<i32>| {
                    list.push(1);
                    Ok(())
                })
                .await,
            Err(ClientError::Storage(_))
        );

        assert_eq!(store.get("k").await.as_deref(), Some("v1"));
        assert!(store.get("fresh").await.is_none());
        assert!(store.get("list").await.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let store = LocalStore::in_memory();
        store.set_json("list", &vec![1]).await.unwrap();
        let mut rx = store.subscribe();

        let result = store
            .update_json("list", |list: &mut Vec<i32>| {
                list.push(2);
                Err::<(), _>(ClientError::Duplicate("nope".into()))
            })
            .await;
        assert_matches!(result, Err(ClientError::Duplicate(_)));

        assert_eq!(store.get_json::<Vec<i32>>("list").await.unwrap(), Some(vec![1]));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let store = LocalStore::in_memory();
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_json("list", |list: &mut Vec<i32>| {
                        list.push(i);
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let list: Vec<i32> = store.get_json("list").await.unwrap().unwrap();
        assert_eq!(list.len(), 20);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = LocalStore::open(&path).await.unwrap();
        store.set("lastVotes", "{}".to_string()).await.unwrap();
        drop(store);

        let reopened = LocalStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("lastVotes").await.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();

        assert_matches!(
            LocalStore::open(&path).await.err(),
            Some(ClientError::Serialization(_))
        );
    }
}
