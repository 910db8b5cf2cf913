use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;

use super::FacadeError;
use crate::storage::json_map_store::JsonMapStore;

/// Client-side mirror of the remote buckets, keyed 1:1 by bucket key.
/// Values are kept JSON-encoded, the way they would sit in browser storage.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Option<String>;
    async fn set_raw(&self, key: &str, raw: String) -> Result<(), FacadeError>;
    async fn remove(&self, key: &str) -> Result<(), FacadeError>;
}

/// Mirror persisted to a JSON file.
#[derive(Clone)]
pub struct FileMirror {
    store: Arc<JsonMapStore<String, String>>,
}

impl FileMirror {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, FacadeError> {
        let store = JsonMapStore::<String, String>::new(path)
            .await
            .map_err(|e| FacadeError::Local(e.to_string()))?;
        Ok(Self { store })
    }
}

#[async_trait]
impl LocalStore for FileMirror {
    async fn get_raw(&self, key: &str) -> Option<String> {
        self.store.get(&key.to_string()).await
    }

    async fn set_raw(&self, key: &str, raw: String) -> Result<(), FacadeError> {
        self.store
            .insert(key.to_string(), raw)
            .await
            .map_err(|e| FacadeError::Local(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), FacadeError> {
        self.store
            .remove(&key.to_string())
            .await
            .map(|_| ())
            .map_err(|e| FacadeError::Local(e.to_string()))
    }
}

/// Mirror held in memory only.
#[derive(Default)]
pub struct MemoryMirror {
    entries: DashMap<String, String>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryMirror {
    async fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    async fn set_raw(&self, key: &str, raw: String) -> Result<(), FacadeError> {
        self.entries.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), FacadeError> {
        self.entries.remove(key);
        Ok(())
    }
}
