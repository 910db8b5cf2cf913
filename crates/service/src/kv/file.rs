use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use super::{KvBackend, KvError};
use crate::storage::json_map_store::JsonMapStore;

/// All buckets in a single JSON document on disk.
#[derive(Clone)]
pub struct FileKv {
    store: Arc<JsonMapStore<String, Value>>,
}

impl FileKv {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, KvError> {
        let store = JsonMapStore::<String, Value>::new(path).await?;
        Ok(Self { store })
    }
}

#[async_trait]
impl KvBackend for FileKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.store.get(&key.to_string()).await)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        self.store.insert(key.to_string(), value).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
