use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{KvBackend, KvError};

/// Read-through cache in front of another backend.
///
/// Misses are cached too (as `None`). Writes go to the backend first and
/// refresh the entry only once the backend accepted them. A miss fills the
/// cache under a shared lock and a write holds it exclusively, so a slow
/// read cannot put back a value older than a completed write.
pub struct CachedKv {
    inner: Arc<dyn KvBackend>,
    cache: Cache<String, Option<Value>>,
    fill_lock: RwLock<()>,
}

impl CachedKv {
    pub fn new(inner: Arc<dyn KvBackend>, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { inner, cache, fill_lock: RwLock::new(()) }
    }
}

#[async_trait]
impl KvBackend for CachedKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        if let Some(hit) = self.cache.get(key).await {
            debug!(%key, "bucket cache hit");
            return Ok(hit);
        }
        let _fill = self.fill_lock.read().await;
        let value = self.inner.get(key).await?;
        self.cache.insert(key.to_string(), value.clone()).await;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        let _fill = self.fill_lock.write().await;
        match self.inner.set(key, value.clone()).await {
            Ok(()) => {
                self.cache.insert(key.to_string(), Some(value)).await;
                Ok(())
            }
            Err(e) => {
                self.cache.invalidate(key).await;
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "cached"
    }
}
