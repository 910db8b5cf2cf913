//! Bucket storage behind the data endpoint.
//!
//! A bucket is one JSON value under one string key. Writes overwrite the
//! whole value; there is no delete, no versioning and no schema.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use configs::{BackendKind, StoreConfig};

pub mod cached;
pub mod file;
pub mod memory;
pub mod redis;

pub use cached::CachedKv;
pub use file::FileKv;
pub use memory::MemoryKv;
pub use self::redis::RedisKv;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<::redis::RedisError> for KvError {
    fn from(e: ::redis::RedisError) -> Self {
        KvError::Backend(e.to_string())
    }
}

impl From<crate::errors::ServiceError> for KvError {
    fn from(e: crate::errors::ServiceError) -> Self {
        KvError::Backend(e.to_string())
    }
}

/// Last-write-wins key/value storage of JSON buckets.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError>;
    /// Overwrite the bucket unconditionally.
    async fn set(&self, key: &str, value: Value) -> Result<(), KvError>;
    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the configured backend, wrapped in the read cache when enabled.
pub async fn build_backend(cfg: &StoreConfig) -> Result<Arc<dyn KvBackend>, KvError> {
    let backend: Arc<dyn KvBackend> = match cfg.backend {
        BackendKind::Memory => Arc::new(MemoryKv::new()),
        BackendKind::File => Arc::new(FileKv::open(&cfg.file_path).await?),
        BackendKind::Redis => {
            Arc::new(RedisKv::connect(&cfg.redis_url, cfg.key_prefix.clone()).await?)
        }
    };
    info!(backend = backend.name(), cache_capacity = cfg.cache_capacity, "bucket backend ready");
    if cfg.cache_capacity == 0 {
        return Ok(backend);
    }
    Ok(Arc::new(CachedKv::new(
        backend,
        cfg.cache_capacity,
        Duration::from_secs(cfg.cache_ttl_secs),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_backend_from_default_config() -> Result<(), anyhow::Error> {
        let cfg = StoreConfig::default();
        let kv = build_backend(&cfg).await?;
        assert_eq!(kv.name(), "cached");
        assert_eq!(kv.get("goldenglass_products").await?, None);
        kv.set("goldenglass_products", json!([1, 2])).await?;
        assert_eq!(kv.get("goldenglass_products").await?, Some(json!([1, 2])));
        Ok(())
    }

    #[tokio::test]
    async fn cache_can_be_disabled() -> Result<(), anyhow::Error> {
        let cfg = StoreConfig { cache_capacity: 0, ..StoreConfig::default() };
        let kv = build_backend(&cfg).await?;
        assert_eq!(kv.name(), "memory");
        Ok(())
    }
}
