use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{KvBackend, KvError};

/// Process-local buckets. Lost on restart; used for development and tests.
#[derive(Default)]
pub struct MemoryKv {
    buckets: DashMap<String, Value>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.buckets.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        self.buckets.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
