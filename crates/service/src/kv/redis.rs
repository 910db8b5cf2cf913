use async_trait::async_trait;
use ::redis::{aio::MultiplexedConnection, AsyncCommands};
use serde_json::Value;
use tracing::warn;

use super::{KvBackend, KvError};

/// Buckets stored as JSON strings in Redis (or any RESP-compatible server).
#[derive(Clone)]
pub struct RedisKv {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisKv {
    /// Connect using a `redis://[user:pass@]host[:port][/db]` URL.
    /// Every bucket key is stored as `prefix + key`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, KvError> {
        let client = ::redis::Client::open(url)
            .map_err(|e| KvError::Connection(format!("failed to parse URL: {}", e)))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| KvError::Connection(format!("failed to connect: {}", e)))?;
        Ok(Self { conn, prefix: prefix.into() })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

/// Decode a stored bucket. Unparseable JSON reads as absent.
fn decode(key: &str, raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(%key, error = %e, "malformed bucket in redis; treating as absent");
            None
        }
    }
}

#[async_trait]
impl KvBackend for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(decode(key, raw))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        let raw = serde_json::to_string(&value)?;
        conn.set::<_, _, ()>(self.full_key(key), raw).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
