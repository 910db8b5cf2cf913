//! Persistence facade used by every entity store.
//!
//! `fetch` and `save` never fail. A remote that cannot be reached degrades
//! to the local mirror, and anything that does not decode degrades to the
//! caller's fallback. Every `save` also rewrites the local mirror, so reads
//! keep working (possibly stale) while the remote is down.

use std::{sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use configs::ClientConfig;

pub mod local;
pub mod remote;

pub use local::{FileMirror, LocalStore, MemoryMirror};
pub use remote::{BackendRemote, HttpRemote, RemoteStore};

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("remote store error: {0}")]
    Remote(String),
    #[error("local store error: {0}")]
    Local(String),
}

impl From<reqwest::Error> for FacadeError {
    fn from(e: reqwest::Error) -> Self {
        FacadeError::Request(e.to_string())
    }
}

pub struct DataFacade {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
}

impl DataFacade {
    pub fn new(remote: Arc<dyn RemoteStore>, local: Arc<dyn LocalStore>) -> Self {
        Self { remote, local }
    }

    /// HTTP remote plus a file mirror, both from `[client]` config.
    pub async fn from_config(cfg: &ClientConfig) -> Result<Self, FacadeError> {
        let remote = HttpRemote::new(&cfg.api_base_url, Duration::from_secs(cfg.timeout_secs))?;
        let local = FileMirror::open(&cfg.local_mirror_path).await?;
        Ok(Self::new(Arc::new(remote), Arc::new(local)))
    }

    /// Value stored under `key`, or `fallback`.
    ///
    /// A reachable remote is authoritative: `null`, or a value that does not
    /// decode as `T`, yields the fallback without consulting the mirror. The
    /// endpoint answers `[]` for a key that was never written, so list-typed
    /// callers see an empty list there and must treat it as "nothing yet".
    /// Only a failed remote call falls through to the mirror.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.remote.get(key).await {
            Ok(Some(value)) if !value.is_null() => {
                return serde_json::from_value(value).unwrap_or_else(|e| {
                    debug!(%key, error = %e, "remote value does not decode; using fallback");
                    fallback
                });
            }
            Ok(_) => return fallback,
            Err(e) => {
                warn!(%key, error = %e, "remote fetch failed; reading local mirror");
            }
        }
        self.read_local(key).await.unwrap_or(fallback)
    }

    /// Write `value` remotely and mirror it locally. Returns whether the
    /// remote write succeeded; the mirror is written either way.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(%key, error = %e, "value does not serialize; nothing saved");
                return false;
            }
        };
        let raw = json.to_string();

        let remote_ok = match self.remote.put(key, json).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "remote save failed; keeping local copy only");
                false
            }
        };
        if let Err(e) = self.local.set_raw(key, raw).await {
            warn!(%key, error = %e, "local mirror write failed");
        }
        remote_ok
    }

    async fn read_local<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.local.get_raw(key).await?;
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(%key, error = %e, "malformed local mirror entry; ignoring");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::kv::MemoryKv;

    /// Remote that can be switched off to simulate a network outage.
    pub struct FlakyRemote {
        inner: BackendRemote,
        pub down: AtomicBool,
    }

    impl FlakyRemote {
        pub fn new() -> Self {
            Self {
                inner: BackendRemote::new(Arc::new(MemoryKv::new())),
                down: AtomicBool::new(false),
            }
        }

        pub fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), FacadeError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(FacadeError::Request("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteStore for FlakyRemote {
        async fn get(&self, key: &str) -> Result<Option<Value>, FacadeError> {
            self.check()?;
            self.inner.get(key).await
        }
        async fn put(&self, key: &str, value: Value) -> Result<(), FacadeError> {
            self.check()?;
            self.inner.put(key, value).await
        }
    }

    pub fn facade() -> (Arc<DataFacade>, Arc<FlakyRemote>, Arc<MemoryMirror>) {
        let remote = Arc::new(FlakyRemote::new());
        let local = Arc::new(MemoryMirror::new());
        let facade = Arc::new(DataFacade::new(remote.clone(), local.clone()));
        (facade, remote, local)
    }
}
