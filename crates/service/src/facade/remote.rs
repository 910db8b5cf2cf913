use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use common::types::{DataResponse, ErrorResponse, WriteRequest, WriteResponse};

use super::FacadeError;
use crate::kv::KvBackend;

/// The remote side of the facade: the `/api/data` endpoint or an equivalent.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Stored value, `[]` or `None` when the remote has nothing for `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, FacadeError>;
    /// Overwrite the bucket.
    async fn put(&self, key: &str, value: Value) -> Result<(), FacadeError>;
}

/// Talks to the data endpoint over HTTP.
#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRemote {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FacadeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/data", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn failure(resp: reqwest::Response) -> FacadeError {
        let status = resp.status().as_u16();
        let message = resp
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_default();
        FacadeError::Status { status, message }
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn get(&self, key: &str) -> Result<Option<Value>, FacadeError> {
        let resp = self.client.get(&self.endpoint).query(&[("key", key)]).send().await?;
        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }
        let body: DataResponse = resp
            .json()
            .await
            .map_err(|e| FacadeError::InvalidResponse(e.to_string()))?;
        Ok((!body.data.is_null()).then_some(body.data))
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), FacadeError> {
        let req = WriteRequest { key: Some(key.to_string()), data: Some(value) };
        let resp = self.client.post(&self.endpoint).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }
        let body: WriteResponse = resp
            .json()
            .await
            .map_err(|e| FacadeError::InvalidResponse(e.to_string()))?;
        if !body.success {
            return Err(FacadeError::InvalidResponse("write not acknowledged".into()));
        }
        Ok(())
    }
}

/// In-process remote over a bucket backend, answering exactly like the
/// endpoint does (`[]` for a never-written key).
#[derive(Clone)]
pub struct BackendRemote {
    backend: Arc<dyn KvBackend>,
}

impl BackendRemote {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl RemoteStore for BackendRemote {
    async fn get(&self, key: &str) -> Result<Option<Value>, FacadeError> {
        let value = self
            .backend
            .get(key)
            .await
            .map_err(|e| FacadeError::Remote(e.to_string()))?;
        Ok(Some(value.unwrap_or_else(|| Value::Array(Vec::new()))))
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), FacadeError> {
        self.backend
            .set(key, value)
            .await
            .map_err(|e| FacadeError::Remote(e.to_string()))
    }
}
