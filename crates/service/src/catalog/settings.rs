use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use models::settings::{Settings, SETTINGS_BUCKET};

use super::collection::WriteStatus;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Store-wide settings, kept as a single JSON object in its own bucket.
///
/// Stored objects are merged over [`Settings::default`], so fields added
/// later pick up their defaults when an older object is read.
pub struct SettingsStore {
    facade: Arc<DataFacade>,
    current: RwLock<Settings>,
    status: RwLock<WriteStatus>,
    write_gate: Mutex<()>,
}

impl SettingsStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self {
            facade,
            current: RwLock::new(Settings::default()),
            status: RwLock::new(WriteStatus::Synced),
            write_gate: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Settings {
        let _gate = self.write_gate.lock().await;
        let stored: Value = self.facade.fetch(SETTINGS_BUCKET, Value::Null).await;
        let settings = match stored {
            Value::Object(_) => serde_json::from_value(stored).unwrap_or_else(|e| {
                warn!(error = %e, "stored settings do not decode; using defaults");
                Settings::default()
            }),
            Value::Null => self.seed().await,
            Value::Array(ref a) if a.is_empty() => self.seed().await,
            other => {
                warn!(stored = %other, "settings bucket is not an object; using defaults");
                Settings::default()
            }
        };
        *self.current.write().await = settings.clone();
        *self.status.write().await = WriteStatus::Synced;
        settings
    }

    async fn seed(&self) -> Settings {
        let defaults = Settings::default();
        let ok = self.facade.save(SETTINGS_BUCKET, &defaults).await;
        info!(remote_ok = ok, "seeded settings with defaults");
        defaults
    }

    pub async fn get(&self) -> Settings {
        self.current.read().await.clone()
    }

    /// Apply `f`, validate, publish and persist the whole object.
    pub async fn update<F>(&self, f: F) -> Result<Settings, ServiceError>
    where
        F: FnOnce(&mut Settings),
    {
        let _gate = self.write_gate.lock().await;
        let mut next = self.current.read().await.clone();
        f(&mut next);
        next.validate()?;
        *self.current.write().await = next.clone();
        self.persist(&next).await;
        Ok(next)
    }

    pub async fn write_status(&self) -> WriteStatus {
        *self.status.read().await
    }

    pub async fn retry_failed(&self) -> bool {
        let _gate = self.write_gate.lock().await;
        if *self.status.read().await != WriteStatus::Failed {
            return true;
        }
        let snapshot = self.current.read().await.clone();
        self.persist(&snapshot).await
    }

    async fn persist(&self, settings: &Settings) -> bool {
        *self.status.write().await = WriteStatus::Pending;
        let ok = self.facade.save(SETTINGS_BUCKET, settings).await;
        if !ok {
            warn!(bucket = SETTINGS_BUCKET, "settings write failed; kept in memory");
        }
        *self.status.write().await = if ok { WriteStatus::Synced } else { WriteStatus::Failed };
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::test_support::facade;
    use serde_json::json;

    #[tokio::test]
    async fn empty_bucket_seeds_defaults() {
        let (f, _, _) = facade();
        let s = SettingsStore::new(f.clone());
        assert_eq!(s.load().await, Settings::default());
        let stored: Value = f.fetch(SETTINGS_BUCKET, Value::Null).await;
        assert_eq!(stored["storeName"], json!("Golden Glass"));
    }

    #[tokio::test]
    async fn non_object_bucket_is_not_overwritten_on_load() {
        let (f, _, _) = facade();
        f.save(SETTINGS_BUCKET, &json!("legacy")).await;
        let s = SettingsStore::new(f.clone());
        assert_eq!(s.load().await, Settings::default());
        let stored: Value = f.fetch(SETTINGS_BUCKET, Value::Null).await;
        assert_eq!(stored, json!("legacy"));
    }

    #[tokio::test]
    async fn partial_object_merges_over_defaults() {
        let (f, _, _) = facade();
        f.save(SETTINGS_BUCKET, &json!({"storeName": "Glass & Gold", "taxRate": 0.05})).await;
        let s = SettingsStore::new(f);
        let loaded = s.load().await;
        assert_eq!(loaded.store_name, "Glass & Gold");
        assert_eq!(loaded.tax_rate, 0.05);
        assert_eq!(loaded.shipping_fee, 25.0);
    }

    #[tokio::test]
    async fn update_validates_and_tracks_failures() {
        let (f, remote, _) = facade();
        let s = SettingsStore::new(f);
        s.load().await;

        assert!(s.update(|st| st.currency = "EURO".into()).await.is_err());
        assert_eq!(s.get().await.currency, "USD");

        remote.set_down(true);
        let updated = s.update(|st| st.shipping_fee = 15.0).await.unwrap();
        assert_eq!(updated.shipping_fee, 15.0);
        assert_eq!(s.write_status().await, WriteStatus::Failed);

        remote.set_down(false);
        assert!(s.retry_failed().await);
        assert_eq!(s.write_status().await, WriteStatus::Synced);
        assert_eq!(s.load().await.shipping_fee, 15.0);
    }
}
