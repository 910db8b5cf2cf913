use std::{
    collections::HashMap,
    ffi::OsString,
    hash::Hash,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map.
///
/// The whole `HashMap<K, V>` is held in memory and rewritten to one JSON file
/// on every change. Backs both the file bucket backend and the local mirror.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Open the store at `path`, creating an empty file if missing.
    /// A file that does not parse is moved aside to `<path>.corrupt-<unix
    /// seconds>` and the store starts empty. Any other read error fails.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    let suffix = format!(".corrupt-{}", chrono::Utc::now().timestamp());
                    let aside = sibling(&file_path, &suffix);
                    fs::rename(&file_path, &aside)
                        .await
                        .map_err(|e| ServiceError::Storage(e.to_string()))?;
                    warn!(
                        path = %file_path.display(),
                        moved_to = %aside.display(),
                        error = %e,
                        "malformed store file; starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!("{}: {}", file_path.display(), e)));
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or overwrite, then persist. Memory changes only if the file write succeeds.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        next.insert(key, value);
        write_atomic(&self.file_path, &next).await?;
        *map = next;
        Ok(())
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(key) {
            return Ok(false);
        }
        let mut next = map.clone();
        next.remove(key);
        write_atomic(&self.file_path, &next).await?;
        *map = next;
        Ok(true)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write to `<path>.tmp`, then rename over `path`.
async fn write_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(value).map_err(|e| ServiceError::Storage(e.to_string()))?;
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    Ok(())
}
