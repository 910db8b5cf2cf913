use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use models::{new_id, ordering, Entity, Ordered};

use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Remote persistence state of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    Synced,
    Pending,
    Failed,
}

/// In-memory list of `E` mirrored to the bucket `E::BUCKET`.
///
/// Every mutation builds the complete new list, publishes it to readers
/// right away, then rewrites the whole bucket through the facade. A failed
/// remote write does not roll the list back; the touched ids are marked
/// [`WriteStatus::Failed`] until a later write of the bucket succeeds.
pub struct Collection<E: Entity> {
    facade: Arc<DataFacade>,
    items: RwLock<Vec<E>>,
    // ids absent from the map are synced
    status: RwLock<HashMap<String, WriteStatus>>,
    // stored records that did not decode, written back untouched
    unreadable: RwLock<Vec<Value>>,
    // serializes writers so bucket rewrites happen in mutation order
    write_gate: Mutex<()>,
}

impl<E: Entity> Collection<E> {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self {
            facade,
            items: RwLock::new(Vec::new()),
            status: RwLock::new(HashMap::new()),
            unreadable: RwLock::new(Vec::new()),
            write_gate: Mutex::new(()),
        }
    }

    /// Read the bucket. A bucket that holds nothing (absent, `null` or `[]`)
    /// is replaced by `E::defaults()`, which are written back so the remote
    /// is seeded once. Records that do not decode are left out of the
    /// in-memory list but kept in every later rewrite of the bucket.
    pub async fn load(&self) -> Vec<E> {
        let _gate = self.write_gate.lock().await;
        let stored: Option<Value> = self.facade.fetch(E::BUCKET, None).await;
        let mut unreadable = Vec::new();
        let items = match stored {
            Some(Value::Array(raw)) if !raw.is_empty() => {
                let (items, rejected) = decode_records(raw);
                unreadable = rejected;
                items
            }
            Some(Value::Array(_)) | Some(Value::Null) | None => {
                let defaults = E::defaults();
                if !defaults.is_empty() {
                    let ok = self.facade.save(E::BUCKET, &defaults).await;
                    info!(
                        bucket = E::BUCKET,
                        count = defaults.len(),
                        remote_ok = ok,
                        "seeded empty bucket with defaults"
                    );
                }
                defaults
            }
            Some(other) => {
                warn!(
                    bucket = E::BUCKET,
                    kind = json_kind(&other),
                    "bucket is not a list; keeping it aside"
                );
                unreadable.push(other);
                Vec::new()
            }
        };
        *self.unreadable.write().await = unreadable;
        *self.items.write().await = items.clone();
        self.status.write().await.clear();
        items
    }

    pub async fn all(&self) -> Vec<E> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<E> {
        self.items.read().await.iter().find(|e| e.id() == id).cloned()
    }

    /// Records matching `pred`, in stored order.
    pub async fn filter<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        self.items.read().await.iter().filter(|e| pred(e)).cloned().collect()
    }

    /// Insert `record` under a freshly generated id.
    pub async fn add(&self, record: E) -> Result<E, ServiceError> {
        self.insert_with(record, |_, _| Ok(())).await
    }

    /// Insert under a fresh id after `prepare` sees the current list.
    /// `prepare` runs under the write gate, so checks against `items` hold
    /// until the record is published; an error leaves the list unchanged.
    pub(crate) async fn insert_with<F>(&self, mut record: E, prepare: F) -> Result<E, ServiceError>
    where
        F: FnOnce(&[E], &mut E) -> Result<(), ServiceError>,
    {
        record.validate()?;
        self.commit(move |items| {
            let id = loop {
                let id = new_id();
                if !items.iter().any(|e| e.id() == id) {
                    break id;
                }
            };
            record.set_id(id.clone());
            prepare(items, &mut record)?;
            items.push(record.clone());
            Ok((record, vec![id]))
        })
        .await
    }

    /// Apply `f` to record `id`; the result must still validate.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<E, ServiceError>
    where
        F: FnOnce(&mut E),
    {
        self.commit(|items| {
            let rec = items
                .iter_mut()
                .find(|e| e.id() == id)
                .ok_or_else(|| ServiceError::not_found(E::KIND))?;
            f(rec);
            rec.set_id(id.to_string());
            rec.validate()?;
            Ok((rec.clone(), vec![id.to_string()]))
        })
        .await
    }

    /// Remove record `id`.
    pub async fn delete(&self, id: &str) -> Result<E, ServiceError> {
        self.commit(|items| {
            let at = items
                .iter()
                .position(|e| e.id() == id)
                .ok_or_else(|| ServiceError::not_found(E::KIND))?;
            let removed = items.remove(at);
            Ok((removed, vec![id.to_string()]))
        })
        .await
    }

    pub async fn write_status(&self, id: &str) -> WriteStatus {
        self.status.read().await.get(id).copied().unwrap_or(WriteStatus::Synced)
    }

    /// Ids whose last write did not reach the remote.
    pub async fn failed(&self) -> Vec<String> {
        let status = self.status.read().await;
        let mut ids: Vec<String> = status
            .iter()
            .filter(|(_, s)| **s == WriteStatus::Failed)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Rewrite the bucket if any record is marked failed. Returns whether
    /// everything is synced afterwards.
    pub async fn retry_failed(&self) -> bool {
        let _gate = self.write_gate.lock().await;
        let failed = self.failed().await;
        if failed.is_empty() {
            return true;
        }
        let snapshot = self.items.read().await.clone();
        self.persist(&snapshot, &failed).await
    }

    /// Build the next list with `f`, publish it, then persist it.
    pub(crate) async fn commit<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<E>) -> Result<(R, Vec<String>), ServiceError>,
    {
        let _gate = self.write_gate.lock().await;
        let (out, touched, snapshot) = {
            let mut items = self.items.write().await;
            let mut next = items.clone();
            let (out, touched) = f(&mut next)?;
            *items = next.clone();
            (out, touched, next)
        };
        self.persist(&snapshot, &touched).await;
        Ok(out)
    }

    async fn persist(&self, snapshot: &[E], touched: &[String]) -> bool {
        {
            let mut status = self.status.write().await;
            for id in touched {
                status.insert(id.clone(), WriteStatus::Pending);
            }
        }
        let unreadable = self.unreadable.read().await.clone();
        let ok = if unreadable.is_empty() {
            self.facade.save(E::BUCKET, snapshot).await
        } else {
            let mut all = Vec::with_capacity(snapshot.len() + unreadable.len());
            for rec in snapshot {
                match serde_json::to_value(rec) {
                    Ok(v) => all.push(v),
                    Err(e) => warn!(
                        bucket = E::BUCKET,
                        id = rec.id(),
                        error = %e,
                        "record does not serialize"
                    ),
                }
            }
            all.extend(unreadable);
            self.facade.save(E::BUCKET, &all).await
        };
        let mut status = self.status.write().await;
        if ok {
            // the whole bucket was rewritten, so nothing is outstanding
            status.clear();
        } else {
            warn!(bucket = E::BUCKET, ids = ?touched, "bucket write failed; kept in memory");
            for id in touched {
                status.insert(id.clone(), WriteStatus::Failed);
            }
        }
        ok
    }
}

/// Split stored records into those that decode as `E` and the rest.
fn decode_records<E: Entity>(raw: Vec<Value>) -> (Vec<E>, Vec<Value>) {
    let mut items = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<E>(value.clone()) {
            Ok(rec) => items.push(rec),
            Err(e) => {
                warn!(
                    bucket = E::BUCKET,
                    index,
                    error = %e,
                    "record does not decode; keeping it aside"
                );
                rejected.push(value);
            }
        }
    }
    (items, rejected)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<E: Ordered> Collection<E> {
    /// Insert `record` last in its sibling group.
    pub async fn append(&self, record: E) -> Result<E, ServiceError> {
        self.append_checked(record, |_, _| Ok(())).await
    }

    /// `append` after `check` accepts the record against the current list.
    pub(crate) async fn append_checked<F>(&self, record: E, check: F) -> Result<E, ServiceError>
    where
        F: FnOnce(&[E], &E) -> Result<(), ServiceError>,
    {
        self.insert_with(record, |items, rec| {
            check(items, rec)?;
            let order = ordering::next_order(items, rec.group_key());
            rec.set_order(order);
            Ok(())
        })
        .await
    }

    /// Records of one group in display order.
    pub async fn siblings(&self, group: Option<&str>) -> Vec<E> {
        let items = self.items.read().await;
        ordering::siblings(&items, group).into_iter().cloned().collect()
    }

    /// Move `id` to `index` inside its group, renumbering the group `0..n-1`,
    /// and rewrite the whole set.
    pub async fn move_to(&self, id: &str, index: usize) -> Result<(), ServiceError> {
        self.commit(|items| {
            let group: Option<String> = items
                .iter()
                .find(|e| e.id() == id)
                .and_then(|e| e.group_key().map(str::to_owned));
            ordering::move_to(items, id, index)?;
            let touched = items
                .iter()
                .filter(|e| e.group_key() == group.as_deref())
                .map(|e| e.id().to_string())
                .collect();
            Ok(((), touched))
        })
        .await
    }
}
