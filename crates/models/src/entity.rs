//! Traits shared by every bucket-backed record type.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ModelError;

/// A record that lives in a list bucket.
///
/// The storage layer does not enforce any schema: ids, defaults and validation
/// are all decided here, by the record type.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Bucket key the collection is stored under.
    const BUCKET: &'static str;
    /// Human readable name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Dataset used when the bucket is empty.
    fn defaults() -> Vec<Self>;

    fn validate(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// A record positioned inside a sibling group by a numeric `order` field.
pub trait Ordered: Entity {
    /// Records with equal keys are siblings. `None` is its own group.
    fn group_key(&self) -> Option<&str>;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Fresh record id, distinct from anything generated before.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
