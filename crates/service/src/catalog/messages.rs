use std::{ops::Deref, sync::Arc};

use chrono::Utc;

use models::message::Message;

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Contact-form inbox.
pub struct MessageStore {
    inner: Collection<Message>,
}

impl MessageStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Store a new unread message stamped with the current time.
    pub async fn submit(&self, mut message: Message) -> Result<Message, ServiceError> {
        message.read = false;
        message.created_at = Utc::now();
        self.inner.add(message).await
    }

    pub async fn mark_read(&self, id: &str, read: bool) -> Result<Message, ServiceError> {
        self.inner.update(id, |m| m.read = read).await
    }

    pub async fn unread_count(&self) -> usize {
        self.inner.filter(|m| !m.read).await.len()
    }

    /// Newest first; same-instant messages keep latest-submitted first.
    pub async fn inbox(&self) -> Vec<Message> {
        let mut items = self.inner.all().await;
        items.reverse();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }
}

impl Deref for MessageStore {
    type Target = Collection<Message>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
