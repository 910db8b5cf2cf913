use std::{ops::Deref, sync::Arc};

use models::banner::Banner;

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Banners grouped by `position`, ordered within each position.
pub struct BannerStore {
    inner: Collection<Banner>,
}

impl BannerStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Add as the last banner of its position.
    pub async fn create(&self, banner: Banner) -> Result<Banner, ServiceError> {
        self.inner.append(banner).await
    }

    /// Active banners of `position` in display order.
    pub async fn active_in(&self, position: &str) -> Vec<Banner> {
        self.inner
            .siblings(Some(position))
            .await
            .into_iter()
            .filter(|b| b.active)
            .collect()
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<Banner, ServiceError> {
        self.inner.update(id, |b| b.active = active).await
    }
}

impl Deref for BannerStore {
    type Target = Collection<Banner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
