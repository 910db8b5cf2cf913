use std::{ops::Deref, sync::Arc};

use models::product::{sort_products, Product, ProductSort};

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Product catalog with the storefront's listing queries.
pub struct ProductStore {
    inner: Collection<Product>,
}

impl ProductStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Active products whose name or description contains `text`.
    pub async fn search(&self, text: &str) -> Vec<Product> {
        self.inner.filter(|p| p.active && p.matches(text)).await
    }

    pub async fn in_category(&self, category_id: &str) -> Vec<Product> {
        self.inner.filter(|p| p.active && p.category_id == category_id).await
    }

    pub async fn featured(&self) -> Vec<Product> {
        self.inner.filter(|p| p.active && p.featured).await
    }

    /// All active products in the requested order.
    pub async fn sorted(&self, sort: ProductSort) -> Vec<Product> {
        let mut items = self.inner.filter(|p| p.active).await;
        sort_products(&mut items, sort);
        items
    }

    /// Add `delta` to the stock level, saturating at zero.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> Result<Product, ServiceError> {
        self.inner
            .update(id, |p| {
                let next = i64::from(p.stock).saturating_add(delta).clamp(0, i64::from(u32::MAX));
                p.stock = next as u32;
            })
            .await
    }
}

impl Deref for ProductStore {
    type Target = Collection<Product>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
