use std::{ops::Deref, sync::Arc};

use models::category::{slugify, Category};

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Category tree; siblings share a `parent_id` and are ordered by `order`.
pub struct CategoryStore {
    inner: Collection<Category>,
}

impl CategoryStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Add as the last child of its parent. A blank slug is derived from the name.
    pub async fn create(&self, mut category: Category) -> Result<Category, ServiceError> {
        if category.slug.trim().is_empty() {
            category.slug = slugify(&category.name);
        }
        self.inner
            .append_checked(category, |items, rec| {
                if let Some(parent) = rec.parent_id.as_deref() {
                    if !items.iter().any(|c| c.id == parent) {
                        return Err(ServiceError::not_found("parent category"));
                    }
                }
                if items.iter().any(|c| c.slug == rec.slug) {
                    let msg = format!("slug '{}' already in use", rec.slug);
                    return Err(ServiceError::Validation(msg));
                }
                Ok(())
            })
            .await
    }

    pub async fn roots(&self) -> Vec<Category> {
        self.inner.siblings(None).await
    }

    pub async fn children(&self, parent_id: &str) -> Vec<Category> {
        self.inner.siblings(Some(parent_id)).await
    }

    pub async fn by_slug(&self, slug: &str) -> Option<Category> {
        self.inner.filter(|c| c.slug == slug).await.into_iter().next()
    }
}

impl Deref for CategoryStore {
    type Target = Collection<Category>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
