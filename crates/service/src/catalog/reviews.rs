use std::{ops::Deref, sync::Arc};

use chrono::Utc;

use models::review::{average_rating, Review};

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// Product reviews; only approved ones are shown on the storefront.
pub struct ReviewStore {
    inner: Collection<Review>,
}

impl ReviewStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Store a customer review awaiting moderation.
    pub async fn submit(&self, mut review: Review) -> Result<Review, ServiceError> {
        review.approved = false;
        review.created_at = Utc::now();
        self.inner.add(review).await
    }

    pub async fn approve(&self, id: &str) -> Result<Review, ServiceError> {
        self.inner.update(id, |r| r.approved = true).await
    }

    pub async fn pending(&self) -> Vec<Review> {
        self.inner.filter(|r| !r.approved).await
    }

    pub async fn approved_for(&self, product_id: &str) -> Vec<Review> {
        self.inner.filter(|r| r.approved && r.product_id == product_id).await
    }

    pub async fn average_rating(&self, product_id: &str) -> Option<f64> {
        average_rating(&self.approved_for(product_id).await)
    }
}

impl Deref for ReviewStore {
    type Target = Collection<Review>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::test_support::facade;

    #[tokio::test]
    async fn moderation_flow() -> Result<(), ServiceError> {
        let (f, _, _) = facade();
        let s = ReviewStore::new(f);
        s.load().await;
        assert_eq!(s.average_rating("1").await, Some(5.0));

        let r = s
            .submit(Review {
                product_id: "1".into(),
                author: "Nour".into(),
                rating: 2,
                approved: true,
                ..Review::default()
            })
            .await?;
        assert!(!r.approved);
        assert_eq!(s.pending().await.len(), 1);
        assert_eq!(s.average_rating("1").await, Some(5.0));

        s.approve(&r.id).await?;
        assert_eq!(s.average_rating("1").await, Some(3.5));
        assert_eq!(s.average_rating("3").await, None);
        Ok(())
    }

    #[tokio::test]
    async fn rating_out_of_range_rejected() {
        let (f, _, _) = facade();
        let s = ReviewStore::new(f);
        let bad =
            Review { product_id: "1".into(), author: "A".into(), rating: 9, ..Review::default() };
        assert!(s.submit(bad).await.is_err());
    }
}
