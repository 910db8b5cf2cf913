//! Typed entity stores over the persistence facade.
//!
//! Each store keeps its bucket in memory, answers queries from that copy and
//! rewrites the whole bucket on every mutation.

use std::sync::Arc;

use tracing::info;

use crate::facade::DataFacade;

pub mod banners;
pub mod categories;
pub mod collection;
pub mod coupons;
pub mod messages;
pub mod products;
pub mod reviews;
pub mod settings;

pub use banners::BannerStore;
pub use categories::CategoryStore;
pub use collection::{Collection, WriteStatus};
pub use coupons::{CouponStore, Redemption};
pub use messages::MessageStore;
pub use products::ProductStore;
pub use reviews::ReviewStore;
pub use settings::SettingsStore;

/// Every store of the storefront sharing one facade.
pub struct Storefront {
    pub products: ProductStore,
    pub categories: CategoryStore,
    pub coupons: CouponStore,
    pub messages: MessageStore,
    pub reviews: ReviewStore,
    pub settings: SettingsStore,
    pub banners: BannerStore,
}

impl Storefront {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self {
            products: ProductStore::new(facade.clone()),
            categories: CategoryStore::new(facade.clone()),
            coupons: CouponStore::new(facade.clone()),
            messages: MessageStore::new(facade.clone()),
            reviews: ReviewStore::new(facade.clone()),
            settings: SettingsStore::new(facade.clone()),
            banners: BannerStore::new(facade),
        }
    }

    /// Load every bucket concurrently.
    pub async fn load_all(&self) {
        let (products, categories, coupons, messages, reviews, _, banners) = tokio::join!(
            self.products.load(),
            self.categories.load(),
            self.coupons.load(),
            self.messages.load(),
            self.reviews.load(),
            self.settings.load(),
            self.banners.load(),
        );
        info!(
            products = products.len(),
            categories = categories.len(),
            coupons = coupons.len(),
            messages = messages.len(),
            reviews = reviews.len(),
            banners = banners.len(),
            "storefront loaded"
        );
    }

    /// Retry every bucket with failed writes. Returns whether all are synced.
    pub async fn retry_failed(&self) -> bool {
        let results = [
            self.products.retry_failed().await,
            self.categories.retry_failed().await,
            self.coupons.retry_failed().await,
            self.messages.retry_failed().await,
            self.reviews.retry_failed().await,
            self.settings.retry_failed().await,
            self.banners.retry_failed().await,
        ];
        results.iter().all(|ok| *ok)
    }
}
