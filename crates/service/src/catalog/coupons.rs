use std::{ops::Deref, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use models::coupon::{normalize_code, validate_coupon, Coupon, CouponRejection};

use super::collection::Collection;
use crate::errors::ServiceError;
use crate::facade::DataFacade;

/// A coupon accepted for an order, with the amount it takes off.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub coupon: Coupon,
    pub discount: f64,
    pub total_after_discount: f64,
}

pub struct CouponStore {
    inner: Collection<Coupon>,
}

impl CouponStore {
    pub fn new(facade: Arc<DataFacade>) -> Self {
        Self { inner: Collection::new(facade) }
    }

    /// Add a coupon; codes are stored uppercased and must be unique.
    pub async fn create(&self, mut coupon: Coupon) -> Result<Coupon, ServiceError> {
        coupon.code = normalize_code(&coupon.code);
        self.inner
            .insert_with(coupon, |items, rec| {
                if items.iter().any(|c| c.code_matches(&rec.code)) {
                    let msg = format!("coupon code '{}' already exists", rec.code);
                    return Err(ServiceError::Validation(msg));
                }
                Ok(())
            })
            .await
    }

    /// Check `code` against the in-memory coupon set at `now`.
    pub async fn validate_at(
        &self,
        code: &str,
        order_total: f64,
        now: DateTime<Utc>,
    ) -> Result<Redemption, CouponRejection> {
        let coupons = self.inner.all().await;
        let coupon = validate_coupon(&coupons, code, order_total, now)?;
        let discount = coupon.discount_for(order_total);
        Ok(Redemption {
            coupon: coupon.clone(),
            discount,
            total_after_discount: order_total - discount,
        })
    }

    pub async fn validate(
        &self,
        code: &str,
        order_total: f64,
    ) -> Result<Redemption, CouponRejection> {
        self.validate_at(code, order_total, Utc::now()).await
    }

    /// Validate and count one use of the coupon in a single write, so
    /// concurrent redemptions cannot pass the usage ceiling.
    pub async fn redeem_at(
        &self,
        code: &str,
        order_total: f64,
        now: DateTime<Utc>,
    ) -> Result<Redemption, ServiceError> {
        let redemption = self
            .inner
            .commit(|items| {
                let coupon = validate_coupon(items, code, order_total, now)?;
                let discount = coupon.discount_for(order_total);
                let id = coupon.id.clone();
                let rec = items
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| ServiceError::not_found("coupon"))?;
                rec.used_count = rec.used_count.saturating_add(1);
                let redemption = Redemption {
                    coupon: rec.clone(),
                    discount,
                    total_after_discount: order_total - discount,
                };
                Ok((redemption, vec![id]))
            })
            .await?;
        info!(
            coupon = %redemption.coupon.code,
            used = redemption.coupon.used_count,
            discount = redemption.discount,
            "coupon redeemed"
        );
        Ok(redemption)
    }

    pub async fn redeem(&self, code: &str, order_total: f64) -> Result<Redemption, ServiceError> {
        self.redeem_at(code, order_total, Utc::now()).await
    }
}

impl Deref for CouponStore {
    type Target = Collection<Coupon>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::test_support::facade;
    use models::coupon::Discount;

    async fn store() -> CouponStore {
        let (f, _, _) = facade();
        let s = CouponStore::new(f);
        s.load().await;
        s
    }

    #[tokio::test]
    async fn validate_reports_discount() {
        let s = store().await;
        let r = s.validate("welcome10", 200.0).await.unwrap();
        assert_eq!(r.discount, 20.0);
        assert_eq!(r.total_after_discount, 180.0);
        assert_eq!(
            s.validate("GLASS50", 100.0).await,
            Err(CouponRejection::BelowMinimum { minimum: 300.0 })
        );
    }

    #[tokio::test]
    async fn redeem_counts_uses_until_ceiling() -> Result<(), ServiceError> {
        let s = store().await;
        let c = s
            .create(Coupon {
                code: " once ".into(),
                discount: Discount::Fixed(10.0),
                max_uses: Some(1),
                active: true,
                ..Coupon::default()
            })
            .await?;
        assert_eq!(c.code, "ONCE");

        let r = s.redeem("once", 50.0).await?;
        assert_eq!(r.coupon.used_count, 1);
        assert!(matches!(
            s.redeem("ONCE", 50.0).await,
            Err(ServiceError::Coupon(CouponRejection::UsageLimitReached))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_redemptions_respect_ceiling() -> Result<(), ServiceError> {
        let s = store().await;
        s.create(Coupon {
            code: "SINGLE".into(),
            discount: Discount::Fixed(5.0),
            max_uses: Some(1),
            active: true,
            ..Coupon::default()
        })
        .await?;

        let (a, b) = tokio::join!(s.redeem("SINGLE", 50.0), s.redeem("single", 50.0));
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let used: Vec<u32> =
            s.filter(|c| c.code == "SINGLE").await.iter().map(|c| c.used_count).collect();
        assert_eq!(used, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_keep_codes_unique() {
        let s = store().await;
        let coupon = || Coupon { code: "twin".into(), active: true, ..Coupon::default() };
        let (a, b) = tokio::join!(s.create(coupon()), s.create(coupon()));
        assert!(a.is_ok() != b.is_ok());
        assert_eq!(s.filter(|c| c.code == "TWIN").await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_code_rejected() {
        let s = store().await;
        let dup =
            s.create(Coupon { code: "Welcome10".into(), active: true, ..Coupon::default() }).await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));
    }
}
