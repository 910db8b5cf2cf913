use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// Percent off the order total, 0..=100.
    Percentage(f64),
    /// Flat amount off, never more than the order total.
    Fixed(f64),
}

impl Default for Discount {
    fn default() -> Self {
        Discount::Percentage(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount: Discount,
    pub min_order_amount: f64,
    pub max_uses: Option<u32>,
    pub used_count: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Why a coupon cannot be applied. Checked in declaration order.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CouponRejection {
    #[error("coupon code not found")]
    NotFound,
    #[error("coupon is not active")]
    Inactive,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon usage limit reached")]
    UsageLimitReached,
    #[error("order total must be at least {minimum:.2}")]
    BelowMinimum { minimum: f64 },
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl Coupon {
    pub fn code_matches(&self, code: &str) -> bool {
        normalize_code(&self.code) == normalize_code(code)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| now > at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.map_or(false, |max| self.used_count >= max)
    }

    /// Amount taken off `order_total`, clamped to `0..=order_total`.
    pub fn discount_for(&self, order_total: f64) -> f64 {
        let total = order_total.max(0.0);
        let off = match self.discount {
            Discount::Percentage(pct) => total * pct.clamp(0.0, 100.0) / 100.0,
            Discount::Fixed(amount) => amount.max(0.0),
        };
        off.min(total)
    }
}

/// Find `code` in `coupons` and check it against `order_total` at `now`.
///
/// Checks run existence, active flag, expiry, usage ceiling, minimum order,
/// and stop at the first failure. Pure: same inputs, same answer.
pub fn validate_coupon<'a>(
    coupons: &'a [Coupon],
    code: &str,
    order_total: f64,
    now: DateTime<Utc>,
) -> Result<&'a Coupon, CouponRejection> {
    let coupon = coupons
        .iter()
        .find(|c| c.code_matches(code))
        .ok_or(CouponRejection::NotFound)?;
    if !coupon.active {
        return Err(CouponRejection::Inactive);
    }
    if coupon.is_expired(now) {
        return Err(CouponRejection::Expired);
    }
    if coupon.is_exhausted() {
        return Err(CouponRejection::UsageLimitReached);
    }
    if order_total < coupon.min_order_amount {
        return Err(CouponRejection::BelowMinimum { minimum: coupon.min_order_amount });
    }
    Ok(coupon)
}

impl Entity for Coupon {
    const BUCKET: &'static str = "goldenglass_coupons";
    const KIND: &'static str = "coupon";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            Coupon {
                id: "welcome10".into(),
                code: "WELCOME10".into(),
                discount: Discount::Percentage(10.0),
                min_order_amount: 0.0,
                max_uses: None,
                used_count: 0,
                expires_at: None,
                active: true,
            },
            Coupon {
                id: "glass50".into(),
                code: "GLASS50".into(),
                discount: Discount::Fixed(50.0),
                min_order_amount: 300.0,
                max_uses: Some(100),
                used_count: 0,
                expires_at: None,
                active: true,
            },
        ]
    }

    fn validate(&self) -> Result<(), ModelError> {
        if normalize_code(&self.code).is_empty() {
            return Err(ModelError::Validation("coupon code required".into()));
        }
        match self.discount {
            Discount::Percentage(p) if !(0.0..=100.0).contains(&p) => {
                return Err(ModelError::Validation("percentage must be within 0..=100".into()))
            }
            Discount::Fixed(a) if !a.is_finite() || a < 0.0 => {
                return Err(ModelError::Validation("fixed discount must be non-negative".into()))
            }
            _ => {}
        }
        if self.min_order_amount < 0.0 {
            return Err(ModelError::Validation("minimum order amount must be non-negative".into()));
        }
        Ok(())
    }
}
