use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Bucket key of the single settings object.
pub const SETTINGS_BUCKET: &str = "goldenglass_settings";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub whatsapp: Option<String>,
}

impl Default for SocialLinks {
    fn default() -> Self {
        Self {
            instagram: Some("https://instagram.com/goldenglass".into()),
            facebook: None,
            whatsapp: None,
        }
    }
}

/// Store-wide settings. Every field has a default so a partially stored
/// object deserializes merged over [`Settings::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub store_name: String,
    pub contact_email: String,
    pub phone: String,
    pub address: String,
    pub currency: String,
    pub shipping_fee: f64,
    pub free_shipping_threshold: f64,
    pub tax_rate: f64,
    pub social: SocialLinks,
    pub maintenance_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_name: "Golden Glass".into(),
            contact_email: "hello@goldenglass.store".into(),
            phone: String::new(),
            address: String::new(),
            currency: "USD".into(),
            shipping_fee: 25.0,
            free_shipping_threshold: 500.0,
            tax_rate: 0.0,
            social: SocialLinks::default(),
            maintenance_mode: false,
        }
    }
}

impl Settings {
    /// Shipping charged for an order of `subtotal`.
    pub fn shipping_for(&self, subtotal: f64) -> f64 {
        if self.free_shipping_threshold > 0.0 && subtotal >= self.free_shipping_threshold {
            0.0
        } else {
            self.shipping_fee
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.store_name.trim().is_empty() {
            return Err(ModelError::Validation("store name required".into()));
        }
        if self.currency.trim().len() != 3 {
            return Err(ModelError::Validation("currency must be a 3-letter code".into()));
        }
        if self.shipping_fee < 0.0 || self.free_shipping_threshold < 0.0 {
            return Err(ModelError::Validation("shipping amounts must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(ModelError::Validation("tax rate must be within 0..=1".into()));
        }
        Ok(())
    }
}
