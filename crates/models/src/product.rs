use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub category_id: String,
    pub images: Vec<String>,
    pub stock: u32,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Sort keys offered by the catalog listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Newest,
    Name,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive match on name or description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("product name required".into()));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

/// Sort in place by the given key. Ties fall back to name.
pub fn sort_products(items: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::PriceAsc => {
            items.sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.name.cmp(&b.name)))
        }
        ProductSort::PriceDesc => {
            items.sort_by(|a, b| b.price.total_cmp(&a.price).then_with(|| a.name.cmp(&b.name)))
        }
        ProductSort::Newest => {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)))
        }
        ProductSort::Name => {
            items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
    }
}

fn seeded_at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl Entity for Product {
    const BUCKET: &'static str = "goldenglass_products";
    const KIND: &'static str = "product";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            Product {
                id: "1".into(),
                name: "Golden Horizon".into(),
                description: "Tempered glass panel with a gold-leaf sunset over calm water.".into(),
                price: 349.0,
                compare_at_price: Some(399.0),
                category_id: "abstract".into(),
                images: vec!["/images/products/golden-horizon.jpg".into()],
                stock: 12,
                featured: true,
                active: true,
                created_at: seeded_at(1_704_067_200),
            },
            Product {
                id: "2".into(),
                name: "Marble Whisper".into(),
                description: "White and grey marble veining printed on crystal glass.".into(),
                price: 289.0,
                compare_at_price: None,
                category_id: "marble".into(),
                images: vec!["/images/products/marble-whisper.jpg".into()],
                stock: 8,
                featured: true,
                active: true,
                created_at: seeded_at(1_704_153_600),
            },
            Product {
                id: "3".into(),
                name: "Desert Bloom".into(),
                description: "Floral glass art in warm sand and copper tones.".into(),
                price: 259.0,
                compare_at_price: None,
                category_id: "floral".into(),
                images: vec!["/images/products/desert-bloom.jpg".into()],
                stock: 15,
                featured: false,
                active: true,
                created_at: seeded_at(1_704_240_000),
            },
            Product {
                id: "4".into(),
                name: "Arabic Calligraphy Gold".into(),
                description: "Hand-finished calligraphy with gold accents on black glass.".into(),
                price: 429.0,
                compare_at_price: Some(479.0),
                category_id: "calligraphy".into(),
                images: vec!["/images/products/calligraphy-gold.jpg".into()],
                stock: 5,
                featured: true,
                active: true,
                created_at: seeded_at(1_704_326_400),
            },
        ]
    }

    fn validate(&self) -> Result<(), ModelError> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        if let Some(p) = self.compare_at_price {
            validate_price(p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_four_distinct_ids() {
        let items = Product::defaults();
        assert_eq!(items.len(), 4);
        let mut ids: Vec<_> = items.iter().map(|p| p.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(items.iter().all(|p| p.validate().is_ok()));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: Product = serde_json::from_str(r#"{"id":"9","name":"X","price":10}"#).unwrap();
        assert_eq!(p.name, "X");
        assert_eq!(p.stock, 0);
        assert!(p.images.is_empty());
    }

    #[test]
    fn camel_case_on_the_wire() {
        let v = serde_json::to_value(&Product::defaults()[0]).unwrap();
        assert!(v.get("categoryId").is_some());
        assert!(v.get("compareAtPrice").is_some());
    }

    #[test]
    fn sort_by_price() {
        let mut items = Product::defaults();
        sort_products(&mut items, ProductSort::PriceAsc);
        assert_eq!(items[0].price, 259.0);
        sort_products(&mut items, ProductSort::PriceDesc);
        assert_eq!(items[0].price, 429.0);
        sort_products(&mut items, ProductSort::Newest);
        assert_eq!(items[0].id, "4");
    }

    #[test]
    fn negative_price_rejected() {
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_name("  ").is_err());
    }
}
