use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Ordered};
use crate::errors::ModelError;

/// Promotional banner. `position` names the slot it is shown in and is the
/// grouping key for ordering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub link: Option<String>,
    pub position: String,
    pub order: u32,
    pub active: bool,
}

impl Entity for Banner {
    const BUCKET: &'static str = "goldenglass_banners";
    const KIND: &'static str = "banner";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            Banner {
                id: "hero-1".into(),
                title: "Art That Shines".into(),
                subtitle: "Handcrafted glass wall art".into(),
                image: "/images/banners/hero-1.jpg".into(),
                link: Some("/shop".into()),
                position: "hero".into(),
                order: 0,
                active: true,
            },
            Banner {
                id: "hero-2".into(),
                title: "New Calligraphy Collection".into(),
                subtitle: "Gold on black, made to order".into(),
                image: "/images/banners/hero-2.jpg".into(),
                link: Some("/shop?category=calligraphy".into()),
                position: "hero".into(),
                order: 1,
                active: true,
            },
            Banner {
                id: "promo-1".into(),
                title: "Free shipping over $500".into(),
                subtitle: String::new(),
                image: "/images/banners/promo-1.jpg".into(),
                link: None,
                position: "promo".into(),
                order: 0,
                active: true,
            },
        ]
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::Validation("banner title required".into()));
        }
        if self.position.trim().is_empty() {
            return Err(ModelError::Validation("banner position required".into()));
        }
        Ok(())
    }
}

impl Ordered for Banner {
    fn group_key(&self) -> Option<&str> {
        Some(self.position.as_str())
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
