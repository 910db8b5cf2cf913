use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

pub fn validate_rating(rating: u8) -> Result<(), ModelError> {
    if !(1..=5).contains(&rating) {
        return Err(ModelError::Validation("rating must be between 1 and 5".into()));
    }
    Ok(())
}

/// Mean rating of `reviews`, `None` when there are none.
pub fn average_rating<'a, I>(reviews: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Review>,
{
    let (sum, n) = reviews
        .into_iter()
        .fold((0u32, 0u32), |(s, n), r| (s + u32::from(r.rating), n + 1));
    (n > 0).then(|| f64::from(sum) / f64::from(n))
}

impl Entity for Review {
    const BUCKET: &'static str = "goldenglass_reviews";
    const KIND: &'static str = "review";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        let at = DateTime::from_timestamp(1_704_412_800, 0).unwrap_or_default();
        vec![
            Review {
                id: "r1".into(),
                product_id: "1".into(),
                author: "Sara".into(),
                rating: 5,
                comment: "Stunning piece, the gold catches the evening light.".into(),
                approved: true,
                created_at: at,
            },
            Review {
                id: "r2".into(),
                product_id: "2".into(),
                author: "Omar".into(),
                rating: 4,
                comment: "Great quality, delivery took a little longer than expected.".into(),
                approved: true,
                created_at: at,
            },
        ]
    }

    fn validate(&self) -> Result<(), ModelError> {
        validate_rating(self.rating)?;
        if self.product_id.trim().is_empty() {
            return Err(ModelError::Validation("review must reference a product".into()));
        }
        if self.author.trim().is_empty() {
            return Err(ModelError::Validation("author required".into()));
        }
        Ok(())
    }
}
