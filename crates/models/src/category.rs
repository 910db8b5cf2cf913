use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Ordered};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<String>,
    pub order: u32,
    pub active: bool,
    pub image: Option<String>,
}

/// Lowercase, dash separated slug from a display name.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash = false;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn root(id: &str, name: &str, order: u32) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        slug: slugify(name),
        parent_id: None,
        order,
        active: true,
        image: None,
    }
}

fn child(id: &str, name: &str, parent: &str, order: u32) -> Category {
    Category { parent_id: Some(parent.into()), ..root(id, name, order) }
}

impl Entity for Category {
    const BUCKET: &'static str = "goldenglass_categories";
    const KIND: &'static str = "category";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            root("abstract", "Abstract", 0),
            root("marble", "Marble", 1),
            root("floral", "Floral", 2),
            root("calligraphy", "Calligraphy", 3),
            child("calligraphy-modern", "Modern Calligraphy", "calligraphy", 0),
            child("calligraphy-classic", "Classic Calligraphy", "calligraphy", 1),
        ]
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("category name required".into()));
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ModelError::Validation("category cannot be its own parent".into()));
        }
        Ok(())
    }
}

impl Ordered for Category {
    fn group_key(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
