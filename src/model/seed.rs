use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Id;

/// One category entry in the bundled dataset. `name` is the natural key the
/// menu items join against during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub description: String,
}

/// One customisation entry (topping, side, size, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomisationSeed {
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemSeed {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub rating: f64,
    pub calories: u32,
    pub protein: u32,
    pub category_name: String,
    /// Customisation names attached to this item, in menu order.
    pub customisations: Vec<String>,
}

/// The bundled source-of-truth dataset. Read once per run, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDataset {
    pub categories: Vec<CategorySeed>,
    pub customisations: Vec<CustomisationSeed>,
    pub menu: Vec<MenuItemSeed>,
}

impl SeedDataset {
    /// Total number of menu↔customisation link rows a successful run creates.
    pub fn link_count(&self) -> usize {
        self.menu.iter().map(|item| item.customisations.len()).sum()
    }
}

impl CategorySeed {
    pub fn row_fields(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
        })
    }
}

impl CustomisationSeed {
    pub fn row_fields(&self) -> Value {
        json!({
            "name": self.name,
            "price": self.price,
            "type": self.kind,
        })
    }
}

impl MenuItemSeed {
    /// Row payload for the menu table. `image_url` is the durable view URL
    /// produced by the asset ingest, `category_id` the id assigned to this
    /// item's category earlier in the run.
    pub fn row_fields(&self, image_url: &str, category_id: &Id) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "image_url": image_url,
            "price": self.price,
            "rating": self.rating,
            "calories": self.calories,
            "protein": self.protein,
            "categories": category_id,
        })
    }
}

/// Row payload for a menu↔customisation link.
pub fn link_row_fields(menu_id: &Id, customisation_id: &Id) -> Value {
    json!({
        "menu": menu_id,
        "customisations": customisation_id,
    })
}
