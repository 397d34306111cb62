//! Catalog product as returned by the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::NewCartLine;
use super::id::ProductId;
use super::quantity::Quantity;

/// A product row from the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    /// Units available; only consulted as an advisory check before adding.
    pub inventory_count: u32,
    pub image_url: String,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Snapshot this product into a cart candidate.
    #[must_use]
    pub fn to_cart_line(&self, quantity: Quantity) -> NewCartLine {
        NewCartLine {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity,
            image: self.image_url.clone(),
        }
    }
}
