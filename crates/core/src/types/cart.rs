//! Cart line item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartLineId, ProductId};
use super::quantity::Quantity;

/// One distinct product held in the cart.
///
/// The unit price is a snapshot taken when the product was first added; it is
/// never re-fetched from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Locally generated line identifier.
    pub id: CartLineId,
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Display name at add-time.
    pub name: String,
    /// Unit price at add-time.
    pub price: Decimal,
    /// Number of units.
    pub quantity: Quantity,
    /// Image reference (URL or path) at add-time.
    pub image: String,
}

impl CartLine {
    /// Create a line from a candidate with a freshly generated ID.
    #[must_use]
    pub fn from_candidate(candidate: NewCartLine) -> Self {
        Self {
            id: CartLineId::generate(),
            product_id: candidate.product_id,
            name: candidate.name,
            price: candidate.price,
            quantity: candidate.quantity,
            image: candidate.image,
        }
    }

    /// Unit price multiplied by quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity.get()))
    }
}

/// A product about to be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: Quantity,
    pub image: String,
}
