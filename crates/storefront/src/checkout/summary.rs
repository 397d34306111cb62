//! Order summary shown next to the checkout form.

use rust_decimal::Decimal;
use shopfront_core::{CurrencyCode, format_amount};

use crate::cart::CartStore;
use crate::storage::CartStorage;

/// Totals for the checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub line_count: usize,
    pub total_items: u64,
    pub subtotal: Decimal,
    /// Flat rate; the store does not charge shipping.
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl OrderSummary {
    /// Compute the summary from the current cart contents.
    #[must_use]
    pub fn from_cart<S: CartStorage>(store: &CartStore<S>, currency: CurrencyCode) -> Self {
        let subtotal = store.total_price();
        let shipping = Decimal::ZERO;
        Self {
            line_count: store.len(),
            total_items: store.total_items(),
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
            currency,
        }
    }

    /// Subtotal formatted for display.
    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_amount(self.subtotal, self.currency)
    }

    /// Shipping formatted for display.
    #[must_use]
    pub fn shipping_display(&self) -> String {
        format_amount(self.shipping, self.currency)
    }

    /// Total formatted for display.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_amount(self.total, self.currency)
    }
}
