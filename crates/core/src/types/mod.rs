//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;

pub use cart::{CartLine, NewCartLine};
pub use id::*;
pub use order::{NewOrder, NewOrderItem, ShippingAddress};
pub use price::{CurrencyCode, format_amount};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
pub use status::*;
