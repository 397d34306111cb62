//! Cart inspection and editing against a file-backed storage profile.
//!
//! Every command rehydrates the cart from the profile before doing anything,
//! so mutations always apply on top of the persisted contents.
//!
//! # Usage
//!
//! ```bash
//! sf-cli cart show
//! sf-cli cart add p1 --name "Shirt" --price 20.00 --quantity 2
//! sf-cli cart set-quantity p1 5
//! sf-cli cart remove 3f0c5a2e-8a49-4a8e-9d0a-5b1f3c2d7e61
//! sf-cli cart clear
//! sf-cli cart purge
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use shopfront_core::{CartLineId, NewCartLine, ProductId, Quantity, QuantityError, format_amount};
use shopfront_storefront::checkout::OrderSummary;
use shopfront_storefront::storage::FileStorage;
use shopfront_storefront::{CartConfig, CartError, CartStore};
use thiserror::Error;
use tracing::info;

/// Errors returned by cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Invalid quantity: {0}")]
    Quantity(#[from] QuantityError),

    #[error("Invalid price {0:?}: expected a decimal between 0 and 10^12")]
    InvalidPrice(String),

    #[error("No cart line matches {0:?}")]
    LineNotFound(String),
}

/// Open the profile's cart and load the persisted contents.
fn open_store(config: &CartConfig) -> Result<CartStore<FileStorage>, CartCommandError> {
    let storage = FileStorage::new(&config.storage_dir);
    let mut store = CartStore::new(storage, config.storage_key.clone());
    store.rehydrate()?;
    Ok(store)
}

/// Resolve a line ID or product ID to the ID of a line in the cart.
fn resolve_line(
    store: &CartStore<FileStorage>,
    target: &str,
) -> Result<CartLineId, CartCommandError> {
    if let Ok(id) = CartLineId::from_str(target)
        && store.line(id).is_some()
    {
        return Ok(id);
    }

    store
        .line_for_product(&ProductId::new(target))
        .map(|line| line.id)
        .ok_or_else(|| CartCommandError::LineNotFound(target.to_string()))
}

/// Largest unit price accepted from the command line.
const MAX_PRICE: i64 = 1_000_000_000_000;

fn parse_price(raw: &str) -> Result<Decimal, CartCommandError> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|price| !price.is_sign_negative() && *price <= Decimal::from(MAX_PRICE))
        .ok_or_else(|| CartCommandError::InvalidPrice(raw.to_string()))
}

/// List cart lines and totals.
pub fn show(config: &CartConfig) -> Result<(), CartCommandError> {
    let store = open_store(config)?;

    if store.is_empty() {
        info!("Cart is empty ({})", config.storage_dir.display());
        return Ok(());
    }

    for line in store.items() {
        info!(
            "{}  {:<16} {:<24} {:>5} x {:>10} = {:>10}",
            line.id,
            line.product_id,
            line.name,
            line.quantity,
            format_amount(line.price, config.currency),
            format_amount(line.line_total(), config.currency),
        );
    }

    let summary = OrderSummary::from_cart(&store, config.currency);
    info!("Lines:    {}", summary.line_count);
    info!("Items:    {}", summary.total_items);
    info!("Subtotal: {}", summary.subtotal_display());
    info!("Shipping: {}", summary.shipping_display());
    info!("Total:    {}", summary.total_display());

    Ok(())
}

/// Add a product snapshot to the cart.
pub fn add(
    config: &CartConfig,
    product_id: &str,
    name: &str,
    price: &str,
    quantity: &str,
    image: &str,
) -> Result<(), CartCommandError> {
    let price = parse_price(price)?;
    let quantity: Quantity = quantity.parse()?;
    let mut store = open_store(config)?;

    let id = store.add_item(NewCartLine {
        product_id: ProductId::new(product_id),
        name: name.to_string(),
        price,
        quantity,
        image: image.to_string(),
    })?;

    let total = store.line(id).map_or(quantity, |line| line.quantity);
    info!("Line {id}: {product_id} x {total}");
    Ok(())
}

/// Remove a line.
pub fn remove(config: &CartConfig, target: &str) -> Result<(), CartCommandError> {
    let mut store = open_store(config)?;
    let id = resolve_line(&store, target)?;

    store.remove_item(id)?;
    info!("Removed line {id}");
    Ok(())
}

/// Replace the quantity of a line.
pub fn set_quantity(
    config: &CartConfig,
    target: &str,
    quantity: &str,
) -> Result<(), CartCommandError> {
    let quantity: Quantity = quantity.parse()?;
    let mut store = open_store(config)?;
    let id = resolve_line(&store, target)?;

    store.update_item_quantity(id, quantity)?;
    info!("Line {id}: quantity {quantity}");
    Ok(())
}

/// Remove every line, keeping the slot.
pub fn clear(config: &CartConfig) -> Result<(), CartCommandError> {
    let mut store = open_store(config)?;
    let removed = store.len();

    store.clear_cart()?;
    info!("Cleared {removed} line(s)");
    Ok(())
}

/// Delete the storage slot.
pub fn purge(config: &CartConfig) -> Result<(), CartCommandError> {
    let storage = FileStorage::new(&config.storage_dir);
    let store = CartStore::new(storage, config.storage_key.clone());

    store.clear_storage()?;
    info!("Purged slot {}", config.storage_key);
    Ok(())
}
