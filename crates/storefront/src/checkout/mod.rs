//! Checkout flow between the cart and the hosted backend.
//!
//! The backend is only reached through two traits:
//!
//! - [`ProductCatalog`] - product lookup used for the advisory stock check
//!   before adding to the cart
//! - [`OrderGateway`] - order and order-item creation at checkout
//!
//! Both calls are single-attempt. A failure is reported once to the caller
//! and the cart is left exactly as it was.

mod summary;

use std::future::Future;

use shopfront_core::{
    CartLineId, NewOrder, NewOrderItem, OrderId, OrderStatus, Product, ProductId, Quantity,
    ShippingAddress, UserId,
};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::cart::CartStore;
use crate::error::CartError;
use crate::storage::CartStorage;

pub use summary::OrderSummary;

/// Error returned by a backend collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct GatewayError(Box<dyn std::error::Error + Send + Sync>);

impl GatewayError {
    /// Wrap any error (or message) from the backend client.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Remote product lookup.
pub trait ProductCatalog {
    /// Fetch a product by ID, `None` if it does not exist.
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, GatewayError>> + Send;
}

/// Remote order creation.
pub trait OrderGateway {
    /// Insert an order row and return its ID.
    fn create_order(
        &self,
        order: NewOrder,
    ) -> impl Future<Output = Result<OrderId, GatewayError>> + Send;

    /// Insert the order's item rows.
    fn create_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Errors that can occur while adding to the cart or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has not finished hydrating; its contents are provisional.
    #[error("Cart is still loading")]
    NotReady,

    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Required shipping fields are blank.
    #[error("Missing shipping fields: {}", .0.join(", "))]
    MissingShippingFields(Vec<&'static str>),

    /// The catalog has no such product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The catalog reports fewer units than requested.
    #[error("Only {available} items available")]
    InsufficientInventory {
        product_id: ProductId,
        requested: Quantity,
        available: u32,
    },

    /// A backend call failed.
    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    /// The cart could not be written.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// Add `quantity` of a catalog product to the cart.
///
/// The stock check is advisory: it compares the requested quantity with the
/// catalog's inventory count at this moment and ignores what is already in
/// the cart. The store itself trusts whatever it is given.
///
/// # Errors
///
/// Returns `ProductNotFound` or `InsufficientInventory` from the check,
/// `Gateway` if the lookup fails, or `Cart` if the slot write fails.
#[instrument(skip_all, fields(product_id = %product_id, quantity = %quantity))]
pub async fn add_product_to_cart<S, C>(
    store: &mut CartStore<S>,
    catalog: &C,
    product_id: &ProductId,
    quantity: Quantity,
) -> Result<CartLineId, CheckoutError>
where
    S: CartStorage,
    C: ProductCatalog,
{
    let product = catalog
        .product(product_id)
        .await?
        .ok_or_else(|| CheckoutError::ProductNotFound(product_id.clone()))?;

    if product.inventory_count < quantity.get() {
        debug!(available = product.inventory_count, "Not enough inventory");
        return Err(CheckoutError::InsufficientInventory {
            product_id: product.id,
            requested: quantity,
            available: product.inventory_count,
        });
    }

    let line_id = store.add_item(product.to_cart_line(quantity))?;
    info!(line_id = %line_id, name = %product.name, "Added to cart");
    Ok(line_id)
}

/// Turn the cart into an order.
///
/// Creates the order (status `pending`, total = the cart's total price),
/// then one order item per cart line with the line's snapshot price, then
/// clears the cart. Prices are not re-checked against the catalog.
///
/// # Errors
///
/// Returns `NotReady`, `EmptyCart` or `MissingShippingFields` before any
/// remote call, and `Gateway` if either backend call fails. On error the
/// cart is unchanged.
#[instrument(skip_all, fields(user_id = %user_id, lines = store.len()))]
pub async fn place_order<S, G>(
    store: &mut CartStore<S>,
    gateway: &G,
    user_id: UserId,
    shipping: ShippingAddress,
) -> Result<OrderId, CheckoutError>
where
    S: CartStorage,
    G: OrderGateway,
{
    if !store.has_hydrated() {
        return Err(CheckoutError::NotReady);
    }
    if store.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let missing = shipping.missing_fields();
    if !missing.is_empty() {
        return Err(CheckoutError::MissingShippingFields(missing));
    }

    let total = store.total_price();
    debug!(%total, "Charging snapshot prices");

    let order_id = gateway
        .create_order(NewOrder {
            user_id,
            status: OrderStatus::Pending,
            total,
            shipping_address: shipping,
        })
        .await
        .inspect_err(|e| error!(error = %e, "Failed to create order"))?;

    let items: Vec<NewOrderItem> = store
        .items()
        .iter()
        .map(|line| NewOrderItem::from_line(order_id, line))
        .collect();

    gateway
        .create_order_items(items)
        .await
        .inspect_err(|e| error!(error = %e, order_id = %order_id, "Failed to create order items"))?;

    // The order exists now; a failed slot write must not turn it into an error.
    if let Err(e) = store.clear_cart() {
        warn!(error = %e, order_id = %order_id, "Order placed but cart storage not cleared");
    }

    info!(order_id = %order_id, %total, "Order placed");
    Ok(order_id)
}
