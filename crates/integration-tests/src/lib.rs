//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_hydration` - File-backed persistence and the hydration lifecycle
//! - `checkout_flow` - Add-to-cart stock checks and order placement
//!
//! The backend is replaced by the in-memory doubles in this crate, so no
//! services need to be running.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;
use shopfront_core::{NewOrder, NewOrderItem, OrderId, Product, ProductId};
use shopfront_storefront::checkout::{GatewayError, OrderGateway, ProductCatalog};

/// Build a catalog product with the fields the cart cares about.
#[must_use]
pub fn product(id: &str, price: Decimal, inventory_count: u32) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        description: String::new(),
        price,
        category: "test".to_string(),
        inventory_count,
        image_url: format!("/img/{id}.png"),
        featured: false,
        created_at: Utc::now(),
    }
}

/// Catalog backed by a fixed set of products.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, Product>,
    unavailable: AtomicBool,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every lookup fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl ProductCatalog for InMemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::new("catalog unavailable"));
        }
        Ok(self.products.get(id).cloned())
    }
}

/// Gateway that records every payload it receives.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    orders: Mutex<Vec<(OrderId, NewOrder)>>,
    items: Mutex<Vec<NewOrderItem>>,
    fail_orders: AtomicBool,
    fail_items: AtomicBool,
}

impl RecordingGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject order creation.
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Accept the order but reject its items.
    pub fn fail_items(&self, fail: bool) {
        self.fail_items.store(fail, Ordering::SeqCst);
    }

    /// Orders created so far, with the IDs handed out.
    #[must_use]
    pub fn orders(&self) -> Vec<(OrderId, NewOrder)> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Order items created so far.
    #[must_use]
    pub fn items(&self) -> Vec<NewOrderItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderGateway for RecordingGateway {
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, GatewayError> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(GatewayError::new("orders table rejected insert"));
        }
        let id = OrderId::generate();
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, order));
        Ok(id)
    }

    async fn create_order_items(&self, items: Vec<NewOrderItem>) -> Result<(), GatewayError> {
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(GatewayError::new("order_items table rejected insert"));
        }
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(items);
        Ok(())
    }
}
