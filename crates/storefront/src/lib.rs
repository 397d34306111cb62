//! Shopfront storefront library.
//!
//! The storefront side of the shop: the client-persisted cart and the flow
//! that turns it into an order on the hosted backend.
//!
//! # Modules
//!
//! - [`cart`] - The cart store and its hydration lifecycle
//! - [`storage`] - Local persistence slots the cart is written to
//! - [`checkout`] - Advisory stock check, order placement and summaries
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Cart error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod storage;

pub use cart::{CartStore, HydrationEvent, HydrationState, HydrationWatch, SubscriptionId};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
