//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by the Shopfront components:
//! - `storefront` - Cart store, storage slots and checkout flow
//! - `cli` - Operator tool for inspecting and editing a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, quantities, prices, cart lines, products and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
