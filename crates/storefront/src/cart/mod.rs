//! Client-persisted shopping cart.
//!
//! [`CartStore`] owns the ordered collection of [`CartLine`]s for one
//! profile. It is created by the application's composition root, rehydrated
//! from its [`CartStorage`] slot, and then writes its whole collection back
//! to that slot after every mutation.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► Hydrating ──rehydrate()──► Ready
//!              │                         │
//!              └ mutations kept in       └ mutations persisted
//!                memory only, replaced     immediately
//!                by the persisted cart
//! ```
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use shopfront_core::{NewCartLine, ProductId, Quantity};
//! use shopfront_storefront::cart::CartStore;
//! use shopfront_storefront::storage::MemoryStorage;
//!
//! let mut store = CartStore::new(MemoryStorage::new(), "cart-storage");
//! store.rehydrate()?;
//!
//! store.add_item(NewCartLine {
//!     product_id: ProductId::from("p1"),
//!     name: "Shirt".to_string(),
//!     price: Decimal::from(20),
//!     quantity: Quantity::new(2)?,
//!     image: "x".to_string(),
//! })?;
//!
//! assert_eq!(store.total_items(), 2);
//! assert_eq!(store.total_price(), Decimal::from(40));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod hydration;
mod persist;

use rust_decimal::Decimal;
use shopfront_core::{CartLine, CartLineId, NewCartLine, ProductId, Quantity};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::CartError;
use crate::storage::CartStorage;

pub use hydration::{HydrationEvent, HydrationState, HydrationWatch, SubscriptionId};
pub use persist::STORAGE_VERSION;

use hydration::Observers;
use persist::Decoded;

/// The shopping cart for one profile.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    items: Vec<CartLine>,
    state: HydrationState,
    observers: Observers,
    hydrated: watch::Sender<HydrationState>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store in the Hydrating state. Nothing is read until
    /// [`rehydrate`](Self::rehydrate) is called.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        let (hydrated, _) = watch::channel(HydrationState::Hydrating);
        Self {
            storage,
            key: key.into(),
            items: Vec::new(),
            state: HydrationState::Hydrating,
            observers: Observers::default(),
            hydrated,
        }
    }

    /// Create a store from configuration, rehydrating immediately unless
    /// `skip_hydration` is set.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if immediate rehydration fails.
    pub fn open(storage: S, config: &CartConfig) -> Result<Self, CartError> {
        let mut store = Self::new(storage, config.storage_key.clone());
        if !config.skip_hydration {
            store.rehydrate()?;
        }
        Ok(store)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    /// Look up a line by its local ID.
    #[must_use]
    pub fn line(&self, id: CartLineId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Look up the line holding `product_id`.
    #[must_use]
    pub fn line_for_product(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.items.iter().find(|line| &line.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of unit price × quantity over all lines. Not rounded; saturates
    /// at `Decimal::MAX`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// The storage slot key.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// The backing storage area.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart and return the ID of the line holding it.
    ///
    /// If a line for the same product exists its quantity grows by
    /// `candidate.quantity`; name, price and image keep their original
    /// snapshot. Otherwise a new line with a fresh ID is appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError` only if writing the slot fails; the in-memory
    /// change is kept either way.
    #[instrument(skip_all, fields(product_id = %candidate.product_id, quantity = %candidate.quantity))]
    pub fn add_item(&mut self, candidate: NewCartLine) -> Result<CartLineId, CartError> {
        let id = if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == candidate.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(candidate.quantity);
            debug!(line_id = %existing.id, quantity = %existing.quantity, "Merged into existing line");
            existing.id
        } else {
            let line = CartLine::from_candidate(candidate);
            let id = line.id;
            debug!(line_id = %id, "Appended new line");
            self.items.push(line);
            id
        };

        self.persist()?;
        Ok(id)
    }

    /// Remove the line with `id`. Returns whether a line was removed; an
    /// unknown ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError` only if writing the slot fails.
    #[instrument(skip_all, fields(line_id = %id))]
    pub fn remove_item(&mut self, id: CartLineId) -> Result<bool, CartError> {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        if self.items.len() == before {
            debug!("No such line");
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Replace the quantity of the line with `id`. Returns whether a line was
    /// updated; an unknown ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError` only if writing the slot fails.
    #[instrument(skip_all, fields(line_id = %id, quantity = %quantity))]
    pub fn update_item_quantity(
        &mut self,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<bool, CartError> {
        let Some(line) = self.items.iter_mut().find(|line| line.id == id) else {
            debug!("No such line");
            return Ok(false);
        };
        line.quantity = quantity;

        self.persist()?;
        Ok(true)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `CartError` only if writing the slot fails.
    #[instrument(skip(self), fields(lines = self.items.len()))]
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    /// Delete the persisted slot. In-memory contents are untouched and the
    /// next mutation writes the slot again.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the slot cannot be removed.
    pub fn clear_storage(&self) -> Result<(), CartError> {
        self.storage.remove_item(&self.key)?;
        info!(key = %self.key, "Cleared cart storage slot");
        Ok(())
    }

    fn persist(&self) -> Result<(), CartError> {
        if self.state == HydrationState::Hydrating {
            debug!("Store is hydrating, not persisting");
            return Ok(());
        }
        let raw = persist::encode(&self.items)?;
        self.storage.set_item(&self.key, &raw)?;
        Ok(())
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> HydrationState {
        self.state
    }

    /// Whether the persisted cart has been loaded.
    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.state == HydrationState::Ready
    }

    /// Register a hydration observer. It receives `Started` and `Finished`
    /// for the single hydration of this store; subscribing after the store is
    /// Ready delivers nothing.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&HydrationEvent<'_>) + Send + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// An awaitable handle on the hydration state.
    #[must_use]
    pub fn watch_hydration(&self) -> HydrationWatch {
        HydrationWatch::new(self.hydrated.subscribe())
    }

    /// Load the persisted cart and move to Ready.
    ///
    /// - A stored cart replaces whatever was added while hydrating.
    /// - An empty slot keeps the in-memory lines and writes them out.
    /// - A cart written by another storage version is ignored (logged).
    ///
    /// Calling this again once Ready does nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the slot cannot be read or does not parse. The
    /// store then stays Hydrating and `Finished` is not emitted.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn rehydrate(&mut self) -> Result<(), CartError> {
        if self.state == HydrationState::Ready {
            debug!("Already hydrated");
            return Ok(());
        }

        self.observers.notify(&HydrationEvent::Started);

        let mut write_back = false;
        match self.storage.get_item(&self.key)? {
            Some(raw) => match persist::decode(&raw)? {
                Decoded::Items(items) => {
                    if !self.items.is_empty() {
                        debug!(
                            discarded = self.items.len(),
                            "Replacing lines added while hydrating"
                        );
                    }
                    self.items = items;
                }
                Decoded::VersionMismatch { found } => {
                    warn!(
                        found,
                        expected = STORAGE_VERSION,
                        "Persisted cart has another storage version, ignoring it"
                    );
                }
            },
            None => write_back = !self.items.is_empty(),
        }

        self.state = HydrationState::Ready;
        self.hydrated.send_replace(HydrationState::Ready);
        info!(
            lines = self.items.len(),
            total_items = self.total_items(),
            "Cart hydrated"
        );

        if write_back && let Err(e) = self.persist() {
            warn!(error = %e, "Failed to write provisional lines after hydration");
        }

        self.observers.notify(&HydrationEvent::Finished {
            items: &self.items,
        });
        Ok(())
    }
}
