//! Hydration lifecycle: state, events, observers and the async watch handle.
//!
//! A store starts in [`HydrationState::Hydrating`] and moves to
//! [`HydrationState::Ready`] exactly once, when its persisted contents have
//! been loaded. Synchronous observers get a `Started`/`Finished` pair;
//! async code can await a [`HydrationWatch`] instead.

use shopfront_core::CartLine;
use tokio::sync::watch;

use crate::error::CartError;

/// Coarse lifecycle state of a cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HydrationState {
    /// Persisted state not loaded yet; contents are provisional.
    #[default]
    Hydrating,
    /// Persisted state loaded; every mutation is written through.
    Ready,
}

/// Notification delivered to hydration observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationEvent<'a> {
    /// Loading from storage has begun.
    Started,
    /// Loading finished; `items` are the authoritative contents.
    Finished {
        /// Cart contents right after hydration.
        items: &'a [CartLine],
    },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&HydrationEvent<'_>) + Send>;

/// Registered hydration observers, notified in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, event: &HydrationEvent<'_>) {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Awaitable view of a store's hydration state.
///
/// Cheap to clone and `Send`, so it can be handed to tasks that must not
/// render cart contents until the store is authoritative.
#[derive(Debug, Clone)]
pub struct HydrationWatch {
    rx: watch::Receiver<HydrationState>,
}

impl HydrationWatch {
    pub(crate) const fn new(rx: watch::Receiver<HydrationState>) -> Self {
        Self { rx }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> HydrationState {
        *self.rx.borrow()
    }

    /// Whether hydration has finished.
    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.state() == HydrationState::Ready
    }

    /// Resolve once the store is Ready. Returns immediately if it already is.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StoreClosed` if the store is dropped while still
    /// hydrating.
    pub async fn wait_until_hydrated(&mut self) -> Result<(), CartError> {
        self.rx
            .wait_for(|state| *state == HydrationState::Ready)
            .await
            .map(|_| ())
            .map_err(|_| CartError::StoreClosed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_observers_notified_in_order_until_unsubscribed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::default();

        let first_log = Arc::clone(&log);
        let first = observers.subscribe(Box::new(move |event| {
            first_log.lock().unwrap().push(format!("first:{event:?}"));
        }));
        let second_log = Arc::clone(&log);
        observers.subscribe(Box::new(move |_| {
            second_log.lock().unwrap().push("second".to_string());
        }));

        observers.notify(&HydrationEvent::Started);
        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        observers.notify(&HydrationEvent::Started);

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "first:Started".to_string(),
                "second".to_string(),
                "second".to_string()
            ]
        );
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let mut observers = Observers::default();
        let a = observers.subscribe(Box::new(|_| {}));
        let b = observers.subscribe(Box::new(|_| {}));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_watch_resolves_when_ready() {
        let (tx, rx) = watch::channel(HydrationState::Hydrating);
        let mut watch = HydrationWatch::new(rx);
        assert!(!watch.has_hydrated());

        let waiter = tokio::spawn(async move {
            watch.wait_until_hydrated().await.unwrap();
            watch.state()
        });
        tx.send_replace(HydrationState::Ready);

        assert_eq!(waiter.await.unwrap(), HydrationState::Ready);
    }

    #[tokio::test]
    async fn test_watch_errors_when_store_dropped_early() {
        let (tx, rx) = watch::channel(HydrationState::Hydrating);
        let mut watch = HydrationWatch::new(rx);
        drop(tx);
        assert!(matches!(
            watch.wait_until_hydrated().await,
            Err(CartError::StoreClosed)
        ));
    }
}
