//! Integration tests for file-backed cart persistence and hydration.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use shopfront_core::{NewCartLine, ProductId, Quantity};
use shopfront_storefront::cart::STORAGE_VERSION;
use shopfront_storefront::storage::{CartStorage, FileStorage};
use shopfront_storefront::{CartConfig, CartStore, HydrationEvent, HydrationState};
use tempfile::TempDir;

const KEY: &str = "cart-storage";

fn shirt(quantity: i64) -> NewCartLine {
    NewCartLine {
        product_id: ProductId::from("p1"),
        name: "Shirt".to_string(),
        price: Decimal::new(2000, 2),
        quantity: Quantity::new(quantity).unwrap(),
        image: "/img/shirt.png".to_string(),
    }
}

fn ready(dir: &TempDir) -> CartStore<FileStorage> {
    let mut store = CartStore::new(FileStorage::new(dir.path()), KEY);
    store.rehydrate().unwrap();
    store
}

// ============================================================================
// Persistence Across Sessions
// ============================================================================

#[test]
fn test_cart_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let mut first = ready(&dir);
    let id = first.add_item(shirt(2)).unwrap();
    drop(first);

    let second = ready(&dir);
    assert_eq!(second.len(), 1);
    let line = second.line(id).unwrap();
    assert_eq!(line.quantity.get(), 2);
    assert_eq!(line.price, Decimal::new(2000, 2));
    assert_eq!(second.total_price(), Decimal::from(40));
}

#[test]
fn test_slot_uses_versioned_envelope() {
    let dir = TempDir::new().unwrap();
    let mut store = ready(&dir);
    store.add_item(shirt(1)).unwrap();

    let raw = FileStorage::new(dir.path()).get_item(KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["version"], STORAGE_VERSION);
    let items = json["state"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], "p1");
    assert_eq!(items[0]["quantity"], 1);
}

#[test]
fn test_externally_written_slot_is_loaded() {
    let dir = TempDir::new().unwrap();
    let raw = r#"{"state":{"items":[
        {"id":"6a1f0a4e-3c7b-4e57-9a53-6f3f0b8f3a10","productId":"p9","name":"Mug","price":"7.50","quantity":4,"image":""}
    ]},"version":0}"#;
    FileStorage::new(dir.path()).set_item(KEY, raw).unwrap();

    let store = ready(&dir);
    assert_eq!(store.total_items(), 4);
    assert_eq!(store.total_price(), Decimal::from(30));
}

#[test]
fn test_corrupt_slot_leaves_store_hydrating() {
    let dir = TempDir::new().unwrap();
    FileStorage::new(dir.path()).set_item(KEY, "{not json").unwrap();

    let mut store = CartStore::new(FileStorage::new(dir.path()), KEY);
    assert!(store.rehydrate().is_err());
    assert_eq!(store.state(), HydrationState::Hydrating);
}

#[test]
fn test_purge_then_reopen_is_empty() {
    let dir = TempDir::new().unwrap();
    let mut store = ready(&dir);
    store.add_item(shirt(1)).unwrap();
    store.clear_storage().unwrap();

    assert!(ready(&dir).is_empty());
}

// ============================================================================
// Hydration Lifecycle
// ============================================================================

#[test]
fn test_open_respects_skip_hydration() {
    let dir = TempDir::new().unwrap();
    ready(&dir).add_item(shirt(3)).unwrap();

    let config = CartConfig {
        storage_dir: dir.path().to_path_buf(),
        skip_hydration: false,
        ..CartConfig::default()
    };
    let eager = CartStore::open(FileStorage::new(dir.path()), &config).unwrap();
    assert!(eager.has_hydrated());
    assert_eq!(eager.total_items(), 3);

    let lazy = CartStore::open(
        FileStorage::new(dir.path()),
        &CartConfig {
            skip_hydration: true,
            ..config
        },
    )
    .unwrap();
    assert!(!lazy.has_hydrated());
    assert!(lazy.is_empty());
}

#[test]
fn test_lines_added_while_hydrating_are_replaced_by_stored_cart() {
    let dir = TempDir::new().unwrap();
    ready(&dir).add_item(shirt(1)).unwrap();

    let mut store = CartStore::new(FileStorage::new(dir.path()), KEY);
    store
        .add_item(NewCartLine {
            product_id: ProductId::from("p2"),
            ..shirt(5)
        })
        .unwrap();
    store.rehydrate().unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.items()[0].product_id, ProductId::from("p1"));
    assert_eq!(store.total_items(), 1);
}

#[test]
fn test_observer_sees_loaded_lines_on_finish() {
    let dir = TempDir::new().unwrap();
    ready(&dir).add_item(shirt(2)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut store = CartStore::new(FileStorage::new(dir.path()), KEY);
    let sink = Arc::clone(&seen);
    store.subscribe(move |event| {
        let entry = match event {
            HydrationEvent::Started => "started".to_string(),
            HydrationEvent::Finished { items } => format!("finished:{}", items.len()),
        };
        sink.lock().unwrap().push(entry);
    });
    store.rehydrate().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["started", "finished:1"]);
}

#[tokio::test]
async fn test_watch_resolves_in_another_task() {
    let dir = TempDir::new().unwrap();
    let mut store = CartStore::new(FileStorage::new(dir.path()), KEY);
    let mut watch = store.watch_hydration();

    let waiter = tokio::spawn(async move {
        watch.wait_until_hydrated().await.unwrap();
        watch.state()
    });

    store.rehydrate().unwrap();
    assert_eq!(waiter.await.unwrap(), HydrationState::Ready);
}
