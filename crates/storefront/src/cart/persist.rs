//! Serialized form of the cart inside its storage slot.
//!
//! ```json
//! {"state":{"items":[{"id":"…","productId":"p1","name":"Shirt","price":"20","quantity":2,"image":"x"}]},"version":0}
//! ```

use serde::{Deserialize, Serialize};
use shopfront_core::CartLine;
use tracing::warn;

/// Version written by this build.
pub const STORAGE_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Serialize)]
struct StateRef<'a> {
    items: &'a [CartLine],
}

#[derive(Deserialize)]
struct Envelope {
    state: State,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    items: Vec<CartLine>,
}

/// Outcome of reading a slot.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decoded {
    Items(Vec<CartLine>),
    /// Written by another version; no migration exists so it is ignored.
    VersionMismatch { found: u32 },
}

pub(crate) fn encode(items: &[CartLine]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        state: StateRef { items },
        version: STORAGE_VERSION,
    })
}

pub(crate) fn decode(raw: &str) -> Result<Decoded, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != STORAGE_VERSION {
        return Ok(Decoded::VersionMismatch {
            found: envelope.version,
        });
    }
    Ok(Decoded::Items(merge_duplicate_products(envelope.state.items)))
}

/// Fold lines that share a product into the first one.
///
/// The store never writes duplicates, but a hand-edited slot can contain
/// them and the one-line-per-product invariant must hold after loading.
fn merge_duplicate_products(items: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(items.len());
    for line in items {
        if let Some(existing) = merged.iter_mut().find(|l| l.product_id == line.product_id) {
            warn!(
                product_id = %line.product_id,
                line_id = %line.id,
                "Merging duplicate persisted cart line"
            );
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            merged.push(line);
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{NewCartLine, ProductId, Quantity};

    use super::*;

    fn line(product: &str, quantity: i64) -> CartLine {
        CartLine::from_candidate(NewCartLine {
            product_id: ProductId::from(product),
            name: product.to_uppercase(),
            price: Decimal::from(10),
            quantity: Quantity::new(quantity).unwrap(),
            image: String::new(),
        })
    }

    #[test]
    fn test_encode_shape() {
        let items = vec![line("p1", 2)];
        let json: serde_json::Value = serde_json::from_str(&encode(&items).unwrap()).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["state"]["items"][0]["productId"], "p1");
        assert_eq!(json["state"]["items"][0]["quantity"], 2);
    }

    #[test]
    fn test_decode_encoded() {
        let items = vec![line("p1", 2), line("p2", 1)];
        let decoded = decode(&encode(&items).unwrap()).unwrap();
        assert_eq!(decoded, Decoded::Items(items));
    }

    #[test]
    fn test_decode_other_version() {
        let raw = r#"{"state":{"items":[]},"version":3}"#;
        assert_eq!(
            decode(raw).unwrap(),
            Decoded::VersionMismatch { found: 3 }
        );
    }

    #[test]
    fn test_decode_missing_version_defaults_to_zero() {
        let raw = r#"{"state":{"items":[]}}"#;
        assert_eq!(decode(raw).unwrap(), Decoded::Items(Vec::new()));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"state":{"items":[{"id":"x"}]},"version":0}"#).is_err());
    }

    #[test]
    fn test_decode_merges_duplicate_products() {
        let first = line("p1", 2);
        let dup = line("p1", 3);
        let other = line("p2", 1);
        let raw = encode(&[first.clone(), other.clone(), dup]).unwrap();

        let Decoded::Items(items) = decode(&raw).unwrap() else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, first.id);
        assert_eq!(items[0].quantity.get(), 5);
        assert_eq!(items[1], other);
    }
}
