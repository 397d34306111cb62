//! Cart error type.
//!
//! The cart itself never rejects input; every variant here comes from the
//! storage slot or the serialized form inside it.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors raised by [`CartStore`](crate::cart::CartStore) operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading or writing the storage slot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The slot contents could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was dropped before hydration finished.
    #[error("Cart store closed before hydration finished")]
    StoreClosed,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::Storage(StorageError::InvalidKey("../x".to_string()));
        assert_eq!(err.to_string(), "Storage error: Invalid storage key: \"../x\"");

        let err = CartError::StoreClosed;
        assert_eq!(
            err.to_string(),
            "Cart store closed before hydration finished"
        );
    }

    #[test]
    fn test_serde_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CartError = parse_err.into();
        assert!(matches!(err, CartError::Serialization(_)));
    }
}
