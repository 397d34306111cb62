//! Line item quantity type.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The quantity is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The quantity is above the per-line ceiling.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
        /// Rejected value.
        got: i64,
    },
    /// The input is not an integer.
    #[error("quantity must be a whole number: {0}")]
    Invalid(String),
}

/// A positive number of units of one product.
///
/// ## Constraints
///
/// - At least 1
/// - At most [`Quantity::MAX`]
///
/// Sums of quantities (repeated additions of the same product) saturate at
/// `u32::MAX` instead of being re-validated against the ceiling.
///
/// ## Examples
///
/// ```
/// use shopfront_core::Quantity;
///
/// assert!(Quantity::new(3).is_ok());
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest quantity accepted from user input for a single line.
    pub const MAX: u32 = 9_999;

    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in `1..=Quantity::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }

        let max = Self::MAX;
        let within = u32::try_from(value)
            .ok()
            .filter(|v| *v <= max)
            .and_then(NonZeroU32::new)
            .ok_or(QuantityError::TooLarge { max, got: value })?;

        Ok(Self(within))
    }

    /// Returns the quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| QuantityError::Invalid(s.to_owned()))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        // Persisted sums may exceed MAX; only the lower bound is re-checked.
        if value > i64::from(Self::MAX) {
            let clamped = u32::try_from(value).unwrap_or(u32::MAX);
            return NonZeroU32::new(clamped)
                .map(Self)
                .ok_or(QuantityError::NotPositive(value));
        }
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_positive() {
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
        assert_eq!(Quantity::new(9_999).unwrap().get(), 9_999);
    }

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-4), Err(QuantityError::NotPositive(-4)));
    }

    #[test]
    fn test_new_rejects_above_max() {
        assert!(matches!(
            Quantity::new(10_000),
            Err(QuantityError::TooLarge { max: 9_999, got: 10_000 })
        ));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3".parse::<Quantity>().unwrap().get(), 3);
        assert!(matches!(
            "three".parse::<Quantity>(),
            Err(QuantityError::Invalid(_))
        ));
        assert!("0".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_saturating_add() {
        let a = Quantity::new(2).unwrap();
        let b = Quantity::new(1).unwrap();
        assert_eq!(a.saturating_add(b).get(), 3);
    }

    #[test]
    fn test_serde_as_plain_number() {
        let q = Quantity::new(5).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "5");
        let parsed: Quantity = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, q);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_deserialize_accepts_merged_totals_above_max() {
        let parsed: Quantity = serde_json::from_str("12000").unwrap();
        assert_eq!(parsed.get(), 12_000);
    }
}
