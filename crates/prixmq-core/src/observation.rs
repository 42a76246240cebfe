//! Identifiers and the read-only price observation row shared by every
//! price source.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque product identifier, as issued by the hosted database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque store identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single recorded price for a product at a store at a point in time.
///
/// Immutable once fetched. Many observations may exist for the same
/// `(store, product)` pair; sources return them newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub store_name: String,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    #[must_use]
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            store_id: self.store_id.clone(),
            product_id: self.product_id.clone(),
        }
    }
}

/// Composite `(store, product)` key. Orders by store first so that iterating
/// a map keyed by it walks one store at a time in store-id order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationKey {
    pub store_id: StoreId,
    pub product_id: ProductId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_order_by_store_then_product() {
        let a = ObservationKey {
            store_id: StoreId::from("S1"),
            product_id: ProductId::from("P9"),
        };
        let b = ObservationKey {
            store_id: StoreId::from("S2"),
            product_id: ProductId::from("P1"),
        };
        assert!(a < b);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&ProductId::from("abc-123")).unwrap();
        assert_eq!(json, "\"abc-123\"");
        let decoded: StoreId = serde_json::from_str("\"s-1\"").unwrap();
        assert_eq!(decoded.as_str(), "s-1");
    }
}
