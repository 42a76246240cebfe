//! Basket state: the user's in-progress shopping list, owned by the local
//! client and persisted after every mutation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::observation::ProductId;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized basket snapshot.
pub const BASKET_STORAGE_KEY: &str = "basket";

/// A desired product and how many of it. Unique by `product_id` within a
/// basket; `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A product picked from search or scan results, not yet in the basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBasketProduct {
    pub product_id: ProductId,
    pub name: String,
    pub photo_url: Option<String>,
}

impl NewBasketProduct {
    #[must_use]
    pub fn new(product_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            name: name.into(),
            photo_url: None,
        }
    }

    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

/// The authoritative basket for the active session.
///
/// Every mutation is applied in memory first and then the full snapshot is
/// written to the store. When that write fails the error is returned but the
/// in-memory change stands. There is no undo.
#[derive(Debug)]
pub struct Basket<S> {
    items: Vec<BasketItem>,
    store: S,
}

impl<S: KeyValueStore> Basket<S> {
    /// Reconstructs the basket from `store`.
    ///
    /// A missing snapshot gives an empty basket. So does an unreadable or
    /// corrupt one: that case is logged and otherwise ignored.
    pub fn load(store: S) -> Self {
        let items = match store.get(BASKET_STORAGE_KEY) {
            Ok(Some(raw)) => decode_snapshot(&raw).unwrap_or_else(|reason| {
                tracing::warn!(%reason, "discarding corrupt basket snapshot");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read basket snapshot; starting empty");
                Vec::new()
            }
        };
        Self { items, store }
    }

    #[must_use]
    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&BasketItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|i| i.product_id.clone()).collect()
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Adds one unit of `product`, appending it if it is not yet present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn add_item(&mut self, product: NewBasketProduct) -> Result<(), StorageError> {
        if let Some(existing) = self.find_mut(&product.product_id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(BasketItem {
                product_id: product.product_id,
                name: product.name,
                quantity: 1,
                photo_url: product.photo_url,
            });
        }
        self.persist()
    }

    /// Adds one unit of an item already in the basket; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn increment(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        if let Some(existing) = self.find_mut(product_id) {
            existing.quantity = existing.quantity.saturating_add(1);
        }
        self.persist()
    }

    /// Removes one unit; the item is dropped when its quantity would reach
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        let current = self.get(product_id).map(|i| i.quantity);
        match current {
            Some(quantity) => self.update_quantity(product_id, quantity - 1),
            None => self.persist(),
        }
    }

    /// Sets the quantity of an existing item. Zero removes it. Unknown
    /// products are ignored since there is no name to list them under.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        new_quantity: u32,
    ) -> Result<(), StorageError> {
        if new_quantity == 0 {
            return self.remove_item(product_id);
        }
        if let Some(existing) = self.find_mut(product_id) {
            existing.quantity = new_quantity;
        }
        self.persist()
    }

    /// Deletes the item; absent items are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        self.items.retain(|i| &i.product_id != product_id);
        self.persist()
    }

    /// Empties the basket immediately. Confirmation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut BasketItem> {
        self.items.iter_mut().find(|i| &i.product_id == product_id)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let snapshot =
            serde_json::to_string(&self.items).map_err(|e| StorageError::Serialize {
                key: BASKET_STORAGE_KEY.to_string(),
                source: e,
            })?;
        self.store.set(BASKET_STORAGE_KEY, &snapshot)
    }
}

/// Parses and validates a persisted snapshot.
fn decode_snapshot(raw: &str) -> Result<Vec<BasketItem>, String> {
    let items: Vec<BasketItem> = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut seen = HashSet::new();
    for item in &items {
        if item.quantity == 0 {
            return Err(format!("item {} has zero quantity", item.product_id));
        }
        if !seen.insert(&item.product_id) {
            return Err(format!("duplicate item {}", item.product_id));
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn empty_basket() -> Basket<MemoryStore> {
        Basket::load(MemoryStore::new())
    }

    fn store_with(raw: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(BASKET_STORAGE_KEY, raw).unwrap();
        store
    }

    fn id(s: &str) -> ProductId {
        ProductId::from(s)
    }

    #[test]
    fn adding_same_product_twice_increments_quantity() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();

        assert_eq!(basket.len(), 1);
        assert_eq!(basket.get(&id("P1")).unwrap().quantity, 2);
    }

    #[test]
    fn new_products_are_appended_in_order() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P2", "Lait")).unwrap();
        basket
            .add_item(NewBasketProduct::new("P1", "Riz").with_photo_url("https://img/p1.jpg"))
            .unwrap();

        assert_eq!(basket.product_ids(), vec![id("P2"), id("P1")]);
        assert_eq!(
            basket.get(&id("P1")).unwrap().photo_url.as_deref(),
            Some("https://img/p1.jpg")
        );
    }

    #[test]
    fn update_quantity_to_zero_removes_item() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.update_quantity(&id("P1"), 0).unwrap();
        assert!(basket.is_empty());
    }

    #[test]
    fn update_quantity_is_idempotent() {
        let mut once = empty_basket();
        once.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        once.update_quantity(&id("P1"), 4).unwrap();

        let mut twice = empty_basket();
        twice.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        twice.update_quantity(&id("P1"), 4).unwrap();
        twice.update_quantity(&id("P1"), 4).unwrap();

        assert_eq!(once.items(), twice.items());
    }

    #[test]
    fn update_quantity_ignores_unknown_product() {
        let mut basket = empty_basket();
        basket.update_quantity(&id("ghost"), 3).unwrap();
        assert!(basket.is_empty());
    }

    #[test]
    fn decrement_removes_last_unit() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.increment(&id("P1")).unwrap();
        basket.decrement(&id("P1")).unwrap();
        assert_eq!(basket.get(&id("P1")).unwrap().quantity, 1);
        basket.decrement(&id("P1")).unwrap();
        assert!(basket.get(&id("P1")).is_none());
    }

    #[test]
    fn remove_missing_item_is_noop() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.remove_item(&id("P9")).unwrap();
        assert_eq!(basket.len(), 1);
    }

    #[test]
    fn clear_empties_basket_and_snapshot() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.add_item(NewBasketProduct::new("P2", "Lait")).unwrap();
        basket.clear().unwrap();
        assert!(basket.is_empty());

        let reloaded = Basket::load(basket.into_store());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut basket = empty_basket();
        basket.add_item(NewBasketProduct::new("P1", "Riz")).unwrap();
        basket.add_item(NewBasketProduct::new("P2", "Lait")).unwrap();
        basket.update_quantity(&id("P2"), 6).unwrap();
        let expected = basket.items().to_vec();

        let reloaded = Basket::load(basket.into_store());
        assert_eq!(reloaded.items(), expected.as_slice());
        assert_eq!(reloaded.total_quantity(), 7);
    }

    #[test]
    fn corrupt_snapshot_loads_as_empty() {
        let basket = Basket::load(store_with("{not json"));
        assert!(basket.is_empty());
    }

    #[test]
    fn zero_quantity_snapshot_is_treated_as_corrupt() {
        let raw = r#"[{"product_id":"P1","name":"Riz","quantity":0}]"#;
        assert!(Basket::load(store_with(raw)).is_empty());
    }

    #[test]
    fn duplicate_snapshot_entries_are_treated_as_corrupt() {
        let raw = r#"[{"product_id":"P1","name":"Riz","quantity":1},
                      {"product_id":"P1","name":"Riz","quantity":2}]"#;
        assert!(Basket::load(store_with(raw)).is_empty());
    }

    #[test]
    fn valid_snapshot_without_photo_loads() {
        let raw = r#"[{"product_id":"P1","name":"Riz","quantity":3}]"#;
        let basket = Basket::load(store_with(raw));
        assert_eq!(basket.len(), 1);
        assert_eq!(basket.items()[0].quantity, 3);
        assert!(basket.items()[0].photo_url.is_none());
    }
}
