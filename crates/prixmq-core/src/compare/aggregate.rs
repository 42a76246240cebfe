//! Per-store basket aggregation.

use rust_decimal::Decimal;
use serde::Serialize;

use super::resolve::LatestPrices;
use crate::basket::BasketItem;
use crate::observation::{ProductId, StoreId};

/// A basket item priced at a particular store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: u32,
}

impl MatchedItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// What the current basket would cost at one store.
///
/// Derived and ephemeral: recomputed whenever the basket or the resolved
/// prices change, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreBasketResult {
    pub store_id: StoreId,
    pub store_name: String,
    /// Sum of [`MatchedItem::line_total`] over `matched_items` only.
    pub total_price: Decimal,
    /// In basket order.
    pub matched_items: Vec<MatchedItem>,
    /// Basket items with no known price at this store, in basket order.
    pub missing_product_ids: Vec<ProductId>,
    pub missing_count: usize,
    /// `matched_items.len() × 100 / basket length`, in `[0, 100]`.
    pub completeness_percent: Decimal,
}

impl StoreBasketResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_count == 0
    }
}

/// Builds one [`StoreBasketResult`] per store that prices at least one basket
/// item.
///
/// An empty basket yields no results. Stores appear in store-id order. Pure
/// function of its inputs.
pub fn aggregate(latest: &LatestPrices, items: &[BasketItem]) -> Vec<StoreBasketResult> {
    if items.is_empty() {
        return Vec::new();
    }

    let basket_len = Decimal::from(items.len());
    let mut results = Vec::new();

    for (store_id, store_name) in latest.stores() {
        let mut matched_items = Vec::new();
        let mut missing_product_ids = Vec::new();

        for item in items {
            match latest.get(store_id, &item.product_id) {
                Some(observation) => matched_items.push(MatchedItem {
                    product_id: item.product_id.clone(),
                    price: observation.price,
                    quantity: item.quantity,
                }),
                None => missing_product_ids.push(item.product_id.clone()),
            }
        }

        if matched_items.is_empty() {
            continue;
        }

        let total_price = matched_items.iter().map(MatchedItem::line_total).sum();
        let completeness_percent =
            Decimal::from(matched_items.len()) * Decimal::ONE_HUNDRED / basket_len;

        results.push(StoreBasketResult {
            store_id: store_id.clone(),
            store_name: store_name.to_string(),
            total_price,
            missing_count: missing_product_ids.len(),
            matched_items,
            missing_product_ids,
            completeness_percent,
        });
    }

    tracing::debug!(
        basket_items = items.len(),
        stores = results.len(),
        "aggregated basket per store"
    );
    results
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::compare::resolve::resolve_latest;
    use crate::observation::PriceObservation;

    fn item(product: &str, quantity: u32) -> BasketItem {
        BasketItem {
            product_id: ProductId::from(product),
            name: format!("Product {product}"),
            quantity,
            photo_url: None,
        }
    }

    fn obs(product: &str, store: &str, cents: i64) -> PriceObservation {
        PriceObservation {
            product_id: ProductId::from(product),
            store_id: StoreId::from(store),
            store_name: format!("Store {store}"),
            price: Decimal::new(cents, 2),
            observed_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn partial_store_reports_missing_items() {
        let latest = resolve_latest(vec![obs("P1", "S1", 199)]);
        let results = aggregate(&latest, &[item("P1", 1), item("P2", 1)]);

        assert_eq!(results.len(), 1);
        let s1 = &results[0];
        assert_eq!(s1.store_id.as_str(), "S1");
        assert_eq!(s1.completeness_percent, Decimal::from(50));
        assert_eq!(s1.missing_count, 1);
        assert_eq!(s1.missing_product_ids, vec![ProductId::from("P2")]);
        assert_eq!(s1.total_price, Decimal::new(199, 2));
        assert!(!s1.is_complete());
    }

    #[test]
    fn empty_basket_produces_no_results() {
        let latest = resolve_latest(vec![obs("P1", "S1", 100)]);
        assert!(aggregate(&latest, &[]).is_empty());
    }

    #[test]
    fn store_without_basket_items_is_omitted() {
        let latest = resolve_latest(vec![obs("P1", "S1", 100), obs("P9", "S2", 100)]);
        let results = aggregate(&latest, &[item("P1", 1)]);
        let stores: Vec<&str> = results.iter().map(|r| r.store_id.as_str()).collect();
        assert_eq!(stores, vec!["S1"]);
    }

    #[test]
    fn total_multiplies_price_by_quantity() {
        let latest = resolve_latest(vec![obs("P1", "S1", 333), obs("P2", "S1", 150)]);
        let results = aggregate(&latest, &[item("P1", 3), item("P2", 2)]);
        let s1 = &results[0];
        assert_eq!(s1.total_price, Decimal::new(1299, 2));
        let line_sum: Decimal = s1.matched_items.iter().map(MatchedItem::line_total).sum();
        assert_eq!(line_sum, s1.total_price);
        assert!(s1.is_complete());
    }

    #[test]
    fn completeness_is_exact_fraction_of_basket() {
        let latest = resolve_latest(vec![obs("P1", "S1", 100)]);
        let results = aggregate(&latest, &[item("P1", 1), item("P2", 1), item("P3", 1)]);
        let pct = results[0].completeness_percent;
        assert_eq!(pct.round_dp(2), Decimal::new(3333, 2));
        assert!(pct >= Decimal::ZERO && pct <= Decimal::ONE_HUNDRED);
        assert_eq!(results[0].matched_items.len(), 1);
    }
}
