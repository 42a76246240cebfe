//! Display ordering of per-store results.

use serde::Serialize;

use super::aggregate::StoreBasketResult;

/// A store result with its position in the display order. Rank 0 is the
/// best offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedStore {
    pub rank: usize,
    pub is_best_offer: bool,
    #[serde(flatten)]
    pub result: StoreBasketResult,
}

/// Orders results by completeness (descending), then total price
/// (ascending).
///
/// The sort is stable, so remaining ties keep input order; [`aggregate`]
/// emits stores in store-id order, which makes the output reproducible.
///
/// [`aggregate`]: super::aggregate
pub fn rank(mut results: Vec<StoreBasketResult>) -> Vec<RankedStore> {
    results.sort_by(|a, b| {
        b.completeness_percent
            .cmp(&a.completeness_percent)
            .then_with(|| a.total_price.cmp(&b.total_price))
    });

    results
        .into_iter()
        .enumerate()
        .map(|(rank, result)| RankedStore {
            rank,
            is_best_offer: rank == 0,
            result,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::observation::StoreId;

    fn result(store: &str, completeness: i64, total_cents: i64) -> StoreBasketResult {
        StoreBasketResult {
            store_id: StoreId::from(store),
            store_name: store.to_string(),
            total_price: Decimal::new(total_cents, 2),
            matched_items: Vec::new(),
            missing_product_ids: Vec::new(),
            missing_count: 0,
            completeness_percent: Decimal::from(completeness),
        }
    }

    fn order(ranked: &[RankedStore]) -> Vec<&str> {
        ranked.iter().map(|r| r.result.store_id.as_str()).collect()
    }

    #[test]
    fn completeness_beats_price() {
        let ranked = rank(vec![result("cheap", 50, 100), result("full", 100, 9_900)]);
        assert_eq!(order(&ranked), vec!["full", "cheap"]);
    }

    #[test]
    fn cheaper_wins_on_equal_completeness() {
        let ranked = rank(vec![result("S1", 100, 600), result("S2", 100, 500)]);
        assert_eq!(order(&ranked), vec!["S2", "S1"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let ranked = rank(vec![
            result("A", 100, 500),
            result("B", 100, 500),
            result("C", 100, 500),
        ]);
        assert_eq!(order(&ranked), vec!["A", "B", "C"]);
    }

    #[test]
    fn only_first_entry_is_best_offer() {
        let ranked = rank(vec![
            result("S1", 50, 100),
            result("S2", 100, 300),
            result("S3", 100, 200),
        ]);
        let flags: Vec<(usize, bool)> = ranked.iter().map(|r| (r.rank, r.is_best_offer)).collect();
        assert_eq!(flags, vec![(0, true), (1, false), (2, false)]);
        assert_eq!(order(&ranked), vec!["S3", "S2", "S1"]);
    }

    #[test]
    fn output_is_a_total_order() {
        let ranked = rank(vec![
            result("S1", 25, 100),
            result("S2", 75, 800),
            result("S3", 75, 300),
            result("S4", 100, 1_200),
            result("S5", 25, 50),
        ]);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0].result, &pair[1].result);
            assert!(a.completeness_percent >= b.completeness_percent);
            if a.completeness_percent == b.completeness_percent {
                assert!(a.total_price <= b.total_price);
            }
        }
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        assert!(rank(Vec::new()).is_empty());
    }
}
