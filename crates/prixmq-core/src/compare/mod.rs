//! Multi-store basket comparison, composed as a pipeline of pure steps:
//! [`resolve_latest`] → [`aggregate`] → [`rank`].

mod aggregate;
mod rank;
mod resolve;

use rust_decimal::Decimal;
use serde::Serialize;

pub use aggregate::{aggregate, MatchedItem, StoreBasketResult};
pub use rank::{rank, RankedStore};
pub use resolve::{resolve_latest, resolve_latest_prices, LatestPrices};

use crate::basket::BasketItem;

/// Ranked per-store costs for one basket snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub basket_len: usize,
    pub stores: Vec<RankedStore>,
}

impl Comparison {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    #[must_use]
    pub fn best_offer(&self) -> Option<&RankedStore> {
        self.stores.first()
    }

    /// Price gap between the cheapest and the dearest store carrying the whole
    /// basket. `None` unless at least two stores are complete.
    #[must_use]
    pub fn savings_vs_worst_complete(&self) -> Option<Decimal> {
        let mut complete = self
            .stores
            .iter()
            .filter(|s| s.result.is_complete())
            .map(|s| s.result.total_price);
        let first = complete.next()?;
        let (min, max, count) = complete.fold((first, first, 1usize), |(lo, hi, n), total| {
            (lo.min(total), hi.max(total), n + 1)
        });
        (count >= 2).then(|| max - min)
    }
}

/// Aggregates and ranks `items` against already-resolved prices.
pub fn compare_basket(latest: &LatestPrices, items: &[BasketItem]) -> Comparison {
    Comparison {
        basket_len: items.len(),
        stores: rank(aggregate(latest, items)),
    }
}
