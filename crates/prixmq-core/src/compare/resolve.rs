//! Latest-price resolution: reduce raw observations to one row per
//! `(store, product)` pair.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::observation::{ObservationKey, PriceObservation, ProductId, StoreId};
use crate::source::{FetchFailure, PriceSource};

/// The most recent observation per `(store, product)` pair.
///
/// Read-only derived data; iteration walks stores in store-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestPrices {
    by_key: BTreeMap<ObservationKey, PriceObservation>,
}

impl LatestPrices {
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Returns the retained observation for `product_id` at `store_id`.
    #[must_use]
    pub fn get(&self, store_id: &StoreId, product_id: &ProductId) -> Option<&PriceObservation> {
        self.by_key.get(&ObservationKey {
            store_id: store_id.clone(),
            product_id: product_id.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObservationKey, &PriceObservation)> {
        self.by_key.iter()
    }

    /// Distinct stores present, in store-id order, with the display name
    /// carried by their first retained observation.
    #[must_use]
    pub fn stores(&self) -> Vec<(&StoreId, &str)> {
        let mut stores: Vec<(&StoreId, &str)> = Vec::new();
        for observation in self.by_key.values() {
            let is_new = stores
                .last()
                .is_none_or(|(last, _)| *last != &observation.store_id);
            if is_new {
                stores.push((&observation.store_id, observation.store_name.as_str()));
            }
        }
        stores
    }
}

/// Reduces `observations` to the newest row per `(store, product)` key in a
/// single pass.
///
/// Sources deliver rows newest-first, so the first row seen for a key is
/// normally the one kept. A later row only replaces it when its timestamp is
/// strictly newer, which keeps the result correct for a backend that failed
/// to order. Equal timestamps keep the first row.
pub fn resolve_latest<I>(observations: I) -> LatestPrices
where
    I: IntoIterator<Item = PriceObservation>,
{
    let mut by_key = BTreeMap::new();
    for observation in observations {
        match by_key.entry(observation.key()) {
            Entry::Vacant(slot) => {
                slot.insert(observation);
            }
            Entry::Occupied(mut slot) => {
                if observation.observed_at > slot.get().observed_at {
                    slot.insert(observation);
                }
            }
        }
    }
    LatestPrices { by_key }
}

/// Fetches observations for `product_ids` from `source` and resolves the
/// latest price per `(store, product)` pair.
///
/// An empty id set short-circuits to an empty result without touching the
/// source.
///
/// # Errors
///
/// Propagates the source's [`FetchFailure`]; partial data is never returned.
pub async fn resolve_latest_prices<S>(
    source: &S,
    product_ids: &[ProductId],
) -> Result<LatestPrices, FetchFailure>
where
    S: PriceSource,
{
    if product_ids.is_empty() {
        tracing::debug!("no products requested; skipping price query");
        return Ok(LatestPrices::default());
    }

    let observations = source.fetch_observations(product_ids).await?;
    let fetched = observations.len();
    let latest = resolve_latest(observations);
    tracing::debug!(
        products = product_ids.len(),
        fetched,
        retained = latest.len(),
        "resolved latest prices"
    );
    Ok(latest)
}
