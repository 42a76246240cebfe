//! Comparison session: keeps the displayed comparison in step with the
//! basket while price fetches are in flight.
//!
//! Each refresh is stamped with a generation number. Only the outcome of the
//! newest refresh is applied; older ones arriving late are dropped, as is
//! anything arriving after [`ComparisonSession::close`]. The underlying
//! network call is never cancelled, only its effect is suppressed.

use crate::basket::BasketItem;
use crate::compare::{compare_basket, resolve_latest_prices, Comparison, LatestPrices};
use crate::observation::ProductId;
use crate::source::{FetchFailure, PriceSource};

/// What the comparison view should currently show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComparisonState {
    #[default]
    Idle,
    Loading,
    Ready(Comparison),
    /// The last fetch failed; no comparison data is shown.
    Failed(String),
}

/// Handle for one in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    product_ids: Vec<ProductId>,
}

impl RefreshTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    /// Runs the price query for this ticket.
    ///
    /// # Errors
    ///
    /// Returns the source's [`FetchFailure`].
    pub async fn fetch<S: PriceSource>(&self, source: &S) -> Result<LatestPrices, FetchFailure> {
        resolve_latest_prices(source, &self.product_ids).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Superseded by a newer refresh, or the session was closed.
    Stale,
}

#[derive(Debug, Default)]
pub struct ComparisonSession {
    generation: u64,
    closed: bool,
    latest: Option<LatestPrices>,
    state: ComparisonState,
}

impl ComparisonSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &ComparisonState {
        &self.state
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Starts a new refresh, superseding any in flight.
    ///
    /// An empty basket needs no fetch: the state becomes an empty
    /// comparison and `None` is returned. A closed session never refreshes.
    pub fn begin_refresh(&mut self, items: &[BasketItem]) -> Option<RefreshTicket> {
        if self.closed {
            return None;
        }
        self.generation += 1;

        if items.is_empty() {
            self.state = ComparisonState::Ready(Comparison::default());
            return None;
        }

        self.state = ComparisonState::Loading;
        Some(RefreshTicket {
            generation: self.generation,
            product_ids: items.iter().map(|i| i.product_id.clone()).collect(),
        })
    }

    /// Applies the outcome of `ticket`'s fetch against the basket as it is
    /// now, unless a newer refresh has started or the session is closed.
    pub fn apply(
        &mut self,
        ticket: &RefreshTicket,
        outcome: Result<LatestPrices, FetchFailure>,
        items: &[BasketItem],
    ) -> ApplyOutcome {
        if self.closed || ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                closed = self.closed,
                "discarding stale price fetch"
            );
            return ApplyOutcome::Stale;
        }

        match outcome {
            Ok(latest) => {
                self.state = ComparisonState::Ready(compare_basket(&latest, items));
                self.latest = Some(latest);
            }
            Err(e) => {
                tracing::warn!(error = %e, "price fetch failed");
                self.latest = None;
                self.state = ComparisonState::Failed(e.to_string());
            }
        }
        ApplyOutcome::Applied
    }

    /// Recomputes the comparison from the last accepted prices after a
    /// basket edit. Does nothing while loading, after a failure, or once
    /// closed.
    pub fn recompute(&mut self, items: &[BasketItem]) {
        if self.closed || !matches!(self.state, ComparisonState::Ready(_)) {
            return;
        }
        let comparison = match &self.latest {
            Some(latest) => compare_basket(latest, items),
            None => Comparison::default(),
        };
        self.state = ComparisonState::Ready(comparison);
    }

    /// Runs a refresh to completion against `source`. A closed session
    /// reports [`ApplyOutcome::Stale`] without touching its state.
    pub async fn refresh<S: PriceSource>(
        &mut self,
        source: &S,
        items: &[BasketItem],
    ) -> ApplyOutcome {
        if self.closed {
            return ApplyOutcome::Stale;
        }
        let Some(ticket) = self.begin_refresh(items) else {
            return ApplyOutcome::Applied;
        };
        let outcome = ticket.fetch(source).await;
        self.apply(&ticket, outcome, items)
    }

    /// Marks the view as gone; outcomes arriving later are ignored.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::compare::resolve_latest;
    use crate::observation::{PriceObservation, StoreId};

    fn item(product: &str, quantity: u32) -> BasketItem {
        BasketItem {
            product_id: ProductId::from(product),
            name: product.to_string(),
            quantity,
            photo_url: None,
        }
    }

    fn prices(rows: &[(&str, &str, i64)]) -> LatestPrices {
        resolve_latest(rows.iter().map(|(product, store, cents)| PriceObservation {
            product_id: ProductId::from(*product),
            store_id: StoreId::from(*store),
            store_name: (*store).to_string(),
            price: Decimal::new(*cents, 2),
            observed_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }))
    }

    struct StaticSource(Vec<PriceObservation>);

    impl PriceSource for StaticSource {
        async fn fetch_observations(
            &self,
            product_ids: &[ProductId],
        ) -> Result<Vec<PriceObservation>, FetchFailure> {
            Ok(self
                .0
                .iter()
                .filter(|o| product_ids.contains(&o.product_id))
                .cloned()
                .collect())
        }
    }

    fn best_store(session: &ComparisonSession) -> Option<String> {
        match session.state() {
            ComparisonState::Ready(c) => c.best_offer().map(|b| b.result.store_id.to_string()),
            _ => None,
        }
    }

    #[test]
    fn late_response_from_older_refresh_is_discarded() {
        let items = vec![item("P1", 1)];
        let mut session = ComparisonSession::new();

        let slow = session.begin_refresh(&items).unwrap();
        let fast = session.begin_refresh(&items).unwrap();

        let applied = session.apply(&fast, Ok(prices(&[("P1", "NEW", 100)])), &items);
        assert_eq!(applied, ApplyOutcome::Applied);

        let stale = session.apply(&slow, Ok(prices(&[("P1", "OLD", 100)])), &items);
        assert_eq!(stale, ApplyOutcome::Stale);
        assert_eq!(best_store(&session).as_deref(), Some("NEW"));
    }

    #[test]
    fn outcome_after_close_is_ignored() {
        let items = vec![item("P1", 1)];
        let mut session = ComparisonSession::new();
        let ticket = session.begin_refresh(&items).unwrap();
        session.close();

        let outcome = session.apply(&ticket, Ok(prices(&[("P1", "S1", 100)])), &items);
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(session.state(), &ComparisonState::Loading);
        assert!(session.begin_refresh(&items).is_none());
    }

    #[tokio::test]
    async fn refresh_after_close_is_stale() {
        let source = StaticSource(Vec::new());
        let items = vec![item("P1", 1)];
        let mut session = ComparisonSession::new();
        session.close();

        assert_eq!(session.refresh(&source, &items).await, ApplyOutcome::Stale);
        assert_eq!(session.state(), &ComparisonState::Idle);
        assert_eq!(session.refresh(&source, &[]).await, ApplyOutcome::Stale);
    }

    #[tokio::test]
    async fn refresh_of_empty_basket_is_applied() {
        let source = StaticSource(Vec::new());
        let mut session = ComparisonSession::new();

        assert_eq!(session.refresh(&source, &[]).await, ApplyOutcome::Applied);
        assert_eq!(
            session.state(),
            &ComparisonState::Ready(Comparison::default())
        );
    }

    #[test]
    fn empty_basket_needs_no_fetch() {
        let mut session = ComparisonSession::new();
        assert!(session.begin_refresh(&[]).is_none());
        assert_eq!(
            session.state(),
            &ComparisonState::Ready(Comparison::default())
        );
    }

    #[test]
    fn failure_clears_cached_prices() {
        let items = vec![item("P1", 1)];
        let mut session = ComparisonSession::new();
        let first = session.begin_refresh(&items).unwrap();
        session.apply(&first, Ok(prices(&[("P1", "S1", 100)])), &items);

        let second = session.begin_refresh(&items).unwrap();
        session.apply(&second, Err(FetchFailure::new("timeout")), &items);
        assert!(matches!(session.state(), ComparisonState::Failed(msg) if msg.contains("timeout")));

        session.recompute(&items);
        assert!(matches!(session.state(), ComparisonState::Failed(_)));
    }

    #[test]
    fn recompute_uses_cached_prices_after_basket_edit() {
        let mut items = vec![item("P1", 1)];
        let mut session = ComparisonSession::new();
        let ticket = session.begin_refresh(&items).unwrap();
        session.apply(
            &ticket,
            Ok(prices(&[("P1", "S1", 200), ("P1", "S2", 300)])),
            &items,
        );

        items[0].quantity = 3;
        session.recompute(&items);
        let ComparisonState::Ready(comparison) = session.state() else {
            panic!("expected ready state");
        };
        assert_eq!(
            comparison.best_offer().unwrap().result.total_price,
            Decimal::new(600, 2)
        );
    }

    #[tokio::test]
    async fn refresh_runs_full_pipeline() {
        let source = StaticSource(vec![PriceObservation {
            product_id: ProductId::from("P1"),
            store_id: StoreId::from("S1"),
            store_name: "Carrefour Dillon".to_string(),
            price: Decimal::new(450, 2),
            observed_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
        }]);
        let items = vec![item("P1", 2), item("P2", 1)];
        let mut session = ComparisonSession::new();

        assert_eq!(session.refresh(&source, &items).await, ApplyOutcome::Applied);
        let ComparisonState::Ready(comparison) = session.state() else {
            panic!("expected ready state");
        };
        let best = comparison.best_offer().unwrap();
        assert_eq!(best.result.store_name, "Carrefour Dillon");
        assert_eq!(best.result.total_price, Decimal::new(900, 2));
        assert_eq!(best.result.missing_count, 1);
    }
}
