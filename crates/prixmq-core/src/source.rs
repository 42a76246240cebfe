//! The seam between the comparator and whatever backend stores price
//! observations.

use std::future::Future;

use thiserror::Error;

use crate::observation::{PriceObservation, ProductId};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The price-observation query failed (network or backend error).
///
/// Callers show a non-blocking error with a retry affordance; the basket is
/// never affected.
#[derive(Debug, Error)]
#[error("price observation query failed: {message}")]
pub struct FetchFailure {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl FetchFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a backend error, keeping it reachable through
    /// [`std::error::Error::source`].
    pub fn from_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A backend able to answer the price-observation query.
///
/// Implementations must return observations for the requested products
/// ordered newest-first. "No observations" is an empty `Vec`, not an error.
/// Implementations are not required to deduplicate.
pub trait PriceSource {
    /// Fetches every known observation for `product_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] when the backend cannot be queried.
    fn fetch_observations(
        &self,
        product_ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<PriceObservation>, FetchFailure>> + Send;
}
