//! Database operations for `prices`.

use chrono::{DateTime, Utc};
use prixmq_core::{FetchFailure, PriceObservation, PriceSource, ProductId, StoreId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A `prices` row joined with its store's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceObservationRow {
    pub product_id: String,
    pub store_id: String,
    pub store_name: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<PriceObservationRow> for PriceObservation {
    fn from(row: PriceObservationRow) -> Self {
        PriceObservation {
            product_id: ProductId::new(row.product_id),
            store_id: StoreId::new(row.store_id),
            store_name: row.store_name,
            price: row.price,
            observed_at: row.created_at,
        }
    }
}

/// Lists every observation for `product_ids`, newest first. Rows recorded
/// in the same instant fall back to insertion order, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_observations(
    pool: &PgPool,
    product_ids: &[ProductId],
) -> Result<Vec<PriceObservationRow>, DbError> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = product_ids.iter().map(|p| p.as_str().to_owned()).collect();

    let rows = sqlx::query_as::<_, PriceObservationRow>(
        "SELECT p.product_id, p.store_id, s.name AS store_name, p.price, p.created_at \
         FROM prices p \
         JOIN stores s ON s.id = p.store_id \
         WHERE p.product_id = ANY($1) \
         ORDER BY p.created_at DESC, p.id DESC",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Records a new observation and returns its `id`.
///
/// # Errors
///
/// Returns [`DbError::InvalidValue`] for a negative price, or
/// [`DbError::Sqlx`] if the insert fails (e.g. unknown product or store).
pub async fn insert_price_observation(
    pool: &PgPool,
    product_id: &ProductId,
    store_id: &StoreId,
    price: Decimal,
) -> Result<i64, DbError> {
    if price < Decimal::ZERO {
        return Err(DbError::InvalidValue {
            field: "price",
            reason: format!("{price} is negative"),
        });
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO prices (product_id, store_id, price) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(product_id.as_str())
    .bind(store_id.as_str())
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// [`PriceSource`] reading straight from Postgres.
#[derive(Debug, Clone)]
pub struct PgPriceSource {
    pool: PgPool,
}

impl PgPriceSource {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl PriceSource for PgPriceSource {
    async fn fetch_observations(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<PriceObservation>, FetchFailure> {
        let rows = list_price_observations(&self.pool, product_ids)
            .await
            .map_err(|e| FetchFailure::from_source(e.to_string(), e))?;
        tracing::debug!(rows = rows.len(), "fetched price observations from postgres");
        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }
}
