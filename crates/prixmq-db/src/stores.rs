//! Database operations for `stores`.

use prixmq_core::{Store, StoreId};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: StoreId::new(row.id),
            name: row.name,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// Lists all stores ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<StoreRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(
        "SELECT id, name, city, latitude, longitude FROM stores ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Inserts a store and returns its generated `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_store(
    pool: &PgPool,
    name: &str,
    city: Option<&str>,
    location: Option<(f64, f64)>,
) -> Result<String, DbError> {
    let id = sqlx::query_scalar::<_, String>(
        "INSERT INTO stores (name, city, latitude, longitude) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(city)
    .bind(location.map(|(lat, _)| lat))
    .bind(location.map(|(_, lon)| lon))
    .fetch_one(pool)
    .await?;
    Ok(id)
}
