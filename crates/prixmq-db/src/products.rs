//! Database operations for `products`.

use prixmq_core::{CatalogProduct, ProductId};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub photo_url: Option<String>,
    pub is_bqp: bool,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct {
            id: ProductId::new(row.id),
            name: row.name,
            barcode: row.barcode,
            photo_url: row.photo_url,
            is_bqp: row.is_bqp,
        }
    }
}

/// Fetches the product carrying `barcode`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_barcode(
    pool: &PgPool,
    barcode: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, barcode, photo_url, is_bqp FROM products WHERE barcode = $1",
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Inserts a product and returns its generated `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (e.g. duplicate barcode).
pub async fn insert_product(
    pool: &PgPool,
    name: &str,
    barcode: Option<&str>,
    is_bqp: bool,
) -> Result<String, DbError> {
    let id = sqlx::query_scalar::<_, String>(
        "INSERT INTO products (name, barcode, is_bqp) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(barcode)
    .bind(is_bqp)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
