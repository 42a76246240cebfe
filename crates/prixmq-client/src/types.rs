//! Wire shapes of the hosted REST API (PostgREST conventions) and their
//! conversion into core types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use prixmq_core::{CatalogProduct, PriceObservation, ProductId, Store, StoreId};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A row of `prices` with the owning store embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRow {
    pub product_id: String,
    pub store_id: String,
    /// PostgREST renders `numeric` as a JSON number; some views cast it to
    /// text, so both are accepted.
    pub price: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub stores: Option<StoreEmbed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreEmbed {
    pub name: String,
}

impl PriceRow {
    /// Converts to a [`PriceObservation`]; `None` when the price is missing,
    /// unparseable, or negative.
    pub fn into_observation(self) -> Option<PriceObservation> {
        let price = parse_price(&self.price)?;
        let store_name = self
            .stores
            .map_or_else(|| self.store_id.clone(), |s| s.name);
        Some(PriceObservation {
            product_id: ProductId::new(self.product_id),
            store_id: StoreId::new(self.store_id),
            store_name,
            price,
            observed_at: self.created_at,
        })
    }
}

fn parse_price(value: &serde_json::Value) -> Option<Decimal> {
    let parsed = match value {
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        serde_json::Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }?;
    (parsed >= Decimal::ZERO).then_some(parsed)
}

/// Plain notation first, then exponent form (`1e-7`, `2.5E1`), which
/// `serde_json` emits for very small or large floats.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[derive(Debug, Clone, Deserialize)]
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

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_bqp: Option<bool>,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct {
            id: ProductId::new(row.id),
            name: row.name,
            barcode: row.barcode,
            photo_url: row.photo_url,
            is_bqp: row.is_bqp.unwrap_or(false),
        }
    }
}

/// PostgREST error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// `"[<code>] <message> (hint: <hint>)"`, with absent parts left out.
    /// `None` when the body carries no message.
    pub fn into_message(self) -> Option<String> {
        let mut message = self.message?;
        if let Some(code) = self.code.filter(|c| !c.is_empty()) {
            message = format!("[{code}] {message}");
        }
        if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
            message = format!("{message} (hint: {hint})");
        }
        Some(message)
    }
}
