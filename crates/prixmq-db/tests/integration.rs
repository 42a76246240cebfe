//! Offline unit tests for prixmq-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{TimeZone, Utc};
use prixmq_core::{AppConfig, CatalogProduct, Environment, PriceObservation, Store};
use prixmq_db::{PoolConfig, PriceObservationRow, ProductRow, StoreRow};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        api_url: None,
        api_key: None,
        database_url: Some("postgres://example".to_string()),
        data_dir: PathBuf::from("./.prixmq"),
        request_timeout_secs: 15,
        max_retries: 2,
        retry_backoff_base_ms: 500,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn price_row_converts_to_observation() {
    let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap();
    let row = PriceObservationRow {
        product_id: "P1".to_string(),
        store_id: "S1".to_string(),
        store_name: "Carrefour Dillon".to_string(),
        price: Decimal::new(249, 2),
        created_at: at,
    };

    let obs = PriceObservation::from(row);
    assert_eq!(obs.product_id.as_str(), "P1");
    assert_eq!(obs.store_id.as_str(), "S1");
    assert_eq!(obs.store_name, "Carrefour Dillon");
    assert_eq!(obs.price, Decimal::new(249, 2));
    assert_eq!(obs.observed_at, at);
}

#[test]
fn product_row_keeps_bqp_flag() {
    let row = ProductRow {
        id: "P9".to_string(),
        name: "Riz long 1kg".to_string(),
        barcode: Some("3017620422003".to_string()),
        photo_url: None,
        is_bqp: true,
    };

    let product = CatalogProduct::from(row);
    assert_eq!(product.id.as_str(), "P9");
    assert!(product.is_bqp);
    assert_eq!(product.barcode.as_deref(), Some("3017620422003"));
}

#[test]
fn store_row_without_coordinates_has_no_location() {
    let row = StoreRow {
        id: "S3".to_string(),
        name: "Leader Price Rivière-Salée".to_string(),
        city: None,
        latitude: Some(14.52),
        longitude: None,
    };

    let store = Store::from(row);
    assert!(store.location().is_none());
}
