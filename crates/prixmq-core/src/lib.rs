pub mod app_config;
pub mod barcode;
pub mod basket;
pub mod compare;
pub mod config;
pub mod observation;
pub mod product;
pub mod session;
pub mod source;
pub mod storage;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use barcode::{Barcode, BarcodeError, BarcodeFormat};
pub use basket::{Basket, BasketItem, NewBasketProduct, BASKET_STORAGE_KEY};
pub use compare::{
    aggregate, compare_basket, rank, resolve_latest, resolve_latest_prices, Comparison,
    LatestPrices, MatchedItem, RankedStore, StoreBasketResult,
};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use observation::{ObservationKey, PriceObservation, ProductId, StoreId};
pub use product::CatalogProduct;
pub use session::{ApplyOutcome, ComparisonSession, ComparisonState, RefreshTicket};
pub use source::{FetchFailure, PriceSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use stores::{nearest_store, stores_within, GeoPoint, Store, StoreDistance};
