//! Picks where prices, stores and products come from.

use anyhow::Context as _;
use prixmq_client::PriceApiClient;
use prixmq_core::{
    AppConfig, CatalogProduct, FetchFailure, PriceObservation, PriceSource, ProductId, Store,
};
use prixmq_db::PgPriceSource;

/// A configured data backend. Postgres wins when both are configured.
#[derive(Debug)]
pub(crate) enum Backend {
    Postgres(PgPriceSource),
    Rest(PriceApiClient),
}

impl Backend {
    /// # Errors
    ///
    /// Returns an error if neither `DATABASE_URL` nor `PRIXMQ_API_URL` is
    /// set, or the chosen backend cannot be reached or built.
    pub(crate) async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.database_url.is_some() {
            let pool = prixmq_db::connect_from_app_config(config)
                .await
                .context("failed to connect to postgres")?;
            tracing::debug!("using postgres backend");
            return Ok(Self::Postgres(PgPriceSource::new(pool)));
        }

        match (config.api_url.as_deref(), config.api_key.as_deref()) {
            (Some(url), Some(key)) => {
                let client = PriceApiClient::new(url, key, config.request_timeout_secs)
                    .context("failed to build price API client")?
                    .with_retry(config.max_retries, config.retry_backoff_base_ms);
                tracing::debug!(url, "using REST backend");
                Ok(Self::Rest(client))
            }
            _ => anyhow::bail!(
                "no price backend configured; set DATABASE_URL or PRIXMQ_API_URL and PRIXMQ_API_KEY"
            ),
        }
    }

    pub(crate) async fn list_stores(&self) -> anyhow::Result<Vec<Store>> {
        match self {
            Self::Postgres(source) => {
                let rows = prixmq_db::list_stores(source.pool()).await?;
                Ok(rows.into_iter().map(Store::from).collect())
            }
            Self::Rest(client) => Ok(client.list_stores().await?),
        }
    }

    pub(crate) async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> anyhow::Result<Option<CatalogProduct>> {
        match self {
            Self::Postgres(source) => {
                let row = prixmq_db::find_product_by_barcode(source.pool(), barcode).await?;
                Ok(row.map(CatalogProduct::from))
            }
            Self::Rest(client) => Ok(client.find_product_by_barcode(barcode).await?),
        }
    }
}

impl PriceSource for Backend {
    async fn fetch_observations(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<PriceObservation>, FetchFailure> {
        match self {
            Self::Postgres(source) => source.fetch_observations(product_ids).await,
            Self::Rest(client) => client.fetch_observations(product_ids).await,
        }
    }
}
