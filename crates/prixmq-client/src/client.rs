//! HTTP client for the hosted database's REST surface.
//!
//! Wraps `reqwest` with API-key headers, PostgREST-style query building,
//! typed error handling, and retry on transient failures. Implements
//! [`PriceSource`] so the comparator can read observations through it.

use std::time::Duration;

use prixmq_core::{
    CatalogProduct, FetchFailure, PriceObservation, PriceSource, ProductId, Store,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorBody, PriceRow, ProductRow, StoreRow};

const REST_PREFIX: &str = "rest/v1/";
/// Rows requested per page; hosted PostgREST caps responses at 1000.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Client for the hosted price database's REST API.
///
/// Use [`PriceApiClient::new`] with the project URL; tests point it at a
/// wiremock server the same way.
pub struct PriceApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    page_size: usize,
}

impl std::fmt::Debug for PriceApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl PriceApiClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("prixmq/0.1 (basket-comparator)")
            .build()?;

        // Exactly one trailing slash so that `join` appends below the
        // project root instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Sets how many rows each paged request asks for (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Enables retry of transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches every price observation for `product_ids`, newest first,
    /// following pages until the server-reported total is reached.
    ///
    /// Rows with an unusable price are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a list of price rows.
    /// - [`ClientError::IncompleteResponse`] if the server returns fewer rows
    ///   than it reports, or pages that do not line up.
    pub async fn list_price_observations(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<PriceObservation>, ClientError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = format!("in.({})", quote_list(product_ids.iter().map(ProductId::as_str)));
        let url = self.build_url(
            "prices",
            &[
                ("select", "product_id,store_id,price,created_at,stores(name)"),
                ("product_id", &filter),
                ("order", "created_at.desc"),
            ],
        )?;

        let rows: Vec<PriceRow> = self.get_all_pages(&url).await?;
        let total = rows.len();
        let observations: Vec<PriceObservation> = rows
            .into_iter()
            .filter_map(|row| {
                let ids = (row.product_id.clone(), row.store_id.clone());
                let converted = row.into_observation();
                if converted.is_none() {
                    tracing::warn!(product_id = %ids.0, store_id = %ids.1, "skipping price row with unusable price");
                }
                converted
            })
            .collect();

        tracing::debug!(
            requested = product_ids.len(),
            rows = total,
            kept = observations.len(),
            "fetched price observations"
        );
        Ok(observations)
    }

    /// Lists all stores, ordered by name.
    ///
    /// # Errors
    ///
    /// Same as [`PriceApiClient::list_price_observations`].
    pub async fn list_stores(&self) -> Result<Vec<Store>, ClientError> {
        let url = self.build_url(
            "stores",
            &[
                ("select", "id,name,city,latitude,longitude"),
                ("order", "name.asc"),
            ],
        )?;
        let rows: Vec<StoreRow> = self.get_all_pages(&url).await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    /// Looks up a product by its (normalized) barcode.
    ///
    /// # Errors
    ///
    /// Same as [`PriceApiClient::list_price_observations`].
    pub async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogProduct>, ClientError> {
        let filter = format!("eq.{barcode}");
        let url = self.build_url(
            "products",
            &[
                ("select", "id,name,barcode,photo_url,is_bqp"),
                ("barcode", &filter),
                ("limit", "1"),
            ],
        )?;
        let rows: Vec<ProductRow> = self.get_json(&url).await?;
        Ok(rows.into_iter().next().map(CatalogProduct::from))
    }

    /// Builds `<base>/rest/v1/<table>?<params>` with percent-encoded values.
    fn build_url(&self, table: &str, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(&format!("{REST_PREFIX}{table}"))
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated GET (with retry) and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ClientError> {
        let page = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request(url, None)
        })
        .await?;
        decode_body(url, &page.body)
    }

    /// Reads a whole result set with `Range` requests and an exact count.
    ///
    /// A response without `Content-Range` to the first request means the
    /// server ignored the range and sent everything.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>, ClientError> {
        let mut rows: Vec<T> = Vec::new();
        loop {
            let offset = rows.len();
            let range = (offset, offset + self.page_size - 1);
            let page = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.request(url, Some(range))
            })
            .await?;
            let batch: Vec<T> = decode_body(url, &page.body)?;
            let received = batch.len();

            let Some(content_range) = page.content_range else {
                if offset == 0 {
                    return Ok(batch);
                }
                return Err(incomplete(url, offset, None, "page is missing Content-Range"));
            };

            if let Some((first, last)) = content_range.span {
                if first != offset || last + 1 - first != received {
                    return Err(incomplete(
                        url,
                        offset + received,
                        content_range.total,
                        "page does not match the requested range",
                    ));
                }
            } else if received > 0 {
                return Err(incomplete(
                    url,
                    offset + received,
                    content_range.total,
                    "rows returned without a range",
                ));
            }
            rows.extend(batch);

            match content_range.total {
                Some(total) if rows.len() >= total => return Ok(rows),
                Some(total) if received == 0 => {
                    return Err(incomplete(url, rows.len(), Some(total), "server stopped early"));
                }
                Some(_) => {}
                None if received < self.page_size => return Ok(rows),
                None => {}
            }
            tracing::debug!(fetched = rows.len(), total = ?content_range.total, "fetching next page");
        }
    }

    /// One attempt: non-2xx statuses become [`ClientError::Api`] carrying
    /// the PostgREST error message when there is one.
    async fn request(&self, url: &Url, range: Option<(usize, usize)>) -> Result<Page, ClientError> {
        let mut request = self
            .client
            .get(url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json");
        if let Some((first, last)) = range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{first}-{last}"))
                .header("Prefer", "count=exact");
        }
        let response = request.send().await?;

        let status = response.status();
        let content_range = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(ContentRange::parse);
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::into_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Page {
            body,
            content_range,
        })
    }
}

struct Page {
    body: String,
    content_range: Option<ContentRange>,
}

/// Parsed `Content-Range: <first>-<last>/<total>`; either side may be `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContentRange {
    span: Option<(usize, usize)>,
    total: Option<usize>,
}

impl ContentRange {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = raw.strip_prefix("items ").unwrap_or(raw);
        let (span, total) = raw.split_once('/')?;
        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse().ok()?),
        };
        let span = match span.trim() {
            "*" => None,
            s => {
                let (first, last) = s.split_once('-')?;
                let (first, last): (usize, usize) = (first.parse().ok()?, last.parse().ok()?);
                if last < first {
                    return None;
                }
                Some((first, last))
            }
        };
        Some(Self { span, total })
    }
}

fn decode_body<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
        context: url.path().to_string(),
        source: e,
    })
}

fn incomplete(url: &Url, received: usize, total: Option<usize>, reason: &str) -> ClientError {
    tracing::warn!(path = url.path(), received, ?total, reason, "incomplete paged response");
    ClientError::IncompleteResponse {
        context: url.path().to_string(),
        received,
        total,
        reason: reason.to_string(),
    }
}

/// Renders values as a PostgREST list body: `"a","b"` with embedded quotes
/// and backslashes escaped.
fn quote_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",")
}

impl PriceSource for PriceApiClient {
    async fn fetch_observations(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<PriceObservation>, FetchFailure> {
        self.list_price_observations(product_ids)
            .await
            .map_err(|e| FetchFailure::from_source(e.to_string(), e))
    }
}
