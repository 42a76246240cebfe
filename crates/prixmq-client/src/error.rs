use thiserror::Error;

/// Errors returned by the hosted price API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A paged read returned fewer rows than the server reported, or pages
    /// that do not line up. The partial result is discarded.
    #[error("incomplete response for {context}: got {received} of {total:?} rows ({reason})")]
    IncompleteResponse {
        context: String,
        received: usize,
        total: Option<usize>,
        reason: String,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
