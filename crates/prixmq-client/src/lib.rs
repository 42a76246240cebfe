pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::PriceApiClient;
pub use error::ClientError;
