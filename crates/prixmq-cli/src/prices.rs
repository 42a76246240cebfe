use clap::Subcommand;
use prixmq_core::{AppConfig, ProductId, StoreId};
use rust_decimal::Decimal;

#[derive(Debug, Subcommand)]
pub enum PricesCommands {
    /// Record a price seen on the shelf
    Record {
        product_id: String,
        store_id: String,
        /// Shelf price in euros, e.g. 2.49
        price: Decimal,
    },
}

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the price is negative, or
/// the product or store does not exist.
pub(crate) async fn run_prices(config: &AppConfig, command: PricesCommands) -> anyhow::Result<()> {
    let pool = prixmq_db::connect_from_app_config(config).await?;
    match command {
        PricesCommands::Record {
            product_id,
            store_id,
            price,
        } => {
            let id = prixmq_db::insert_price_observation(
                &pool,
                &ProductId::new(product_id),
                &StoreId::new(store_id),
                price,
            )
            .await?;
            tracing::info!(id, %price, "price observation recorded");
            println!("recorded observation {id}");
        }
    }
    pool.close().await;
    Ok(())
}
