mod backend;
mod barcode;
mod basket;
mod compare;
mod db;
mod prices;
mod stores;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::barcode::BarcodeCommands;
use crate::basket::BasketCommands;
use crate::db::DbCommands;
use crate::prices::PricesCommands;
use crate::stores::StoresCommands;

#[derive(Debug, Parser)]
#[command(name = "prixmq-cli")]
#[command(about = "Compare a grocery basket across Martinique stores")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Edit or show the local basket
    Basket {
        #[command(subcommand)]
        command: BasketCommands,
    },
    /// Rank stores by the cost of the current basket
    Compare,
    /// Store directory queries
    Stores {
        #[command(subcommand)]
        command: StoresCommands,
    },
    /// Validate a retail barcode
    Barcode {
        #[command(subcommand)]
        command: BarcodeCommands,
    },
    /// Record price observations (requires `DATABASE_URL`)
    Prices {
        #[command(subcommand)]
        command: PricesCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = prixmq_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Basket { command }) => basket::run_basket(&config, command).await?,
        Some(Commands::Compare) => compare::run_compare(&config).await?,
        Some(Commands::Stores { command }) => stores::run_stores(&config, &command).await?,
        Some(Commands::Barcode { command }) => barcode::run_barcode(&command)?,
        Some(Commands::Prices { command }) => prices::run_prices(&config, command).await?,
        Some(Commands::Db { command }) => db::run_db(&config, &command).await?,
        None => println!("prixmq-cli ready; see --help"),
    }

    Ok(())
}
