use clap::Subcommand;
use prixmq_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the database operation
/// fails.
pub(crate) async fn run_db(config: &AppConfig, command: &DbCommands) -> anyhow::Result<()> {
    let pool = prixmq_db::connect_from_app_config(config).await?;
    match command {
        DbCommands::Ping => {
            prixmq_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            prixmq_db::run_migrations(&pool).await?;
            tracing::info!("migrations applied");
            println!("migrations applied");
        }
    }
    pool.close().await;
    Ok(())
}
