use anyhow::ensure;
use clap::Subcommand;
use prixmq_core::{nearest_store, stores_within, AppConfig, GeoPoint};

use crate::backend::Backend;

#[derive(Debug, Subcommand)]
pub enum StoresCommands {
    /// List every known store
    List,
    /// Find the closest store to a position
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// List every store within this radius instead of only the closest
        #[arg(long)]
        radius_km: Option<f64>,
    },
}

/// # Errors
///
/// Returns an error for out-of-range coordinates or if the store list cannot
/// be fetched.
pub(crate) async fn run_stores(config: &AppConfig, command: &StoresCommands) -> anyhow::Result<()> {
    let backend = Backend::from_config(config).await?;
    let stores = backend.list_stores().await?;

    match command {
        StoresCommands::List => {
            for store in &stores {
                println!(
                    "{:<38}{:<32}{}",
                    store.id.as_str(),
                    store.name,
                    store.city.as_deref().unwrap_or("")
                );
            }
        }
        StoresCommands::Nearest {
            lat,
            lon,
            radius_km,
        } => {
            let here = checked_point(*lat, *lon)?;
            match *radius_km {
                Some(radius) => {
                    ensure!(radius >= 0.0, "--radius-km must not be negative");
                    let nearby = stores_within(&stores, &here, radius);
                    if nearby.is_empty() {
                        println!("no store within {radius} km");
                    }
                    for hit in nearby {
                        println!("{:>7.2} km  {}", hit.distance_km, hit.store.name);
                    }
                }
                None => match nearest_store(&stores, &here) {
                    Some(hit) => println!("{:.2} km  {}", hit.distance_km, hit.store.name),
                    None => println!("no store has coordinates"),
                },
            }
        }
    }
    Ok(())
}

pub(crate) fn checked_point(lat: f64, lon: f64) -> anyhow::Result<GeoPoint> {
    ensure!((-90.0..=90.0).contains(&lat), "latitude {lat} is out of range");
    ensure!((-180.0..=180.0).contains(&lon), "longitude {lon} is out of range");
    Ok(GeoPoint::new(lat, lon))
}
