//! Stores and GPS-based nearest-store resolution for the store picker.

use serde::{Deserialize, Serialize};

use crate::observation::StoreId;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Store {
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreDistance<'a> {
    pub store: &'a Store,
    pub distance_km: f64,
}

fn with_distances<'a>(stores: &'a [Store], here: &GeoPoint) -> Vec<StoreDistance<'a>> {
    stores
        .iter()
        .filter_map(|store| {
            store.location().map(|at| StoreDistance {
                store,
                distance_km: here.distance_km(&at),
            })
        })
        .collect()
}

/// The closest store to `here`. Stores without coordinates are skipped; on
/// equal distance the earlier store wins.
#[must_use]
pub fn nearest_store<'a>(stores: &'a [Store], here: &GeoPoint) -> Option<StoreDistance<'a>> {
    with_distances(stores, here)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.distance_km < best.distance_km {
                candidate
            } else {
                best
            }
        })
}

/// Stores within `radius_km` of `here`, closest first.
#[must_use]
pub fn stores_within<'a>(
    stores: &'a [Store],
    here: &GeoPoint,
    radius_km: f64,
) -> Vec<StoreDistance<'a>> {
    let mut nearby: Vec<StoreDistance<'a>> = with_distances(stores, here)
        .into_iter()
        .filter(|d| d.distance_km <= radius_km)
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}
