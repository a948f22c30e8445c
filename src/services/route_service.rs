use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::LookupDegraded;
use crate::models::location::RoutePoint;
use crate::services::catalog::Catalog;

/// Straight-line distance underestimates the actual road, so haversine
/// results are inflated by a fixed factor before pricing.
pub const ROAD_DISTANCE_FACTOR: f64 = 1.3;
/// Assumed door-to-door average, used to derive duration. No live traffic.
pub const AVERAGE_SPEED_KMH: f64 = 45.0;
/// Conservative default when a destination matches nothing at all. The
/// wizard still presents a price estimate, flagged as degraded.
pub const DEFAULT_DISTANCE_KM: f64 = 30.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Pre-measured road distance from the static table.
    Table,
    /// Google Distance Matrix result.
    Matrix,
    /// Haversine over coordinates, inflated by the road factor.
    Haversine,
    /// Nothing matched; documented default distance.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub source: RouteSource,
    pub degraded: bool,
}

// Distance Matrix wire format.
#[derive(Debug, Deserialize)]
struct GoogleMapsResponse {
    status: String,
    rows: Vec<GoogleMapsRow>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsRow {
    elements: Vec<GoogleMapsElement>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsElement {
    status: String,
    distance: Option<GoogleMapsDistance>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsDistance {
    value: u32, // meters
}

pub struct RouteService {
    http_client: reqwest::Client,
    config: AppConfig,
}

impl RouteService {
    pub fn new(config: AppConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            config,
        }
    }

    /// Resolve a route to distance and duration. Resolution order: the
    /// pre-measured table for named destinations, then the Distance Matrix
    /// when both endpoints carry coordinates and a key is configured, then
    /// inflated haversine, then the documented default. External failures
    /// degrade to the next rung instead of surfacing.
    pub async fn estimate(
        &self,
        catalog: &Catalog,
        origin: &RoutePoint,
        destination: &RoutePoint,
    ) -> RouteEstimate {
        if let Some(distance_km) = table_distance(catalog, origin, destination) {
            return finish(distance_km, RouteSource::Table, false);
        }

        let origin_coords = resolve_coordinates(catalog, origin);
        let destination_coords = resolve_coordinates(catalog, destination);

        if let (Some(from), Some(to)) = (origin_coords, destination_coords) {
            if self.config.maps_enabled() {
                match self.fetch_from_distance_matrix(from, to).await {
                    Ok(distance_km) => return finish(distance_km, RouteSource::Matrix, false),
                    Err(degraded) => {
                        log::warn!("{}", degraded);
                    }
                }
            }
            let distance_km = haversine_km(from, to) * ROAD_DISTANCE_FACTOR;
            return finish(distance_km, RouteSource::Haversine, false);
        }

        log::warn!(
            "{}",
            LookupDegraded {
                reason: format!(
                    "no route data for {} -> {}",
                    origin.label(),
                    destination.label()
                ),
            }
        );
        finish(DEFAULT_DISTANCE_KM, RouteSource::Fallback, true)
    }

    /// Table, haversine, or fallback only; never touches the network. Used
    /// by the submission path so a pending booking cannot stall on the maps
    /// collaborator.
    pub fn estimate_offline(
        catalog: &Catalog,
        origin: &RoutePoint,
        destination: &RoutePoint,
    ) -> RouteEstimate {
        if let Some(distance_km) = table_distance(catalog, origin, destination) {
            return finish(distance_km, RouteSource::Table, false);
        }

        let origin_coords = resolve_coordinates(catalog, origin);
        let destination_coords = resolve_coordinates(catalog, destination);

        if let (Some(from), Some(to)) = (origin_coords, destination_coords) {
            let distance_km = haversine_km(from, to) * ROAD_DISTANCE_FACTOR;
            return finish(distance_km, RouteSource::Haversine, false);
        }

        finish(DEFAULT_DISTANCE_KM, RouteSource::Fallback, true)
    }

    async fn fetch_from_distance_matrix(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
    ) -> Result<f64, LookupDegraded> {
        let api_key = self
            .config
            .google_maps_api_key
            .as_deref()
            .ok_or_else(|| LookupDegraded {
                reason: "no maps API key configured".to_string(),
            })?;

        let url = format!(
            "https://maps.googleapis.com/maps/api/distancematrix/json?origins={},{}&destinations={},{}&mode=driving&key={}",
            origin.0, origin.1, destination.0, destination.1, api_key
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupDegraded {
                reason: format!("distance matrix request failed: {}", e),
            })?;

        let google_response: GoogleMapsResponse =
            response.json().await.map_err(|e| LookupDegraded {
                reason: format!("failed to parse distance matrix response: {}", e),
            })?;

        if google_response.status != "OK" {
            return Err(LookupDegraded {
                reason: format!("distance matrix error: {}", google_response.status),
            });
        }

        let element = google_response
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(|| LookupDegraded {
                reason: "no distance data returned".to_string(),
            })?;

        if element.status != "OK" {
            return Err(LookupDegraded {
                reason: format!("distance matrix element error: {}", element.status),
            });
        }

        let distance = element.distance.as_ref().ok_or_else(|| LookupDegraded {
            reason: "distance not available".to_string(),
        })?;

        Ok(distance.value as f64 / 1000.0)
    }
}

fn finish(distance_km: f64, source: RouteSource, degraded: bool) -> RouteEstimate {
    RouteEstimate {
        distance_km,
        duration_minutes: duration_minutes(distance_km),
        source,
        degraded,
    }
}

pub fn duration_minutes(distance_km: f64) -> u32 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as u32
}

pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// The table holds road distances measured from CMB, so it only applies to
/// routes that start or end there.
fn table_distance(catalog: &Catalog, origin: &RoutePoint, destination: &RoutePoint) -> Option<f64> {
    let named = match (origin, destination) {
        (RoutePoint::Airport { code }, other) if code.eq_ignore_ascii_case("CMB") => other,
        (other, RoutePoint::Airport { code }) if code.eq_ignore_ascii_case("CMB") => other,
        _ => return None,
    };

    let RoutePoint::Named { name, area } = named else {
        return None;
    };

    let key = area
        .clone()
        .or_else(|| catalog.destination(name).map(|d| d.area.clone()))
        .unwrap_or_else(|| name.clone());

    catalog.route_distance(&key)
}

fn resolve_coordinates(catalog: &Catalog, point: &RoutePoint) -> Option<(f64, f64)> {
    match point {
        RoutePoint::Airport { code } => catalog.airport(code).map(|a| a.coordinates),
        RoutePoint::Named { name, .. } => catalog.destination(name).and_then(|d| d.coordinates),
        RoutePoint::Coordinates { lat, lng, .. } => Some((*lat, *lng)),
    }
}
