//! Geocoding collaborator: free-form address in, coordinate pair out.
//!
//! The weather cache is keyed by the coordinate pair, never the raw
//! address, so two addresses resolving to the same point share an entry.

use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::{ApiClient, FetchError};

pub const GEOCODING_API_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Value-equality cache key at micro-degree resolution, stable under
    /// float noise from repeated lookups.
    pub fn cache_key(&self) -> (i64, i64) {
        (
            (self.latitude * 1e6).round() as i64,
            (self.longitude * 1e6).round() as i64,
        )
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address to coordinates, or fail with a lookup error.
    async fn locate(&self, address: &str) -> Result<Coordinates, FetchError>;
}

/// Google Maps Geocoding API client.
pub struct MapsGeocoder {
    client: ApiClient,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl MapsGeocoder {
    pub fn new(api_key: &str, http: reqwest::Client) -> Self {
        Self {
            client: ApiClient::new("geocoding", GEOCODING_API_URL, None, http),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for MapsGeocoder {
    async fn locate(&self, address: &str) -> Result<Coordinates, FetchError> {
        let resp: GeocodeResponse = self
            .client
            .get_json(
                "/json",
                &[
                    ("address", address.to_string()),
                    ("key", self.api_key.clone()),
                ],
            )
            .await?;

        let location = resp
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| {
                FetchError::new(self.client.service(), format!("no results for '{address}'"))
            })?;

        Ok(Coordinates {
            latitude: location.lat,
            longitude: location.lng,
        })
    }
}
