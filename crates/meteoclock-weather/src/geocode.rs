//! Reverse geocoding: convert coordinates to a place name.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Location, WeatherError};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Meteoclock/", env!("CARGO_PKG_VERSION"));

/// Name used when the address has no city, town or village
pub const UNKNOWN_PLACE: &str = "Ubicación";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Reverse geocode coordinates to a place name.
    ///
    /// Returns `None` on failure; the caller keeps whatever name it had.
    pub async fn reverse_geocode(&self, location: &Location) -> Option<String> {
        let url = format!(
            "{}?format=json&lat={}&lon={}&zoom=10&addressdetails=1",
            self.base_url, location.latitude, location.longitude
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let place = body
            .address
            .and_then(|addr| addr.city.or(addr.town).or(addr.village))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

        tracing::info!("Reverse geocoded to: {}", place);
        Some(place)
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self {
            client: Client::new(),
            base_url: NOMINATIM_URL.to_string(),
        }
    }
}
