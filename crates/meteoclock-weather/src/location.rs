//! Location resolution: position lookup, reverse geocoding, fallback.

use crate::geocode::Geocoder;
use crate::types::{Location, LocationError};

/// Used whenever the position lookup fails or is denied
pub const FALLBACK_LATITUDE: f64 = 40.4168;
pub const FALLBACK_LONGITUDE: f64 = -3.7038;
pub const FALLBACK_CITY: &str = "Madrid";

pub fn fallback_location() -> Location {
    Location {
        latitude: FALLBACK_LATITUDE,
        longitude: FALLBACK_LONGITUDE,
        city_name: Some(FALLBACK_CITY.to_string()),
    }
}

/// Anything that can report the device position.
///
/// `ConfiguredPosition` always succeeds and `NoPosition` reports
/// `Unsupported`. `PermissionDenied`, `PositionUnavailable` and `Timeout`
/// belong to a platform location service (e.g. a desktop geolocation
/// backend), which a terminal host does not have.
#[allow(async_fn_in_trait)]
pub trait PositionSource {
    async fn current_position(&self) -> Result<Location, LocationError>;
}

/// Coordinates fixed in configuration
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionSource for ConfiguredPosition {
    async fn current_position(&self) -> Result<Location, LocationError> {
        Ok(Location {
            latitude: self.latitude,
            longitude: self.longitude,
            city_name: None,
        })
    }
}

/// No position lookup available on this host
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

impl PositionSource for NoPosition {
    async fn current_position(&self) -> Result<Location, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: Location,
    /// Set when the fallback location stands in for the real one
    pub lookup_error: Option<LocationError>,
}

impl ResolvedLocation {
    /// Name for the location slot
    pub fn display_name(&self) -> String {
        match &self.location.city_name {
            Some(name) => name.clone(),
            None => format!(
                "{:.2},{:.2}",
                self.location.latitude, self.location.longitude
            ),
        }
    }
}

pub struct LocationResolver<P> {
    source: P,
    geocoder: Geocoder,
}

impl<P: PositionSource> LocationResolver<P> {
    pub fn new(source: P, geocoder: Geocoder) -> Self {
        Self { source, geocoder }
    }

    /// Resolve the position and its place name.
    ///
    /// Never fails: lookup errors are logged and replaced by the fallback
    /// location. Geocoding is skipped when a name is already known.
    pub async fn resolve(&self) -> ResolvedLocation {
        let (mut location, lookup_error) = match self.source.current_position().await {
            Ok(location) => {
                tracing::info!("Got location: {}, {}", location.latitude, location.longitude);
                (location, None)
            }
            Err(e) => {
                tracing::warn!("Location lookup failed, using fallback: {}", e);
                (fallback_location(), Some(e))
            }
        };

        if location.city_name.is_none() {
            location.city_name = self.geocoder.reverse_geocode(&location).await;
        }

        ResolvedLocation {
            location,
            lookup_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Denied;

    impl PositionSource for Denied {
        async fn current_position(&self) -> Result<Location, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn test_denied_uses_fallback_without_geocoding() {
        // The geocoder points nowhere; the fallback already has a name
        let resolver = LocationResolver::new(Denied, Geocoder::new("http://127.0.0.1:9").unwrap());
        let resolved = resolver.resolve().await;

        assert_eq!(resolved.location, fallback_location());
        assert_eq!(resolved.lookup_error, Some(LocationError::PermissionDenied));
        assert_eq!(resolved.display_name(), "Madrid");
    }

    #[tokio::test]
    async fn test_unsupported_uses_fallback() {
        let resolver = LocationResolver::new(NoPosition, Geocoder::default());
        let resolved = resolver.resolve().await;
        assert_eq!(resolved.lookup_error, Some(LocationError::Unsupported));
        assert_eq!(resolved.location.latitude, FALLBACK_LATITUDE);
    }

    #[test]
    fn test_display_name_without_city_uses_coordinates() {
        let resolved = ResolvedLocation {
            location: Location {
                latitude: 41.3874,
                longitude: 2.1686,
                city_name: None,
            },
            lookup_error: None,
        };
        assert_eq!(resolved.display_name(), "41.39,2.17");
    }
}
