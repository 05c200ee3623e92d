//! Weather service for Meteoclock
//!
//! Resolves the user's location (with a fixed fallback), names it through
//! Nominatim, and reads current conditions and a three-day forecast from
//! wttr.in.

pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use geocode::Geocoder;
pub use location::{ConfiguredPosition, LocationResolver, NoPosition, PositionSource, ResolvedLocation};
pub use provider::WeatherProvider;
pub use types::*;
