use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weather condition categories matched from wttr.in descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Match a free-text description by substring, case-insensitively.
    ///
    /// Order matters: "Patchy light rain with thunder" is a thunderstorm,
    /// "Partly cloudy" is not plain cloud.
    pub fn from_description(description: &str) -> Self {
        let text = description.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if has(&["thunder"]) {
            Self::Thunderstorm
        } else if has(&["snow", "sleet", "ice", "blizzard"]) {
            Self::Snow
        } else if has(&["rain", "drizzle", "shower"]) {
            Self::Rain
        } else if has(&["fog", "mist", "haze"]) {
            Self::Fog
        } else if has(&["partly"]) {
            Self::PartlyCloudy
        } else if has(&["cloud", "overcast"]) {
            Self::Cloudy
        } else if has(&["sun", "clear"]) {
            Self::Clear
        } else {
            Self::Unknown
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Emoji shown in the icon slot
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁️",
            Self::Fog => "🌫️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::Unknown => "🌡️",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
}

/// Current conditions as reported by wttr.in's one-line format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// e.g. "+15°C"
    pub temperature: String,
    pub description: String,
    /// e.g. "↗11km/h"
    pub wind: String,
    pub condition: WeatherCondition,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high_c: i32,
    pub low_c: i32,
    pub description: String,
    pub condition: WeatherCondition,
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    PositionUnavailable,
    #[error("Location lookup not supported")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    /// Text for the location slot
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Permiso de ubicación denegado.",
            Self::PositionUnavailable => "Ubicación no disponible.",
            Self::Unsupported => "Geolocalización no soportada.",
            Self::Timeout => "Error al obtener la ubicación.",
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Fallo al obtener el clima de wttr.in. HTTP {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Text for the description slot
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Status(_) => "No se pudo cargar la info de wttr.in.",
            Self::Parse(_) => "Respuesta del clima no válida.",
        }
    }
}
