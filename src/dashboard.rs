//! Fills the weather slots from the location resolver and wttr.in.

use chrono::{Locale, TimeZone, Utc};
use meteoclock_weather::{
    CurrentWeather, DayForecast, LocationResolver, PositionSource, WeatherError, WeatherProvider,
};

use crate::display::{Slot, SlotBoard};

pub const MISSING_TEMPERATURE: &str = "-- °C";
pub const WEATHER_LOAD_FAILED: &str = "Error al cargar el clima.";

/// Resolve the location and refresh every weather slot.
///
/// Failures only change slot text; nothing here is fatal.
pub async fn refresh_weather<P: PositionSource>(
    resolver: &LocationResolver<P>,
    provider: &WeatherProvider,
    board: &SlotBoard,
) {
    let resolved = resolver.resolve().await;
    match &resolved.lookup_error {
        Some(err) => {
            tracing::info!("Showing fallback location ({})", err.user_message());
            board.set(Slot::LocationNotice, err.user_message());
        }
        None => board.clear(Slot::LocationNotice),
    }

    let city = resolved.display_name();
    board.set(Slot::LocationName, city.as_str());

    match provider.fetch_current(&city).await {
        Ok(current) => show_current(board, &current),
        Err(e) => show_weather_error(board, &e),
    }

    match provider.fetch_forecast(&city).await {
        Ok(days) => board.set(Slot::Forecast, format_forecast(&days)),
        Err(e) => {
            tracing::warn!("Forecast unavailable: {}", e);
            board.clear(Slot::Forecast);
        }
    }
}

fn show_current(board: &SlotBoard, current: &CurrentWeather) {
    board.set(Slot::Icon, current.condition.icon());
    board.set(Slot::Temperature, current.temperature.as_str());
    board.set(Slot::Description, current.description.as_str());
    board.set(Slot::Wind, format!("Viento: {}", current.wind));
}

fn show_weather_error(board: &SlotBoard, err: &WeatherError) {
    tracing::error!("Error al obtener datos del clima: {}", err);
    board.set(Slot::LocationName, WEATHER_LOAD_FAILED);
    board.set(Slot::Description, err.user_message());
    board.set(Slot::Temperature, MISSING_TEMPERATURE);
    board.clear(Slot::Icon);
    board.clear(Slot::Wind);
}

/// e.g. "vie 8 ☀️ 18°/9° · sáb 9 🌧️ 16°/8°"
pub fn format_forecast(days: &[DayForecast]) -> String {
    days.iter()
        .filter_map(|day| {
            let noon = day.date.and_hms_opt(12, 0, 0)?;
            let label = Utc
                .from_utc_datetime(&noon)
                .format_localized("%a %-d", Locale::es_ES)
                .to_string();
            Some(format!(
                "{} {} {}°/{}°",
                label,
                day.condition.icon(),
                day.high_c,
                day.low_c
            ))
        })
        .collect::<Vec<_>>()
        .join(" · ")
}
