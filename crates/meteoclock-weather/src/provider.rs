//! wttr.in client: one-line current conditions and the three-day forecast.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::types::{CurrentWeather, DayForecast, WeatherCondition, WeatherError};

pub const WTTR_URL: &str = "https://wttr.in";
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// temperature, condition, wind
const CURRENT_FORMAT: &str = "%t+%C+%w";
const FORECAST_DAYS: usize = 3;
pub const MISSING_WIND: &str = "-- km/h";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    weather: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastDay {
    date: String,
    #[serde(rename = "maxtempC")]
    max_temp_c: String,
    #[serde(rename = "mintempC")]
    min_temp_c: String,
    #[serde(default)]
    hourly: Vec<ForecastHour>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastHour {
    time: String,
    #[serde(default)]
    weather_desc: Vec<DescValue>,
}

#[derive(Debug, Deserialize)]
struct DescValue {
    value: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let url = format!(
            "{}/{}?format={}",
            self.base_url,
            urlencoding::encode(city),
            CURRENT_FORMAT
        );
        let text = self.get_text(&url).await?;
        parse_current(&text)
    }

    /// Forecast for today and the next two days.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<DayForecast>, WeatherError> {
        let url = format!("{}/{}?format=j1", self.base_url, urlencoding::encode(city));
        let text = self.get_text(&url).await?;
        parse_forecast(&text)
    }

    async fn get_text(&self, url: &str) -> Result<String, WeatherError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Weather request returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Parse "+15°C Partly cloudy ↗11km/h".
///
/// First token is the temperature and, with three or more tokens, the last
/// is the wind; everything between is the description.
pub fn parse_current(text: &str) -> Result<CurrentWeather, WeatherError> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    let (temperature, description, wind) = match parts.as_slice() {
        [] => return Err(WeatherError::Parse("empty weather response".to_string())),
        [temp] => (*temp, String::new(), MISSING_WIND.to_string()),
        [temp, desc] => (*temp, desc.to_string(), MISSING_WIND.to_string()),
        [temp, middle @ .., wind] => (*temp, middle.join(" "), wind.to_string()),
    };

    if !temperature.contains('°') {
        return Err(WeatherError::Parse(format!(
            "unexpected weather response: {}",
            text.trim()
        )));
    }

    Ok(CurrentWeather {
        temperature: temperature.to_string(),
        condition: WeatherCondition::from_description(&description),
        description,
        wind,
    })
}

/// Parse a wttr.in `format=j1` body into at most three days.
pub fn parse_forecast(body: &str) -> Result<Vec<DayForecast>, WeatherError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    response
        .weather
        .into_iter()
        .take(FORECAST_DAYS)
        .map(day_from_api)
        .collect()
}

fn day_from_api(day: ForecastDay) -> Result<DayForecast, WeatherError> {
    let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
        .map_err(|e| WeatherError::Parse(format!("bad forecast date {:?}: {}", day.date, e)))?;
    let high_c = parse_degrees(&day.max_temp_c)?;
    let low_c = parse_degrees(&day.min_temp_c)?;

    // Noon is the representative slot; wttr.in encodes it as "1200"
    let description = day
        .hourly
        .iter()
        .find(|h| h.time == "1200")
        .or_else(|| day.hourly.first())
        .and_then(|h| h.weather_desc.first())
        .map(|d| d.value.trim().to_string())
        .unwrap_or_default();

    Ok(DayForecast {
        date,
        high_c,
        low_c,
        condition: WeatherCondition::from_description(&description),
        description,
    })
}

fn parse_degrees(value: &str) -> Result<i32, WeatherError> {
    value
        .trim()
        .parse()
        .map_err(|_| WeatherError::Parse(format!("bad temperature {:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_multiword_description() {
        let current = parse_current("+15°C Partly cloudy ↗11km/h\n").unwrap();
        assert_eq!(current.temperature, "+15°C");
        assert_eq!(current.description, "Partly cloudy");
        assert_eq!(current.wind, "↗11km/h");
        assert_eq!(current.condition, WeatherCondition::PartlyCloudy);
    }

    #[test]
    fn test_parse_current_single_word() {
        let current = parse_current("-2°C Snow ←5km/h").unwrap();
        assert_eq!(current.description, "Snow");
        assert_eq!(current.condition, WeatherCondition::Snow);
    }

    #[test]
    fn test_parse_current_without_wind() {
        let current = parse_current("+20°C Sunny").unwrap();
        assert_eq!(current.wind, MISSING_WIND);
        assert_eq!(current.condition, WeatherCondition::Clear);
    }

    #[test]
    fn test_parse_current_rejects_non_weather_text() {
        assert!(parse_current("Unknown location; please try ~40.4,-3.7").is_err());
        assert!(parse_current("   ").is_err());
    }

    #[test]
    fn test_parse_forecast_takes_three_days() {
        let body = serde_json::json!({
            "weather": [
                { "date": "2024-11-08", "maxtempC": "18", "mintempC": "9", "hourly": [
                    { "time": "0", "weatherDesc": [{ "value": "Clear " }] },
                    { "time": "1200", "weatherDesc": [{ "value": "Sunny" }] }
                ]},
                { "date": "2024-11-09", "maxtempC": "16", "mintempC": "8", "hourly": [
                    { "time": "0", "weatherDesc": [{ "value": "Light rain" }] }
                ]},
                { "date": "2024-11-10", "maxtempC": "14", "mintempC": "-1", "hourly": [] },
                { "date": "2024-11-11", "maxtempC": "14", "mintempC": "7", "hourly": [] }
            ]
        })
        .to_string();

        let days = parse_forecast(&body).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 11, 8).unwrap());
        assert_eq!(days[0].description, "Sunny");
        assert_eq!(days[0].high_c, 18);
        assert_eq!(days[1].condition, WeatherCondition::Rain);
        assert_eq!(days[2].low_c, -1);
        assert_eq!(days[2].condition, WeatherCondition::Unknown);
    }

    #[test]
    fn test_parse_forecast_bad_temperature() {
        let body = r#"{"weather":[{"date":"2024-11-08","maxtempC":"hot","mintempC":"9"}]}"#;
        assert!(matches!(parse_forecast(body), Err(WeatherError::Parse(_))));
    }
}
