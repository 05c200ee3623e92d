use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "METEOCLOCK_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Startup is refused
    Error,
    /// Logged, then ignored
    Warning,
}

/// One problem found in a loaded config
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted key, e.g. `clock.timezone`
    pub key: &'static str,
    pub detail: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.detail)
    }
}

/// Findings of [`Config::validate`], in the order the checks ran
#[derive(Debug, Clone, Default)]
pub struct ConfigReport {
    issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    fn push(&mut self, severity: Severity, key: &'static str, detail: impl Into<String>) {
        self.issues.push(ConfigIssue {
            severity,
            key,
            detail: detail.into(),
        });
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Warnings alone never block startup
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ConfigIssue> {
        self.issues.iter().filter(move |i| i.key == key)
    }

    /// All errors on one line, `key: detail; key: detail`
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Why `raw` cannot be used as an HTTP endpoint, if it cannot.
fn endpoint_problem(raw: &str) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => return Some(format!("not a URL ({})", e)),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Some(format!("expected http or https, got {}", url.scheme()));
    }
    if !url.has_host() {
        return Some("missing host".to_string());
    }
    if url.port() == Some(0) {
        return Some("port 0 is not usable".to_string());
    }
    None
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Clock synchronization settings
    #[serde(default)]
    pub clock: ClockConfig,

    /// Weather and geocoding services
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Fixed position, used instead of the fallback location
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Time service endpoint; must answer with a JSON `utc_datetime` field
    #[serde(default = "default_time_api_url")]
    pub time_api_url: String,

    /// IANA zone used for display (e.g. "Europe/Madrid"); host zone when unset
    #[serde(default)]
    pub timezone: Option<String>,

    /// Optional timeout for the single sync request. No timeout when unset.
    #[serde(default)]
    pub sync_timeout_secs: Option<u64>,
}

fn default_time_api_url() -> String {
    "https://worldtimeapi.org/api/ip".to_string()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_api_url: default_time_api_url(),
            timezone: None,
            sync_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// wttr.in compatible weather endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// Nominatim compatible reverse geocoding endpoint
    #[serde(default = "default_geocode_api_url")]
    pub geocode_api_url: String,

    /// Refresh interval in minutes (0 disables refresh)
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_weather_api_url() -> String {
    "https://wttr.in".to_string()
}

fn default_geocode_api_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_refresh_minutes() -> u32 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            weather_api_url: default_weather_api_url(),
            geocode_api_url: default_geocode_api_url(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Configured coordinates, if both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from `$METEOCLOCK_CONFIG` or the default path.
    ///
    /// A missing file yields the defaults; nothing is written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Load, then refuse a config with validation errors.
    ///
    /// Warnings are logged and returned with the config.
    pub fn load_validated() -> Result<(Self, ConfigReport), ConfigError> {
        Self::load()?.into_validated()
    }

    fn into_validated(self) -> Result<(Self, ConfigReport), ConfigError> {
        let report = self.validate();
        if !report.is_valid() {
            return Err(ConfigError::Invalid(report.error_summary()));
        }

        for warning in report.warnings() {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok((self, report))
    }

    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        let endpoints = [
            ("clock.time_api_url", &self.clock.time_api_url),
            ("weather.weather_api_url", &self.weather.weather_api_url),
            ("weather.geocode_api_url", &self.weather.geocode_api_url),
        ];
        for (key, raw) in endpoints {
            if let Some(problem) = endpoint_problem(raw) {
                report.push(Severity::Error, key, problem);
            }
        }

        if let Some(tz) = &self.clock.timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                report.push(Severity::Error, "clock.timezone", format!("unknown time zone {}", tz));
            }
        }

        if self.clock.sync_timeout_secs == Some(0) {
            report.push(Severity::Error, "clock.sync_timeout_secs", "must be at least 1 second");
        }

        match self.weather.refresh_minutes {
            0 => report.push(Severity::Warning, "weather.refresh_minutes", "refresh disabled"),
            m if m > 24 * 60 => report.push(
                Severity::Warning,
                "weather.refresh_minutes",
                "refresh interval is longer than a day",
            ),
            _ => {}
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    report.push(Severity::Error, "location.latitude", "outside -90..90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    report.push(Severity::Error, "location.longitude", "outside -180..180");
                }
            }
            (None, None) => {}
            _ => report.push(
                Severity::Warning,
                "location",
                "only one coordinate set, the fallback location is used",
            ),
        }

        report
    }

    /// `<config dir>/meteoclock/config.toml`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user config directory".to_string()))?;
        Ok(config_dir.join("meteoclock").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_valid_default_config() {
        let report = Config::default().validate();
        assert!(report.is_valid(), "default config rejected: {}", report.error_summary());
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_default_endpoints() {
        let config = Config::default();
        assert_eq!(config.clock.time_api_url, "https://worldtimeapi.org/api/ip");
        assert_eq!(config.weather.weather_api_url, "https://wttr.in");
        assert!(config.clock.sync_timeout_secs.is_none());
        assert!(config.location.coordinates().is_none());
    }

    #[test]
    fn test_endpoint_problems() {
        assert!(endpoint_problem("https://wttr.in").is_none());
        assert!(endpoint_problem("http://127.0.0.1:8080/api").is_none());
        assert!(endpoint_problem("not-a-url").is_some());
        assert_eq!(
            endpoint_problem("ftp://wttr.in").as_deref(),
            Some("expected http or https, got ftp")
        );
        assert_eq!(
            endpoint_problem("http://wttr.in:0").as_deref(),
            Some("port 0 is not usable")
        );
    }

    #[test]
    fn test_invalid_url_is_reported_per_key() {
        let mut config = Config::default();
        config.clock.time_api_url = "not-a-url".to_string();
        config.weather.weather_api_url = "ftp://wttr.in".to_string();
        let report = config.validate();

        assert!(!report.is_valid());
        assert_eq!(report.for_key("clock.time_api_url").count(), 1);
        assert!(report
            .for_key("weather.weather_api_url")
            .any(|i| i.detail.contains("http or https")));
        assert_eq!(report.for_key("weather.geocode_api_url").count(), 0);
    }

    #[test]
    fn test_unknown_timezone() {
        let mut config = Config::default();
        config.clock.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(config
            .validate()
            .errors()
            .any(|i| i.key == "clock.timezone"));

        config.clock.timezone = Some("Europe/Madrid".to_string());
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let mut config = Config::default();
        config.location.latitude = Some(123.0);
        config.location.longitude = Some(-3.7);
        let report = config.validate();
        assert!(report.errors().any(|i| i.key == "location.latitude"));
        assert_eq!(report.for_key("location.longitude").count(), 0);
    }

    #[test]
    fn test_single_coordinate_is_warning() {
        let mut config = Config::default();
        config.location.latitude = Some(40.0);
        let report = config.validate();
        assert!(report.is_valid());
        assert!(report.warnings().any(|w| w.key == "location"));
        assert!(config.location.coordinates().is_none());
    }

    #[test]
    fn test_zero_refresh_is_warning() {
        let mut config = Config::default();
        config.weather.refresh_minutes = 0;
        let report = config.validate();
        assert!(report.is_valid());
        assert_eq!(
            report.for_key("weather.refresh_minutes").next().map(|i| i.severity),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn test_error_summary_lists_only_errors() {
        let mut report = ConfigReport::default();
        report.push(Severity::Error, "clock.timezone", "unknown time zone X");
        report.push(Severity::Warning, "location", "only one coordinate set");
        report.push(Severity::Error, "clock.sync_timeout_secs", "must be at least 1 second");

        assert_eq!(
            report.error_summary(),
            "clock.timezone: unknown time zone X; clock.sync_timeout_secs: must be at least 1 second"
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.weather.refresh_minutes, 30);
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[clock]\ntimezone = \"Europe/Madrid\"\n\n[location]\nlatitude = 41.39\nlongitude = 2.17"
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.clock.timezone.as_deref(), Some("Europe/Madrid"));
        assert_eq!(config.clock.time_api_url, "https://worldtimeapi.org/api/ip");
        assert_eq!(config.location.coordinates(), Some((41.39, 2.17)));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[clock\ntimezone = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)), "got {:?}", err);
    }

    #[test]
    fn test_unreadable_path_is_reported() {
        // a directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable(_)), "got {:?}", err);
    }

    #[test]
    fn test_invalid_values_are_refused_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[clock]\nsync_timeout_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap().into_validated().unwrap_err();
        match err {
            ConfigError::Invalid(summary) => assert!(summary.contains("clock.sync_timeout_secs")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_warnings_pass_validation() {
        let mut config = Config::default();
        config.weather.refresh_minutes = 0;
        let (config, report) = config.into_validated().unwrap();
        assert_eq!(config.weather.refresh_minutes, 0);
        assert_eq!(report.warnings().count(), 1);
    }
}
