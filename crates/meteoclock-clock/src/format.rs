//! Time and date strings for the display slots.

use std::fmt::Display;

use chrono::{DateTime, Local, Locale, TimeZone, Utc};
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%H:%M:%S";
const LONG_DATE_FORMAT: &str = "%A, %-d de %B de %Y";
const DISPLAY_LOCALE: Locale = Locale::es_ES;

/// Zone the UTC base time is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// Host time zone
    #[default]
    Local,
    Named(Tz),
}

impl DisplayZone {
    /// Parse an IANA name; `None` selects the host zone.
    pub fn from_name(name: Option<&str>) -> Result<Self, String> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name.parse::<Tz>().map(Self::Named).map_err(|e| e.to_string()),
        }
    }
}

/// Rendered pair written to the time and date slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTime {
    pub time: String,
    pub date: String,
}

/// Format `instant` in `zone` as `HH:MM:SS` plus the capitalized long date.
pub fn render(instant: DateTime<Utc>, zone: DisplayZone) -> RenderedTime {
    match zone {
        DisplayZone::Local => render_in(instant.with_timezone(&Local)),
        DisplayZone::Named(tz) => render_in(instant.with_timezone(&tz)),
    }
}

fn render_in<Z>(instant: DateTime<Z>) -> RenderedTime
where
    Z: TimeZone,
    Z::Offset: Display,
{
    RenderedTime {
        time: instant.format(TIME_FORMAT).to_string(),
        date: capitalize_first(
            &instant
                .format_localized(LONG_DATE_FORMAT, DISPLAY_LOCALE)
                .to_string(),
        ),
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
