//! Network time source.
//!
//! One GET against a world-time style endpoint whose JSON body carries a
//! `utc_datetime` field in RFC 3339 form.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::SyncUnavailable;

pub const WORLD_TIME_API_URL: &str = "https://worldtimeapi.org/api/ip";

/// Anything that can produce an authoritative UTC timestamp.
#[allow(async_fn_in_trait)]
pub trait TimeSource {
    async fn fetch_utc(&self) -> Result<DateTime<Utc>, SyncUnavailable>;
}

#[derive(Debug, Deserialize)]
struct TimeResponse {
    utc_datetime: String,
}

/// HTTP time source backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTimeSource {
    client: Client,
    endpoint: String,
}

impl HttpTimeSource {
    /// Source for `endpoint`. `timeout` of `None` leaves the request unbounded.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, SyncUnavailable> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTimeSource {
    fn default() -> Self {
        Self {
            client: Client::new(),
            endpoint: WORLD_TIME_API_URL.to_string(),
        }
    }
}

impl TimeSource for HttpTimeSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint), level = "debug")]
    async fn fetch_utc(&self) -> Result<DateTime<Utc>, SyncUnavailable> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncUnavailable::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_time_payload(&body)
    }
}

/// Extract the UTC timestamp from a time service body.
pub fn parse_time_payload(body: &[u8]) -> Result<DateTime<Utc>, SyncUnavailable> {
    let payload: TimeResponse =
        serde_json::from_slice(body).map_err(|e| SyncUnavailable::Payload(e.to_string()))?;

    DateTime::parse_from_rfc3339(&payload.utc_datetime)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            SyncUnavailable::Payload(format!(
                "invalid utc_datetime {:?}: {}",
                payload.utc_datetime, e
            ))
        })
}
