//! Sync failure taxonomy.

use thiserror::Error;

/// Why the network time could not be used.
///
/// Every variant is recovered the same way: the clock falls back to the
/// local device time and keeps running.
#[derive(Debug, Error)]
pub enum SyncUnavailable {
    #[error("time service request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("time service returned HTTP {0}")]
    Status(u16),

    #[error("malformed time payload: {0}")]
    Payload(String),
}

impl SyncUnavailable {
    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(e) if e.is_timeout() => "timeout",
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::Payload(_) => "payload",
        }
    }
}
