//! Top-level error types for the Meteoclock application.
//!
//! Library crates keep their own error enums; this module wraps what the
//! binary needs to report and gives each variant a message fit for display.

use thiserror::Error;

/// Startup failures reported by the binary.
///
/// Use `user_message()` for the line printed to the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Other(_) => "Meteoclock could not start. See the log for details.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found: {0}")]
    NotFound(String),

    #[error("Cannot read configuration file {0}")]
    Unreadable(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => {
                "No configuration directory on this system. Set METEOCLOCK_CONFIG."
            }
            ConfigError::Unreadable(_) => "Configuration file could not be read.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            AppError::Config(ConfigError::NotFound("x".into())),
            AppError::Config(ConfigError::Unreadable("x".into())),
            AppError::Config(ConfigError::Invalid("x".into())),
            AppError::Config(ConfigError::ParseError("x".into())),
            AppError::Other(anyhow::anyhow!("boom")),
        ];

        let messages: std::collections::HashSet<_> =
            errors.iter().map(AppError::user_message).collect();
        assert_eq!(messages.len(), errors.len());
        assert!(messages.iter().all(|m| !m.is_empty()));
    }

    #[test]
    fn test_config_error_converts_into_app_error() {
        let err: AppError = ConfigError::Invalid("clock.timezone".into()).into();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert!(err.to_string().contains("clock.timezone"));
        assert_eq!(err.user_message(), "Invalid configuration. Check your settings.");
    }
}
