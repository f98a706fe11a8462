//! Centralized error types for Nimbus.
//!
//! `WeatherError` is the failure taxonomy shared by the remote and cache
//! adapters. Its `Display` text is what ends up in an `Outcome::Error`, so the
//! wording here is user-visible.

use thiserror::Error;

/// Message used when a failure carries no text of its own.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Failures of the weather and location-search adapters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// Upstream answered 2xx without a body.
    #[error("Response body is null")]
    NotFound,

    /// Upstream answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    Http { status: u16, reason: String },

    /// The transport itself failed.
    #[error("Network error occurred: {0}")]
    Network(String),

    /// Upstream body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Local cache read or write failed.
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("{0}")]
    Unexpected(String),
}

impl WeatherError {
    pub fn http(status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");
        WeatherError::Http {
            status,
            reason: reason.to_string(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        WeatherError::Network(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        WeatherError::Cache(message.into())
    }

    /// Build an `Unexpected` error, falling back to the generic message when
    /// `message` is blank.
    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            WeatherError::Unexpected(UNEXPECTED_ERROR_MESSAGE.to_string())
        } else {
            WeatherError::Unexpected(message)
        }
    }

    /// Whether the failure came from the local cache rather than upstream.
    pub fn is_cache(&self) -> bool {
        matches!(self, WeatherError::Cache(_))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_weather_error(self) -> WeatherError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_weather_error(self) -> WeatherError {
        if self.is_timeout() {
            WeatherError::Network("request timed out".to_string())
        } else if self.is_decode() {
            WeatherError::Decode(self.to_string())
        } else if let Some(status) = self.status() {
            WeatherError::http(status.as_u16())
        } else {
            WeatherError::Network(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_cache_error(self) -> WeatherError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_cache_error(self) -> WeatherError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                WeatherError::Cache(format!("data corruption detected: {}", self))
            }
            _ => WeatherError::Cache(self.to_string()),
        }
    }
}
