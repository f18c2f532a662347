use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(shiftboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(shiftboard::config))]
    Config(String),

    #[error("Calendar feed error: {0}")]
    #[diagnostic(code(shiftboard::calendar_feed))]
    CalendarFeed(String),

    #[error("Calendar decode error: {0}")]
    #[diagnostic(
        code(shiftboard::decode),
        help("the feed did not look like an iCalendar document")
    )]
    Decode(String),

    #[error("Recurrence error: {0}")]
    #[diagnostic(code(shiftboard::recurrence))]
    Recurrence(String),

    #[error("Bridge error: {0}")]
    #[diagnostic(code(shiftboard::bridge))]
    Bridge(String),

    #[error(transparent)]
    #[diagnostic(code(shiftboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shiftboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(shiftboard::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::CalendarFeed(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BoardResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar feed errors
pub fn feed_error(message: &str) -> Error {
    Error::CalendarFeed(message.to_string())
}

/// Helper to create decode errors
pub fn decode_error(message: &str) -> Error {
    Error::Decode(message.to_string())
}

/// Helper to create recurrence errors
pub fn recurrence_error(message: &str) -> Error {
    Error::Recurrence(message.to_string())
}

/// Helper to create bridge errors
pub fn bridge_error(message: &str) -> Error {
    Error::Bridge(message.to_string())
}
